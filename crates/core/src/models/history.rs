//! Completed matches and the rolling log of recent results

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Match, Team, TeamId, TeamStats, Throw};
use crate::error::MatchError;

/// Number of completed matches kept in the log
pub const HISTORY_CAPACITY: usize = 10;

/// Immutable record of a finished match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedMatch {
    pub id: Uuid,
    pub completed_at: DateTime<Utc>,
    /// Wall-clock milliseconds from match start to completion
    pub duration_ms: i64,
    pub winner_id: TeamId,
    pub teams: [Team; 2],
    pub throws: Vec<Throw>,
    /// Indexed like `teams`
    pub stats: [TeamStats; 2],
}

impl CompletedMatch {
    /// Snapshot a finished match
    pub fn from_match(game: &Match, completed_at: DateTime<Utc>) -> Result<Self, MatchError> {
        let winner_id = game.winner_id.ok_or(MatchError::NotFinished)?;
        let duration_ms = (completed_at - game.started_at).num_milliseconds().max(0);

        Ok(Self {
            id: Uuid::new_v4(),
            completed_at,
            duration_ms,
            winner_id,
            teams: game.teams.clone(),
            throws: game.throws.clone(),
            stats: TeamId::ALL.map(|id| game.stats(id)),
        })
    }

    pub fn winner(&self) -> &Team {
        &self.teams[self.winner_id.index()]
    }

    pub fn stats_for(&self, id: TeamId) -> &TeamStats {
        &self.stats[id.index()]
    }

    /// Duration rounded to whole minutes
    pub fn duration_minutes(&self) -> i64 {
        (self.duration_ms + 30_000) / 60_000
    }
}

/// Most recent completed matches, newest first
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MatchHistory {
    entries: VecDeque<CompletedMatch>,
}

impl MatchHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepend a result, evicting the oldest beyond capacity
    pub fn record(&mut self, completed: CompletedMatch) {
        self.entries.push_front(completed);
        self.entries.truncate(HISTORY_CAPACITY);
    }

    /// Withdraw the newest result
    pub fn pop_latest(&mut self) -> Option<CompletedMatch> {
        self.entries.pop_front()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn latest(&self) -> Option<&CompletedMatch> {
        self.entries.front()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CompletedMatch> {
        self.entries.iter()
    }
}
