//! Match model - the mutable root aggregate of a 501 leg

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{
    validate_team_name, Team, TeamId, TeamStats, Throw, MAX_THROW_POINTS, STARTING_SCORE,
};
use crate::error::MatchError;

/// A running (or just finished) match between two teams
///
/// Score-changing operations live in [`crate::engine`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub teams: [Team; 2],
    pub active_team_id: TeamId,
    pub throws: Vec<Throw>,
    pub winner_id: Option<TeamId>,
    pub started_at: DateTime<Utc>,
}

impl Match {
    /// Start a fresh match; missing, blank or overlong names fall back to "Team N"
    pub fn new<S: AsRef<str>>(team_names: &[S]) -> Self {
        let name_for = |id: TeamId| {
            team_names
                .get(id.index())
                .and_then(|n| validate_team_name(n.as_ref()).ok())
                .unwrap_or_else(|| Team::default_name(id))
        };

        Self {
            teams: [
                Team::new(TeamId::ONE, name_for(TeamId::ONE)),
                Team::new(TeamId::TWO, name_for(TeamId::TWO)),
            ],
            active_team_id: TeamId::ONE,
            throws: Vec::new(),
            winner_id: None,
            started_at: Utc::now(),
        }
    }

    pub fn team(&self, id: TeamId) -> &Team {
        &self.teams[id.index()]
    }

    pub(crate) fn team_mut(&mut self, id: TeamId) -> &mut Team {
        &mut self.teams[id.index()]
    }

    /// Look up a team by raw id as received from an adapter
    pub fn find_team(&self, raw_id: u8) -> Result<&Team, MatchError> {
        let id = TeamId::try_from(raw_id)?;
        Ok(self.team(id))
    }

    pub fn active_team(&self) -> &Team {
        self.team(self.active_team_id)
    }

    pub fn winner(&self) -> Option<&Team> {
        self.winner_id.map(|id| self.team(id))
    }

    pub fn is_finished(&self) -> bool {
        self.winner_id.is_some()
    }

    /// The throw that ended the match, if any
    pub fn finishing_throw(&self) -> Option<&Throw> {
        let winner = self.winner_id?;
        self.throws
            .iter()
            .rev()
            .find(|t| t.team_id == winner && t.is_finish())
    }

    pub fn team_names(&self) -> [String; 2] {
        [self.teams[0].name.clone(), self.teams[1].name.clone()]
    }

    /// Statistics for one team, recomputed from the throw log
    pub fn stats(&self, id: TeamId) -> TeamStats {
        TeamStats::compute(&self.throws, id)
    }

    /// Check a match that did not come from the engine, such as one read
    /// back from storage. Replays the throw log against the team scores.
    pub fn validate(&self) -> Result<(), MatchError> {
        for (index, team) in self.teams.iter().enumerate() {
            if team.id.index() != index {
                return Err(inconsistent(format!(
                    "team {} stored in slot {}",
                    team.id,
                    index + 1
                )));
            }
            validate_team_name(&team.name)?;
        }

        let mut remaining = [STARTING_SCORE; 2];
        for (position, throw) in self.throws.iter().enumerate() {
            if !(1..=3).contains(&throw.darts_used) {
                return Err(inconsistent(format!(
                    "throw {} used {} darts",
                    position + 1,
                    throw.darts_used
                )));
            }
            if i64::from(throw.points) > MAX_THROW_POINTS {
                return Err(inconsistent(format!(
                    "throw {} scored {}",
                    position + 1,
                    throw.points
                )));
            }

            let left = &mut remaining[throw.team_id.index()];
            *left = left.checked_sub(throw.points).ok_or_else(|| {
                inconsistent(format!("throw {} goes below zero", position + 1))
            })?;
            if throw.resulting_score != *left {
                return Err(inconsistent(format!(
                    "throw {} records {} remaining, log says {}",
                    position + 1,
                    throw.resulting_score,
                    left
                )));
            }
            if *left == 0 && position + 1 != self.throws.len() {
                return Err(inconsistent("throws recorded after the finish".into()));
            }
        }

        for team in &self.teams {
            let expected = remaining[team.id.index()];
            if team.score != expected {
                return Err(inconsistent(format!(
                    "team {} has {} remaining, log says {}",
                    team.id, team.score, expected
                )));
            }
            if (team.score == 0) != (self.winner_id == Some(team.id)) {
                return Err(inconsistent(format!(
                    "team {} has {} remaining but winner is {:?}",
                    team.id, team.score, self.winner_id
                )));
            }
        }

        Ok(())
    }
}

fn inconsistent(detail: String) -> MatchError {
    MatchError::Inconsistent(detail)
}

impl Default for Match {
    fn default() -> Self {
        Self::new::<&str>(&[])
    }
}
