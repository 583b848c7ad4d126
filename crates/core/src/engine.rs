//! Match engine
//!
//! Every score-changing rule of a 501 leg lives here. Operations either
//! mutate the match and return `Ok`, or return a [`MatchError`] and leave the
//! match exactly as it was. Persisting the result is the caller's job.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::MatchError;
use crate::invariants::assert_match_invariants;
use crate::models::{validate_team_name, Match, TeamId, Throw, DEFAULT_DARTS, MAX_THROW_POINTS};

/// Commands accepted by [`Match::apply`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Command {
    RecordThrow {
        team_id: TeamId,
        points: i64,
        #[serde(default)]
        darts_used: Option<u8>,
    },
    Undo,
    SwitchActiveTeam,
    Reset { team_names: Vec<String> },
    RenameTeam { team_id: TeamId, name: String },
}

/// Parse points typed by a user
pub fn parse_points(input: &str) -> Result<i64, MatchError> {
    input
        .trim()
        .parse::<i64>()
        .map_err(|_| MatchError::InvalidInput(format!("'{}' is not a whole number", input.trim())))
}

fn validate_darts(darts: u8) -> Result<u8, MatchError> {
    if (1..=3).contains(&darts) {
        Ok(darts)
    } else {
        Err(MatchError::InvalidInput(format!(
            "darts used must be between 1 and 3, got {}",
            darts
        )))
    }
}

impl Match {
    /// Dispatch a command to the matching operation
    pub fn apply(&mut self, command: Command) -> Result<(), MatchError> {
        match command {
            Command::RecordThrow {
                team_id,
                points,
                darts_used,
            } => self.record_throw(team_id, points, darts_used),
            Command::Undo => self.undo_last_throw().map(|_| ()),
            Command::SwitchActiveTeam => self.switch_active_team(),
            Command::Reset { team_names } => {
                self.reset(&team_names);
                Ok(())
            }
            Command::RenameTeam { team_id, name } => self.rename_team(team_id, &name),
        }
    }

    /// Credit `points` to `team_id`.
    ///
    /// The credited team is not checked against the active team; the turn
    /// always passes to the other side of the current one unless the throw
    /// finishes the match.
    pub fn record_throw(
        &mut self,
        team_id: TeamId,
        points: i64,
        darts_used: Option<u8>,
    ) -> Result<(), MatchError> {
        if self.is_finished() {
            return Err(MatchError::MatchFinished);
        }
        if points < 0 {
            return Err(MatchError::InvalidInput(format!(
                "points must not be negative, got {}",
                points
            )));
        }
        if points > MAX_THROW_POINTS {
            return Err(MatchError::OutOfRange { points });
        }
        let remaining = self.team(team_id).score;
        if points > i64::from(remaining) {
            return Err(MatchError::Overscore { points, remaining });
        }
        let darts_used = validate_darts(darts_used.unwrap_or(DEFAULT_DARTS))?;

        // bounded by `remaining` above
        let points = points as u32;
        let resulting_score = remaining - points;
        self.team_mut(team_id).score = resulting_score;
        self.throws.push(Throw {
            team_id,
            points,
            darts_used,
            resulting_score,
            thrown_at: Utc::now(),
        });

        if resulting_score == 0 {
            self.winner_id = Some(team_id);
            debug!(team = %team_id, points, darts_used, "Match finished");
        } else {
            self.active_team_id = self.active_team_id.other();
            debug!(team = %team_id, points, resulting_score, "Throw recorded");
        }

        assert_match_invariants(self);
        Ok(())
    }

    /// Remove the most recent throw and hand the turn back to its thrower
    pub fn undo_last_throw(&mut self) -> Result<Throw, MatchError> {
        let last = self.throws.pop().ok_or(MatchError::NothingToUndo)?;

        self.team_mut(last.team_id).score += last.points;
        self.active_team_id = last.team_id;
        self.winner_id = None;

        debug!(team = %last.team_id, points = last.points, "Throw undone");
        assert_match_invariants(self);
        Ok(last)
    }

    /// Change who throws first. Only possible before the first throw.
    pub fn switch_active_team(&mut self) -> Result<(), MatchError> {
        if !self.throws.is_empty() || self.is_finished() {
            return Err(MatchError::TurnOrderLocked);
        }
        self.active_team_id = self.active_team_id.other();
        debug!(active = %self.active_team_id, "Throw order switched");
        Ok(())
    }

    /// Replace this match with a fresh one
    pub fn reset<S: AsRef<str>>(&mut self, team_names: &[S]) {
        *self = Match::new(team_names);
        debug!("Match reset");
    }

    pub fn rename_team(&mut self, team_id: TeamId, name: &str) -> Result<(), MatchError> {
        let name = validate_team_name(name)?;
        self.team_mut(team_id).name = name;
        Ok(())
    }

    /// Amend the dart count of the finishing throw
    pub fn set_finishing_darts(&mut self, darts: u8) -> Result<(), MatchError> {
        let darts = validate_darts(darts)?;
        let winner = self.winner_id.ok_or(MatchError::NotFinished)?;
        let finish = self
            .throws
            .last_mut()
            .filter(|t| t.team_id == winner && t.is_finish())
            .ok_or(MatchError::NotFinished)?;
        finish.darts_used = darts;
        Ok(())
    }
}
