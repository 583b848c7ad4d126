//! Scoreboard view model
//!
//! Owns the running match and everything around it that the engine does not
//! care about: the finish prompt, the completed-match log, remembered names,
//! and saving after each visible change.

use chrono::Utc;
use oche_core::{
    BundleStore, CompletedMatch, Match, MatchError, MatchHistory, PersistedBundle, TeamId,
    TeamStats,
};
use tracing::{debug, info};

/// Waiting for the number of darts used on the winning throw
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingFinish {
    pub team_id: TeamId,
    pub points: u32,
}

/// Result of a recorded throw
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThrowOutcome {
    /// Turn passed to the given team
    NextUp(TeamId),
    /// The throw won the match; the finish prompt is open
    Finished(PendingFinish),
}

pub struct Scoreboard {
    game: Match,
    bundle: PersistedBundle,
    pending_finish: Option<PendingFinish>,
    store: Box<dyn BundleStore + Send>,
}

impl Scoreboard {
    /// Rehydrate from the store, or start a fresh match with the remembered
    /// names (falling back to `default_names` when none were remembered).
    pub fn restore(store: Box<dyn BundleStore + Send>, default_names: Option<[String; 2]>) -> Self {
        let mut bundle = store.load();
        bundle.apply_default_names(default_names);

        let game = bundle
            .current_match
            .clone()
            .unwrap_or_else(|| bundle.new_match());

        // A finished match that was never moved to the log still needs its darts
        let pending_finish = game.finishing_throw().map(|t| PendingFinish {
            team_id: t.team_id,
            points: t.points,
        });

        info!(
            throws = game.throws.len(),
            history = bundle.history.len(),
            "Scoreboard restored"
        );

        Self {
            game,
            bundle,
            pending_finish,
            store,
        }
    }

    pub fn game(&self) -> &Match {
        &self.game
    }

    pub fn history(&self) -> &MatchHistory {
        &self.bundle.history
    }

    pub fn pending_finish(&self) -> Option<PendingFinish> {
        self.pending_finish
    }

    pub fn stats(&self, team_id: TeamId) -> TeamStats {
        self.game.stats(team_id)
    }

    /// Record a throw for the team whose turn it is
    pub fn throw(&mut self, points: i64, darts: Option<u8>) -> Result<ThrowOutcome, MatchError> {
        let team_id = self.game.active_team_id;
        self.game.record_throw(team_id, points, darts)?;

        let outcome = match self.game.finishing_throw() {
            Some(finish) => {
                let pending = PendingFinish {
                    team_id: finish.team_id,
                    points: finish.points,
                };
                self.pending_finish = Some(pending);
                ThrowOutcome::Finished(pending)
            }
            None => ThrowOutcome::NextUp(self.game.active_team_id),
        };

        self.persist();
        Ok(outcome)
    }

    /// Throw exactly the remaining score of the active team
    pub fn throw_finish(&mut self) -> Result<ThrowOutcome, MatchError> {
        let remaining = i64::from(self.game.active_team().score);
        self.throw(remaining, None)
    }

    /// Answer the finish prompt; `None` skips it and counts three darts.
    /// Moves the match into the completed log.
    pub fn submit_finish_darts(&mut self, darts: Option<u8>) -> Result<&CompletedMatch, MatchError> {
        if self.pending_finish.is_none() {
            return Err(MatchError::NotFinished);
        }
        if let Some(darts) = darts {
            self.game.set_finishing_darts(darts)?;
        }

        self.pending_finish = None;
        let completed = self.bundle.finalize(&self.game, Utc::now())?;
        info!(
            winner = %completed.winner_id,
            duration_ms = completed.duration_ms,
            "Match completed"
        );
        self.store.save(&self.bundle);
        self.bundle.history.latest().ok_or(MatchError::NotFinished)
    }

    pub fn undo(&mut self) -> Result<(), MatchError> {
        self.game.undo_last_throw()?;
        self.pending_finish = None;
        self.persist();
        Ok(())
    }

    /// Change who throws first
    pub fn switch_first_thrower(&mut self) -> Result<(), MatchError> {
        self.game.switch_active_team()?;
        self.persist();
        Ok(())
    }

    pub fn rename(&mut self, team_id: TeamId, name: &str) -> Result<(), MatchError> {
        self.game.rename_team(team_id, name)?;
        self.persist();
        Ok(())
    }

    /// Start over with the current names. The completed log is kept.
    pub fn reset(&mut self) {
        let names = self.game.team_names();
        self.game.reset(&names);
        self.pending_finish = None;
        self.bundle.current_match = None;
        self.bundle.settings.team_names = names;
        self.store.save(&self.bundle);
        debug!("Scoreboard reset");
    }

    pub fn clear_history(&mut self) {
        self.bundle.history.clear();
        self.store.save(&self.bundle);
    }

    /// Save the running match. Once a finished match has been moved to the
    /// log it is only kept on screen, not in the bundle.
    fn persist(&mut self) {
        if self.game.is_finished() && self.pending_finish.is_none() {
            self.bundle.current_match = None;
            self.bundle.settings.team_names = self.game.team_names();
        } else {
            self.bundle.track(&self.game);
        }
        self.store.save(&self.bundle);
    }
}
