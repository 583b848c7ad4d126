//! Persistence for `oche serve`
//!
//! The server publishes a snapshot after every change. Nobody answers a dart
//! prompt over the network, so a finish is logged with the three darts the
//! server recorded.

use chrono::{DateTime, Utc};
use oche_core::{BundleStore, Match, PersistedBundle};
use tracing::{debug, info, warn};

pub struct MirrorLog {
    store: Box<dyn BundleStore + Send>,
    bundle: PersistedBundle,
    /// `started_at` of the match most recently moved to the history
    logged_finish: Option<DateTime<Utc>>,
}

impl MirrorLog {
    pub fn restore(store: Box<dyn BundleStore + Send>, default_names: Option<[String; 2]>) -> Self {
        let mut bundle = store.load();
        bundle.apply_default_names(default_names);
        Self {
            store,
            bundle,
            logged_finish: None,
        }
    }

    /// The saved running match, or a fresh one with the remembered names
    pub fn starting_match(&self) -> Match {
        self.bundle
            .current_match
            .clone()
            .unwrap_or_else(|| self.bundle.new_match())
    }

    pub fn bundle(&self) -> &PersistedBundle {
        &self.bundle
    }

    /// Save a published snapshot. An undo past a logged finish withdraws
    /// that result again.
    pub fn record(&mut self, game: &Match) {
        let already_logged = self.logged_finish == Some(game.started_at);

        if game.is_finished() {
            if already_logged {
                return;
            }
            match self.bundle.finalize(game, Utc::now()) {
                Ok(completed) => {
                    info!(winner = %completed.winner_id, "Match completed");
                    self.logged_finish = Some(game.started_at);
                }
                Err(e) => warn!(error = %e, "Could not record completed match"),
            }
        } else {
            if already_logged {
                self.bundle.history.pop_latest();
                self.logged_finish = None;
                debug!("Finish undone, match back in play");
            }
            self.bundle.track(game);
        }

        self.store.save(&self.bundle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oche_core::{MemoryStore, TeamId};
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct SharedStore(Arc<MemoryStore>);

    impl BundleStore for SharedStore {
        fn load(&self) -> PersistedBundle {
            self.0.load()
        }

        fn save(&self, bundle: &PersistedBundle) {
            self.0.save(bundle)
        }
    }

    fn finished(game: &mut Match) {
        for points in [180, 180, 180, 180] {
            let team = game.active_team_id;
            game.record_throw(team, points, None).unwrap();
        }
        game.record_throw(TeamId::ONE, 141, None).unwrap();
    }

    #[test]
    fn test_running_snapshot_is_tracked() {
        let store = SharedStore::default();
        let mut log = MirrorLog::restore(Box::new(store.clone()), None);

        let mut game = log.starting_match();
        game.record_throw(TeamId::ONE, 100, None).unwrap();
        log.record(&game);

        assert_eq!(store.load().current_match, Some(game));
        assert!(store.load().history.is_empty());
    }

    #[test]
    fn test_finish_is_logged_once_with_three_darts() {
        let store = SharedStore::default();
        let mut log = MirrorLog::restore(Box::new(store.clone()), None);

        let mut game = log.starting_match();
        finished(&mut game);
        log.record(&game);
        log.record(&game);

        let saved = store.load();
        assert!(saved.current_match.is_none());
        assert_eq!(saved.history.len(), 1);
        let record = saved.history.latest().unwrap();
        assert_eq!(record.winner_id, TeamId::ONE);
        assert_eq!(record.throws.last().unwrap().darts_used, 3);
    }

    #[test]
    fn test_undo_after_finish_restores_running_match() {
        let store = SharedStore::default();
        let mut log = MirrorLog::restore(Box::new(store.clone()), None);

        let mut game = log.starting_match();
        finished(&mut game);
        log.record(&game);

        game.undo_last_throw().unwrap();
        log.record(&game);

        let saved = store.load();
        assert_eq!(saved.current_match.as_ref(), Some(&game));
        assert!(saved.history.is_empty());

        game.record_throw(TeamId::ONE, 141, None).unwrap();
        log.record(&game);
        assert_eq!(store.load().history.len(), 1);
    }

    #[test]
    fn test_configured_names_yield_to_remembered_ones() {
        let configured = Some(["Bulls".to_string(), "Arrows".to_string()]);

        let log = MirrorLog::restore(Box::new(MemoryStore::new()), configured.clone());
        assert_eq!(log.starting_match().team(TeamId::ONE).name, "Bulls");

        let mut bundle = PersistedBundle::default();
        bundle.settings.team_names = ["Home".to_string(), "Away".to_string()];
        let log = MirrorLog::restore(Box::new(MemoryStore::with_bundle(bundle)), configured);
        assert_eq!(log.starting_match().team(TeamId::ONE).name, "Home");
        assert_eq!(log.bundle().settings.team_names[1], "Away");
    }
}
