//! SQLite storage layer for Oche
//!
//! The whole persisted state is a single JSON document kept under one
//! well-known key. See [`BundleStore`] for the load/save contract.

mod kv;
mod migrations;
mod traits;

use std::path::Path;

use rusqlite::Connection;
use tracing::{instrument, warn};

use crate::error::Result;
use crate::models::PersistedBundle;

pub use kv::KeyValueStore;
pub use traits::{BundleStore, MemoryStore};

/// Key the persisted bundle is stored under
pub const BUNDLE_KEY: &str = "oche-data";

/// Main database handle
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open or create database at the given path
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Open in-memory database (for testing)
    #[instrument]
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initialize database schema via migrations
    fn init(&self) -> Result<()> {
        migrations::run_migrations(&self.conn)?;
        Ok(())
    }

    /// Get current schema version
    pub fn schema_version(&self) -> u32 {
        self.conn
            .query_row("SELECT MAX(version) FROM schema_migrations", [], |row| {
                row.get(0)
            })
            .unwrap_or(0)
    }

    /// Get the key-value store
    pub fn kv(&self) -> KeyValueStore<'_> {
        KeyValueStore::new(&self.conn)
    }

    /// Read and decode the bundle, surfacing any failure
    pub fn read_bundle(&self) -> Result<Option<PersistedBundle>> {
        match self.kv().get(BUNDLE_KEY)? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    /// Encode and write the bundle, surfacing any failure
    pub fn write_bundle(&self, bundle: &PersistedBundle) -> Result<()> {
        let json = serde_json::to_string(bundle)?;
        self.kv().put(BUNDLE_KEY, &json)
    }
}

impl BundleStore for Database {
    fn load(&self) -> PersistedBundle {
        match self.read_bundle() {
            Ok(Some(bundle)) => traits::checked(bundle),
            Ok(None) => PersistedBundle::default(),
            Err(e) => {
                warn!(error = %e, "Stored data unreadable, starting fresh");
                PersistedBundle::default()
            }
        }
    }

    fn save(&self, bundle: &PersistedBundle) {
        if let Err(e) = self.write_bundle(bundle) {
            warn!(error = %e, "Failed to save data");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Match, TeamId};
    use tempfile::tempdir;

    #[test]
    fn test_missing_bundle_loads_default() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.read_bundle().unwrap().is_none());
        assert_eq!(db.load(), PersistedBundle::default());
    }

    #[test]
    fn test_corrupt_bundle_loads_default() {
        let db = Database::open_in_memory().unwrap();
        db.kv().put(BUNDLE_KEY, "{not json").unwrap();

        assert!(db.read_bundle().is_err());
        assert_eq!(db.load(), PersistedBundle::default());
    }

    #[test]
    fn test_inconsistent_match_is_discarded_on_load() {
        let db = Database::open_in_memory().unwrap();

        let mut game = Match::new(&["Bulls", "Arrows"]);
        game.record_throw(TeamId::ONE, 60, None).unwrap();
        let mut bundle = PersistedBundle::default();
        bundle.track(&game);

        let mut json: serde_json::Value = serde_json::to_value(&bundle).unwrap();
        json["currentMatch"]["teams"][0]["score"] = 9000.into();
        db.kv().put(BUNDLE_KEY, &json.to_string()).unwrap();

        let loaded = db.load();
        assert!(loaded.current_match.is_none());
        assert_eq!(loaded.settings.team_names, ["Bulls", "Arrows"]);

        // a fresh match from the loaded bundle plays normally
        let mut fresh = loaded.new_match();
        fresh.record_throw(TeamId::ONE, 60, None).unwrap();
        assert_eq!(fresh.team(TeamId::ONE).score, 441);
    }

    #[test]
    fn test_bundle_survives_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("oche.db");

        let mut game = Match::new(&["Bulls", "Arrows"]);
        game.record_throw(TeamId::ONE, 100, None).unwrap();
        let mut bundle = PersistedBundle::default();
        bundle.track(&game);

        {
            let db = Database::open(&path).unwrap();
            db.save(&bundle);
        }

        let db = Database::open(&path).unwrap();
        let loaded = db.load();
        let restored = loaded.current_match.unwrap();
        assert_eq!(restored, game);
        assert_eq!(restored.active_team_id, TeamId::TWO);
        assert_eq!(loaded.settings.team_names, ["Bulls", "Arrows"]);
    }

    #[test]
    fn test_schema_version() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(db.schema_version(), 1);
    }
}
