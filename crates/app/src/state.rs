//! Application state management

use std::path::PathBuf;

use oche_core::{AppConfig, BundleStore, Database, MemoryStore, Result};
use tracing::{info, warn};

const DATABASE_FILE: &str = "oche.db";

/// Main application state
pub struct AppState {
    pub config: AppConfig,
    data_dir: Option<PathBuf>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let data_dir = match config.data_dir() {
            Ok(dir) => Some(dir),
            Err(e) => {
                warn!(error = %e, "No data directory, progress will not be saved");
                None
            }
        };
        Self { config, data_dir }
    }

    pub fn data_dir(&self) -> Option<&PathBuf> {
        self.data_dir.as_ref()
    }

    /// Open the persistent store.
    ///
    /// Falls back to an in-memory store so a match can always be played,
    /// even when nothing can be written to disk.
    pub fn open_store(&self) -> Box<dyn BundleStore + Send> {
        match self.open_database() {
            Ok(db) => Box::new(db),
            Err(e) => {
                warn!(error = %e, "Storage unavailable, keeping state in memory only");
                Box::new(MemoryStore::new())
            }
        }
    }

    fn open_database(&self) -> Result<Database> {
        let dir = self.data_dir.as_ref().ok_or_else(|| {
            oche_core::Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "Could not determine data directory",
            ))
        })?;
        std::fs::create_dir_all(dir)?;

        let path = dir.join(DATABASE_FILE);
        let db = Database::open(&path)?;
        info!(path = %path.display(), "Storage opened");
        Ok(db)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oche_core::{Match, PersistedBundle};
    use tempfile::tempdir;

    #[test]
    fn test_store_persists_in_data_dir() {
        let dir = tempdir().unwrap();
        let config = AppConfig {
            data_dir: Some(dir.path().join("nested")),
            ..AppConfig::default()
        };
        let state = AppState {
            data_dir: config.data_dir.clone(),
            config,
        };

        let mut bundle = PersistedBundle::default();
        bundle.track(&Match::new(&["Bulls", "Arrows"]));
        state.open_store().save(&bundle);

        assert!(dir.path().join("nested").join(DATABASE_FILE).exists());
        assert_eq!(state.open_store().load(), bundle);
    }

    #[test]
    fn test_missing_data_dir_falls_back_to_memory() {
        let state = AppState {
            config: AppConfig::default(),
            data_dir: None,
        };
        let store = state.open_store();
        assert_eq!(store.load(), PersistedBundle::default());
    }
}
