//! Oche Core Library
//!
//! Match engine, models, and storage for scoring 501 darts matches.

pub mod config;
pub mod engine;
pub mod error;
pub mod invariants;
pub mod models;
pub mod storage;

pub use config::AppConfig;
pub use engine::{parse_points, Command};
pub use error::{Error, MatchError, Result};
pub use models::*;
pub use storage::{BundleStore, Database, KeyValueStore, MemoryStore, BUNDLE_KEY};
