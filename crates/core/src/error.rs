//! Error types for Oche Core

use thiserror::Error;

/// Rejections raised by the match engine.
///
/// Every variant is a recoverable validation failure; the match is never
/// mutated when one of these is returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MatchError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{points} points is out of range (maximum 180)")]
    OutOfRange { points: i64 },

    #[error("{points} points exceeds the remaining {remaining}")]
    Overscore { points: i64, remaining: u32 },

    #[error("Nothing to undo")]
    NothingToUndo,

    #[error("Unknown team: {0}")]
    UnknownTeam(u8),

    #[error("Match is already finished")]
    MatchFinished,

    #[error("Match is not finished")]
    NotFinished,

    #[error("Throw order can only change before the first throw")]
    TurnOrderLocked,

    #[error("Invalid team name: {0}")]
    InvalidName(String),

    /// A match built outside the engine breaks the scoring rules
    #[error("Inconsistent match: {0}")]
    Inconsistent(String),
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Match error: {0}")]
    Match(#[from] MatchError),
}

pub type Result<T> = std::result::Result<T, Error>;
