//! Data models for Oche

mod bundle;
mod game;
mod history;
mod stats;
mod team;
mod throw;

pub use bundle::*;
pub use game::*;
pub use history::*;
pub use stats::*;
pub use team::*;
pub use throw::*;
