//! View models sitting between the engine and the front ends

mod scoreboard;

pub use scoreboard::{Scoreboard, ThrowOutcome};
