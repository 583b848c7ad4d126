//! Throw records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::TeamId;

/// Highest score three darts can make
pub const MAX_THROW_POINTS: i64 = 180;

/// Darts assumed when a throw does not say otherwise
pub const DEFAULT_DARTS: u8 = 3;

fn default_darts() -> u8 {
    DEFAULT_DARTS
}

/// One visit at the oche, as recorded in the match log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Throw {
    pub team_id: TeamId,
    pub points: u32,
    /// Older saves did not record darts; they count as three
    #[serde(default = "default_darts")]
    pub darts_used: u8,
    pub resulting_score: u32,
    pub thrown_at: DateTime<Utc>,
}

impl Throw {
    pub fn is_finish(&self) -> bool {
        self.resulting_score == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_throw_defaults_to_three_darts() {
        let json = r#"{"teamId":1,"points":60,"resultingScore":441,"thrownAt":"2024-05-01T18:00:00Z"}"#;
        let throw: Throw = serde_json::from_str(json).unwrap();
        assert_eq!(throw.darts_used, 3);
        assert!(!throw.is_finish());
    }
}
