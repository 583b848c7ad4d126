//! Team model

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::MatchError;

/// Score every team starts a leg with
pub const STARTING_SCORE: u32 = 501;

/// Maximum length of a display name, counted after trimming
pub const MAX_NAME_LEN: usize = 20;

/// Identifier of one of the two teams in a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct TeamId(u8);

impl TeamId {
    pub const ONE: TeamId = TeamId(1);
    pub const TWO: TeamId = TeamId(2);

    /// Both ids in display order
    pub const ALL: [TeamId; 2] = [TeamId::ONE, TeamId::TWO];

    /// The opposing team
    pub fn other(self) -> TeamId {
        if self == TeamId::ONE {
            TeamId::TWO
        } else {
            TeamId::ONE
        }
    }

    /// Position of this team in a match's team array
    pub fn index(self) -> usize {
        (self.0 - 1) as usize
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for TeamId {
    type Error = MatchError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(TeamId::ONE),
            2 => Ok(TeamId::TWO),
            other => Err(MatchError::UnknownTeam(other)),
        }
    }
}

impl From<TeamId> for u8 {
    fn from(id: TeamId) -> Self {
        id.0
    }
}

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A team taking part in a match
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    pub score: u32,
}

impl Team {
    pub fn new(id: TeamId, name: String) -> Self {
        Self {
            id,
            name,
            score: STARTING_SCORE,
        }
    }

    /// Name used when none was configured
    pub fn default_name(id: TeamId) -> String {
        format!("Team {}", id)
    }
}

/// Trim and validate a display name
pub fn validate_team_name(name: &str) -> Result<String, MatchError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(MatchError::InvalidName("name must not be empty".into()));
    }
    if trimmed.chars().count() > MAX_NAME_LEN {
        return Err(MatchError::InvalidName(format!(
            "name must be at most {} characters",
            MAX_NAME_LEN
        )));
    }
    Ok(trimmed.to_string())
}
