//! The unit the persistence layer loads and saves

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{CompletedMatch, Match, MatchHistory, Team, TeamId};
use crate::error::MatchError;

/// Remembered user settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub team_names: [String; 2],
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            team_names: TeamId::ALL.map(Team::default_name),
        }
    }
}

/// Everything that survives a restart
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersistedBundle {
    pub current_match: Option<Match>,
    pub history: MatchHistory,
    pub settings: Settings,
}

impl PersistedBundle {
    /// Store the running match and remember its team names
    pub fn track(&mut self, game: &Match) {
        self.current_match = Some(game.clone());
        self.settings.team_names = game.team_names();
    }

    /// Move a finished match into the history.
    ///
    /// The running match is dropped from the bundle; the caller keeps its
    /// own copy on screen until the next reset.
    pub fn finalize(
        &mut self,
        game: &Match,
        completed_at: DateTime<Utc>,
    ) -> Result<&CompletedMatch, MatchError> {
        let completed = CompletedMatch::from_match(game, completed_at)?;
        self.history.record(completed);
        self.current_match = None;
        self.settings.team_names = game.team_names();
        self.history.latest().ok_or(MatchError::NotFinished)
    }

    /// Adopt configured names unless the user has already chosen some
    pub fn apply_default_names(&mut self, names: Option<[String; 2]>) {
        if let Some(names) = names {
            if self.settings == Settings::default() {
                self.settings.team_names = names;
            }
        }
    }

    /// Fresh match using the remembered names
    pub fn new_match(&self) -> Match {
        Match::new(&self.settings.team_names)
    }
}
