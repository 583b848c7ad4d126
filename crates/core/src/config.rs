//! Application configuration
//!
//! Read from `oche.toml` in the platform config directory, or from the file
//! named by `OCHE_CONFIG`. Every field is optional.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

/// Default port for the network mirror
pub const DEFAULT_PORT: u16 = 7501;

/// Environment variable naming an explicit config file
pub const CONFIG_ENV: &str = "OCHE_CONFIG";

/// Environment variable overriding the data directory
pub const DATA_DIR_ENV: &str = "OCHE_DATA_DIR";

const CONFIG_FILE: &str = "oche.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Where the database lives
    pub data_dir: Option<PathBuf>,
    /// Port for `oche serve`
    pub port: u16,
    /// Names used when no names were remembered yet
    pub team_names: Option<[String; 2]>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            port: DEFAULT_PORT,
            team_names: None,
        }
    }
}

impl AppConfig {
    /// Load from `OCHE_CONFIG` or the platform config dir
    pub fn load() -> Result<Self> {
        let path = match std::env::var_os(CONFIG_ENV) {
            Some(path) => Some(PathBuf::from(path)),
            None => project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE)),
        };

        match path {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load from a specific file; a missing file yields defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Resolve the data directory: `OCHE_DATA_DIR`, then config, then platform default
    pub fn data_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = std::env::var_os(DATA_DIR_ENV) {
            return Ok(PathBuf::from(dir));
        }
        if let Some(dir) = &self.data_dir {
            return Ok(dir.clone());
        }
        let dirs = project_dirs().ok_or_else(|| {
            Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "Could not determine data directory",
            ))
        })?;
        Ok(dirs.data_dir().to_path_buf())
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("dev", "oche", "oche")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_empty_config_is_default() {
        assert_eq!(AppConfig::from_toml_str("").unwrap(), AppConfig::default());
    }

    #[test]
    fn test_parse_config() {
        let config = AppConfig::from_toml_str(
            r#"
            port = 9000
            data_dir = "/tmp/oche"
            team_names = ["Bulls", "Arrows"]
            "#,
        )
        .unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.data_dir, Some(PathBuf::from("/tmp/oche")));
        assert_eq!(
            config.team_names,
            Some(["Bulls".to_string(), "Arrows".to_string()])
        );
    }

    #[test]
    fn test_malformed_config_is_error() {
        let err = AppConfig::from_toml_str("port = \"lots\"").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempdir().unwrap();
        let config = AppConfig::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.port, DEFAULT_PORT);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "port = 8123\n").unwrap();
        assert_eq!(AppConfig::load_from(&path).unwrap().port, 8123);
    }
}
