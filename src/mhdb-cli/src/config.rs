//! Configuration management for mhdb CLI

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default asset download timeout
pub const DEFAULT_ASSET_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    pub database: Option<PathBuf>,
    pub export_path: Option<PathBuf>,
    pub asset_timeout_secs: Option<u64>,
}

impl Config {
    /// Get the path to the config file
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?
            .join("mhdb");

        Ok(config_dir.join("config.toml"))
    }

    /// Load configuration from file, or default if it doesn't exist
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        toml::from_str(&contents).context("Failed to parse config file")
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory at {}", parent.display())
            })?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, contents)
            .with_context(|| format!("Failed to write config to {}", path.display()))?;

        Ok(())
    }

    /// Database path: explicit argument, then config, then the built-in default
    pub fn database_path(&self, explicit: Option<PathBuf>) -> PathBuf {
        explicit
            .or_else(|| self.database.clone())
            .unwrap_or_else(|| PathBuf::from(mhdb::DEFAULT_DB_PATH))
    }

    pub fn asset_timeout(&self) -> Duration {
        Duration::from_secs(
            self.asset_timeout_secs
                .unwrap_or(DEFAULT_ASSET_TIMEOUT_SECS),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mhdb/config.toml");

        let config = Config {
            database: Some(PathBuf::from("data/mhdb.db")),
            export_path: Some(PathBuf::from("/srv/export")),
            asset_timeout_secs: Some(5),
        };
        config.save_to(&path).unwrap();

        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_database_path_precedence() {
        let config = Config {
            database: Some(PathBuf::from("configured.db")),
            ..Default::default()
        };
        assert_eq!(
            config.database_path(Some(PathBuf::from("explicit.db"))),
            PathBuf::from("explicit.db")
        );
        assert_eq!(config.database_path(None), PathBuf::from("configured.db"));
        assert_eq!(
            Config::default().database_path(None),
            PathBuf::from(mhdb::DEFAULT_DB_PATH)
        );
        assert_eq!(Config::default().asset_timeout(), Duration::from_secs(30));
    }
}
