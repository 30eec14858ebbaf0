//! Configuration command handlers
//!
//! Handles the `configure` subcommand for setting up mhdb CLI defaults.

use crate::config::Config;
use anyhow::Result;
use std::path::PathBuf;

/// Values `configure` can set
#[derive(Debug, Default)]
pub struct Settings {
    pub database: Option<PathBuf>,
    pub export_path: Option<PathBuf>,
    pub asset_timeout: Option<u64>,
}

impl Settings {
    fn is_empty(&self) -> bool {
        self.database.is_none() && self.export_path.is_none() && self.asset_timeout.is_none()
    }

    /// Write every given value into `config`
    fn apply(self, config: &mut Config) {
        if let Some(database) = self.database {
            config.database = Some(database);
        }
        if let Some(export_path) = self.export_path {
            config.export_path = Some(export_path);
        }
        if let Some(timeout) = self.asset_timeout {
            config.asset_timeout_secs = Some(timeout);
        }
    }
}

/// Handle the configure command
pub fn handle(settings: Settings, show: bool) -> Result<()> {
    let mut config = Config::load()?;

    if show {
        show_config(&config);
        return Ok(());
    }

    if settings.is_empty() {
        show_usage();
        return Ok(());
    }

    settings.apply(&mut config);
    config.save()?;

    println!("Configuration updated");
    if let Ok(path) = Config::config_path() {
        println!("Config saved to: {}", path.display());
    }

    Ok(())
}

fn show_config(config: &Config) {
    match &config.database {
        Some(path) => println!("Database:      {}", path.display()),
        None => println!("Database:      {} (default)", mhdb::DEFAULT_DB_PATH),
    }
    match &config.export_path {
        Some(path) => println!("Export path:   {}", path.display()),
        None => println!("Export path:   not configured"),
    }
    println!("Asset timeout: {}s", config.asset_timeout().as_secs());

    if let Ok(path) = Config::config_path() {
        println!("Config file: {}", path.display());
    }
}

fn show_usage() {
    println!("Usage: mhdb configure --database PATH");
    println!("   or: mhdb configure --export-path PATH --asset-timeout SECONDS");
    println!("   or: mhdb configure --show");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_keeps_unset_values() {
        let mut config = Config {
            database: Some(PathBuf::from("old.db")),
            export_path: Some(PathBuf::from("out")),
            asset_timeout_secs: None,
        };

        Settings {
            database: Some(PathBuf::from("new.db")),
            asset_timeout: Some(10),
            ..Default::default()
        }
        .apply(&mut config);

        assert_eq!(config.database, Some(PathBuf::from("new.db")));
        assert_eq!(config.export_path, Some(PathBuf::from("out")));
        assert_eq!(config.asset_timeout_secs, Some(10));
    }

    #[test]
    fn test_empty_settings() {
        assert!(Settings::default().is_empty());
    }
}
