//! Settings for the tool itself (not the scanner configuration)
//!
//! Looked up in order: `./.snitch-config.toml`, `$SNITCH_CONFIG_SETTINGS`,
//! `<config_dir>/snitch-config/settings.toml`. The first file found wins.

use crate::config::UnknownHeuristicPolicy;
use crate::fetch::DEFAULT_FETCH_TIMEOUT;
use crate::types::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

pub const SETTINGS_ENV_VAR: &str = "SNITCH_CONFIG_SETTINGS";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub store_path: Option<PathBuf>,
    pub fetch_timeout_secs: Option<u64>,
    pub unknown_heuristics: Option<UnknownHeuristicPolicy>,
    pub log_level: Option<String>,
}

impl Settings {
    /// Search the standard locations; missing files yield defaults
    pub fn discover() -> Result<Self> {
        let mut candidates = Vec::new();

        if let Ok(cwd) = std::env::current_dir() {
            candidates.push(cwd.join(".snitch-config.toml"));
        }

        if let Ok(path) = std::env::var(SETTINGS_ENV_VAR) {
            candidates.push(PathBuf::from(path));
        }

        if let Some(config_dir) = dirs::config_dir() {
            candidates.push(config_dir.join("snitch-config").join("settings.toml"));
        }

        for path in &candidates {
            if path.exists() {
                return Self::from_file(path);
            }
        }

        debug!("No settings file found");
        Ok(Self::default())
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading settings from: {}", path.display());
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Settings(format!("Failed to read settings: {}", e)))?;

        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| ConfigError::Settings(format!("Failed to parse settings: {}", e)))
    }

    pub fn fetch_timeout(&self) -> Duration {
        self.fetch_timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_FETCH_TIMEOUT)
    }

    pub fn unknown_heuristics(&self) -> UnknownHeuristicPolicy {
        self.unknown_heuristics.unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::from_toml("").unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.fetch_timeout(), DEFAULT_FETCH_TIMEOUT);
        assert_eq!(settings.unknown_heuristics(), UnknownHeuristicPolicy::PassThrough);
    }

    #[test]
    fn test_full_settings() {
        let settings = Settings::from_toml(
            r#"
            store_path = "/var/lib/ds/store.json"
            fetch_timeout_secs = 5
            unknown_heuristics = "reject"
            log_level = "debug"
            "#,
        )
        .unwrap();

        assert_eq!(settings.store_path, Some(PathBuf::from("/var/lib/ds/store.json")));
        assert_eq!(settings.fetch_timeout(), Duration::from_secs(5));
        assert_eq!(settings.unknown_heuristics(), UnknownHeuristicPolicy::Reject);
        assert_eq!(settings.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_bad_policy_is_rejected() {
        let result = Settings::from_toml(r#"unknown_heuristics = "ignore""#);
        assert!(matches!(result, Err(ConfigError::Settings(_))));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "unknown_heuristics = \"drop\"\n").unwrap();

        let settings = Settings::from_file(&path).unwrap();
        assert_eq!(settings.unknown_heuristics(), UnknownHeuristicPolicy::Drop);
    }
}
