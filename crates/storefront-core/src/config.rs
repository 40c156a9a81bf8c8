//! Application configuration management.
//!
//! This module handles loading and saving the client configuration: the
//! backend base URL, request timeout, keychain service name and the last
//! email used to sign in.
//!
//! Configuration is stored at `~/.config/storefront/config.json`.
//! `STOREFRONT_API_URL` and `STOREFRONT_TIMEOUT_SECS` override the file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::auth::credentials::DEFAULT_SERVICE_NAME;

/// Application name used for config directory paths
const APP_NAME: &str = "storefront";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Backend used when nothing else is configured
pub const DEFAULT_API_URL: &str = "http://localhost:8000/api/v1";

/// HTTP request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

pub const API_URL_ENV: &str = "STOREFRONT_API_URL";
pub const TIMEOUT_ENV: &str = "STOREFRONT_TIMEOUT_SECS";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    pub api_url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub keyring_service: Option<String>,
    pub last_email: Option<String>,
}

impl Config {
    /// Load from the default location, falling back to defaults if absent.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config file {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Base URL: environment, then config file, then the default.
    pub fn api_url(&self) -> String {
        self.resolve_api_url(std::env::var(API_URL_ENV).ok())
    }

    fn resolve_api_url(&self, from_env: Option<String>) -> String {
        from_env
            .filter(|url| !url.trim().is_empty())
            .or_else(|| self.api_url.clone())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
            .trim_end_matches('/')
            .to_string()
    }

    /// Request timeout: environment, then config file, then the default.
    pub fn timeout(&self) -> Duration {
        self.resolve_timeout(std::env::var(TIMEOUT_ENV).ok())
    }

    fn resolve_timeout(&self, from_env: Option<String>) -> Duration {
        let from_env = from_env.and_then(|raw| match raw.trim().parse::<u64>() {
            Ok(secs) if secs > 0 => Some(secs),
            _ => {
                warn!(value = %raw, "Ignoring invalid {}", TIMEOUT_ENV);
                None
            }
        });
        let secs = from_env
            .or(self.timeout_secs.filter(|s| *s > 0))
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        Duration::from_secs(secs)
    }

    pub fn keyring_service(&self) -> &str {
        self.keyring_service.as_deref().unwrap_or(DEFAULT_SERVICE_NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.resolve_api_url(None), DEFAULT_API_URL);
        assert_eq!(config.resolve_timeout(None), Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert_eq!(config.keyring_service(), "storefront");
    }

    #[test]
    fn test_env_overrides_file() {
        let config = Config {
            api_url: Some("https://shop.example.com/api/v1".to_string()),
            timeout_secs: Some(30),
            ..Default::default()
        };
        assert_eq!(config.resolve_api_url(None), "https://shop.example.com/api/v1");
        assert_eq!(
            config.resolve_api_url(Some("http://10.0.0.2:8000/api/v1/".to_string())),
            "http://10.0.0.2:8000/api/v1"
        );
        assert_eq!(config.resolve_timeout(None), Duration::from_secs(30));
        assert_eq!(config.resolve_timeout(Some("5".to_string())), Duration::from_secs(5));
    }

    #[test]
    fn test_invalid_env_values_ignored() {
        let config = Config::default();
        assert_eq!(config.resolve_api_url(Some("  ".to_string())), DEFAULT_API_URL);
        assert_eq!(
            config.resolve_timeout(Some("soon".to_string())),
            Duration::from_secs(DEFAULT_TIMEOUT_SECS)
        );
        assert_eq!(
            config.resolve_timeout(Some("0".to_string())),
            Duration::from_secs(DEFAULT_TIMEOUT_SECS)
        );
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join(CONFIG_FILE);

        let config = Config {
            last_email: Some("ana@example.com".to_string()),
            ..Default::default()
        };
        config.save_to(&path).expect("save");

        assert_eq!(Config::load_from(&path).expect("load"), config);
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = Config::load_from(&dir.path().join("absent.json")).expect("load");
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_corrupt_file_fails() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "{not json").expect("write");
        assert!(Config::load_from(&path).is_err());
    }
}
