//! # Client Configuration
//!
//! Where the ERP backend lives and where the session file is kept.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     BRANCHLINE_API_URL=https://erp.example.com/api                     │
//! │     BRANCHLINE_TIMEOUT_SECS=20                                         │
//! │     BRANCHLINE_SESSION_PATH=/tmp/session.json                          │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/branchline/branchline.toml (Linux)                       │
//! │     ~/Library/Application Support/com.branchline.erp/branchline.toml   │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     http://localhost:8000, 10 s timeout                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [api]
//! base_url = "https://erp.example.com/api"
//! timeout_secs = 10
//! user_agent = "branchline/0.1.0"
//!
//! [session]
//! path = "/home/ana/.local/share/branchline/session.json"
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{ClientError, ClientResult};

pub const ENV_API_URL: &str = "BRANCHLINE_API_URL";
pub const ENV_TIMEOUT_SECS: &str = "BRANCHLINE_TIMEOUT_SECS";
pub const ENV_SESSION_PATH: &str = "BRANCHLINE_SESSION_PATH";

const CONFIG_FILE_NAME: &str = "branchline.toml";
const SESSION_FILE_NAME: &str = "session.json";

// =============================================================================
// API Settings
// =============================================================================

/// Connection settings for the ERP REST API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiSettings {
    /// Base URL every endpoint path is joined onto.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout (seconds).
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_timeout() -> u64 {
    10
}

fn default_user_agent() -> String {
    format!("branchline/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for ApiSettings {
    fn default() -> Self {
        ApiSettings {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl ApiSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Parses `base_url`, normalised to end with `/` so relative joins keep
    /// any path prefix (`https://host/api` + `sales` = `https://host/api/sales`).
    pub fn base(&self) -> ClientResult<Url> {
        let mut raw = self.base_url.trim().to_string();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        let url = Url::parse(&raw)?;
        if url.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl(format!(
                "{} cannot be used as a base URL",
                self.base_url
            )));
        }
        Ok(url)
    }
}

// =============================================================================
// Session Settings
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSettings {
    /// Session file location. Defaults to the platform data directory.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

// =============================================================================
// Main Client Configuration
// =============================================================================

/// Complete client configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub api: ApiSettings,

    #[serde(default)]
    pub session: SessionSettings,
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (branchline.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ClientResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading client config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;

        Ok(config)
    }

    /// Writes the configuration as pretty TOML, creating parent directories.
    pub fn save(&self, config_path: Option<PathBuf>) -> ClientResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| ClientError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| ClientError::ConfigSaveFailed(e.to_string()))?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents).map_err(|e| ClientError::ConfigSaveFailed(e.to_string()))?;

        info!(?path, "Client config saved");
        Ok(())
    }

    pub fn validate(&self) -> ClientResult<()> {
        let base = self.api.base()?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(ClientError::InvalidUrl(format!(
                "API URL must start with http:// or https://, got: {}",
                self.api.base_url
            )));
        }

        if self.api.timeout_secs == 0 {
            return Err(ClientError::InvalidConfig(
                "timeout_secs must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Applies overrides from a variable source (the process environment in
    /// production, a map in tests).
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_API_URL) {
            debug!(url = %url, "Overriding API URL from environment");
            self.api.base_url = url;
        }

        if let Some(timeout) = lookup(ENV_TIMEOUT_SECS) {
            match timeout.trim().parse::<u64>() {
                Ok(secs) => self.api.timeout_secs = secs,
                Err(_) => warn!(value = %timeout, "Ignoring non-numeric {}", ENV_TIMEOUT_SECS),
            }
        }

        if let Some(path) = lookup(ENV_SESSION_PATH) {
            debug!(path = %path, "Overriding session path from environment");
            self.session.path = Some(PathBuf::from(path));
        }
    }

    /// Session file location: configured path, else the platform data dir.
    pub fn session_path(&self) -> Option<PathBuf> {
        self.session.path.clone().or_else(|| {
            directories::ProjectDirs::from("com", "branchline", "erp")
                .map(|dirs| dirs.data_dir().join(SESSION_FILE_NAME))
        })
    }

    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "branchline", "erp")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.api.base_url, "http://localhost:8000");
        assert_eq!(config.api.timeout(), Duration::from_secs(10));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_base_url_keeps_path_prefix() {
        let mut config = ClientConfig::default();
        config.api.base_url = "https://erp.example.com/api".to_string();
        let base = config.api.base().unwrap();
        assert_eq!(
            base.join("sales").unwrap().as_str(),
            "https://erp.example.com/api/sales"
        );
    }

    #[test]
    fn test_config_validation() {
        let mut config = ClientConfig::default();

        config.api.base_url = "ftp://erp.example.com".to_string();
        assert!(matches!(config.validate(), Err(ClientError::InvalidUrl(_))));

        config.api.base_url = "not a url".to_string();
        assert!(config.validate().unwrap_err().is_config_error());

        config.api.base_url = "https://erp.example.com".to_string();
        config.api.timeout_secs = 0;
        assert!(matches!(config.validate(), Err(ClientError::InvalidConfig(_))));
    }

    #[test]
    fn test_overrides() {
        let mut config = ClientConfig::default();
        config.apply_overrides(env(&[
            (ENV_API_URL, "https://erp.example.com"),
            (ENV_TIMEOUT_SECS, "25"),
            (ENV_SESSION_PATH, "/tmp/branchline-session.json"),
        ]));

        assert_eq!(config.api.base_url, "https://erp.example.com");
        assert_eq!(config.api.timeout_secs, 25);
        assert_eq!(
            config.session_path(),
            Some(PathBuf::from("/tmp/branchline-session.json"))
        );
    }

    #[test]
    fn test_bad_timeout_override_is_ignored() {
        let mut config = ClientConfig::default();
        config.apply_overrides(env(&[(ENV_TIMEOUT_SECS, "soon")]));
        assert_eq!(config.api.timeout_secs, 10);
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE_NAME);

        let mut config = ClientConfig::default();
        config.api.base_url = "https://erp.example.com/api".to_string();
        config.api.timeout_secs = 30;
        config.save(Some(path.clone())).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("[api]"));

        let loaded: ClientConfig = toml::from_str(&contents).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: ClientConfig = toml::from_str("[api]\nbase_url = \"https://x.test\"\n").unwrap();
        assert_eq!(config.api.timeout_secs, 10);
        assert_eq!(config.session.path, None);
    }
}
