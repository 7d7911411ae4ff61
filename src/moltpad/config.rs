use crate::cache::{CacheSettings, DEFAULT_STALENESS_DAYS};
use crate::error::{MoltpadError, Result};
use crate::remote::http::HttpSettings;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const CONFIG_FILENAME: &str = "config.json";
const CREDENTIALS_FILENAME: &str = "credentials.json";
const STATE_FILENAME: &str = "state.json";
const DEFAULT_API_URL: &str = "https://moltpad.space/api";

pub const HOME_ENV: &str = "MOLTPAD_HOME";
pub const API_URL_ENV: &str = "MOLTPAD_API_URL";

/// Where moltpad keeps its files.
///
/// ```text
/// <root>/
/// ├── config.json
/// ├── credentials.json
/// ├── state.json
/// └── memory/books/<book_id>.md
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoltpadPaths {
    pub root: PathBuf,
}

impl MoltpadPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// `$MOLTPAD_HOME` if set, otherwise the platform data directory.
    pub fn discover() -> Result<Self> {
        if let Some(home) = std::env::var_os(HOME_ENV).filter(|h| !h.is_empty()) {
            return Ok(Self::new(PathBuf::from(home)));
        }
        let dirs = ProjectDirs::from("space", "moltpad", "moltpad").ok_or_else(|| {
            MoltpadError::InvalidInput(format!(
                "cannot determine a data directory, set {}",
                HOME_ENV
            ))
        })?;
        Ok(Self::new(dirs.data_dir()))
    }

    pub fn config_file(&self) -> PathBuf {
        self.root.join(CONFIG_FILENAME)
    }

    pub fn credentials_file(&self) -> PathBuf {
        self.root.join(CREDENTIALS_FILENAME)
    }

    pub fn state_file(&self) -> PathBuf {
        self.root.join(STATE_FILENAME)
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.root.join("memory").join("books")
    }
}

/// Configuration, stored in `<root>/config.json`. Every field is optional.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MoltpadConfig {
    #[serde(default = "default_api_url")]
    pub api_base_url: String,

    /// Per-request timeout, in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Extra attempts for transient server errors
    #[serde(default = "default_retries")]
    pub retries: u32,

    #[serde(default = "default_retry_delay_secs")]
    pub retry_delay_secs: u64,

    /// How long a cached book summary stays fresh
    #[serde(default = "default_staleness_days")]
    pub staleness_days: i64,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_retries() -> u32 {
    1
}

fn default_retry_delay_secs() -> u64 {
    2
}

fn default_staleness_days() -> i64 {
    DEFAULT_STALENESS_DAYS
}

impl Default for MoltpadConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_url(),
            timeout_secs: default_timeout_secs(),
            retries: default_retries(),
            retry_delay_secs: default_retry_delay_secs(),
            staleness_days: default_staleness_days(),
        }
    }
}

impl MoltpadConfig {
    /// Load config from the given directory, or return defaults if not found
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILENAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path).map_err(MoltpadError::Io)?;
        let config: MoltpadConfig =
            serde_json::from_str(&content).map_err(MoltpadError::Serialization)?;
        Ok(config)
    }

    /// Applies `MOLTPAD_API_URL` on top of the file value.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                self.api_base_url = url;
            }
        }
        self
    }

    pub fn http_settings(&self) -> HttpSettings {
        HttpSettings {
            base_url: self.api_base_url.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
            retries: self.retries,
            retry_delay: Duration::from_secs(self.retry_delay_secs),
        }
    }

    pub fn cache_settings(&self, paths: &MoltpadPaths) -> CacheSettings {
        CacheSettings::new(paths.cache_dir())
            .with_staleness(chrono::Duration::days(self.staleness_days))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = MoltpadConfig::default();
        assert_eq!(config.api_base_url, "https://moltpad.space/api");
        assert_eq!(config.retries, 1);
        assert_eq!(config.staleness_days, 7);
    }

    #[test]
    fn test_load_missing_config() {
        let dir = TempDir::new().unwrap();
        let config = MoltpadConfig::load(dir.path()).unwrap();
        assert_eq!(config, MoltpadConfig::default());
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(CONFIG_FILENAME), r#"{"retries": 3}"#).unwrap();

        let config = MoltpadConfig::load(dir.path()).unwrap();
        assert_eq!(config.retries, 3);
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn test_settings_derived_from_config() {
        let config = MoltpadConfig {
            timeout_secs: 5,
            retry_delay_secs: 1,
            staleness_days: 3,
            ..Default::default()
        };
        let paths = MoltpadPaths::new("/data/moltpad");

        let http = config.http_settings();
        assert_eq!(http.timeout, Duration::from_secs(5));
        assert_eq!(http.retry_delay, Duration::from_secs(1));

        let cache = config.cache_settings(&paths);
        assert_eq!(cache.root, PathBuf::from("/data/moltpad/memory/books"));
        assert_eq!(cache.staleness, chrono::Duration::days(3));
    }
}
