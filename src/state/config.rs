/// Application configuration
///
/// Stored as JSON in the user's config directory:
/// - Linux: ~/.config/pairing-generator/config.json
/// - macOS: ~/Library/Application Support/pairing-generator/config.json
/// - Windows: %APPDATA%\pairing-generator\config.json
///
/// Every section is `#[serde(default)]`, so a partial file only overrides
/// the keys it names.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unable to locate OS config directory")]
    NoConfigDir,
    #[error("failed accessing {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("json error for {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Pause between starting and settling a random draw
    pub settle_delay_ms: u64,
    /// Replaces the bundled roster when set
    pub catalog_path: Option<PathBuf>,
    pub portrait: PortraitConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            settle_delay_ms: 600,
            catalog_path: None,
            portrait: PortraitConfig::default(),
        }
    }
}

/// Where portraits come from
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct PortraitConfig {
    /// Thumbnail search endpoint, queried by name
    pub search_endpoint: String,
    /// Appended to every search query to bias results towards portraits
    pub query_suffix: String,
    /// Generated-avatar endpoint used when the search image fails
    pub fallback_endpoint: String,
    pub request_timeout_secs: u64,
}

impl Default for PortraitConfig {
    fn default() -> Self {
        Self {
            search_endpoint: "https://tse4.mm.bing.net/th".to_string(),
            query_suffix: "明星 写真".to_string(),
            fallback_endpoint: "https://ui-avatars.com/api/".to_string(),
            request_timeout_secs: 10,
        }
    }
}

impl PortraitConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl AppConfig {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    /// Get the path where the config file lives
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let mut path = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        path.push("pairing-generator");
        path.push("config.json");
        Ok(path)
    }

    /// Load the config from its default location, writing the defaults
    /// there on first run.
    pub fn load_or_create() -> Result<(Self, PathBuf), ConfigError> {
        let path = Self::default_path()?;
        if !path.exists() {
            let config = Self::default();
            config.save(&path)?;
            info!(path = %path.display(), "wrote default config");
            return Ok((config, path));
        }

        let config = Self::load(&path)?;
        Ok((config, path))
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let io_err = |source: std::io::Error| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let payload = serde_json::to_string_pretty(self).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, payload).map_err(io_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("pairing-generator-test-{}", std::process::id()))
            .join(name)
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.settle_delay(), Duration::from_millis(600));
        assert!(config.catalog_path.is_none());
        assert_eq!(config.portrait.request_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let raw = r#"{ "settle_delay_ms": 0, "portrait": { "query_suffix": "actor" } }"#;
        let config: AppConfig = serde_json::from_str(raw).unwrap();
        assert_eq!(config.settle_delay(), Duration::ZERO);
        assert_eq!(config.portrait.query_suffix, "actor");
        assert_eq!(
            config.portrait.fallback_endpoint,
            PortraitConfig::default().fallback_endpoint
        );
    }

    #[test]
    fn test_save_then_load() {
        let path = scratch_path("config.json");
        let mut config = AppConfig::default();
        config.catalog_path = Some(PathBuf::from("/tmp/actors.json"));
        config.settle_delay_ms = 250;

        config.save(&path).unwrap();
        let loaded = AppConfig::load(&path).unwrap();
        assert_eq!(loaded, config);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_invalid_json_is_reported() {
        let path = scratch_path("broken.json");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "{ not json").unwrap();

        assert!(matches!(AppConfig::load(&path), Err(ConfigError::Parse { .. })));

        let _ = fs::remove_file(&path);
    }
}
