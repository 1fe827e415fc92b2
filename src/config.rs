//! Configuration file parser for ~/.config/inkfeed/config.toml.
//!
//! The config file is optional: a missing file yields `Config::default()`.
//! Unknown keys are ignored by serde, though we log a warning when the file
//! contains potential typos.
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::feed::{
    FeedEndpoints, DEFAULT_FEED_BASE_URL, DEFAULT_MAX_FEED_SIZE, DEFAULT_PROFILE_BASE_URL,
    DEFAULT_PROXY_URL,
};
use crate::util::{validate_endpoint, UrlValidationError};

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config file exceeds maximum allowed size.
    #[error("Config file too large: {0}")]
    TooLarge(String),

    #[error("Invalid `{key}` in config file: {source}")]
    InvalidEndpoint {
        key: &'static str,
        #[source]
        source: UrlValidationError,
    },
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Top-level configuration.
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Feed owner handle used when none is given on the command line.
    pub owner: Option<String>,

    /// Base of the feed URL; the feed lives at `<feed_base_url>/@<owner>`.
    pub feed_base_url: String,

    /// Base of the public profile URL.
    pub profile_base_url: String,

    /// CORS proxy prefix the encoded feed URL is appended to.
    pub proxy_url: String,

    /// Freshness window of the article cache.
    pub cache_ttl_minutes: u64,

    /// Per-request timeout.
    pub request_timeout_secs: u64,

    /// Largest accepted feed body.
    pub max_feed_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            owner: None,
            feed_base_url: DEFAULT_FEED_BASE_URL.to_string(),
            profile_base_url: DEFAULT_PROFILE_BASE_URL.to_string(),
            proxy_url: DEFAULT_PROXY_URL.to_string(),
            cache_ttl_minutes: 30,
            request_timeout_secs: 30,
            max_feed_bytes: DEFAULT_MAX_FEED_SIZE,
        }
    }
}

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    const KNOWN_KEYS: [&'static str; 7] = [
        "owner",
        "feed_base_url",
        "profile_base_url",
        "proxy_url",
        "cache_ttl_minutes",
        "request_timeout_secs",
        "max_feed_bytes",
    ];

    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(Config::default())`
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Unknown keys → accepted, logged as warning
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        // Check file size before reading
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // File deleted between metadata and read
                tracing::debug!(path = %path.display(), "Config file disappeared, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Ok(Self::default());
        }

        if let Ok(raw) = content.parse::<toml::Table>() {
            for key in raw.keys() {
                if !Self::KNOWN_KEYS.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: Config = toml::from_str(&content)?;
        tracing::info!(path = %path.display(), proxy = %config.proxy_url, "Loaded configuration");
        Ok(config)
    }

    /// Validated endpoints. Every URL must be HTTPS (HTTP only on loopback).
    pub fn endpoints(&self) -> Result<FeedEndpoints, ConfigError> {
        let check = |key: &'static str, value: &str| {
            validate_endpoint(value)
                .map(|_| value.to_string())
                .map_err(|source| ConfigError::InvalidEndpoint { key, source })
        };

        Ok(FeedEndpoints {
            feed_base_url: check("feed_base_url", &self.feed_base_url)?,
            profile_base_url: check("profile_base_url", &self.profile_base_url)?,
            proxy_url: check("proxy_url", &self.proxy_url)?,
        })
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_minutes.saturating_mul(60))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    /// Writes `content` to a fresh config.toml under a per-test temp dir.
    fn write_config(test_name: &str, content: &str) -> (PathBuf, PathBuf) {
        let dir = std::env::temp_dir().join(format!("inkfeed_config_test_{test_name}"));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.owner.is_none());
        assert_eq!(config.feed_base_url, "https://medium.com/feed");
        assert_eq!(config.proxy_url, "https://api.allorigins.win/raw?url=");
        assert_eq!(config.cache_ttl(), Duration::from_secs(30 * 60));
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.max_feed_bytes, 10 * 1024 * 1024);
    }

    #[test]
    fn test_missing_file_returns_default() {
        let path = Path::new("/tmp/inkfeed_test_nonexistent_config.toml");
        let config = Config::load(path).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_whitespace_only_file_returns_default() {
        let (dir, path) = write_config("whitespace", "   \n  \n  ");
        assert_eq!(Config::load(&path).unwrap(), Config::default());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_partial_config_uses_defaults_for_missing() {
        let (dir, path) = write_config("partial", "owner = \"writer\"\ncache_ttl_minutes = 5\n");

        let config = Config::load(&path).unwrap();
        assert_eq!(config.owner.as_deref(), Some("writer"));
        assert_eq!(config.cache_ttl(), Duration::from_secs(300));
        assert_eq!(config.proxy_url, DEFAULT_PROXY_URL); // default

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_invalid_toml_returns_error() {
        let (dir, path) = write_config("invalid", "this is not [valid toml");

        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().contains("Invalid TOML"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_wrong_type_returns_error() {
        let (dir, path) = write_config("wrongtype", "cache_ttl_minutes = \"soon\"\n");
        assert!(Config::load(&path).is_err());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_unknown_keys_accepted() {
        let (dir, path) = write_config("unknown", "owner = \"w\"\ntheme = \"dark\"\n");
        assert_eq!(Config::load(&path).unwrap().owner.as_deref(), Some("w"));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_too_large_file_rejected() {
        let (dir, path) = write_config("too_large", &"a".repeat(1_048_577));

        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::TooLarge(_)));
        assert!(err.to_string().contains("too large"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_endpoints_validated() {
        let config = Config::default();
        assert_eq!(config.endpoints().unwrap(), FeedEndpoints::default());

        let insecure = Config {
            proxy_url: "http://proxy.example.com/?url=".to_string(),
            ..Config::default()
        };
        match insecure.endpoints() {
            Err(ConfigError::InvalidEndpoint { key, .. }) => assert_eq!(key, "proxy_url"),
            other => panic!("Expected InvalidEndpoint, got {:?}", other),
        }

        let local = Config {
            proxy_url: "http://127.0.0.1:9000/raw?url=".to_string(),
            ..Config::default()
        };
        assert!(local.endpoints().is_ok());
    }
}
