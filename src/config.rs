//! Configuration for the fetch-and-merge pipeline.
//!
//! The library takes a [`Config`] value directly. The binary can also read one
//! from a TOML file; a missing file yields `Config::default()` and unknown
//! keys are accepted with a warning.
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config file exceeds the maximum allowed size.
    #[error("Config file too large: {0}")]
    TooLarge(String),
}

// ============================================================================
// Configuration Struct
// ============================================================================

/// Pipeline settings.
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Separator between URLs in the input list.
    pub delimiter: String,

    /// Upper bound on feeds fetched at the same time. Values below 1 act as 1.
    pub max_concurrent_fetches: usize,

    /// Per-feed request timeout in seconds, covering connect through body read.
    pub request_timeout_secs: u64,

    /// Largest response body accepted for a single feed.
    pub max_feed_size_bytes: usize,

    /// `User-Agent` header sent with every request.
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            delimiter: ",".to_string(),
            max_concurrent_fetches: 10,
            request_timeout_secs: 30,
            max_feed_size_bytes: 10 * 1024 * 1024, // 10MB
            user_agent: concat!("feedmerge/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    const KNOWN_KEYS: [&'static str; 5] = [
        "delimiter",
        "max_concurrent_fetches",
        "request_timeout_secs",
        "max_feed_size_bytes",
        "user_agent",
    ];

    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(Config::default())`
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Unknown keys → accepted, logged as warning
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let size = match std::fs::metadata(path) {
            Ok(meta) => meta.len(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };

        if size > Self::MAX_FILE_SIZE {
            return Err(ConfigError::TooLarge(format!(
                "{} is {} bytes, limit is {}",
                path.display(),
                size,
                Self::MAX_FILE_SIZE
            )));
        }

        Self::from_toml(&std::fs::read_to_string(path)?)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        if let Ok(raw) = content.parse::<toml::Table>() {
            for key in raw.keys() {
                if !Self::KNOWN_KEYS.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: Config = toml::from_str(content)?;
        tracing::debug!(?config, "Loaded configuration");
        Ok(config)
    }

    /// Concurrency limit actually used by the aggregator (never zero).
    pub fn concurrency(&self) -> usize {
        self.max_concurrent_fetches.max(1)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

// ============================================================================
// Tests
// ============================================================================
