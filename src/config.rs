//! Configuration file parser for ~/.config/newshub/config.toml.
//!
//! The config file is optional: a missing file yields `Config::default()`.
//! Unknown keys are accepted but logged as warnings since they are usually
//! typos. A few settings can also come from the environment, which wins
//! over the file.
use serde::Deserialize;
use std::path::{Path, PathBuf};
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

    #[error("Config file too large: {0}")]
    TooLarge(String),

    #[error("Invalid value for {key}: {reason}")]
    InvalidValue { key: &'static str, reason: String },
}

// ============================================================================
// Configuration
// ============================================================================

/// Application configuration shared by `serve` and `browse`.
///
/// The Debug impl masks `gnews_api_key`.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Port the proxy listens on.
    pub port: u16,

    /// Address the proxy binds to.
    pub bind_address: String,

    /// Headline API root the proxy forwards to.
    pub upstream_base_url: String,

    /// Headline API key. `GNEWS_API_KEY` takes precedence.
    pub gnews_api_key: Option<String>,

    /// Proxy API root used by the terminal client.
    pub backend_url: String,

    pub language: String,
    pub country: String,

    /// Articles requested per page.
    pub page_size: u32,

    /// Outbound request timeout, for both the proxy and the client.
    pub request_timeout_secs: u64,

    /// Where bookmarks and preferences are stored. Defaults to the
    /// platform data directory.
    pub data_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 5000,
            bind_address: "0.0.0.0".to_string(),
            upstream_base_url: "https://gnews.io/api/v4".to_string(),
            gnews_api_key: None,
            backend_url: "http://127.0.0.1:5000/api".to_string(),
            language: "en".to_string(),
            country: "in".to_string(),
            page_size: 6,
            request_timeout_secs: 30,
            data_dir: None,
        }
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("port", &self.port)
            .field("bind_address", &self.bind_address)
            .field("upstream_base_url", &self.upstream_base_url)
            .field(
                "gnews_api_key",
                &self.gnews_api_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field("backend_url", &self.backend_url)
            .field("language", &self.language)
            .field("country", &self.country)
            .field("page_size", &self.page_size)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("data_dir", &self.data_dir)
            .finish()
    }
}

const KNOWN_KEYS: [&str; 10] = [
    "port",
    "bind_address",
    "upstream_base_url",
    "gnews_api_key",
    "backend_url",
    "language",
    "country",
    "page_size",
    "request_timeout_secs",
    "data_dir",
];

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(Config::default())`
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Unknown keys → accepted, logged as warning
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
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
                // Deleted between metadata and read
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
                if !KNOWN_KEYS.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: Config = toml::from_str(&content)?;
        tracing::info!(path = %path.display(), port = config.port, "Loaded configuration");
        Ok(config)
    }

    /// Apply `PORT`, `GNEWS_API_KEY`, and `NEWSHUB_BACKEND_URL`.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    /// Apply overrides from an arbitrary lookup. Empty values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(port) = get("PORT") {
            self.port = port.trim().parse().map_err(|e| ConfigError::InvalidValue {
                key: "PORT",
                reason: format!("{e}"),
            })?;
        }
        if let Some(key) = get("GNEWS_API_KEY") {
            self.gnews_api_key = Some(key);
        }
        if let Some(url) = get("NEWSHUB_BACKEND_URL") {
            self.backend_url = url;
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    /// `~/.config/newshub`, or `./.newshub` when no home is known.
    pub fn config_dir() -> PathBuf {
        match std::env::var_os("XDG_CONFIG_HOME").filter(|v| !v.is_empty()) {
            Some(dir) => PathBuf::from(dir).join("newshub"),
            None => home_dir()
                .map(|home| home.join(".config").join("newshub"))
                .unwrap_or_else(|| PathBuf::from(".newshub")),
        }
    }

    pub fn default_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Resolved store directory: `data_dir` if set, else
    /// `~/.local/share/newshub`.
    pub fn data_dir(&self) -> PathBuf {
        if let Some(dir) = &self.data_dir {
            return dir.clone();
        }
        match std::env::var_os("XDG_DATA_HOME").filter(|v| !v.is_empty()) {
            Some(dir) => PathBuf::from(dir).join("newshub"),
            None => home_dir()
                .map(|home| home.join(".local").join("share").join("newshub"))
                .unwrap_or_else(|| PathBuf::from(".newshub").join("data")),
        }
    }
}

fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

// ============================================================================
// Tests
// ============================================================================
