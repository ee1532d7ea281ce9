//! Server configuration.
//!
//! Settings come from a TOML file (see [`ServerConfig::load`]) with
//! environment variables applied on top. Every field has a default, so an
//! empty file or no file at all yields a working configuration.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Environment variable holding an explicit config file path.
pub const CONFIG_PATH_ENV: &str = "ATTENTION_CONFIG";

const DEFAULT_SEARCH_PATHS: [&str; 3] = ["attention.toml", "backend/attention.toml", "../attention.toml"];

/// Errors raised while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid value {value:?} for {key}: {reason}")]
    Invalid {
        key: String,
        value: String,
        reason: String,
    },
}

impl ConfigError {
    fn invalid(key: &str, value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key: key.to_string(),
            value: value.into(),
            reason: reason.into(),
        }
    }
}

/// Complete server configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub landmarks: LandmarkSettings,
    #[serde(default)]
    pub store: StoreSettings,
}

/// Listener settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Maximum request body size in megabytes
    #[serde(default = "default_body_limit_mb")]
    pub body_limit_mb: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            body_limit_mb: default_body_limit_mb(),
        }
    }
}

/// Which landmark provider backs detection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LandmarkProviderKind {
    /// No detector: every lit frame is classified as absent
    #[default]
    None,
    /// HTTP sidecar running the vision models
    Remote,
}

impl FromStr for LandmarkProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "none" | "null" => Ok(Self::None),
            "remote" | "http" => Ok(Self::Remote),
            _ => Err(format!("unknown landmark provider: {}", s)),
        }
    }
}

/// Landmark provider settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LandmarkSettings {
    #[serde(default)]
    pub provider: LandmarkProviderKind,
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for LandmarkSettings {
    fn default() -> Self {
        Self {
            provider: LandmarkProviderKind::default(),
            endpoint: None,
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl LandmarkSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Attention store settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreSettings {
    /// Evict users idle for longer than this; unset keeps them forever
    #[serde(default)]
    pub idle_ttl_secs: Option<u64>,
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            idle_ttl_secs: None,
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

impl StoreSettings {
    pub fn idle_ttl(&self) -> Option<Duration> {
        self.idle_ttl_secs.map(Duration::from_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs.max(1))
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_body_limit_mb() -> usize {
    16
}

fn default_timeout_ms() -> u64 {
    2000
}

fn default_sweep_interval_secs() -> u64 {
    60
}

impl ServerConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Locate the config file.
    ///
    /// Uses `ATTENTION_CONFIG` when set, otherwise the first existing file of:
    /// 1. `attention.toml`
    /// 2. `backend/attention.toml`
    /// 3. `../attention.toml`
    pub fn locate() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            return Some(PathBuf::from(path));
        }
        DEFAULT_SEARCH_PATHS
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }

    /// Load the file found by [`ServerConfig::locate`] (or defaults),
    /// then apply environment overrides and validate.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match Self::locate() {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from `lookup`.
    ///
    /// Recognized keys: `HOST`, `PORT`, `LANDMARK_PROVIDER`,
    /// `LANDMARK_ENDPOINT`, `ATTENTION_IDLE_TTL_SECS`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("PORT") {
            self.server.port = port
                .trim()
                .parse()
                .map_err(|_| ConfigError::invalid("PORT", &port, "expected a port number"))?;
        }
        if let Some(provider) = lookup("LANDMARK_PROVIDER") {
            self.landmarks.provider = provider
                .parse()
                .map_err(|reason: String| ConfigError::invalid("LANDMARK_PROVIDER", &provider, reason))?;
        }
        if let Some(endpoint) = lookup("LANDMARK_ENDPOINT") {
            self.landmarks.endpoint = Some(endpoint);
        }
        if let Some(ttl) = lookup("ATTENTION_IDLE_TTL_SECS") {
            let secs = ttl.trim().parse().map_err(|_| {
                ConfigError::invalid("ATTENTION_IDLE_TTL_SECS", &ttl, "expected whole seconds")
            })?;
            self.store.idle_ttl_secs = Some(secs);
        }
        Ok(())
    }

    /// Reject combinations the server cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.body_limit_mb == 0 {
            return Err(ConfigError::invalid(
                "server.body_limit_mb",
                "0",
                "must be at least 1",
            ));
        }
        if self.landmarks.provider == LandmarkProviderKind::Remote {
            let has_endpoint = self
                .landmarks
                .endpoint
                .as_deref()
                .is_some_and(|e| !e.trim().is_empty());
            if !has_endpoint {
                return Err(ConfigError::invalid(
                    "landmarks.endpoint",
                    "",
                    "required when provider = \"remote\"",
                ));
            }
            if !cfg!(feature = "remote-landmarks") {
                return Err(ConfigError::invalid(
                    "landmarks.provider",
                    "remote",
                    "built without the remote-landmarks feature",
                ));
            }
        }
        Ok(())
    }

    /// `host:port` for the listener.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn body_limit_bytes(&self) -> usize {
        self.server.body_limit_mb.saturating_mul(1024 * 1024)
    }
}
