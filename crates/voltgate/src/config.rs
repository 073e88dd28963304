//! Configuration for the bridge.
//!
//! Small surface: bind port, controller endpoint, timeout, log level.
//! Load order (later wins): compiled defaults, `./voltgate.toml` (or an
//! explicit `--config` path), `VOLTGATE_*` environment variables. CLI
//! flags override all of these in `main`.
//!
//! The 2048-byte read limit is deliberately not configurable; it is a
//! documented protocol bound, not a tunable.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::relay;

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    Parse { path: PathBuf, message: String },
}

/// Complete bridge configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BridgeConfig {
    #[serde(default)]
    pub bind: BindConfig,

    #[serde(default)]
    pub sequencer: SequencerConfig,

    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// HTTP bind settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BindConfig {
    /// HTTP port for the command and health endpoints.
    /// Default: 8080
    #[serde(default = "BindConfig::default_http_port")]
    pub http_port: u16,
}

impl BindConfig {
    fn default_http_port() -> u16 {
        8080
    }
}

impl Default for BindConfig {
    fn default() -> Self {
        Self {
            http_port: Self::default_http_port(),
        }
    }
}

/// Downstream controller settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SequencerConfig {
    /// host:port of the controller's TCP listener.
    /// Default: localhost:5000
    #[serde(default = "SequencerConfig::default_endpoint")]
    pub endpoint: String,

    /// Bound applied independently to connect, send, and receive.
    /// Default: 2000
    #[serde(default = "SequencerConfig::default_timeout_ms")]
    pub timeout_ms: u64,
}

impl SequencerConfig {
    fn default_endpoint() -> String {
        relay::DEFAULT_ENDPOINT.to_string()
    }

    fn default_timeout_ms() -> u64 {
        relay::DEFAULT_TIMEOUT_MS
    }
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self {
            endpoint: Self::default_endpoint(),
            timeout_ms: Self::default_timeout_ms(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Default tracing directive when RUST_LOG is unset.
    #[serde(default = "TelemetryConfig::default_log_level")]
    pub log_level: String,
}

impl TelemetryConfig {
    fn default_log_level() -> String {
        "info".to_string()
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: Self::default_log_level(),
        }
    }
}

impl BridgeConfig {
    /// Load from an optional file path, then apply env overrides.
    ///
    /// With no explicit path, `./voltgate.toml` is used when present and
    /// compiled defaults otherwise.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match config_path {
            Some(path) => Self::from_file(path)?,
            None => {
                let local = Path::new("voltgate.toml");
                if local.exists() {
                    Self::from_file(local)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_env_overrides();
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(port) = std::env::var("VOLTGATE_HTTP_PORT") {
            if let Ok(port) = port.parse() {
                self.bind.http_port = port;
            }
        }
        if let Ok(endpoint) = std::env::var("VOLTGATE_SEQUENCER_ENDPOINT") {
            self.sequencer.endpoint = endpoint;
        }
        if let Ok(ms) = std::env::var("VOLTGATE_TIMEOUT_MS") {
            if let Ok(ms) = ms.parse() {
                self.sequencer.timeout_ms = ms;
            }
        }
        if let Ok(level) = std::env::var("VOLTGATE_LOG_LEVEL") {
            self.telemetry.log_level = level;
        }
    }
}
