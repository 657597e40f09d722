//! Configuration management with validation and defaults
//!
//! Values come from built-in defaults, an optional TOML file, and `YOLO_*`
//! environment variables, in that order. The binary applies CLI flags last.

use crate::errors::{ConfigurationError, YoloResult};
use crate::games::settlement::MAX_SETTLEABLE_STAKE;
use crate::games::types::MINOR_UNITS_PER_UNIT;
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;
use std::path::Path;
use std::str::FromStr;

/// Longest session a game may be configured with
pub const MAX_SESSION_TIMEOUT_SECS: u64 = 24 * 60 * 60;

/// Top-level service configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct YoloConfig {
    pub game: GameConfig,
    pub api: ApiConfig,
    pub logging: LoggingConfig,
}

/// Which correct-number source the registry uses
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NumberSourceKind {
    #[default]
    Random,
    /// Provably fair draw with a VRF proof stored on the game
    Vrf,
}

impl fmt::Display for NumberSourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumberSourceKind::Random => write!(f, "random"),
            NumberSourceKind::Vrf => write!(f, "vrf"),
        }
    }
}

impl FromStr for NumberSourceKind {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "random" => Ok(NumberSourceKind::Random),
            "vrf" => Ok(NumberSourceKind::Vrf),
            other => Err(ConfigurationError::InvalidValue {
                field: "game.number_source".to_string(),
                value: other.to_string(),
                reason: "Expected 'random' or 'vrf'".to_string(),
            }),
        }
    }
}

/// Game session rules
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GameConfig {
    /// Time between game creation and expiry
    pub session_timeout_secs: u64,
    /// Largest accepted stake in minor units
    pub max_stake: u64,
    pub number_source: NumberSourceKind,
}

impl GameConfig {
    pub fn session_timeout(&self) -> Duration {
        Duration::seconds(self.session_timeout_secs as i64)
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            session_timeout_secs: 60,
            max_stake: 10_000 * MINOR_UNITS_PER_UNIT,
            number_source: NumberSourceKind::Random,
        }
    }
}

/// HTTP API configuration
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,
    pub request_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            allowed_origins: vec!["*".to_string()],
            request_timeout_secs: 30,
        }
    }
}

/// Log output configuration
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive, overridden by `RUST_LOG`
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "yolo_game=info,tower_http=info".to_string(),
        }
    }
}

/// Configuration loader with environment variable support
#[derive(Debug, Default)]
pub struct ConfigLoader {
    config_path: Option<String>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self { config_path: None }
    }

    /// Set the configuration file path
    pub fn with_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_path = Some(path.as_ref().to_string_lossy().to_string());
        self
    }

    /// Load configuration from file and process environment
    pub fn load(&self) -> YoloResult<YoloConfig> {
        self.load_with_env(|key| std::env::var(key).ok())
    }

    /// Load configuration using `lookup` for environment variables
    pub fn load_with_env<F>(&self, lookup: F) -> YoloResult<YoloConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match self.config_path {
            Some(ref path) => self.load_from_file(path)?,
            None => YoloConfig::default(),
        };

        apply_env_overrides(&mut config, lookup)?;
        validate(&config)?;

        Ok(config)
    }

    fn load_from_file(&self, path: &str) -> YoloResult<YoloConfig> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigurationError::LoadFailed(format!("Failed to read {}: {}", path, e)))?;

        toml::from_str(&content)
            .map_err(|e| ConfigurationError::LoadFailed(format!("Failed to parse TOML: {}", e)).into())
    }
}

fn parse_env<T: FromStr>(key: &str, value: String, reason: &str) -> Result<T, ConfigurationError> {
    value.parse().map_err(|_| ConfigurationError::InvalidValue {
        field: key.to_string(),
        value,
        reason: reason.to_string(),
    })
}

/// Apply `YOLO_*` environment overrides
pub fn apply_env_overrides<F>(config: &mut YoloConfig, lookup: F) -> YoloResult<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(host) = lookup("YOLO_API_HOST") {
        config.api.host = host;
    }
    if let Some(port) = lookup("YOLO_API_PORT") {
        config.api.port = parse_env("YOLO_API_PORT", port, "Invalid port number")?;
    }
    if let Some(timeout) = lookup("YOLO_SESSION_TIMEOUT_SECS") {
        config.game.session_timeout_secs =
            parse_env("YOLO_SESSION_TIMEOUT_SECS", timeout, "Invalid timeout value")?;
    }
    if let Some(max_stake) = lookup("YOLO_MAX_STAKE") {
        config.game.max_stake = parse_env("YOLO_MAX_STAKE", max_stake, "Invalid stake amount")?;
    }
    if let Some(source) = lookup("YOLO_NUMBER_SOURCE") {
        config.game.number_source = source.parse()?;
    }
    if let Some(filter) = lookup("YOLO_LOG") {
        config.logging.filter = filter;
    }

    Ok(())
}

/// Validate configuration values
pub fn validate(config: &YoloConfig) -> YoloResult<()> {
    let game = &config.game;
    if game.session_timeout_secs == 0 || game.session_timeout_secs > MAX_SESSION_TIMEOUT_SECS {
        return Err(ConfigurationError::InvalidValue {
            field: "game.session_timeout_secs".to_string(),
            value: game.session_timeout_secs.to_string(),
            reason: format!("Must be between 1 and {}", MAX_SESSION_TIMEOUT_SECS),
        }
        .into());
    }

    if game.max_stake == 0 || game.max_stake > MAX_SETTLEABLE_STAKE {
        return Err(ConfigurationError::InvalidValue {
            field: "game.max_stake".to_string(),
            value: game.max_stake.to_string(),
            reason: format!("Must be between 1 and {}", MAX_SETTLEABLE_STAKE),
        }
        .into());
    }

    if config.api.port == 0 {
        return Err(ConfigurationError::InvalidValue {
            field: "api.port".to_string(),
            value: "0".to_string(),
            reason: "Port cannot be zero".to_string(),
        }
        .into());
    }

    if config.api.host.parse::<IpAddr>().is_err() {
        return Err(ConfigurationError::InvalidValue {
            field: "api.host".to_string(),
            value: config.api.host.clone(),
            reason: "Host must be an IP address".to_string(),
        }
        .into());
    }

    if config.api.request_timeout_secs == 0 {
        return Err(ConfigurationError::ValidationFailed(
            "api.request_timeout_secs cannot be zero".to_string(),
        )
        .into());
    }

    Ok(())
}
