//! Configuration management for Quillpad
//!
//! Defaults reproduce the stock behaviour (listener on port 5000, two
//! notification workers, one second simulated delivery latency). Values can
//! be overridden from a TOML file or from `QUILLPAD_*` environment
//! variables.

use serde::{Deserialize, Serialize};
use std::env;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

mod error;

pub use error::ConfigError;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Stub TCP listener
    pub listener: ListenerConfig,

    /// Comment notification worker pool
    pub notifier: NotifierConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Stub listener configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Start the listener at all
    pub enabled: bool,

    /// Address the listener binds to
    pub bind_address: SocketAddr,
}

/// Notification dispatcher configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifierConfig {
    /// Number of worker tasks draining the queue
    pub workers: usize,

    /// Simulated latency of a single delivery
    #[serde(with = "humantime_serde")]
    pub delivery_delay: Duration,

    /// How long shutdown waits for queued deliveries before aborting them
    #[serde(with = "humantime_serde")]
    pub shutdown_timeout: Duration,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Enable JSON formatting
    pub json_format: bool,

    /// Include timestamps
    pub with_timestamp: bool,

    /// Include target module
    pub with_target: bool,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bind_address: SocketAddr::from(([127, 0, 0, 1], 5000)),
        }
    }
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            workers: 2,
            delivery_delay: Duration::from_secs(1),
            shutdown_timeout: Duration::from_secs(2),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
            with_timestamp: true,
            with_target: true,
        }
    }
}

fn parse_var<T>(var: &'static str, what: &'static str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(raw) => raw
            .parse()
            .map(Some)
            .map_err(|e: T::Err| ConfigError::InvalidEnv {
                var,
                what,
                reason: e.to_string(),
            }),
        Err(_) => Ok(None),
    }
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Variables follow the pattern `QUILLPAD_<SECTION>_<KEY>`, e.g.
    /// `QUILLPAD_NOTIFIER_WORKERS=4`. Durations are given in milliseconds.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Overlay any `QUILLPAD_*` variables onto this configuration
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        if let Some(enabled) = parse_var("QUILLPAD_LISTENER_ENABLED", "listener flag")? {
            self.listener.enabled = enabled;
        }
        if let Some(addr) = parse_var("QUILLPAD_LISTENER_BIND_ADDRESS", "bind address")? {
            self.listener.bind_address = addr;
        }

        if let Some(workers) = parse_var("QUILLPAD_NOTIFIER_WORKERS", "worker count")? {
            self.notifier.workers = workers;
        }
        if let Some(ms) = parse_var::<u64>("QUILLPAD_NOTIFIER_DELAY_MS", "delivery delay")? {
            self.notifier.delivery_delay = Duration::from_millis(ms);
        }
        if let Some(ms) =
            parse_var::<u64>("QUILLPAD_NOTIFIER_SHUTDOWN_TIMEOUT_MS", "shutdown timeout")?
        {
            self.notifier.shutdown_timeout = Duration::from_millis(ms);
        }

        if let Ok(level) = env::var("QUILLPAD_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(json) = parse_var("QUILLPAD_LOG_JSON", "JSON flag")? {
            self.logging.json_format = json;
        }

        Ok(())
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let config: Self = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.notifier.workers == 0 {
            return Err(ConfigError::InvalidSetting {
                key: "notifier.workers",
                reason: "must be greater than 0".to_string(),
            });
        }

        let valid_levels = ["trace", "debug", "info", "warn", "warning", "error"];
        if !valid_levels.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidSetting {
                key: "logging.level",
                reason: format!("unknown level '{}'", self.logging.level),
            });
        }

        Ok(())
    }

    /// Save configuration to a TOML file
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let contents = toml::to_string_pretty(self)?;

        std::fs::write(path, contents).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(())
    }
}
