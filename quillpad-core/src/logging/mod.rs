//! Logging subsystem for Quillpad
//!
//! Everything in the workspace reports through the `tracing` macros. This
//! module installs the global subscriber: an `EnvFilter` (so `RUST_LOG`
//! still wins over the configured level) followed by either a plain or a
//! JSON formatting layer.

use tracing_subscriber::{
    fmt,
    layer::{Layered, SubscriberExt},
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

use crate::config::LoggingConfig;

mod error;
mod level;

pub use error::LoggingError;
pub use level::LogLevel;

type BoxedFmtLayer = Box<dyn Layer<Layered<EnvFilter, Registry>> + Send + Sync>;

/// Configuration for the logging subsystem
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// The minimum log level to display
    pub level: LogLevel,
    /// Whether to include timestamps
    pub with_timestamp: bool,
    /// Whether to include target module information
    pub with_target: bool,
    /// Whether to use JSON formatting
    pub json_format: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            with_timestamp: true,
            with_target: true,
            json_format: false,
        }
    }
}

impl LogConfig {
    pub fn new(level: LogLevel) -> Self {
        Self {
            level,
            ..Default::default()
        }
    }

    pub fn with_timestamp(mut self, enabled: bool) -> Self {
        self.with_timestamp = enabled;
        self
    }

    pub fn with_target(mut self, enabled: bool) -> Self {
        self.with_target = enabled;
        self
    }

    pub fn json_format(mut self, enabled: bool) -> Self {
        self.json_format = enabled;
        self
    }
}

impl TryFrom<&LoggingConfig> for LogConfig {
    type Error = LoggingError;

    fn try_from(config: &LoggingConfig) -> Result<Self, Self::Error> {
        let level = LogLevel::parse(&config.level).ok_or_else(|| {
            LoggingError::InvalidConfiguration(format!("unknown level '{}'", config.level))
        })?;

        Ok(LogConfig::new(level)
            .with_timestamp(config.with_timestamp)
            .with_target(config.with_target)
            .json_format(config.json_format))
    }
}

/// Initialize logging at `info` with plain output
pub fn init_logging() -> Result<(), LoggingError> {
    init_logging_with_config(LogConfig::default())
}

/// Initialize logging with a custom configuration
///
/// Fails (rather than panicking) when a global subscriber is already set,
/// which happens in tests that initialise more than once.
///
/// # Example
/// ```
/// use quillpad_core::logging::{init_logging_with_config, LogConfig, LogLevel};
///
/// let config = LogConfig::new(LogLevel::Debug).with_target(false);
/// let _ = init_logging_with_config(config);
/// ```
pub fn init_logging_with_config(config: LogConfig) -> Result<(), LoggingError> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.as_str()));

    // stderr keeps log lines out of the interactive prompts on stdout
    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(config.with_target);

    let fmt_layer: BoxedFmtLayer = match (config.json_format, config.with_timestamp) {
        (true, true) => layer.json().boxed(),
        (true, false) => layer.json().without_time().boxed(),
        (false, true) => layer.boxed(),
        (false, false) => layer.without_time().boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| LoggingError::InitializationFailed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_config_default() {
        let config = LogConfig::default();
        assert_eq!(config.level, LogLevel::Info);
        assert!(config.with_timestamp);
        assert!(config.with_target);
        assert!(!config.json_format);
    }

    #[test]
    fn test_log_config_builder() {
        let config = LogConfig::new(LogLevel::Debug)
            .with_timestamp(false)
            .with_target(false)
            .json_format(true);

        assert_eq!(config.level, LogLevel::Debug);
        assert!(!config.with_timestamp);
        assert!(!config.with_target);
        assert!(config.json_format);
    }

    #[test]
    fn test_log_config_from_settings() {
        let settings = LoggingConfig {
            level: "WARN".to_string(),
            json_format: true,
            ..Default::default()
        };

        let config = LogConfig::try_from(&settings).unwrap();
        assert_eq!(config.level, LogLevel::Warn);
        assert!(config.json_format);
    }

    #[test]
    fn test_log_config_rejects_unknown_level() {
        let settings = LoggingConfig {
            level: "chatty".to_string(),
            ..Default::default()
        };

        assert!(matches!(
            LogConfig::try_from(&settings),
            Err(LoggingError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_second_init_is_an_error_not_a_panic() {
        let _ = init_logging_with_config(LogConfig::new(LogLevel::Error));
        let second = init_logging_with_config(LogConfig::new(LogLevel::Error));
        assert!(matches!(second, Err(LoggingError::InitializationFailed(_))));
    }
}
