//! Error types for the logging subsystem

use thiserror::Error;

/// Errors that can occur while installing the global subscriber
#[derive(Debug, Clone, Error)]
pub enum LoggingError {
    /// A global subscriber is already installed, or installation failed
    #[error("Failed to initialize logging: {0}")]
    InitializationFailed(String),

    /// The supplied level or format could not be used
    #[error("Invalid logging configuration: {0}")]
    InvalidConfiguration(String),
}
