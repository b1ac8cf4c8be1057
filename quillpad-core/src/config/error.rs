//! Errors raised while loading or checking a Quillpad configuration

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot write config file {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Cannot serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// A `QUILLPAD_*` variable held something unparseable
    #[error("Environment variable {var} is not a valid {what}: {reason}")]
    InvalidEnv {
        var: &'static str,
        what: &'static str,
        reason: String,
    },

    /// A setting parsed but is out of range
    #[error("Invalid setting {key}: {reason}")]
    InvalidSetting { key: &'static str, reason: String },
}
