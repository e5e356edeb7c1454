//! Error types for pulse.

use thiserror::Error;

/// CLI-level errors that don't come from pulse-core.
#[derive(Error, Debug)]
pub enum PulseError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::ser::Error> for PulseError {
    fn from(e: toml::ser::Error) -> Self {
        PulseError::Serialization(e.to_string())
    }
}
