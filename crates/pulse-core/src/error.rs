//! Error types for pulse-core.

use thiserror::Error;

/// Result type alias using pulse-core Error
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for EventPulse operations
#[derive(Error, Debug)]
pub enum Error {
    // Store errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Database lock poisoned")]
    LockPoisoned,

    // Topic tree errors
    #[error("Topic not found: {0}")]
    TopicNotFound(String),

    #[error("Ambiguous topic id '{prefix}' matches {matches} topics")]
    AmbiguousId { prefix: String, matches: usize },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("No topics to brief on. Add a topic first.")]
    NothingToBrief,

    // Provider errors
    #[error("Gemini API key is missing. Set GEMINI_API_KEY or ai.api_key in config.")]
    MissingApiKey,

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Provider error ({status}): {body}")]
    Provider { status: u16, body: String },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // Generic errors
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a non-success provider response
    pub fn provider(status: u16, body: impl Into<String>) -> Self {
        Self::Provider {
            status,
            body: body.into(),
        }
    }
}

#[cfg(feature = "gemini")]
impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Http(e.to_string())
    }
}
