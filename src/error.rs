//! Error types for the viva gateway

use thiserror::Error;

/// Result type alias for gateway operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the viva gateway
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Speech transcription failure. The STT adapter recovers this into an
    /// empty transcript; it never reaches an HTTP response.
    #[error("transcription error: {0}")]
    Transcription(String),

    /// Speech synthesis pipeline failure, with the failing stage's
    /// diagnostic output
    #[error("synthesis error in {stage}: {detail}")]
    Synthesis {
        stage: &'static str,
        detail: String,
    },

    /// Chat completion failure
    #[error("completion error: {0}")]
    Completion(String),

    /// An upstream call exceeded its deadline
    #[error("upstream timeout in {stage}")]
    UpstreamTimeout { stage: &'static str },

    /// Caller-supplied conversation history could not be parsed
    #[error("malformed history: {0}")]
    MalformedHistory(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}
