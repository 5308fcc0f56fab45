//! Error handling and custom error types
//!
//! Provides unified error handling across the application using thiserror.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Unexpected response shape: {0}")]
    Parse(String),

    #[error("Translation error: {0}")]
    Translation(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Whether a retry against the upstream service can reasonably succeed.
    ///
    /// Rate-limit and availability statuses count, as do transport-level
    /// timeouts and connection failures. Auth failures, malformed requests,
    /// and unusable response bodies do not.
    pub fn is_transient(&self) -> bool {
        match self {
            Error::Api { status, .. } => matches!(*status, 429 | 503 | 504),
            Error::Http(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
