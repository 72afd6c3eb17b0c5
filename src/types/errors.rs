//! Application error types.
//!
//! All errors use `thiserror` for automatic Error trait derivation and provide
//! clear error messages with context.

use thiserror::Error;

/// Application result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error enum for the warden core.
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid setup detected at bind time (ambiguous static rule,
    /// malformed server parameters). Fatal: the affected connection or
    /// resolver must not start.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// No credential configured for the model backend. Raised before any
    /// network attempt so a request is never silently sent elsewhere.
    #[error("missing credential: {0}")]
    MissingCredential(String),

    /// Tool server unreachable, crashed, or spoke garbage. Propagated
    /// unchanged to the caller; the gate never filters a failed fetch.
    #[error("transport error: {0}")]
    Transport(String),

    /// Validation errors (bad tool arguments, malformed requests).
    #[error("validation error: {0}")]
    Validation(String),

    /// Resource not found (unknown tool, unknown role).
    #[error("not found: {0}")]
    NotFound(String),

    /// Model backend returned a non-success status.
    #[error("model backend error: {0}")]
    Backend(String),

    /// Serialization/deserialization errors.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O errors.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

// Convenience constructors
impl Error {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn missing_credential(msg: impl Into<String>) -> Self {
        Self::MissingCredential(msg.into())
    }

    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}
