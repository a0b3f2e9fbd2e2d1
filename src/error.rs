//! Error handling and custom error types
//!
//! Provides unified error handling across the crate using thiserror. Every
//! variant maps onto an [`ErrorKind`] so callers can tell a missing upload
//! apart from a network failure or a malformed model reply.

use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("AI provider error: {0}")]
    AiProvider(String),

    #[error("Missing input: {0}")]
    Precondition(String),

    #[error("Media encoding error: {0}")]
    Encoding(String),

    #[error("Invalid caption response: {reason}")]
    InvalidResponse { reason: String, raw: String },

    #[error("Caption generation timed out after {0:?}")]
    Timeout(Duration),

    #[error("A caption generation request is already in flight")]
    Busy,

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Coarse classification of [`Error`] for callers deciding how to react.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The caller supplied no usable media.
    Precondition,
    /// Media could not be read or encoded.
    Encoding,
    /// Network failure, remote failure or timeout.
    Transport,
    /// The model replied, but not with the expected JSON shape.
    SchemaInvalid,
    /// Another generation is still running.
    Busy,
    Config,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Precondition(_) => ErrorKind::Precondition,
            Error::Io(_) | Error::Encoding(_) => ErrorKind::Encoding,
            Error::Http(_) | Error::AiProvider(_) | Error::Timeout(_) => ErrorKind::Transport,
            Error::InvalidResponse { .. } => ErrorKind::SchemaInvalid,
            Error::Busy => ErrorKind::Busy,
            Error::Config(_) => ErrorKind::Config,
        }
    }

    /// Whether re-issuing the same request could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self.kind(), ErrorKind::Transport | ErrorKind::Busy)
    }

    /// Raw model output attached to a schema violation, if any.
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            Error::InvalidResponse { raw, .. } => Some(raw.as_str()),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
