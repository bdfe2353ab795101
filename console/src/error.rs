//! Errors surfaced to console callers.
//!
//! Transport failures never reach the normalizer; they are reported as-is.
//! Everything the server said is an `Api` error carrying the normalized
//! message, except messages that look like an expired session.

use admin_core::ApiError;
use thiserror::Error;

use crate::transport::TransportError;

#[derive(Debug, Error)]
pub enum ConsoleError {
    #[error("transport failed: {0}")]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Api(#[from] ApiError),

    /// The stored token was rejected as expired and has been cleared.
    #[error("session expired: {0}")]
    SessionExpired(String),

    #[error("token store failed: {0}")]
    Store(String),
}

impl ConsoleError {
    /// Message suitable for a user-facing notification.
    pub fn notification(&self) -> String {
        match self {
            ConsoleError::Api(err) => err.to_string(),
            ConsoleError::SessionExpired(message) => message.clone(),
            other => other.to_string(),
        }
    }
}

pub type ConsoleResult<T> = Result<T, ConsoleError>;
