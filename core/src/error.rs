//! Error types for the admin API client.
//!
//! # Design
//! Every server-side failure, whatever envelope it arrived in, has already
//! been folded into a normalized `code`/`message` pair by the time it reaches
//! `ApiError::Api`. The remaining variants cover local encode/decode
//! problems on either side of the round-trip.

use thiserror::Error;

/// Errors returned by `AdminClient` build and parse methods.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The normalized result carried a non-zero code.
    #[error("{message}")]
    Api { code: i64, message: String },

    /// The payload of a successful result did not match the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl ApiError {
    /// Normalized result code, if this error came from the server.
    pub fn code(&self) -> Option<i64> {
        match self {
            ApiError::Api { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Whether the message contains the session-expiry marker.
    ///
    /// This is a plain substring check on the server message, so any error
    /// text that happens to contain `marker` counts as an expired session.
    pub fn is_session_expired(&self, marker: &str) -> bool {
        match self {
            ApiError::Api { message, .. } => !marker.is_empty() && message.contains(marker),
            _ => false,
        }
    }
}
