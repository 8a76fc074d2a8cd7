use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure reported by the native client core.
///
/// The code and message are passed through to the caller unchanged; this
/// layer never reinterprets native failures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("native error {code}: {message}")]
pub struct NativeError {
    pub code: i32,
    pub message: String,
}

impl NativeError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClientError {
    /// Malformed or missing arguments, unrecognized tokens. Always detected
    /// locally, before the native core is contacted.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The native core did not complete the operation within the bound.
    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),

    /// The connection was already closed at dispatch, or torn down while the
    /// operation was in flight.
    #[error("Connection closed")]
    ConnectionClosed,

    /// The native core returned a payload this layer could not decode.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Failure reported by the native core, passed through as-is.
    #[error(transparent)]
    Native(#[from] NativeError),
}

impl ClientError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        ClientError::Validation(message.into())
    }

    /// True for failures detected locally, without a native round trip.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            ClientError::Validation(_) | ClientError::ConnectionClosed
        )
    }
}
