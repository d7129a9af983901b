//! Errors raised while dispatching messages.

use thiserror::Error;

use crate::persistence::PersistenceError;
use crate::report::ValidationError;

/// A message could not be delivered, or its attempt could not be recorded.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DispatchError {
    /// The provider answered but rejected the request.
    #[error("messaging provider rejected the request: {message}")]
    Provider {
        /// Provider error code or description.
        message: String,
    },

    /// The provider answered with a non-success HTTP status.
    #[error("messaging provider returned HTTP {status}: {message}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Response body, truncated.
        message: String,
    },

    /// The request never reached the provider or timed out.
    #[error("network error: {message}")]
    Network {
        /// Transport error detail.
        message: String,
    },

    /// The provider's response could not be decoded.
    #[error("failed to decode provider response: {message}")]
    Decode {
        /// Decoder error detail.
        message: String,
    },

    /// The client could not be configured (missing token, bad URL).
    #[error("configuration error: {message}")]
    Configuration {
        /// Description of the problem.
        message: String,
    },

    /// The report was rejected before anything was sent.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The attempt could not be written to the notification history.
    #[error("failed to record notification: {0}")]
    Storage(#[from] PersistenceError),
}
