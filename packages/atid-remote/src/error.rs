//! Remote catalog error types.

use std::time::Duration;

use thiserror::Error;

/// Reply body rejected by the parser.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReplyError {
    /// The service reported a failure (`::error` marker)
    #[error("Service error: {0}")]
    Service(String),
}

/// Failure of one remote round trip.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    /// No reply before the timer fired
    #[error("No reply within {0:?}")]
    Timeout(Duration),

    /// Endpoint plus script did not form a valid request URI
    #[error("Invalid request URI '{uri}': {reason}")]
    InvalidUri { uri: String, reason: String },

    /// Connection or protocol failure
    #[error("HTTP error: {0}")]
    Http(String),

    /// Non-success HTTP status
    #[error("HTTP status {0}")]
    Status(u16),

    /// Reply body could not be used
    #[error(transparent)]
    Reply(#[from] ReplyError),
}

impl RemoteError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}
