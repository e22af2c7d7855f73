//! Error types for the OpenAPI client.
//!
//! # Design
//! Every operation fails with exactly one `ApiError`. Local failures
//! (`Serialization`, `RequestConstruction`) happen before any network
//! activity; `Transport` carries the transport's failure unchanged; `Status`
//! is the mapped error for any non-200 response; `Deserialization` is only
//! reachable after a 200.

use thiserror::Error;

/// Failure reported by a [`Transport`](crate::transport::Transport).
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("connection failed: {0}")]
    Connection(String),

    #[error("request timed out")]
    Timeout,

    /// The response arrived but its body could not be read.
    #[error("failed to read response body: {0}")]
    Body(String),

    #[error("{0}")]
    Other(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Errors returned by `OpenApiClient` operations.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request payload could not be encoded as JSON.
    #[error("failed to serialize request body: {0}")]
    Serialization(#[source] serde_json::Error),

    /// The URL could not be turned into a request.
    #[error("invalid request: {0}")]
    RequestConstruction(String),

    #[error("transport failed: {0}")]
    Transport(#[from] TransportError),

    /// The portal answered with something other than 200.
    #[error("{message}")]
    Status { status: u16, message: String },

    /// A 200 body that does not match the expected shape.
    #[error("failed to decode response body: {0}")]
    Deserialization(#[source] serde_json::Error),
}

impl ApiError {
    /// The HTTP status of a mapped API error.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_displays_message_only() {
        let err = ApiError::Status {
            status: 404,
            message: "404 - Not Found".to_string(),
        };
        assert_eq!(err.to_string(), "404 - Not Found");
        assert_eq!(err.status(), Some(404));
    }

    #[test]
    fn transport_error_converts() {
        let err: ApiError = TransportError::Timeout.into();
        assert!(matches!(err, ApiError::Transport(TransportError::Timeout)));
        assert_eq!(err.to_string(), "transport failed: request timed out");
        assert_eq!(err.status(), None);
    }
}
