//! Error types for the exporter.

use std::time::Duration;

use thiserror::Error;

use crate::address::AddressError;

/// Result type alias using [`ExporterError`].
pub type Result<T> = std::result::Result<T, ExporterError>;

/// Errors that prevent the exporter from starting.
#[derive(Debug, Error)]
pub enum ExporterError {
    /// The configured router address is malformed.
    #[error("Invalid GoBGP address: {0}")]
    Address(#[from] AddressError),

    /// TLS material could not be loaded.
    #[error("Failed to load TLS material from {path}: {source}")]
    Tls {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The router could not be reached at startup.
    #[error("Failed to connect to GoBGP at {address}: {source}")]
    Connect {
        address: String,
        #[source]
        source: tonic::transport::Error,
    },

    /// An empty authentication token was supplied.
    #[error("Invalid empty authentication token")]
    EmptyToken,

    /// Logging could not be initialized.
    #[error("Failed to initialize logging: {0}")]
    Logging(String),
}

/// Errors returned by a single remote API call.
///
/// These never leave the collection engine: they are counted and logged.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The remote call failed.
    #[error("GoBGP request failed: {0}")]
    Status(#[from] tonic::Status),

    /// The call did not complete within the per-call timeout.
    #[error("GoBGP request timed out after {0:?}")]
    Timeout(Duration),

    /// The daemon answered with a response missing required fields.
    #[error("Malformed GoBGP response: {0}")]
    Malformed(String),
}

impl ApiError {
    /// Whether the failure points at a broken connection rather than a
    /// rejected request.
    pub fn is_connection_error(&self) -> bool {
        match self {
            ApiError::Status(status) => matches!(
                status.code(),
                tonic::Code::Unavailable | tonic::Code::DeadlineExceeded | tonic::Code::Cancelled
            ),
            ApiError::Timeout(_) => true,
            ApiError::Malformed(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_error_classification() {
        let refused = ApiError::Status(tonic::Status::unavailable("connection refused"));
        assert!(refused.is_connection_error());
        assert!(ApiError::Timeout(Duration::from_secs(2)).is_connection_error());

        let missing = ApiError::Status(tonic::Status::not_found("no such table"));
        assert!(!missing.is_connection_error());
        assert!(!ApiError::Malformed("missing global".to_string()).is_connection_error());
    }

    #[test]
    fn test_error_display() {
        let err = ExporterError::EmptyToken;
        assert_eq!(err.to_string(), "Invalid empty authentication token");

        let err = ApiError::Timeout(Duration::from_secs(2));
        assert!(err.to_string().contains("timed out"));
    }
}
