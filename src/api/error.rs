//! API error types for the TrackMyBugs client.

use thiserror::Error;

/// Message used when a rejection carries no usable `error` field.
pub const GENERIC_FAILURE_MESSAGE: &str = "Request failed";

/// Coarse classification of a failed operation.
///
/// Views branch on this rather than on individual [`ApiError`] variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Transport or decoding failure. Re-issuing the same request may succeed.
    Network,
    /// The session is missing, invalid or expired.
    Unauthorized,
    /// The server understood and rejected the request.
    Api,
}

/// Errors that can occur when talking to the TrackMyBugs API.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    /// The server could not be reached or the connection failed mid-request.
    #[error("Network error: {0}")]
    Network(String),

    /// A successful response whose body could not be decoded.
    #[error("Invalid API response: {0}")]
    InvalidResponse(String),

    /// The server answered 401. The session has already been cleared.
    #[error("Unauthorized")]
    Unauthorized,

    /// Domain-level rejection (validation, not found, conflict, ...).
    #[error("{message}")]
    Rejected {
        /// HTTP status code of the response.
        status: u16,
        /// The server's `error` field, or the generic fallback.
        message: String,
    },

    /// The configured base URL cannot be used to build requests.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// A request body could not be encoded as JSON.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

/// Result type for API operations.
pub type Result<T> = std::result::Result<T, ApiError>;

impl ApiError {
    /// Build a rejection, falling back to a generic message when the server
    /// supplied none.
    pub fn rejected(status: u16, message: Option<&str>) -> Self {
        let message = message
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(GENERIC_FAILURE_MESSAGE)
            .to_string();
        ApiError::Rejected { status, message }
    }

    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Network(_)
            | ApiError::InvalidResponse(_)
            | ApiError::InvalidUrl(_)
            | ApiError::InvalidRequest(_) => ErrorKind::Network,
            ApiError::Unauthorized => ErrorKind::Unauthorized,
            ApiError::Rejected { .. } => ErrorKind::Api,
        }
    }

    /// Whether re-issuing the identical request could succeed.
    ///
    /// The client never retries on its own; this only informs the view.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ApiError::Network(_) | ApiError::InvalidResponse(_))
    }

    /// HTTP status of a rejection, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Rejected { status, .. } => Some(*status),
            ApiError::Unauthorized => Some(401),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_uses_server_message() {
        let err = ApiError::rejected(400, Some("Project name is required"));
        assert_eq!(err.to_string(), "Project name is required");
        assert_eq!(err.status(), Some(400));
    }

    #[test]
    fn test_rejected_falls_back_when_missing() {
        let err = ApiError::rejected(500, None);
        assert_eq!(err.to_string(), GENERIC_FAILURE_MESSAGE);
    }

    #[test]
    fn test_rejected_falls_back_when_blank() {
        let err = ApiError::rejected(422, Some("   "));
        assert_eq!(err.to_string(), GENERIC_FAILURE_MESSAGE);
    }

    #[test]
    fn test_kind_classification() {
        assert_eq!(ApiError::Network("refused".into()).kind(), ErrorKind::Network);
        assert_eq!(
            ApiError::InvalidResponse("eof".into()).kind(),
            ErrorKind::Network
        );
        assert_eq!(ApiError::Unauthorized.kind(), ErrorKind::Unauthorized);
        assert_eq!(ApiError::rejected(404, Some("x")).kind(), ErrorKind::Api);
    }

    #[test]
    fn test_is_retryable() {
        assert!(ApiError::Network("timeout".into()).is_retryable());
        assert!(!ApiError::Unauthorized.is_retryable());
        assert!(!ApiError::rejected(409, Some("conflict")).is_retryable());
    }

    #[test]
    fn test_error_display() {
        assert_eq!(ApiError::Unauthorized.to_string(), "Unauthorized");
        assert_eq!(
            ApiError::Network("connection refused".into()).to_string(),
            "Network error: connection refused"
        );
    }
}
