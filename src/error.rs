//! Error types for Canvas API calls.
//!
//! Every failed logical call resolves to exactly one [`NormalizedError`], whatever
//! shape the failure had on the wire (JSON error object, HTML error page, plain text,
//! or no response at all). The crate-level [`Error`] wraps it together with the few
//! failures that happen locally (configuration, serialization, deserialization).

use http::StatusCode;
use std::fmt;

/// Classification of a failed logical call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// No response was received (connection refused, DNS failure, timeout, ...).
    Network,
    /// The server answered `429 Too Many Requests`.
    RateLimited,
    /// The server answered with a 5xx status.
    ServerError,
    /// The server answered with a 4xx status other than 429.
    ClientError,
    /// Anything that fits none of the above.
    Unknown,
}

impl ErrorKind {
    /// Classifies a received HTTP status.
    ///
    /// # Examples
    ///
    /// ```
    /// use canvas_api::ErrorKind;
    /// use http::StatusCode;
    ///
    /// assert_eq!(ErrorKind::from_status(StatusCode::TOO_MANY_REQUESTS), ErrorKind::RateLimited);
    /// assert_eq!(ErrorKind::from_status(StatusCode::BAD_GATEWAY), ErrorKind::ServerError);
    /// assert_eq!(ErrorKind::from_status(StatusCode::NOT_FOUND), ErrorKind::ClientError);
    /// assert_eq!(ErrorKind::from_status(StatusCode::OK), ErrorKind::Unknown);
    /// ```
    pub fn from_status(status: StatusCode) -> Self {
        if status == StatusCode::TOO_MANY_REQUESTS {
            ErrorKind::RateLimited
        } else if status.is_server_error() {
            ErrorKind::ServerError
        } else if status.is_client_error() {
            ErrorKind::ClientError
        } else {
            ErrorKind::Unknown
        }
    }

    /// Returns `true` for the transient kinds: network failures, 429 and 5xx.
    pub fn is_retryable(self) -> bool {
        matches!(
            self,
            ErrorKind::Network | ErrorKind::RateLimited | ErrorKind::ServerError
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Network => "network",
            ErrorKind::RateLimited => "rate limited",
            ErrorKind::ServerError => "server error",
            ErrorKind::ClientError => "client error",
            ErrorKind::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// The single failure representation surfaced for a logical call.
///
/// Built once by the error normalizer when a call fails for good, and never
/// modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedError {
    /// Failure classification.
    pub kind: ErrorKind,
    /// HTTP status of the final failed attempt, when a response was received.
    pub status: Option<StatusCode>,
    /// Human-readable message extracted from the failure.
    pub message: String,
    /// At most the first 200 characters of the raw response body.
    pub body_excerpt: Option<String>,
    /// Whether the failure kind is considered transient.
    pub retryable: bool,
    /// Physical attempts made before giving up.
    pub attempts: u32,
}

impl NormalizedError {
    /// Builds an `Unknown` error for failures detected locally, without a response.
    pub(crate) fn unexpected(message: impl Into<String>, attempts: u32) -> Self {
        Self {
            kind: ErrorKind::Unknown,
            status: None,
            message: message.into(),
            body_excerpt: None,
            retryable: false,
            attempts,
        }
    }
}

impl fmt::Display for NormalizedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.kind, self.status) {
            (ErrorKind::Network, _) => write!(f, "Network error: {}", self.message),
            (_, Some(status)) => write!(f, "API error ({}): {}", status, self.message),
            (_, None) => write!(f, "Unexpected error: {}", self.message),
        }
    }
}

impl std::error::Error for NormalizedError {}

/// The main error type of this crate.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The logical call failed; see [`NormalizedError`] for the classification.
    #[error(transparent)]
    Api(#[from] NormalizedError),

    /// The (aggregated) response body did not match the requested type.
    #[error("Failed to deserialize response (status {status}): {serde_error}")]
    DeserializationFailed {
        /// The raw response body
        raw_response: String,
        /// The serde error message
        serde_error: String,
        /// The HTTP status code
        status: StatusCode,
    },

    /// A request payload could not be turned into JSON.
    #[error("Failed to serialize request: {0}")]
    SerializationFailed(String),

    /// Invalid client configuration (missing token, bad header value, ...).
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// An invalid base URL or domain was provided.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl Error {
    /// Returns the failure classification for API failures.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Error::Api(e) => Some(e.kind),
            _ => None,
        }
    }

    /// Returns the HTTP status code if this error has one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::Api(e) => e.status,
            Error::DeserializationFailed { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns `true` if the underlying failure was transient.
    ///
    /// An `Api` error that reached the caller has already used up the retry
    /// budget; this tells whether trying again later may help.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Api(e) if e.retryable)
    }
}

/// A specialized `Result` type for Canvas API calls.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        assert_eq!(
            ErrorKind::from_status(StatusCode::TOO_MANY_REQUESTS),
            ErrorKind::RateLimited
        );
        assert_eq!(
            ErrorKind::from_status(StatusCode::INTERNAL_SERVER_ERROR),
            ErrorKind::ServerError
        );
        assert_eq!(
            ErrorKind::from_status(StatusCode::FORBIDDEN),
            ErrorKind::ClientError
        );
        assert_eq!(
            ErrorKind::from_status(StatusCode::MOVED_PERMANENTLY),
            ErrorKind::Unknown
        );
    }

    #[test]
    fn test_retryable_kinds() {
        assert!(ErrorKind::Network.is_retryable());
        assert!(ErrorKind::RateLimited.is_retryable());
        assert!(ErrorKind::ServerError.is_retryable());
        assert!(!ErrorKind::ClientError.is_retryable());
        assert!(!ErrorKind::Unknown.is_retryable());
    }

    #[test]
    fn test_display() {
        let err = NormalizedError {
            kind: ErrorKind::ClientError,
            status: Some(StatusCode::NOT_FOUND),
            message: "The specified resource does not exist.".to_string(),
            body_excerpt: None,
            retryable: false,
            attempts: 1,
        };
        assert_eq!(
            err.to_string(),
            "API error (404 Not Found): The specified resource does not exist."
        );

        let err = NormalizedError {
            kind: ErrorKind::Network,
            status: None,
            message: "connection refused".to_string(),
            body_excerpt: None,
            retryable: true,
            attempts: 4,
        };
        assert_eq!(err.to_string(), "Network error: connection refused");

        let wrapped = Error::from(err);
        assert_eq!(wrapped.kind(), Some(ErrorKind::Network));
        assert!(wrapped.is_retryable());
        assert_eq!(wrapped.status(), None);
    }
}
