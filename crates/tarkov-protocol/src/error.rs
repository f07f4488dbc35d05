//! Error types for protocol operations

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Connection failed: {0}")]
    Connect(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("HTTP status: {0}")]
    HttpStatus(StatusCode),

    #[error("Decompression failed: {0}")]
    Decompress(String),

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Malformed response envelope: {0}")]
    MalformedEnvelope(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl ProtocolError {
    /// Create a malformed envelope error naming the offending field
    pub fn malformed(detail: impl Into<String>) -> Self {
        Self::MalformedEnvelope(detail.into())
    }

    /// Check if error is retryable
    ///
    /// Only failures where the request never reached the server qualify.
    /// Everything past the connection (timeouts included) may have been
    /// applied by the backend and is surfaced to the caller instead.
    pub fn should_retry(&self) -> bool {
        match self {
            Self::Http(e) => e.is_connect(),
            Self::Connect(_) => true,
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, ProtocolError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_and_envelope_errors_are_not_retryable() {
        assert!(!ProtocolError::HttpStatus(StatusCode::BAD_GATEWAY).should_retry());
        assert!(!ProtocolError::malformed("err").should_retry());
        assert!(!ProtocolError::Decompress("corrupt deflate stream".into()).should_retry());
        assert!(!ProtocolError::Transport("reset after send".into()).should_retry());
    }

    #[test]
    fn test_connect_errors_are_retryable() {
        assert!(ProtocolError::Connect("connection refused".into()).should_retry());
    }

    #[test]
    fn test_malformed_display_names_field() {
        let err = ProtocolError::malformed("'errmsg' key is not available");
        assert_eq!(
            err.to_string(),
            "Malformed response envelope: 'errmsg' key is not available"
        );
    }
}
