//! Error types for client operations

use std::fmt;

use tarkov_protocol::{ErrorCode, ProtocolError};
use thiserror::Error;

use crate::auth::AuthState;
use crate::catalog::CatalogGap;

/// Out-of-band challenge raised by the login endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChallengeKind {
    /// A code sent to the account e-mail must be supplied
    TwoFactor,
    /// A captcha must be solved and passed back with the credentials
    Captcha,
}

impl fmt::Display for ChallengeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TwoFactor => f.write_str("two-factor code required"),
            Self::Captcha => f.write_str("captcha required"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error("{operation}: {message} (code {code})")]
    ApiServer {
        operation: &'static str,
        code: ErrorCode,
        message: String,
        /// Backend `errmsg` text, verbatim
        detail: String,
    },

    #[error("Authentication challenge: {kind}")]
    AuthChallenge { kind: ChallengeKind },

    #[error("Catalog resolution left {} item(s) unresolved", gaps.len())]
    ResolutionGap { gaps: Vec<CatalogGap> },

    #[error("Invalid argument: {0}")]
    InvalidArgument(&'static str),

    #[error("Cannot {action} while authentication is {state:?}")]
    InvalidTransition {
        state: AuthState,
        action: &'static str,
    },

    #[error("Request rejected: {0}")]
    BadRequest(String),

    #[error("{kind} not found: {key}")]
    NotFound { kind: &'static str, key: String },
}

impl ClientError {
    /// Build an API error for `code`, using the registry message
    pub fn api(operation: &'static str, code: ErrorCode, detail: impl Into<String>) -> Self {
        Self::ApiServer {
            operation,
            code,
            message: code.message().into_owned(),
            detail: detail.into(),
        }
    }

    /// Backend error code, if the failure came from the backend
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            Self::ApiServer { code, .. } => Some(*code),
            _ => None,
        }
    }

    pub(crate) fn malformed(detail: impl Into<String>) -> Self {
        Self::Protocol(ProtocolError::malformed(detail))
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
