use serde::{Deserialize, Serialize};
use std::{error::Error, fmt};

/// Taxonomy of failures the bridge can surface to an HTTP client.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub enum BridgeError {
    NotRunning,
    CsrfMissing,
    ApiKeyMissing,
    ConnectionFailed(String),
    StreamError(String),
    BadRequest(String),
    Internal(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorSeverity {
    ClientFault,
    BackendUnavailable,
    Unexpected,
}

impl BridgeError {
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            BridgeError::NotRunning
            | BridgeError::CsrfMissing
            | BridgeError::ApiKeyMissing
            | BridgeError::ConnectionFailed(_) => ErrorSeverity::BackendUnavailable,
            BridgeError::StreamError(_) => ErrorSeverity::BackendUnavailable,
            BridgeError::BadRequest(_) => ErrorSeverity::ClientFault,
            BridgeError::Internal(_) => ErrorSeverity::Unexpected,
        }
    }

    /// Stable tag used in structured log fields and in the JSON error body.
    pub fn tag(&self) -> &'static str {
        match self {
            BridgeError::NotRunning => "NOT_RUNNING",
            BridgeError::CsrfMissing => "CSRF_MISSING",
            BridgeError::ApiKeyMissing => "API_KEY_MISSING",
            BridgeError::ConnectionFailed(_) => "CONNECTION_FAILED",
            BridgeError::StreamError(_) => "STREAM_ERROR",
            BridgeError::BadRequest(_) => "BAD_REQUEST",
            BridgeError::Internal(_) => "INTERNAL",
        }
    }

    /// HTTP status this error maps to at the surface layer.
    pub fn http_status(&self) -> u16 {
        match self {
            BridgeError::NotRunning | BridgeError::CsrfMissing | BridgeError::ApiKeyMissing => 503,
            BridgeError::ConnectionFailed(_) => 502,
            BridgeError::StreamError(_) => 502,
            BridgeError::BadRequest(_) => 400,
            BridgeError::Internal(_) => 500,
        }
    }
}

impl fmt::Display for BridgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BridgeError::NotRunning => write!(f, "windsurf language server is not running"),
            BridgeError::CsrfMissing => write!(f, "csrf token not found on language server command line"),
            BridgeError::ApiKeyMissing => write!(f, "api key not found in local windsurf state"),
            BridgeError::ConnectionFailed(msg) => write!(f, "connection to language server failed: {}", msg),
            BridgeError::StreamError(msg) => write!(f, "cascade stream error: {}", msg),
            BridgeError::BadRequest(msg) => write!(f, "bad request: {}", msg),
            BridgeError::Internal(msg) => write!(f, "internal error: {}", msg),
        }
    }
}

impl Error for BridgeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        None
    }
}

pub type BridgeResult<T> = Result<T, BridgeError>;
