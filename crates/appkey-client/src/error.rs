//! Structured errors for client operations.

use std::fmt;

use appkey_types::ErrorEnvelope;
use serde::{Deserialize, Serialize};

/// Categories of authentication errors for consistent handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthErrorKind {
    /// Rejected locally before any network call (empty/malformed input)
    Validation,
    /// Connection or request failure before a response arrived
    Transport,
    /// Failed to parse a response body
    Parse,
    /// Business error reported by the service (code + message)
    Api,
}

impl fmt::Display for AuthErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthErrorKind::Validation => write!(f, "validation"),
            AuthErrorKind::Transport => write!(f, "transport"),
            AuthErrorKind::Parse => write!(f, "parse"),
            AuthErrorKind::Api => write!(f, "api"),
        }
    }
}

/// Structured error with kind, optional service code, and details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthError {
    /// Error category
    pub kind: AuthErrorKind,
    /// One-line summary suitable for display
    pub message: String,
    /// Service error code for `Api` errors
    pub code: Option<u32>,
    /// Optional additional details (e.g., raw response body)
    pub details: Option<String>,
}

impl AuthError {
    /// Creates a new error without a service code.
    pub fn new(kind: AuthErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            code: None,
            details: None,
        }
    }

    /// Creates a local validation error. Never recorded on the session.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(AuthErrorKind::Validation, message)
    }

    /// Creates a transport error.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(AuthErrorKind::Transport, message)
    }

    /// Creates a parse error with the offending body attached.
    pub fn parse(message: impl Into<String>, body: &str) -> Self {
        Self {
            kind: AuthErrorKind::Parse,
            message: message.into(),
            code: None,
            details: if body.is_empty() {
                None
            } else {
                Some(body.to_string())
            },
        }
    }

    /// Creates an API error from a decoded error envelope.
    pub fn api(envelope: &ErrorEnvelope) -> Self {
        Self {
            kind: AuthErrorKind::Api,
            message: envelope.message.clone(),
            code: Some(envelope.code),
            details: None,
        }
    }

    /// Creates an API error from a non-2xx response the envelope parser
    /// could not decode.
    pub fn http_status(status: u16, body: &str) -> Self {
        Self {
            kind: AuthErrorKind::Api,
            message: format!("HTTP {status}"),
            code: None,
            details: if body.is_empty() {
                None
            } else {
                Some(body.to_string())
            },
        }
    }

    /// Returns true for an API error carrying the given service code.
    pub fn is_code(&self, code: u32) -> bool {
        self.kind == AuthErrorKind::Api && self.code == Some(code)
    }
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AuthError {}

/// Result type for client operations.
pub type AuthResult<T> = Result<T, AuthError>;
