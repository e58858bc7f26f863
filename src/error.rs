//! # Errors
//!
//! Two layers:
//!
//! - [`ServiceError`]: anything the Translation Service or Telemetry Sink
//!   reports (transport, HTTP status, malformed body).
//! - [`SessionError`]: what a controller operation reports to the user.
//!   Wraps `ServiceError` and adds the local credential checks.
//!
//! Nothing here is retried. Every error ends up as text in the output
//! field, so `Display` is the user-facing message.

use std::fmt;

/// Errors raised by the external service clients.
#[derive(Debug, Clone, PartialEq)]
pub enum ServiceError {
    /// Client misconfigured (bad endpoint URL, malformed connection string).
    Config(String),
    /// Network-level failure (timeout, DNS, connection refused).
    Network(String),
    /// The service rejected the credentials (HTTP 401/403).
    Unauthorized(String),
    /// Any other non-success response.
    Api { status: u16, message: String },
    /// The response body did not have the expected shape.
    Parse(String),
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceError::Config(msg) => write!(f, "config error: {msg}"),
            ServiceError::Network(msg) => write!(f, "network error: {msg}"),
            ServiceError::Unauthorized(msg) => write!(f, "unauthorized: {msg}"),
            ServiceError::Api { status, message } => {
                write!(f, "API error (HTTP {status}): {message}")
            }
            ServiceError::Parse(msg) => write!(f, "parse error: {msg}"),
        }
    }
}

impl std::error::Error for ServiceError {}

impl From<reqwest::Error> for ServiceError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ServiceError::Parse(e.to_string())
        } else {
            ServiceError::Network(e.to_string())
        }
    }
}

/// Errors reported by controller operations.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionError {
    /// Key is neither empty nor exactly 32 characters. No request was sent.
    InvalidCredential { length: usize },
    /// Key is empty. The catalog was still fetched.
    CredentialRequired,
    /// Passed through from a service client.
    Service(ServiceError),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::InvalidCredential { length } => write!(
                f,
                "invalid API key: expected 32 characters, got {length}"
            ),
            SessionError::CredentialRequired => {
                write!(f, "an API key is required to translate")
            }
            SessionError::Service(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SessionError::Service(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ServiceError> for SessionError {
    fn from(e: ServiceError) -> Self {
        SessionError::Service(e)
    }
}
