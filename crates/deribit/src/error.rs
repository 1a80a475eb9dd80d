//! Error types for the deribit client.
//!
//! This module provides a unified error type with explicit variants for
//! authentication, request, transport, and input validation errors.

use std::fmt;
use thiserror::Error;

/// Vendor error code for "too many requests".
pub const CODE_TOO_MANY_REQUESTS: i64 = 10028;

/// Vendor error code for "unauthorized" (missing, wrong or expired token).
pub const CODE_UNAUTHORIZED: i64 = 13009;

/// Vendor error code for rejected client credentials.
pub const CODE_INVALID_CREDENTIALS: i64 = 13004;

/// The unified error type for deribit operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Authentication errors (missing or rejected credentials).
    #[error("authentication error: {0}")]
    Auth(#[from] AuthError),

    /// The API answered with a JSON-RPC error or a non-success status.
    #[error("request error: {0}")]
    Request(#[from] RequestError),

    /// Network transport errors (DNS, connection, timeout).
    #[error("network error: {0}")]
    Network(#[from] NetworkError),

    /// Input validation errors.
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),

    /// The response body was not a JSON-RPC envelope.
    #[error("failed to decode response: {message}")]
    Decode { message: String },
}

impl Error {
    /// Returns the request error if this is one.
    pub fn as_request(&self) -> Option<&RequestError> {
        match self {
            Error::Request(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Decode {
            message: err.to_string(),
        }
    }
}

/// Transport-level errors.
#[derive(Debug, Error)]
pub enum NetworkError {
    /// Network connection failed.
    #[error("connection failed: {message}")]
    Connection { message: String },

    /// Request timed out.
    #[error("request timed out: {message}")]
    Timeout { message: String },

    /// Generic HTTP transport error.
    #[error("HTTP error: {message}")]
    Http { message: String },
}

impl From<reqwest::Error> for NetworkError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            NetworkError::Timeout {
                message: err.to_string(),
            }
        } else if err.is_connect() {
            NetworkError::Connection {
                message: err.to_string(),
            }
        } else {
            NetworkError::Http {
                message: err.to_string(),
            }
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Network(NetworkError::from(err))
    }
}

/// Authentication-related errors.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No client id / secret was configured.
    #[error("client id and client secret are required for private requests")]
    MissingCredentials,

    /// The auth endpoint rejected the credentials.
    #[error("credentials rejected: {0}")]
    Rejected(RequestError),

    /// The auth endpoint could not be reached.
    #[error("auth endpoint unavailable: {0}")]
    Unavailable(NetworkError),

    /// A refresh was requested but no refresh token is held.
    #[error("no refresh token available")]
    NoRefreshToken,
}

/// Error reported by the API, carried unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestError {
    /// HTTP status code.
    pub status: u16,
    /// Vendor error code (if present).
    pub code: Option<i64>,
    /// Vendor error message (if present).
    pub message: Option<String>,
    /// Additional vendor error data (if present).
    pub data: Option<serde_json::Value>,
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {}", self.status)?;
        if let Some(code) = self.code {
            write!(f, " [{}]", code)?;
        }
        if let Some(ref message) = self.message {
            write!(f, ": {}", message)?;
        }
        Ok(())
    }
}

impl std::error::Error for RequestError {}

impl RequestError {
    /// Create a new request error.
    pub fn new(
        status: u16,
        code: Option<i64>,
        message: Option<String>,
        data: Option<serde_json::Value>,
    ) -> Self {
        Self {
            status,
            code,
            message,
            data,
        }
    }

    /// Check if the call was rejected for authorization reasons.
    pub fn is_unauthorized(&self) -> bool {
        self.status == 401 || self.code == Some(CODE_UNAUTHORIZED)
    }

    /// Check if the call was throttled.
    pub fn is_rate_limited(&self) -> bool {
        self.status == 429 || self.code == Some(CODE_TOO_MANY_REQUESTS)
    }
}

/// Input validation errors.
#[derive(Debug, Error)]
pub enum InvalidInputError {
    /// Unknown environment name.
    #[error("environment '{value}' not supported (expected 'test' or 'prod')")]
    Environment { value: String },

    /// Invalid base URL override.
    #[error("invalid base URL '{value}': {reason}")]
    BaseUrl { value: String, reason: String },

    /// Invalid order amount.
    #[error("invalid amount {value}: {reason}")]
    Amount { value: f64, reason: String },

    /// Generic invalid input.
    #[error("invalid input: {message}")]
    Other { message: String },
}
