// Error taxonomy shared by every provider.
//
// `SocialiteError` is what provider operations return; `ErrorCode` is the
// stable, machine-readable tag callers can match on or render.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable error codes, one per `SocialiteError` variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    AuthorizeFailed,
    MethodNotSupported,
    InvalidConfig,
    HttpRequestFailed,
    InvalidUrl,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::AuthorizeFailed => "Authorize failed",
            Self::MethodNotSupported => "Method not supported",
            Self::InvalidConfig => "Invalid provider configuration",
            Self::HttpRequestFailed => "HTTP request failed",
            Self::InvalidUrl => "Invalid URL",
        };
        write!(f, "{msg}")
    }
}

/// Errors raised by provider operations.
#[derive(Debug, thiserror::Error)]
pub enum SocialiteError {
    /// The upstream API rejected the request or returned no usable identity.
    /// `body` is the decoded response, kept for diagnostics.
    #[error("{message}")]
    AuthorizeFailed {
        message: String,
        body: serde_json::Value,
    },

    /// The provider does not implement the requested capability.
    #[error("{0}")]
    MethodNotSupported(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error(transparent)]
    InvalidUrl(#[from] url::ParseError),
}

impl SocialiteError {
    pub fn authorize_failed(message: impl Into<String>, body: serde_json::Value) -> Self {
        Self::AuthorizeFailed {
            message: message.into(),
            body,
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            Self::AuthorizeFailed { .. } => ErrorCode::AuthorizeFailed,
            Self::MethodNotSupported(_) => ErrorCode::MethodNotSupported,
            Self::Config(_) => ErrorCode::InvalidConfig,
            Self::Http(_) => ErrorCode::HttpRequestFailed,
            Self::InvalidUrl(_) => ErrorCode::InvalidUrl,
        }
    }

    /// Upstream response attached to an `AuthorizeFailed` error.
    pub fn body(&self) -> Option<&serde_json::Value> {
        match self {
            Self::AuthorizeFailed { body, .. } => Some(body),
            _ => None,
        }
    }

    /// Build a JSON body for rendering the error to a client.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "code": self.code(),
            "message": self.to_string(),
        })
    }
}

impl From<reqwest::Error> for SocialiteError {
    fn from(e: reqwest::Error) -> Self {
        Self::Http(e.to_string())
    }
}

/// Unified result type for provider operations.
pub type Result<T> = std::result::Result<T, SocialiteError>;
