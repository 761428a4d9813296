//! Error types for TikTok node operations.

use std::fmt;

use tiktok_auth::error::{ErrorKind, OAuthErrorKind};

/// Error type shared by every resource handler and the API transport.
///
/// Upstream failures keep the response body verbatim so the caller sees exactly what
/// TikTok reported. Nothing here is retried.
#[derive(Debug)]
pub enum Error {
    /// Missing or rejected credentials: not connected, expired token, insufficient scope.
    Authentication(String),

    /// Connection failures before a response was received.
    Network(String),

    /// Missing required fields, empty required selections, unknown resource/operation pairs.
    /// Raised before any HTTP request is issued.
    Configuration(String),

    /// TikTok rejected the request. Holds the upstream body as received.
    Provider(String),

    /// The HTTP transport's request timeout elapsed.
    Timeout(String),

    /// TikTok answered 404.
    NotFound(String),

    /// TikTok answered 429.
    RateLimited { retry_after_seconds: u64 },

    /// Failed to serialize a request body.
    Serialization(String),

    /// The response body was not the JSON shape expected.
    Deserialization(String),

    /// Catch-all for errors that don't fit other categories.
    Other(Box<dyn std::error::Error + Send + Sync>),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Authentication(msg) => write!(f, "Authentication failed: {}", msg),
            Error::Network(msg) => write!(f, "Network error: {}", msg),
            Error::Configuration(msg) => write!(f, "{}", msg),
            Error::Provider(msg) => write!(f, "TikTok API error: {}", msg),
            Error::Timeout(msg) => write!(f, "Timeout: {}", msg),
            Error::NotFound(msg) => write!(f, "Not found: {}", msg),
            Error::RateLimited {
                retry_after_seconds,
            } => {
                write!(f, "Rate limited: retry after {}s", retry_after_seconds)
            }
            Error::Serialization(msg) => write!(f, "Serialization error: {}", msg),
            Error::Deserialization(msg) => write!(f, "Deserialization error: {}", msg),
            Error::Other(err) => write!(f, "Other error: {}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Other(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<tiktok_auth::Error> for Error {
    fn from(err: tiktok_auth::Error) -> Self {
        match err.error_kind {
            ErrorKind::OAuth(OAuthErrorKind::Network) | ErrorKind::Http(_) => {
                Error::Network(err.to_string())
            }
            ErrorKind::OAuth(_) | ErrorKind::State(_) | ErrorKind::Token(_) => {
                Error::Authentication(err.to_string())
            }
            ErrorKind::Storage(_) => Error::Other(Box::new(err)),
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Error::Timeout(err.to_string())
        } else if err.is_decode() {
            Error::Deserialization(err.to_string())
        } else {
            Error::Network(err.to_string())
        }
    }
}

impl From<reqwest_middleware::Error> for Error {
    fn from(err: reqwest_middleware::Error) -> Self {
        match err {
            reqwest_middleware::Error::Reqwest(err) => err.into(),
            other => Error::Network(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Deserialization(err.to_string())
    }
}
