//! Error type of the host harness.

use std::fmt;

#[derive(Debug)]
pub enum Error {
    /// Missing or invalid settings, bad command input.
    Config(String),
    /// Token lifecycle failures from the credential authenticator.
    Auth(tiktok_auth::Error),
    /// Failures from the resource dispatcher.
    Node(tiktok_node::Error),
    Io(std::io::Error),
    Json(serde_json::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(msg) => write!(f, "Configuration error: {}", msg),
            Error::Auth(err) => write!(f, "{}", err),
            Error::Node(err) => write!(f, "{}", err),
            Error::Io(err) => write!(f, "I/O error: {}", err),
            Error::Json(err) => write!(f, "JSON error: {}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Auth(err) => Some(err),
            Error::Node(err) => Some(err),
            Error::Io(err) => Some(err),
            Error::Json(err) => Some(err),
            Error::Config(_) => None,
        }
    }
}

impl From<tiktok_auth::Error> for Error {
    fn from(err: tiktok_auth::Error) -> Self {
        Error::Auth(err)
    }
}

impl From<tiktok_node::Error> for Error {
    fn from(err: tiktok_node::Error) -> Self {
        Error::Node(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json(err)
    }
}
