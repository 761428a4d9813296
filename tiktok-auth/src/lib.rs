//! # tiktok-auth
//!
//! TikTok OAuth 2.0 credential handling:
//! - Credential definition (client key/secret, scopes, CSRF state expectations)
//! - Authorization-code exchange and refresh with state validation
//! - Bearer signing and connectivity test
//! - Encrypted token storage
//! - HTTP client building with middleware
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tiktok_auth::{
//!     credentials::TikTokCredential,
//!     oauth::{providers::tiktok, Authenticator, CallbackData},
//! };
//!
//! let provider = tiktok::Provider::new(credential.clone())?;
//! let authenticator = Authenticator::new(provider, credential.state.clone());
//! let tokens = authenticator.authenticate(stored.as_ref(), &callback, Utc::now()).await?;
//! ```

pub mod credentials;
pub mod error;
pub mod http;
pub mod oauth;

// Re-export commonly used types
pub use error::{Error, ErrorKind};
