//! OAuth 2.0 authorization-code flow for TikTok.
//!
//! Covers the authorization redirect, CSRF state round-trip, code exchange, refresh,
//! revocation and bearer signing of API requests.

mod authenticator;
mod callback;
mod provider;
mod signing;
mod state;

pub mod providers;
pub mod token;

pub use authenticator::Authenticator;
pub use callback::{CallbackData, CallbackParams};
pub use provider::{AuthorizationRequest, Provider, USER_INFO_FIELDS};
pub use signing::{bearer_header, BearerSigner, RequestSigner};
pub use state::{validate_state, StatePayload};
