//! TikTok OAuth credential definition.
//!
//! Models the credential as composition: a generic OAuth 2.0 configuration plus the
//! TikTok-specific overrides (client secret in the body, custom token endpoint, state checks).

mod record;

pub use record::{
    ClientAuthentication, OAuth2Config, StateExpectations, TikTokCredential, DEFAULT_API_BASE_URL,
    DEFAULT_AUTH_URL, DEFAULT_SCOPE, DEFAULT_STATE_MAX_AGE_MINUTES,
};
