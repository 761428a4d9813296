//! OAuth provider trait and types.

use async_trait::async_trait;

use super::token::{TokenResponse, UserInfo};
use crate::error::Error;

/// Profile fields requested when caching user info next to the tokens.
pub const USER_INFO_FIELDS: &str = "open_id,username,display_name,avatar_url";

/// Authorization request with URL and the state it embeds.
#[derive(Debug, Clone)]
pub struct AuthorizationRequest {
    /// Authorization URL to redirect the user to.
    pub url: String,
    /// Encoded CSRF state parameter.
    pub state: String,
}

/// Trait for OAuth 2.0 providers.
///
/// Implementations handle the network side of the token lifecycle:
/// - Authorization URL generation
/// - Authorization code exchange for tokens
/// - Token refresh
/// - Token revocation
/// - User info retrieval
///
/// Validation and state handling live in the authenticator, so every method here is a
/// single outbound request with no retry.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Generate the authorization URL the user is redirected to.
    ///
    /// # Arguments
    ///
    /// * `state` - Encoded CSRF state parameter
    /// * `redirect_uri` - Redirect URI; the code exchange must reuse it byte for byte
    fn authorization_url(&self, state: &str, redirect_uri: &str) -> AuthorizationRequest;

    /// Exchange an authorization code for access and refresh tokens.
    async fn exchange_code(&self, code: &str, redirect_uri: &str) -> Result<TokenResponse, Error>;

    /// Refresh an access token using a refresh token.
    async fn refresh_token(&self, refresh_token: &str) -> Result<TokenResponse, Error>;

    /// Revoke an access token.
    async fn revoke_token(&self, access_token: &str) -> Result<(), Error>;

    /// Get user information using an access token.
    async fn get_user_info(&self, access_token: &str) -> Result<UserInfo, Error>;
}
