//! Bearer signing of outbound TikTok API requests.

use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest_middleware::RequestBuilder;
use secrecy::{ExposeSecret, SecretString};

use super::token::TokenData;
use crate::error::{oauth_error, Error, ErrorKind, OAuthErrorKind, TokenErrorKind};

/// Attaches credentials to a request.
pub trait RequestSigner: Send + Sync {
    fn sign(&self, request: RequestBuilder) -> Result<RequestBuilder, Error>;
}

/// `Authorization: Bearer <access_token>` taken from persisted token data.
#[derive(Clone)]
pub struct BearerSigner {
    token: SecretString,
}

impl BearerSigner {
    pub fn new(token: SecretString) -> Self {
        Self { token }
    }

    /// Signer for the access token in `data`; fails when the account is not connected.
    pub fn from_token_data(data: &TokenData) -> Result<Self, Error> {
        let token = data.access_token().ok_or_else(|| {
            oauth_error(OAuthErrorKind::NotConnected, "TikTok account is not connected")
        })?;
        Ok(Self::new(SecretString::from(token.to_string())))
    }

    /// Header value marked sensitive so it is redacted from debug output.
    pub fn header_value(&self) -> Result<HeaderValue, Error> {
        let mut value =
            HeaderValue::from_str(&format!("Bearer {}", self.token.expose_secret())).map_err(
                |e| Error {
                    source: Some(Box::new(e)),
                    error_kind: ErrorKind::Token(TokenErrorKind::InvalidHeader),
                },
            )?;
        value.set_sensitive(true);
        Ok(value)
    }
}

impl RequestSigner for BearerSigner {
    fn sign(&self, request: RequestBuilder) -> Result<RequestBuilder, Error> {
        Ok(request.header(AUTHORIZATION, self.header_value()?))
    }
}

impl std::fmt::Debug for BearerSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BearerSigner").field("token", &"[redacted]").finish()
    }
}

/// Shortcut for a one-off header without building a signer.
pub fn bearer_header(data: &TokenData) -> Result<HeaderValue, Error> {
    BearerSigner::from_token_data(data)?.header_value()
}
