//! TikTok OAuth provider implementation.

use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::credentials::{ClientAuthentication, TikTokCredential};
use crate::error::{oauth_error, Error, OAuthErrorKind};
use crate::http::{HttpClient, HttpClientBuilder};
use crate::oauth::token::{TokenResponse, UserInfo};
use crate::oauth::{AuthorizationRequest, USER_INFO_FIELDS};

/// Envelope of TikTok's `/v2/user/info/` response.
#[derive(Debug, Deserialize)]
struct UserInfoEnvelope {
    #[serde(default)]
    data: Option<UserInfoData>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct UserInfoData {
    #[serde(default)]
    user: Option<UserInfo>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

/// TikTok OAuth provider.
///
/// Client credentials travel in the form body (`client_key`/`client_secret`) unless the
/// credential asks for header authentication.
pub struct Provider {
    credential: TikTokCredential,
    http_client: HttpClient,
}

impl Provider {
    /// Create a new TikTok OAuth provider with a default HTTP client.
    pub fn new(credential: TikTokCredential) -> Result<Self, Error> {
        let http_client = HttpClientBuilder::new().build()?;
        Ok(Self::with_client(credential, http_client))
    }

    /// Create a provider sharing an existing HTTP client.
    pub fn with_client(credential: TikTokCredential, http_client: HttpClient) -> Self {
        Self {
            credential,
            http_client,
        }
    }

    pub fn credential(&self) -> &TikTokCredential {
        &self.credential
    }

    async fn token_request(
        &self,
        grant: &[(&str, &str)],
        failure: OAuthErrorKind,
    ) -> Result<TokenResponse, Error> {
        let oauth2 = &self.credential.oauth2;
        let mut form: Vec<(&str, &str)> = Vec::with_capacity(grant.len() + 2);
        let mut request = self.http_client.post(&oauth2.access_token_url);

        match oauth2.authentication {
            ClientAuthentication::Body => {
                form.push(("client_key", oauth2.client_id.as_str()));
                form.push(("client_secret", oauth2.client_secret.expose_secret().as_str()));
            }
            ClientAuthentication::Header => {
                request = request.basic_auth(
                    &oauth2.client_id,
                    Some(oauth2.client_secret.expose_secret()),
                );
            }
        }
        form.extend_from_slice(grant);

        let response = request.form(&form).send().await.map_err(|e| {
            warn!("TikTok token request failed to send: {:?}", e);
            Error::from(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!("TikTok token endpoint returned {}: {}", status, error_text);
            return Err(oauth_error(failure, &error_text));
        }

        let tokens: TokenResponse = response.json().await.map_err(|e| {
            warn!("Failed to parse TikTok token response: {:?}", e);
            Error {
                source: Some(Box::new(e)),
                error_kind: crate::error::ErrorKind::OAuth(OAuthErrorKind::InvalidResponse),
            }
        })?;

        if let Some(message) = tokens.error_message() {
            warn!("TikTok token endpoint reported an error: {}", message);
            return Err(oauth_error(failure, &message));
        }

        Ok(tokens)
    }
}

#[async_trait]
impl crate::oauth::Provider for Provider {
    fn authorization_url(&self, state: &str, redirect_uri: &str) -> AuthorizationRequest {
        let url = format!(
            "{}?\
            client_key={}&\
            response_type=code&\
            scope={}&\
            redirect_uri={}&\
            state={}",
            self.credential.oauth2.auth_url,
            urlencoding::encode(self.credential.client_key()),
            urlencoding::encode(&self.credential.scope()),
            urlencoding::encode(redirect_uri),
            urlencoding::encode(state)
        );

        AuthorizationRequest {
            url,
            state: state.to_string(),
        }
    }

    async fn exchange_code(&self, code: &str, redirect_uri: &str) -> Result<TokenResponse, Error> {
        debug!("Exchanging TikTok authorization code for tokens");

        let tokens = self
            .token_request(
                &[
                    ("grant_type", "authorization_code"),
                    ("code", code),
                    ("redirect_uri", redirect_uri),
                ],
                OAuthErrorKind::TokenExchangeFailed,
            )
            .await?;

        info!("Successfully exchanged TikTok authorization code for tokens");
        Ok(tokens)
    }

    async fn refresh_token(&self, refresh_token: &str) -> Result<TokenResponse, Error> {
        debug!("Refreshing TikTok access token");

        let tokens = self
            .token_request(
                &[
                    ("grant_type", "refresh_token"),
                    ("refresh_token", refresh_token),
                ],
                OAuthErrorKind::TokenRefreshFailed,
            )
            .await?;

        info!("Successfully refreshed TikTok access token");
        Ok(tokens)
    }

    async fn revoke_token(&self, access_token: &str) -> Result<(), Error> {
        let oauth2 = &self.credential.oauth2;
        let form = [
            ("client_key", oauth2.client_id.as_str()),
            ("client_secret", oauth2.client_secret.expose_secret().as_str()),
            ("token", access_token),
        ];

        let response = self
            .http_client
            .post(self.credential.revoke_url())
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            warn!("TikTok token revocation returned {}: {}", status, body);
            return Err(oauth_error(OAuthErrorKind::RevocationFailed, &body));
        }
        if let Ok(tokens) = serde_json::from_str::<TokenResponse>(&body) {
            if tokens.error.as_deref().is_some_and(|e| !e.is_empty() && e != "ok") {
                return Err(oauth_error(OAuthErrorKind::RevocationFailed, &body));
            }
        }

        info!("Revoked TikTok access token");
        Ok(())
    }

    async fn get_user_info(&self, access_token: &str) -> Result<UserInfo, Error> {
        let response = self
            .http_client
            .get(self.credential.user_info_url())
            .query(&[("fields", USER_INFO_FIELDS)])
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| {
                warn!("Failed to get TikTok user info: {:?}", e);
                Error::from(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!("TikTok user info error {}: {}", status, error_text);
            return Err(oauth_error(OAuthErrorKind::InvalidResponse, &error_text));
        }

        let envelope: UserInfoEnvelope = response.json().await.map_err(|e| Error {
            source: Some(Box::new(e)),
            error_kind: crate::error::ErrorKind::OAuth(OAuthErrorKind::InvalidResponse),
        })?;

        if let Some(error) = envelope.error.filter(|e| !e.code.is_empty() && e.code != "ok") {
            let kind = if error.code == "scope_not_authorized" {
                OAuthErrorKind::InsufficientScope
            } else {
                OAuthErrorKind::InvalidResponse
            };
            return Err(oauth_error(kind, &format!("{}: {}", error.code, error.message)));
        }

        Ok(envelope.data.and_then(|d| d.user).unwrap_or_default())
    }
}
