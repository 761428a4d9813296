//! Credential record: generic OAuth 2.0 settings composed with TikTok overrides.

use chrono::Duration;
use secrecy::SecretString;

/// TikTok authorization endpoint.
pub const DEFAULT_AUTH_URL: &str = "https://www.tiktok.com/v2/auth/authorize/";

/// TikTok Open API base URL. OAuth and content endpoints live under `/v2`.
pub const DEFAULT_API_BASE_URL: &str = "https://open.tiktokapis.com";

/// Scopes requested when none are configured.
pub const DEFAULT_SCOPE: &str =
    "video.upload,video.publish,user.info.basic,user.info.profile,user.info.stats";

/// Default maximum age of a CSRF state payload.
pub const DEFAULT_STATE_MAX_AGE_MINUTES: i64 = 10;

/// Where client credentials are placed on token requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientAuthentication {
    /// `client_key`/`client_secret` sent in the form body (TikTok).
    Body,
    /// HTTP Basic authentication header.
    Header,
}

/// Generic OAuth 2.0 client configuration.
#[derive(Debug, Clone)]
pub struct OAuth2Config {
    pub client_id: String,
    pub client_secret: SecretString,
    pub auth_url: String,
    pub access_token_url: String,
    pub scopes: Vec<String>,
    pub authentication: ClientAuthentication,
}

/// CSRF expectations applied to the `state` round-tripped through the redirect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateExpectations {
    /// Reject callbacks without a `state` parameter.
    pub required: bool,
    /// Maximum payload age. `None` disables the age check.
    pub max_age: Option<Duration>,
    pub expected_token: Option<String>,
    pub expected_cid: Option<String>,
}

impl Default for StateExpectations {
    fn default() -> Self {
        Self {
            required: true,
            max_age: Some(Duration::minutes(DEFAULT_STATE_MAX_AGE_MINUTES)),
            expected_token: None,
            expected_cid: None,
        }
    }
}

impl StateExpectations {
    /// Build expectations from the user-facing minute setting. Zero or negative disables the
    /// check, as does a value too large to represent.
    pub fn from_minutes(required: bool, max_age_minutes: i64) -> Self {
        Self {
            required,
            max_age: if max_age_minutes > 0 {
                Duration::try_minutes(max_age_minutes)
            } else {
                None
            },
            ..Default::default()
        }
    }

    pub fn with_expected_token(mut self, token: Option<String>) -> Self {
        self.expected_token = token.filter(|t| !t.is_empty());
        self
    }

    pub fn with_expected_cid(mut self, cid: Option<String>) -> Self {
        self.expected_cid = cid.filter(|c| !c.is_empty());
        self
    }
}

/// The TikTok OAuth credential: generic OAuth 2.0 config plus TikTok's state validation.
#[derive(Debug, Clone)]
pub struct TikTokCredential {
    pub oauth2: OAuth2Config,
    pub state: StateExpectations,
    /// Base URL for token, revoke and user info endpoints.
    pub api_base_url: String,
}

impl TikTokCredential {
    /// Create a credential with TikTok's endpoints and body-placed client credentials.
    ///
    /// # Arguments
    ///
    /// * `client_key` - TikTok client key (`client_key`)
    /// * `client_secret` - TikTok client secret
    /// * `scope` - Comma-separated scopes
    pub fn new(client_key: String, client_secret: SecretString, scope: &str) -> Self {
        Self {
            oauth2: OAuth2Config {
                client_id: client_key,
                client_secret,
                auth_url: DEFAULT_AUTH_URL.to_string(),
                access_token_url: format!("{}/v2/oauth/token/", DEFAULT_API_BASE_URL),
                scopes: parse_scopes(scope),
                authentication: ClientAuthentication::Body,
            },
            state: StateExpectations::default(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
        }
    }

    pub fn with_state(mut self, state: StateExpectations) -> Self {
        self.state = state;
        self
    }

    pub fn with_auth_url(mut self, auth_url: String) -> Self {
        self.oauth2.auth_url = auth_url;
        self
    }

    /// Point token and user info endpoints at another base URL (e.g. a mock server).
    pub fn with_api_base_url(mut self, base_url: &str) -> Self {
        let base_url = base_url.trim_end_matches('/');
        self.oauth2.access_token_url = format!("{}/v2/oauth/token/", base_url);
        self.api_base_url = base_url.to_string();
        self
    }

    pub fn client_key(&self) -> &str {
        &self.oauth2.client_id
    }

    /// Scopes joined the way TikTok expects them on the authorization URL.
    pub fn scope(&self) -> String {
        self.oauth2.scopes.join(",")
    }

    pub fn revoke_url(&self) -> String {
        format!("{}/v2/oauth/revoke/", self.api_base_url)
    }

    pub fn user_info_url(&self) -> String {
        format!("{}/v2/user/info/", self.api_base_url)
    }
}

fn parse_scopes(scope: &str) -> Vec<String> {
    scope
        .split([',', ' '])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
