//! OAuth token data persisted by the host between runs.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

fn default_token_type() -> String {
    "Bearer".to_string()
}

/// Profile details cached next to the tokens for display purposes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

impl UserInfo {
    /// Best human-readable label: display name, then username, then open id.
    pub fn label(&self) -> Option<&str> {
        [&self.display_name, &self.username, &self.open_id]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .find(|s| !s.is_empty())
    }
}

/// Canonical token-data record.
///
/// Replaced wholesale by every successful exchange or refresh. Besides the token fields it
/// carries the redirect URI and CSRF expectations stashed at authorization kickoff, so a
/// later exchange or refresh still has them.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<i64>,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_expires_in: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_state_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_state_cid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserInfo>,
}

impl Default for TokenData {
    fn default() -> Self {
        Self {
            access_token: None,
            refresh_token: None,
            expires_in: None,
            token_type: default_token_type(),
            scope: None,
            open_id: None,
            refresh_expires_in: None,
            expires_at: None,
            redirect_uri: None,
            expected_state_token: None,
            expected_state_cid: None,
            user: None,
        }
    }
}

impl fmt::Debug for TokenData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |t: &Option<String>| t.as_ref().map(|_| "[REDACTED]");
        f.debug_struct("TokenData")
            .field("access_token", &redact(&self.access_token))
            .field("refresh_token", &redact(&self.refresh_token))
            .field("expires_in", &self.expires_in)
            .field("token_type", &self.token_type)
            .field("scope", &self.scope)
            .field("open_id", &self.open_id)
            .field("refresh_expires_in", &self.refresh_expires_in)
            .field("expires_at", &self.expires_at)
            .field("redirect_uri", &self.redirect_uri)
            .field("expected_state_cid", &self.expected_state_cid)
            .field("user", &self.user)
            .finish()
    }
}

impl TokenData {
    /// Record stashed at authorization kickoff, before any token exists.
    pub fn pending(
        redirect_uri: String,
        expected_state_token: Option<String>,
        expected_state_cid: Option<String>,
    ) -> Self {
        Self {
            redirect_uri: Some(redirect_uri),
            expected_state_token,
            expected_state_cid,
            ..Default::default()
        }
    }

    /// Access token, ignoring empty strings.
    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref().filter(|t| !t.is_empty())
    }

    /// Refresh token, ignoring empty strings.
    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref().filter(|t| !t.is_empty())
    }

    /// Check if the access token is expired or about to expire soon.
    ///
    /// Returns true if token is expired or will expire within 5 minutes.
    pub fn is_expired(&self) -> bool {
        self.expires_at
            .map(|expires| {
                let now = Utc::now();
                let buffer = Duration::minutes(5);
                expires <= (now + buffer)
            })
            .unwrap_or(false)
    }

    /// Get the remaining time until expiration.
    pub fn time_until_expiry(&self) -> Option<Duration> {
        self.expires_at.map(|expires| expires - Utc::now())
    }
}

/// Token endpoint response. TikTok reports some failures with a 200 status and an `error` field.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub open_id: Option<String>,
    #[serde(default)]
    pub refresh_expires_in: Option<i64>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub error_description: Option<String>,
    #[serde(default)]
    pub log_id: Option<String>,
}

impl TokenResponse {
    /// The upstream error message when the body reports a failure instead of tokens.
    pub fn error_message(&self) -> Option<String> {
        let error = self.error.as_deref().filter(|e| !e.is_empty() && *e != "ok");
        match (error, self.access_token.as_deref()) {
            (Some(error), _) => Some(match &self.error_description {
                Some(description) if !description.is_empty() => {
                    format!("{}: {}", error, description)
                }
                _ => error.to_string(),
            }),
            (None, None) | (None, Some("")) => Some("token response has no access_token".to_string()),
            (None, Some(_)) => None,
        }
    }

    /// Build the next token-data record.
    ///
    /// Carries forward the refresh token (when none was returned), the redirect URI, the
    /// CSRF expectations and the cached user from `previous`.
    pub fn into_token_data(self, previous: Option<&TokenData>, now: DateTime<Utc>) -> TokenData {
        let previous_refresh = previous.and_then(|p| p.refresh_token().map(String::from));

        TokenData {
            expires_at: self.expires_in.map(|secs| now + Duration::seconds(secs)),
            access_token: self.access_token,
            refresh_token: self
                .refresh_token
                .filter(|t| !t.is_empty())
                .or(previous_refresh),
            expires_in: self.expires_in,
            token_type: self
                .token_type
                .filter(|t| !t.is_empty())
                .unwrap_or_else(default_token_type),
            scope: self.scope,
            open_id: self.open_id,
            refresh_expires_in: self.refresh_expires_in,
            redirect_uri: previous.and_then(|p| p.redirect_uri.clone()),
            expected_state_token: previous.and_then(|p| p.expected_state_token.clone()),
            expected_state_cid: previous.and_then(|p| p.expected_state_cid.clone()),
            user: previous.and_then(|p| p.user.clone()),
        }
    }
}
