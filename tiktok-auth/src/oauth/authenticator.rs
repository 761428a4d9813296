//! Token lifecycle for one authentication attempt.
//!
//! An attempt either refreshes (a refresh token is stored) or exchanges the callback's
//! authorization code. A `code` in the callback never overrides the refresh branch. CSRF
//! state checks run before any network call, and stored token data is only replaced by
//! a complete new record.

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use super::callback::CallbackData;
use super::provider::{AuthorizationRequest, Provider};
use super::state::{validate_state, StatePayload};
use super::token::{TokenData, UserInfo};
use crate::credentials::StateExpectations;
use crate::error::{oauth_error, Error, OAuthErrorKind};

/// Drives the OAuth state machine against a [`Provider`].
pub struct Authenticator<P: Provider> {
    provider: P,
    state: StateExpectations,
}

impl<P: Provider> Authenticator<P> {
    pub fn new(provider: P, state: StateExpectations) -> Self {
        Self { provider, state }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Start an authorization.
    ///
    /// Returns the redirect request and the pending token data to persist until the
    /// callback arrives. The pending record remembers the redirect URI and the issued
    /// state so the exchange can verify both.
    pub fn begin(
        &self,
        redirect_uri: &str,
        cid: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<(AuthorizationRequest, TokenData), Error> {
        let payload = StatePayload::issue(cid, now);
        let request = self
            .provider
            .authorization_url(&payload.encode()?, redirect_uri);
        let pending = TokenData::pending(redirect_uri.to_string(), payload.token, payload.cid);

        debug!("Issued authorization request");
        Ok((request, pending))
    }

    /// Produce the next token data for this attempt.
    ///
    /// # Arguments
    ///
    /// * `stored` - Previously persisted token data, if any
    /// * `callback` - Data the host captured from the authorization redirect
    /// * `now` - Clock used for state age checks and `expires_at`
    pub async fn authenticate(
        &self,
        stored: Option<&TokenData>,
        callback: &CallbackData,
        now: DateTime<Utc>,
    ) -> Result<TokenData, Error> {
        match stored.and_then(TokenData::refresh_token) {
            Some(refresh_token) => self.refresh(stored, refresh_token, now).await,
            None => self.exchange(stored, callback, now).await,
        }
    }

    async fn refresh(
        &self,
        stored: Option<&TokenData>,
        refresh_token: &str,
        now: DateTime<Utc>,
    ) -> Result<TokenData, Error> {
        let response = self.provider.refresh_token(refresh_token).await?;
        let mut data = response.into_token_data(stored, now);

        if data.user.is_none() {
            data.user = self.fetch_user(&data).await;
        }

        info!("Refreshed TikTok token data");
        Ok(data)
    }

    async fn exchange(
        &self,
        stored: Option<&TokenData>,
        callback: &CallbackData,
        now: DateTime<Utc>,
    ) -> Result<TokenData, Error> {
        let params = callback.params();
        let expectations = self.expectations_for(stored);

        validate_state(params.state.as_deref(), &expectations, now).map_err(|e| {
            warn!("Rejected OAuth callback: {}", e);
            e
        })?;

        let code = params.code.ok_or_else(|| {
            oauth_error(
                OAuthErrorKind::MissingCode,
                "No authorization code found in the OAuth callback",
            )
        })?;

        let redirect_uri = stored
            .and_then(|s| s.redirect_uri.as_deref())
            .filter(|uri| !uri.is_empty())
            .ok_or_else(|| {
                oauth_error(
                    OAuthErrorKind::MissingRedirectUri,
                    "No redirect URI recorded for this authorization",
                )
            })?;

        let response = self.provider.exchange_code(&code, redirect_uri).await?;
        let mut data = response.into_token_data(stored, now);
        data.user = self.fetch_user(&data).await;

        info!("Exchanged TikTok authorization code");
        Ok(data)
    }

    /// Credential expectations win; values stashed at kickoff fill the gaps.
    fn expectations_for(&self, stored: Option<&TokenData>) -> StateExpectations {
        let mut expectations = self.state.clone();
        if expectations.expected_token.is_none() {
            expectations = expectations
                .with_expected_token(stored.and_then(|s| s.expected_state_token.clone()));
        }
        if expectations.expected_cid.is_none() {
            expectations =
                expectations.with_expected_cid(stored.and_then(|s| s.expected_state_cid.clone()));
        }
        expectations
    }

    /// Best-effort profile lookup. Failures are logged and swallowed.
    async fn fetch_user(&self, data: &TokenData) -> Option<UserInfo> {
        let access_token = data.access_token()?;
        match self.provider.get_user_info(access_token).await {
            Ok(user) => Some(user),
            Err(e) => {
                debug!("Skipping user info enrichment: {}", e);
                None
            }
        }
    }

    /// Check that the stored token works.
    ///
    /// # Returns
    ///
    /// `connected as <display name | username | open_id>`.
    pub async fn test_connection(&self, data: &TokenData) -> Result<String, Error> {
        let access_token = data.access_token().ok_or_else(|| {
            oauth_error(OAuthErrorKind::NotConnected, "TikTok account is not connected")
        })?;

        let user = match data.user.as_ref().filter(|u| u.label().is_some()) {
            Some(user) => user.clone(),
            None => self.provider.get_user_info(access_token).await?,
        };

        match user.label() {
            Some(label) => Ok(format!("connected as {}", label)),
            None => Err(oauth_error(
                OAuthErrorKind::InsufficientScope,
                "Token is valid but no user id is available; grant the user.info.basic scope",
            )),
        }
    }

    /// Revoke the stored access token upstream.
    pub async fn revoke(&self, data: &TokenData) -> Result<(), Error> {
        let access_token = data.access_token().ok_or_else(|| {
            oauth_error(OAuthErrorKind::NotConnected, "TikTok account is not connected")
        })?;
        self.provider.revoke_token(access_token).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::TikTokCredential;
    use crate::error::{ErrorKind, StateErrorKind};
    use crate::oauth::providers::tiktok;
    use chrono::Duration;
    use mockito::{Matcher, Server, ServerGuard};
    use secrecy::SecretString;

    const TOKEN_BODY: &str = r#"{"access_token":"act.new","expires_in":86400,"open_id":"open-1",
        "refresh_token":"rft.new","scope":"user.info.basic","token_type":"Bearer"}"#;
    const USER_BODY: &str = r#"{"data":{"user":{"open_id":"open-1","username":"creator","display_name":"Creator"}},
        "error":{"code":"ok","message":""}}"#;

    fn authenticator(server: &ServerGuard, state: StateExpectations) -> Authenticator<tiktok::Provider> {
        let credential = TikTokCredential::new(
            "client-key".to_string(),
            SecretString::from("client-secret".to_string()),
            "user.info.basic",
        )
        .with_api_base_url(&server.url());
        Authenticator::new(tiktok::Provider::new(credential).unwrap(), state)
    }

    fn state_kind(err: Error) -> StateErrorKind {
        match err.error_kind {
            ErrorKind::State(kind) => kind,
            other => panic!("expected state error, got {:?}", other),
        }
    }

    fn pending(now: DateTime<Utc>) -> (String, TokenData) {
        let payload = StatePayload::issue(Some("cid-1".to_string()), now);
        let pending = TokenData::pending(
            "https://host/callback".to_string(),
            payload.token.clone(),
            payload.cid.clone(),
        );
        (payload.encode().unwrap(), pending)
    }

    #[tokio::test]
    async fn test_missing_state_fails_before_any_request() {
        let mut server = Server::new_async().await;
        let token_mock = server
            .mock("POST", "/v2/oauth/token/")
            .expect(0)
            .create_async()
            .await;

        let auth = authenticator(&server, StateExpectations::default());
        let stored = TokenData::pending("https://host/callback".to_string(), None, None);
        let callback = CallbackData::from_query_string("?code=abc");

        let err = auth
            .authenticate(Some(&stored), &callback, Utc::now())
            .await
            .unwrap_err();

        assert_eq!(state_kind(err), StateErrorKind::Missing);
        token_mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_expired_state_fails_before_any_request() {
        let mut server = Server::new_async().await;
        let token_mock = server
            .mock("POST", "/v2/oauth/token/")
            .expect(0)
            .create_async()
            .await;

        let now = Utc::now();
        let (state, stored) = pending(now - Duration::minutes(11));
        let callback = CallbackData::from_query_string(&format!("code=abc&state={}", state));

        let err = authenticator(&server, StateExpectations::default())
            .authenticate(Some(&stored), &callback, now)
            .await
            .unwrap_err();

        assert_eq!(state_kind(err), StateErrorKind::Expired);
        token_mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_stashed_state_token_is_enforced() {
        let server = Server::new_async().await;
        let now = Utc::now();
        let (_, stored) = pending(now);
        let (forged, _) = pending(now);
        let callback = CallbackData::from_query_string(&format!("code=abc&state={}", forged));

        let err = authenticator(&server, StateExpectations::default())
            .authenticate(Some(&stored), &callback, now)
            .await
            .unwrap_err();

        assert_eq!(state_kind(err), StateErrorKind::Mismatch);
    }

    #[tokio::test]
    async fn test_code_exchange_caches_user() {
        let mut server = Server::new_async().await;
        let token_mock = server
            .mock("POST", "/v2/oauth/token/")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("grant_type".into(), "authorization_code".into()),
                Matcher::UrlEncoded("code".into(), "abc".into()),
                Matcher::UrlEncoded("redirect_uri".into(), "https://host/callback".into()),
            ]))
            .with_status(200)
            .with_body(TOKEN_BODY)
            .create_async()
            .await;
        let _user_mock = server
            .mock("GET", "/v2/user/info/")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(USER_BODY)
            .create_async()
            .await;

        let now = Utc::now();
        let (state, stored) = pending(now);
        let callback = CallbackData::from_query_string(&format!("?code=abc&state={}", state));

        let data = authenticator(&server, StateExpectations::default())
            .authenticate(Some(&stored), &callback, now)
            .await
            .unwrap();

        token_mock.assert_async().await;
        assert_eq!(data.access_token(), Some("act.new"));
        assert_eq!(data.redirect_uri.as_deref(), Some("https://host/callback"));
        assert_eq!(data.expected_state_cid.as_deref(), Some("cid-1"));
        assert_eq!(data.expires_at, Some(now + Duration::seconds(86400)));
        assert_eq!(
            data.user.as_ref().and_then(|u| u.display_name.as_deref()),
            Some("Creator")
        );
    }

    #[tokio::test]
    async fn test_user_info_failure_is_swallowed() {
        let mut server = Server::new_async().await;
        let _token_mock = server
            .mock("POST", "/v2/oauth/token/")
            .with_status(200)
            .with_body(TOKEN_BODY)
            .create_async()
            .await;
        let _user_mock = server
            .mock("GET", "/v2/user/info/")
            .match_query(Matcher::Any)
            .with_status(500)
            .create_async()
            .await;

        let stored = TokenData::pending("https://host/callback".to_string(), None, None);
        let data = authenticator(&server, StateExpectations::from_minutes(false, 10))
            .authenticate(Some(&stored), &CallbackData::from_query_string("code=abc"), Utc::now())
            .await
            .unwrap();

        assert_eq!(data.access_token(), Some("act.new"));
        assert!(data.user.is_none());
    }

    #[tokio::test]
    async fn test_missing_code_and_redirect_uri() {
        let server = Server::new_async().await;
        let auth = authenticator(&server, StateExpectations::from_minutes(false, 10));

        let stored = TokenData::pending("https://host/callback".to_string(), None, None);
        let err = auth
            .authenticate(Some(&stored), &CallbackData::default(), Utc::now())
            .await
            .unwrap_err();
        assert_eq!(err.error_kind, ErrorKind::OAuth(OAuthErrorKind::MissingCode));

        let err = auth
            .authenticate(None, &CallbackData::from_query_string("code=abc"), Utc::now())
            .await
            .unwrap_err();
        assert_eq!(err.error_kind, ErrorKind::OAuth(OAuthErrorKind::MissingRedirectUri));
    }

    #[tokio::test]
    async fn test_refresh_wins_over_callback_code() {
        let mut server = Server::new_async().await;
        let refresh_mock = server
            .mock("POST", "/v2/oauth/token/")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("grant_type".into(), "refresh_token".into()),
                Matcher::UrlEncoded("refresh_token".into(), "abc".into()),
            ]))
            .with_status(200)
            .with_body(r#"{"access_token":"X","expires_in":3600}"#)
            .expect(1)
            .create_async()
            .await;

        let stored = TokenData {
            refresh_token: Some("abc".to_string()),
            user: Some(UserInfo {
                open_id: Some("open-1".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let callback = CallbackData::from_query_string("code=ignored");

        let data = authenticator(&server, StateExpectations::default())
            .authenticate(Some(&stored), &callback, Utc::now())
            .await
            .unwrap();

        refresh_mock.assert_async().await;
        assert_eq!(data.access_token.as_deref(), Some("X"));
        assert_eq!(data.refresh_token.as_deref(), Some("abc"));
        assert_eq!(data.token_type, "Bearer");
        assert_eq!(data.user, stored.user);
    }

    #[tokio::test]
    async fn test_refresh_failure_propagates() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/v2/oauth/token/")
            .with_status(400)
            .with_body(r#"{"error":"invalid_grant"}"#)
            .expect(1)
            .create_async()
            .await;

        let stored = TokenData {
            refresh_token: Some("abc".to_string()),
            ..Default::default()
        };
        let err = authenticator(&server, StateExpectations::default())
            .authenticate(Some(&stored), &CallbackData::default(), Utc::now())
            .await
            .unwrap_err();

        assert_eq!(err.error_kind, ErrorKind::OAuth(OAuthErrorKind::TokenRefreshFailed));
    }

    #[tokio::test]
    async fn test_connection_reports_label() {
        let mut server = Server::new_async().await;
        let _user_mock = server
            .mock("GET", "/v2/user/info/")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(USER_BODY)
            .create_async()
            .await;

        let auth = authenticator(&server, StateExpectations::default());
        let data = TokenData {
            access_token: Some("act.1".to_string()),
            ..Default::default()
        };

        assert_eq!(auth.test_connection(&data).await.unwrap(), "connected as Creator");
    }

    #[tokio::test]
    async fn test_connection_errors() {
        let mut server = Server::new_async().await;
        let _user_mock = server
            .mock("GET", "/v2/user/info/")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"data":{"user":{}},"error":{"code":"ok"}}"#)
            .create_async()
            .await;
        let auth = authenticator(&server, StateExpectations::default());

        let err = auth.test_connection(&TokenData::default()).await.unwrap_err();
        assert_eq!(err.error_kind, ErrorKind::OAuth(OAuthErrorKind::NotConnected));

        let data = TokenData {
            access_token: Some("act.1".to_string()),
            ..Default::default()
        };
        let err = auth.test_connection(&data).await.unwrap_err();
        assert_eq!(err.error_kind, ErrorKind::OAuth(OAuthErrorKind::InsufficientScope));
    }

    #[test]
    fn test_begin_stashes_pending_state() {
        let server_url = "http://localhost:1";
        let credential = TikTokCredential::new(
            "client-key".to_string(),
            SecretString::from("client-secret".to_string()),
            "user.info.basic",
        )
        .with_api_base_url(server_url);
        let auth = Authenticator::new(
            tiktok::Provider::new(credential).unwrap(),
            StateExpectations::default(),
        );

        let now = Utc::now();
        let (request, pending) = auth
            .begin("https://host/callback", Some("cid-1".to_string()), now)
            .unwrap();

        let payload = StatePayload::decode(&request.state).unwrap();
        assert_eq!(payload.token, pending.expected_state_token);
        assert_eq!(pending.expected_state_cid.as_deref(), Some("cid-1"));
        assert_eq!(pending.redirect_uri.as_deref(), Some("https://host/callback"));
        assert!(pending.access_token().is_none());
        assert!(request.url.contains("state="));
    }
}
