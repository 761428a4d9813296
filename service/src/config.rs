use clap::builder::TypedValueParser as _;
use clap::{ArgAction, Args};
use log::LevelFilter;
use secrecy::SecretString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tiktok_auth::credentials::{
    StateExpectations, TikTokCredential, DEFAULT_API_BASE_URL, DEFAULT_AUTH_URL, DEFAULT_SCOPE,
    DEFAULT_STATE_MAX_AGE_MINUTES,
};
use tiktok_auth::http::{HttpClient, HttpClientBuilder};

use crate::error::Error;
use crate::token_store::FileStorage;

/// Default location of the encrypted token store.
pub const DEFAULT_TOKEN_STORE_PATH: &str = ".tiktok/tokens.json";

#[derive(Clone, Debug, Args)]
pub struct Config {
    /// The TikTok app's client key.
    #[arg(long, env)]
    tiktok_client_key: Option<String>,

    /// The TikTok app's client secret.
    #[arg(long, env, hide_env_values = true)]
    tiktok_client_secret: Option<String>,

    /// Comma-separated OAuth scopes requested at authorization time.
    #[arg(long, env, default_value = DEFAULT_SCOPE)]
    tiktok_scope: String,

    /// Reject OAuth callbacks that carry no `state` parameter.
    #[arg(long, env, default_value_t = true, action = ArgAction::Set)]
    pub state_required: bool,

    /// Maximum age in minutes of a callback `state`. Zero or less disables the check.
    #[arg(long, env, default_value_t = DEFAULT_STATE_MAX_AGE_MINUTES)]
    pub state_max_age_minutes: i64,

    /// Expected `token` inside the callback state. Overrides the value issued by `authorize`.
    #[arg(long, env)]
    expected_state_token: Option<String>,

    /// Expected `cid` inside the callback state. Overrides the value issued by `authorize`.
    #[arg(long, env)]
    expected_state_cid: Option<String>,

    /// The TikTok authorization page URL.
    #[arg(long, env, default_value = DEFAULT_AUTH_URL)]
    tiktok_auth_url: String,

    /// The TikTok API base URL. Override in tests to point at a mock server.
    #[arg(long, env, default_value = DEFAULT_API_BASE_URL)]
    tiktok_api_base_url: String,

    /// Path of the encrypted token store file.
    #[arg(long, env, default_value = DEFAULT_TOKEN_STORE_PATH)]
    token_store_path: PathBuf,

    /// Hex-encoded 32-byte key used to encrypt stored token data.
    #[arg(long, env, hide_env_values = true)]
    token_encryption_key: Option<String>,

    /// Key under which token data is stored.
    #[arg(long, env, default_value = "default")]
    credential_id: String,

    /// Request timeout of the HTTP transport, in seconds.
    #[arg(long, env, default_value_t = 30)]
    pub http_timeout_secs: u64,

    /// Transient-failure retries of the HTTP transport. Zero disables retries.
    #[arg(long, env, default_value_t = 0)]
    pub http_max_retries: u32,

    /// Set the log level verbosity threshold (level) to control what gets displayed on console output
    #[arg(
        short,
        long,
        env,
        default_value_t = LevelFilter::Info,
        value_parser = clap::builder::PossibleValuesParser::new(["OFF", "ERROR", "WARN", "INFO", "DEBUG", "TRACE"])
            .map(|s| s.parse::<LevelFilter>().unwrap()),
        )]
    pub log_level_filter: LevelFilter,
}

impl Config {
    /// Build the TikTok credential from the configured client and state settings.
    pub fn credential(&self) -> Result<TikTokCredential, Error> {
        let client_key = self
            .tiktok_client_key
            .clone()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| Error::Config("TIKTOK_CLIENT_KEY is not set".to_string()))?;
        let client_secret = self
            .tiktok_client_secret
            .clone()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| Error::Config("TIKTOK_CLIENT_SECRET is not set".to_string()))?;

        if self.state_max_age_minutes > 0
            && chrono::Duration::try_minutes(self.state_max_age_minutes).is_none()
        {
            return Err(Error::Config(format!(
                "STATE_MAX_AGE_MINUTES is out of range: {}",
                self.state_max_age_minutes
            )));
        }

        let state = StateExpectations::from_minutes(self.state_required, self.state_max_age_minutes)
            .with_expected_token(self.expected_state_token.clone())
            .with_expected_cid(self.expected_state_cid.clone());

        Ok(
            TikTokCredential::new(client_key, SecretString::from(client_secret), &self.tiktok_scope)
                .with_state(state)
                .with_auth_url(self.tiktok_auth_url.clone())
                .with_api_base_url(&self.tiktok_api_base_url),
        )
    }

    pub fn http_client(&self) -> Result<HttpClient, Error> {
        Ok(HttpClientBuilder::new()
            .with_timeout(Duration::from_secs(self.http_timeout_secs))
            .with_max_retries(self.http_max_retries)
            .build()
            .map_err(tiktok_auth::Error::from)?)
    }

    pub fn token_store(&self) -> Result<FileStorage, Error> {
        let key = self
            .token_encryption_key
            .clone()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| Error::Config("TOKEN_ENCRYPTION_KEY is not set".to_string()))?;
        Ok(FileStorage::new(self.token_store_path.clone(), key))
    }

    pub fn api_base_url(&self) -> &str {
        &self.tiktok_api_base_url
    }

    pub fn token_store_path(&self) -> &Path {
        &self.token_store_path
    }

    pub fn credential_id(&self) -> &str {
        &self.credential_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        config: Config,
    }

    fn parse(args: &[&str]) -> Config {
        let mut argv = vec!["test"];
        argv.extend_from_slice(args);
        TestCli::try_parse_from(argv).unwrap().config
    }

    #[test]
    fn test_credential_from_flags() {
        let config = parse(&[
            "--tiktok-client-key",
            "ck",
            "--tiktok-client-secret",
            "cs",
            "--tiktok-scope",
            "user.info.basic,video.publish",
            "--state-required",
            "false",
            "--state-max-age-minutes",
            "5",
            "--expected-state-cid",
            "cid-1",
            "--tiktok-api-base-url",
            "http://localhost:9999/",
        ]);

        let credential = config.credential().unwrap();
        assert_eq!(credential.client_key(), "ck");
        assert_eq!(credential.scope(), "user.info.basic,video.publish");
        assert!(!credential.state.required);
        assert_eq!(credential.state.max_age, Some(chrono::Duration::minutes(5)));
        assert_eq!(credential.state.expected_cid.as_deref(), Some("cid-1"));
        assert_eq!(credential.oauth2.access_token_url, "http://localhost:9999/v2/oauth/token/");
    }

    #[test]
    fn test_missing_secrets_are_config_errors() {
        let config = parse(&["--tiktok-client-key", "ck"]);
        assert!(matches!(config.credential(), Err(Error::Config(_))));
        assert!(matches!(config.token_store(), Err(Error::Config(_))));
    }

    #[test]
    fn test_out_of_range_state_max_age_is_config_error() {
        let max = i64::MAX.to_string();
        let config = parse(&[
            "--tiktok-client-key",
            "ck",
            "--tiktok-client-secret",
            "cs",
            "--state-max-age-minutes",
            max.as_str(),
        ]);
        assert!(matches!(config.credential(), Err(Error::Config(_))));
    }

    #[test]
    fn test_log_level_parsing() {
        let config = parse(&["--log-level-filter", "DEBUG"]);
        assert_eq!(config.log_level_filter, LevelFilter::Debug);
    }
}
