//! Host-side wiring of the credential and the dispatcher.
//!
//! A [`Connector`] owns the configuration, the token store and the HTTP client, and
//! runs one command at a time: kick off an authorization, complete it from a callback,
//! refresh, test, execute a batch, or disconnect.

use chrono::Utc;
use log::*;

use tiktok_auth::error::{oauth_error, OAuthErrorKind};
use tiktok_auth::http::HttpClient;
use tiktok_auth::oauth::providers::tiktok;
use tiktok_auth::oauth::token::{Storage, TokenData};
use tiktok_auth::oauth::{AuthorizationRequest, Authenticator, CallbackData};
use tiktok_node::{Dispatcher, ExecutionMode, Item, Operation, OutputRecord, Resource, TikTokClient};

use crate::config::Config;
use crate::error::Error;
use crate::token_store::FileStorage;

pub struct Connector<S: Storage> {
    config: Config,
    storage: S,
    http_client: HttpClient,
}

impl Connector<FileStorage> {
    /// Connector over the configured encrypted token file.
    pub fn from_config(config: Config) -> Result<Self, Error> {
        let storage = config.token_store()?;
        let http_client = config.http_client()?;
        Ok(Self::new(config, storage, http_client))
    }
}

impl<S: Storage> Connector<S> {
    pub fn new(config: Config, storage: S, http_client: HttpClient) -> Self {
        Self {
            config,
            storage,
            http_client,
        }
    }

    fn authenticator(&self) -> Result<Authenticator<tiktok::Provider>, Error> {
        let credential = self.config.credential()?;
        let state = credential.state.clone();
        let provider = tiktok::Provider::with_client(credential, self.http_client.clone());
        Ok(Authenticator::new(provider, state))
    }

    async fn stored(&self) -> Result<Option<TokenData>, Error> {
        Ok(self.storage.get(self.config.credential_id()).await?)
    }

    async fn connected(&self) -> Result<TokenData, Error> {
        self.stored()
            .await?
            .filter(|data| data.access_token().is_some())
            .ok_or_else(|| {
                oauth_error(
                    OAuthErrorKind::NotConnected,
                    "TikTok account is not connected; run authorize first",
                )
                .into()
            })
    }

    async fn save(&self, data: &TokenData) -> Result<(), Error> {
        Ok(self.storage.store(self.config.credential_id(), data).await?)
    }

    /// Storage key of the kickoff record awaiting its callback.
    fn pending_id(&self) -> String {
        format!("{}:pending", self.config.credential_id())
    }

    /// Issue an authorization URL and persist the pending record it must come back to.
    ///
    /// The pending record is kept apart from the connected token data, which stays
    /// usable until the callback completes.
    pub async fn authorize(
        &self,
        redirect_uri: &str,
        cid: Option<String>,
    ) -> Result<AuthorizationRequest, Error> {
        let (request, pending) = self.authenticator()?.begin(redirect_uri, cid, Utc::now())?;
        self.storage.store(&self.pending_id(), &pending).await?;
        info!(
            "Stored pending authorization for credential {}",
            self.config.credential_id()
        );
        Ok(request)
    }

    /// Complete an authorization from the redirect's callback data.
    ///
    /// Runs against the pending kickoff record when there is one. Stored token data is
    /// only replaced once the exchange succeeds.
    pub async fn callback(&self, callback: &CallbackData) -> Result<TokenData, Error> {
        let pending_id = self.pending_id();
        let basis = match self.storage.get(&pending_id).await? {
            Some(pending) => Some(pending),
            None => self.stored().await?,
        };

        let data = self
            .authenticator()?
            .authenticate(basis.as_ref(), callback, Utc::now())
            .await?;
        self.save(&data).await?;
        self.storage.delete(&pending_id).await?;
        Ok(data)
    }

    pub async fn refresh(&self) -> Result<TokenData, Error> {
        let stored = self
            .stored()
            .await?
            .filter(|data| data.refresh_token().is_some())
            .ok_or_else(|| {
                Error::from(oauth_error(
                    OAuthErrorKind::NotConnected,
                    "No refresh token stored; run authorize first",
                ))
            })?;

        let data = self
            .authenticator()?
            .authenticate(Some(&stored), &CallbackData::default(), Utc::now())
            .await?;
        self.save(&data).await?;
        Ok(data)
    }

    pub async fn test_connection(&self) -> Result<String, Error> {
        let data = self.connected().await?;
        Ok(self.authenticator()?.test_connection(&data).await?)
    }

    /// Run a batch against the stored account, refreshing an expired token first.
    pub async fn execute(
        &self,
        resource: Resource,
        operation: Operation,
        items: &[Item],
        mode: ExecutionMode,
    ) -> Result<Vec<OutputRecord>, Error> {
        let mut data = self.connected().await?;
        if data.is_expired() && data.refresh_token().is_some() {
            info!("Access token expired, refreshing before execution");
            data = self.refresh().await?;
        }

        let client = TikTokClient::with_client(
            self.http_client.clone(),
            self.config.api_base_url(),
            &data,
        )?;
        Ok(Dispatcher::new()
            .execute(&client, resource, operation, items, mode)
            .await?)
    }

    /// Revoke the token upstream and forget it locally.
    ///
    /// The local record is deleted even when revocation fails.
    pub async fn disconnect(&self) -> Result<(), Error> {
        if let Some(data) = self.stored().await?.filter(|d| d.access_token().is_some()) {
            if let Err(e) = self.authenticator()?.revoke(&data).await {
                warn!("Token revocation failed: {}", e);
            }
        }
        self.storage.delete(self.config.credential_id()).await?;
        self.storage.delete(&self.pending_id()).await?;
        info!("Disconnected credential {}", self.config.credential_id());
        Ok(())
    }
}
