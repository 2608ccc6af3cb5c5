//! Token acquisition policy
//!
//! Every call to [`TokenManager::get_token`] runs the same two steps:
//! - refresh with the saved refresh token
//! - if that fails for any reason, ask the user for an authorization code
//!   and exchange it
//!
//! There is no loop and no backoff. A failure of the second step is
//! returned to the caller.

use common::Config;
use tracing::{debug, info, warn};

use crate::client::AuthClient;
use crate::error::Result;
use crate::flow::{CodePrompt, TerminalPrompt};
use crate::storage::{TokenKind, TokenStore};
use crate::tokens::TokenPair;

/// Hands out usable access tokens, persisting whatever it obtains
pub struct TokenManager<P = TerminalPrompt> {
    client: AuthClient,
    store: TokenStore,
    prompt: P,
}

impl<P: CodePrompt> TokenManager<P> {
    /// Creates a manager from the runtime configuration
    pub fn new(config: &Config, prompt: P) -> Result<Self> {
        Ok(Self::with_parts(
            AuthClient::new(config)?,
            TokenStore::new(&config.token_dir),
            prompt,
        ))
    }

    pub fn with_parts(client: AuthClient, store: TokenStore, prompt: P) -> Self {
        Self {
            client,
            store,
            prompt,
        }
    }

    pub fn client(&self) -> &AuthClient {
        &self.client
    }

    pub fn store(&self) -> &TokenStore {
        &self.store
    }

    pub fn prompt(&self) -> &P {
        &self.prompt
    }

    /// Returns an access token, refreshing first and authorizing interactively if that fails
    pub async fn get_token(&self) -> Result<String> {
        let pair = match self.try_refresh().await {
            Ok(pair) => pair,
            Err(e) if e.is_not_found() => {
                info!("No saved refresh token; starting interactive authorization");
                return self.authorize().await;
            }
            Err(e) => {
                match e.oauth_error() {
                    Some(reason) => warn!("Refresh failed ({}); generating new access token", reason),
                    None => warn!("Refresh failed ({}); generating new access token", e),
                }
                return self.authorize().await;
            }
        };

        self.persist(&pair)?;
        info!("Access token refreshed and saved");
        Ok(pair.access_token)
    }

    /// Refreshes with the saved refresh token, without falling back
    pub async fn refresh(&self) -> Result<String> {
        let pair = self.try_refresh().await?;
        self.persist(&pair)?;
        info!("Access token refreshed and saved");
        Ok(pair.access_token)
    }

    /// Runs the interactive authorization code grant
    pub async fn authorize(&self) -> Result<String> {
        let code = self
            .prompt
            .request_code(&self.client.authorization_url())
            .await?;

        let pair = self.client.exchange_authorization_code(&code).await?;
        self.persist(&pair)?;
        info!("Access and refresh tokens saved");
        Ok(pair.access_token)
    }

    async fn try_refresh(&self) -> Result<TokenPair> {
        let refresh_token = self.store.load(TokenKind::Refresh)?;
        self.client.exchange_refresh_token(&refresh_token).await
    }

    /// Saves the refresh token (when the server sent one), then the access token
    ///
    /// If the second save fails, the store keeps the new refresh token and
    /// the previous access token.
    fn persist(&self, pair: &TokenPair) -> Result<()> {
        match &pair.refresh_token {
            Some(refresh_token) => self.store.save(TokenKind::Refresh, refresh_token)?,
            // Not rotated: the saved refresh token is still the valid one
            None => debug!("No refresh token in response, keeping the saved one"),
        }

        self.store.save(TokenKind::Access, &pair.access_token)
    }
}
