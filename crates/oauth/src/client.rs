//! Token endpoint client
//!
//! Both grants go to the same endpoint with the same request shape:
//! `POST {base}/SASLogon/oauth/token`, HTTP Basic client authentication and
//! a form-encoded body. Failures are returned as-is; retrying is the
//! caller's business.

use base64::{engine::general_purpose::STANDARD, Engine};
use common::Config;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use std::fmt;
use tracing::{debug, info, warn};

use crate::constants::{GRANT_AUTHORIZATION_CODE, GRANT_REFRESH_TOKEN, TOKEN_PATH};
use crate::error::{AuthError, Result};
use crate::flow::authorization_url;
use crate::tokens::{parse_token_response, Grant, TokenPair};

/// OAuth client id and secret
#[derive(Clone)]
pub struct ClientCredentials {
    client_id: String,
    client_secret: String,
}

impl ClientCredentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.client_id, &config.client_secret)
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Value of the `Authorization` header: `Basic base64(client_id:client_secret)`
    pub fn basic_auth_header(&self) -> String {
        let raw = format!("{}:{}", self.client_id, self.client_secret);
        format!("Basic {}", STANDARD.encode(raw))
    }
}

impl fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

/// Talks to the SAS Logon token endpoint
#[derive(Debug, Clone)]
pub struct AuthClient {
    http: reqwest::Client,
    credentials: ClientCredentials,
    base_url: String,
    token_url: String,
}

impl AuthClient {
    /// Builds a client for the deployment described by `config`
    pub fn new(config: &Config) -> Result<Self> {
        let base_url = config.base_url.trim_end_matches('/').to_string();

        Ok(Self {
            http: build_http_client(config)?,
            credentials: ClientCredentials::from_config(config),
            token_url: format!("{}{}", base_url, TOKEN_PATH),
            base_url,
        })
    }

    pub fn credentials(&self) -> &ClientCredentials {
        &self.credentials
    }

    pub fn token_url(&self) -> &str {
        &self.token_url
    }

    /// URL the user opens to obtain an authorization code
    pub fn authorization_url(&self) -> String {
        authorization_url(&self.base_url, self.credentials.client_id())
    }

    /// Exchanges an authorization code for an access and refresh token
    pub async fn exchange_authorization_code(&self, code: &str) -> Result<TokenPair> {
        info!("Exchanging authorization code for tokens");

        let body = self
            .post_grant(&[("grant_type", GRANT_AUTHORIZATION_CODE), ("code", code)])
            .await?;

        parse_token_response(&body, Grant::AuthorizationCode)
    }

    /// Exchanges a refresh token for a new access token
    ///
    /// The server does not always rotate the refresh token. When the
    /// response carries none, `refresh_token` is `None` and the caller
    /// should keep using the one it has.
    pub async fn exchange_refresh_token(&self, refresh_token: &str) -> Result<TokenPair> {
        info!("Refreshing access token");

        let body = self
            .post_grant(&[
                ("grant_type", GRANT_REFRESH_TOKEN),
                ("refresh_token", refresh_token),
            ])
            .await?;

        parse_token_response(&body, Grant::RefreshToken)
    }

    /// Posts a form to the token endpoint and returns the body of a 2xx response
    async fn post_grant(&self, form: &[(&str, &str)]) -> Result<String> {
        debug!("POST {}", self.token_url);

        let response = self
            .http
            .post(&self.token_url)
            .header(AUTHORIZATION, self.credentials.basic_auth_header())
            .header(ACCEPT, "application/json")
            .form(form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(AuthError::Http {
                status: status.as_u16(),
                body,
            });
        }

        Ok(body)
    }
}

fn build_http_client(config: &Config) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder();

    if let Some(timeout) = config.request_timeout() {
        builder = builder.timeout(timeout);
    }

    if let Some(path) = &config.ca_bundle {
        let pem = std::fs::read(path).map_err(|e| {
            AuthError::Config(format!("failed to read CA bundle {}: {}", path.display(), e))
        })?;
        let certs = reqwest::Certificate::from_pem_bundle(&pem).map_err(|e| {
            AuthError::Config(format!("invalid CA bundle {}: {}", path.display(), e))
        })?;
        if certs.is_empty() {
            return Err(AuthError::Config(format!(
                "CA bundle {} contains no certificates",
                path.display()
            )));
        }

        debug!("Trusting {} certificate(s) from {:?}", certs.len(), path);
        for cert in certs {
            builder = builder.add_root_certificate(cert);
        }
    }

    if config.insecure_skip_tls_verify {
        warn!("TLS certificate verification is disabled; only use this against demo servers");
        builder = builder.danger_accept_invalid_certs(true);
    }

    builder
        .build()
        .map_err(|e| AuthError::Config(format!("failed to build HTTP client: {}", e)))
}
