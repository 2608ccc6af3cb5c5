//! Token types and token endpoint response parsing

use serde::Deserialize;
use std::fmt;

use crate::error::{AuthError, Result};

/// Token pair returned by the token endpoint
#[derive(Clone, PartialEq, Eq)]
pub struct TokenPair {
    /// Opaque bearer token for the analytics service
    pub access_token: String,

    /// Present on every authorization code exchange; refresh responses may omit it
    pub refresh_token: Option<String>,
}

impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &"<redacted>")
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

/// Which grant produced a response, since they differ in what is mandatory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Grant {
    AuthorizationCode,
    RefreshToken,
}

/// Response from the SAS Logon token endpoint
///
/// `token_type`, `expires_in`, `scope` and friends are ignored.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
}

/// Error response from the token endpoint (RFC 6749 section 5.2)
#[derive(Debug, Deserialize)]
pub(crate) struct OAuthErrorBody {
    pub error: String,
    #[serde(default)]
    pub error_description: Option<String>,
}

/// Parses a successful token endpoint body into a [`TokenPair`]
pub(crate) fn parse_token_response(body: &str, grant: Grant) -> Result<TokenPair> {
    let response: TokenResponse = serde_json::from_str(body)
        .map_err(|e| AuthError::Protocol(format!("invalid JSON: {}", e)))?;

    let access_token = response
        .access_token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AuthError::Protocol("response has no access_token".into()))?;

    let refresh_token = response.refresh_token.filter(|t| !t.is_empty());
    if grant == Grant::AuthorizationCode && refresh_token.is_none() {
        return Err(AuthError::Protocol(
            "authorization code response has no refresh_token".into(),
        ));
    }

    Ok(TokenPair {
        access_token,
        refresh_token,
    })
}
