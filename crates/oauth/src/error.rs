//! Error taxonomy for token acquisition

use std::path::PathBuf;
use thiserror::Error;

use crate::storage::TokenKind;
use crate::tokens::OAuthErrorBody;

pub type Result<T> = std::result::Result<T, AuthError>;

#[derive(Debug, Error)]
pub enum AuthError {
    /// Local persistence failed (permissions, disk full, invalid path)
    #[error("failed to access {}: {source}", .path.display())]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No token of this kind has been saved yet
    #[error("no saved {kind} found")]
    NotFound { kind: TokenKind },

    /// Network, TLS or timeout failure talking to the token endpoint
    #[error("request to token endpoint failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Token endpoint answered with a non-2xx status
    #[error("token endpoint returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// Token endpoint answered 2xx with a body we cannot use
    #[error("unusable token response: {0}")]
    Protocol(String),

    #[error("could not read authorization code: {0}")]
    Prompt(String),

    #[error("invalid client configuration: {0}")]
    Config(String),
}

impl AuthError {
    /// True when the error only means no token was saved yet
    pub fn is_not_found(&self) -> bool {
        matches!(self, AuthError::NotFound { .. })
    }

    /// Returns the OAuth `error` code (and description) of an HTTP error body, if it has one
    pub fn oauth_error(&self) -> Option<String> {
        let AuthError::Http { body, .. } = self else {
            return None;
        };

        let parsed: OAuthErrorBody = serde_json::from_str(body).ok()?;
        Some(match parsed.error_description {
            Some(description) if !description.is_empty() => {
                format!("{} - {}", parsed.error, description)
            }
            _ => parsed.error,
        })
    }
}
