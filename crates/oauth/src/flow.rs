//! Interactive part of the authorization code flow
//!
//! The user opens the authorization URL in a browser, signs in, and pastes
//! the short code SAS Logon shows back into the terminal:
//! 1. Build the authorization URL
//! 2. Show it (and optionally open the browser)
//! 3. Read one line from stdin

use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, warn};

use crate::constants::AUTHORIZE_PATH;
use crate::error::{AuthError, Result};

/// Builds `{base}/SASLogon/oauth/authorize?client_id=...&response_type=code`
pub fn authorization_url(base_url: &str, client_id: &str) -> String {
    format!(
        "{}{}?client_id={}&response_type=code",
        base_url.trim_end_matches('/'),
        AUTHORIZE_PATH,
        urlencoding::encode(client_id),
    )
}

/// Source of authorization codes
///
/// The code is handed to the token endpoint unchecked; a malformed code
/// shows up as an HTTP or protocol error from the exchange.
#[async_trait]
pub trait CodePrompt: Send + Sync {
    async fn request_code(&self, authorization_url: &str) -> Result<String>;
}

/// Prompts on the terminal and reads the code from stdin
#[derive(Debug, Clone, Default)]
pub struct TerminalPrompt {
    open_browser: bool,
}

impl TerminalPrompt {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also try to open the authorization URL in the default browser
    pub fn with_browser(mut self, open_browser: bool) -> Self {
        self.open_browser = open_browser;
        self
    }
}

#[async_trait]
impl CodePrompt for TerminalPrompt {
    async fn request_code(&self, authorization_url: &str) -> Result<String> {
        // stdout is reserved for the token itself
        let mut stderr = tokio::io::stderr();
        let instructions = format!(
            "* Open in a private browser window: {}\n\
             * Sign in with your SAS credentials, check all boxes, and copy the resulting short code.\n\
             Paste the authorization code: ",
            authorization_url
        );
        stderr
            .write_all(instructions.as_bytes())
            .await
            .map_err(|e| AuthError::Prompt(e.to_string()))?;
        stderr
            .flush()
            .await
            .map_err(|e| AuthError::Prompt(e.to_string()))?;

        if self.open_browser {
            if let Err(e) = open::that(authorization_url) {
                warn!("Could not open browser: {}", e);
            }
        }

        read_code(BufReader::new(tokio::io::stdin())).await
    }
}

/// Reads a single line and returns it trimmed
async fn read_code<R: AsyncBufRead + Unpin>(mut reader: R) -> Result<String> {
    let mut line = String::new();
    let read = reader
        .read_line(&mut line)
        .await
        .map_err(|e| AuthError::Prompt(e.to_string()))?;

    if read == 0 {
        return Err(AuthError::Prompt(
            "input closed before an authorization code was entered".into(),
        ));
    }

    let code = line.trim();
    if code.is_empty() {
        return Err(AuthError::Prompt("no authorization code entered".into()));
    }

    debug!("Read authorization code ({} chars)", code.len());
    Ok(code.to_string())
}
