//! OAuth 2.0 token lifecycle for SAS Viya
//!
//! Obtains, persists and refreshes an access/refresh token pair against
//! SAS Logon. [`TokenManager::get_token`] is the single entry point: it
//! refreshes with the saved refresh token and falls back to the interactive
//! authorization code grant when that fails.

pub mod client;
pub mod constants;
pub mod error;
pub mod flow;
pub mod manager;
pub mod storage;
pub mod tokens;

pub use client::{AuthClient, ClientCredentials};
pub use error::{AuthError, Result};
pub use flow::{authorization_url, CodePrompt, TerminalPrompt};
pub use manager::TokenManager;
pub use storage::{TokenKind, TokenStore};
pub use tokens::TokenPair;
