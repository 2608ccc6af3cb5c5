use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::platform;

pub const DEFAULT_CLIENT_ID: &str = "api.client";
pub const DEFAULT_CLIENT_SECRET: &str = "api.secret";
pub const DEFAULT_BASE_URL: &str = "https://create.demo.sas.com";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Runtime configuration, built once at startup and passed around by reference.
///
/// Every key is optional in the TOML file; missing keys take the defaults.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub client_id: String,
    pub client_secret: String,
    /// Base URL of the SAS Viya deployment, without a trailing slash
    pub base_url: String,
    /// PEM bundle added to the trusted roots
    pub ca_bundle: Option<PathBuf>,
    /// Disables certificate verification. Only for demo environments.
    pub insecure_skip_tls_verify: bool,
    /// 0 disables the timeout
    pub request_timeout_secs: u64,
    pub token_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            client_id: DEFAULT_CLIENT_ID.to_string(),
            client_secret: DEFAULT_CLIENT_SECRET.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            ca_bundle: None,
            insecure_skip_tls_verify: false,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            token_dir: platform::default_token_dir(),
        }
    }
}

// Keep the client secret out of logs and panic messages
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("ca_bundle", &self.ca_bundle)
            .field("insecure_skip_tls_verify", &self.insecure_skip_tls_verify)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("token_dir", &self.token_dir)
            .finish()
    }
}

impl Config {
    /// Loads configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Loads configuration from a TOML file, or returns the defaults if it does not exist
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!("No config file at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        debug!("Loading config from {:?}", path);
        Self::load(path)
    }

    /// Checks required fields and normalizes the base URL
    pub fn validate(mut self) -> Result<Self, ConfigError> {
        if self.client_id.trim().is_empty() {
            return Err(ConfigError::Invalid("client_id must not be empty".into()));
        }

        let base_url = self.base_url.trim().trim_end_matches('/');
        if base_url.is_empty() {
            return Err(ConfigError::Invalid("base_url must not be empty".into()));
        }
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ConfigError::Invalid(format!(
                "base_url must start with http:// or https://, got {}",
                base_url
            )));
        }
        self.base_url = base_url.to_string();

        Ok(self)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        match self.request_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    /// Returns a copy that is safe to print
    pub fn redacted(&self) -> Self {
        Self {
            client_secret: "<redacted>".to_string(),
            ..self.clone()
        }
    }
}
