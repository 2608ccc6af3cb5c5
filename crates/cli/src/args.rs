//! Command-line arguments and configuration layering

use anyhow::{Context, Result};
use clap::builder::BoolishValueParser;
use clap::{ArgAction, Parser, Subcommand};
use common::{Config, platform};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Obtain and refresh SAS Viya OAuth tokens
#[derive(Debug, Parser)]
#[command(name = "viya-token", version, about)]
pub struct Cli {
    /// Config file (TOML). Defaults to the platform config directory.
    #[arg(long, global = true, env = "VIYA_TOKEN_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory holding access_token.txt and refresh_token.txt
    #[arg(long, global = true, env = "SAS_TOKEN_DIR")]
    pub token_dir: Option<PathBuf>,

    /// Base URL of the SAS Viya deployment
    #[arg(long, global = true, env = "SAS_BASE_URL")]
    pub base_url: Option<String>,

    #[arg(long, global = true, env = "SAS_CLIENT_ID")]
    pub client_id: Option<String>,

    #[arg(long, global = true, env = "SAS_CLIENT_SECRET", hide_env_values = true)]
    pub client_secret: Option<String>,

    /// PEM bundle of additional trusted root certificates
    #[arg(long, global = true, env = "SAS_CERT_PATH")]
    pub ca_bundle: Option<PathBuf>,

    /// Skip TLS certificate verification (demo servers only)
    #[arg(
        long,
        global = true,
        env = "SAS_INSECURE_SKIP_TLS_VERIFY",
        action = ArgAction::SetTrue,
        value_parser = BoolishValueParser::new()
    )]
    pub insecure: bool,

    /// Request timeout in seconds, 0 for none
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Open the authorization URL in the default browser
    #[arg(long, global = true)]
    pub open_browser: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Print a usable access token, refreshing or logging in as needed
    #[default]
    Token,
    /// Log in interactively, even if a refresh token is saved
    Login,
    /// Refresh with the saved refresh token, never prompting
    Refresh,
    /// Print the authorization URL
    Url,
    /// Print the effective configuration
    ShowConfig,
}

/// Loads variables from a `.env` file without overriding ones already set
///
/// With no path, `.env` is looked up from the working directory upwards. A
/// missing file is not an error; anything else is returned for the caller
/// to report once logging is up.
pub fn load_env_file(path: Option<&Path>) -> Option<dotenvy::Error> {
    let result = match path {
        Some(path) => dotenvy::from_path(path),
        None => dotenvy::dotenv().map(|_| ()),
    };

    match result {
        Ok(()) => None,
        Err(e) if e.not_found() => None,
        Err(e) => Some(e),
    }
}

impl Cli {
    /// Builds the runtime configuration: defaults, then config file, then flags/env
    pub fn resolve_config(&self) -> Result<Config> {
        let config = match &self.config {
            // An explicitly named file must exist
            Some(path) => Config::load(path)?,
            None => match platform::get_config_path() {
                Some(path) => Config::load_or_default(&path)?,
                None => Config::default(),
            },
        };

        let config = self
            .apply_overrides(config)
            .validate()
            .context("invalid configuration")?;
        debug!("Effective configuration: {:?}", config);
        Ok(config)
    }

    fn apply_overrides(&self, mut config: Config) -> Config {
        if let Some(dir) = &self.token_dir {
            config.token_dir = dir.clone();
        }
        if let Some(url) = &self.base_url {
            config.base_url = url.clone();
        }
        if let Some(id) = &self.client_id {
            config.client_id = id.clone();
        }
        if let Some(secret) = &self.client_secret {
            config.client_secret = secret.clone();
        }
        if let Some(bundle) = &self.ca_bundle {
            config.ca_bundle = Some(bundle.clone());
        }
        if self.insecure {
            config.insecure_skip_tls_verify = true;
        }
        if let Some(secs) = self.timeout {
            config.request_timeout_secs = secs;
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Mutex, MutexGuard};
    use tempfile::TempDir;

    const ENV_VARS: &[&str] = &[
        "VIYA_TOKEN_CONFIG",
        "SAS_TOKEN_DIR",
        "SAS_BASE_URL",
        "SAS_CLIENT_ID",
        "SAS_CLIENT_SECRET",
        "SAS_CERT_PATH",
        "SAS_INSECURE_SKIP_TLS_VERIFY",
    ];

    // Tests in this module share the process environment
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    /// Locks the environment and clears every variable the CLI reads
    fn clean_env() -> MutexGuard<'static, ()> {
        let guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        for var in ENV_VARS {
            unsafe {
                std::env::remove_var(var);
            }
        }
        guard
    }

    fn parse_with_env(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("viya-token").chain(args.iter().copied())).unwrap()
    }

    fn parse(args: &[&str]) -> Cli {
        let _env = clean_env();
        parse_with_env(args)
    }

    #[test]
    fn test_default_command_is_token() {
        let cli = parse(&[]);
        assert_eq!(cli.command.unwrap_or_default(), Command::Token);
    }

    #[test]
    fn test_subcommands() {
        assert_eq!(parse(&["login"]).command, Some(Command::Login));
        assert_eq!(parse(&["refresh"]).command, Some(Command::Refresh));
        assert_eq!(parse(&["show-config"]).command, Some(Command::ShowConfig));
    }

    #[test]
    fn test_flags_override_config() {
        let cli = parse(&[
            "--base-url",
            "https://viya.example.com/",
            "--client-id",
            "cli.client",
            "--token-dir",
            "/tmp/viya-tokens",
            "--timeout",
            "0",
            "url",
        ]);
        let base = Config {
            client_id: "file.client".into(),
            client_secret: "file.secret".into(),
            ..Config::default()
        };

        let config = cli.apply_overrides(base).validate().unwrap();
        assert_eq!(config.base_url, "https://viya.example.com");
        assert_eq!(config.client_id, "cli.client");
        assert_eq!(config.client_secret, "file.secret");
        assert_eq!(config.token_dir, PathBuf::from("/tmp/viya-tokens"));
        assert_eq!(config.request_timeout(), None);
        assert!(!config.insecure_skip_tls_verify);
    }

    #[test]
    fn test_insecure_is_opt_in() {
        assert!(!parse(&[]).insecure);

        let config = parse(&["--insecure"]).apply_overrides(Config::default());
        assert!(config.insecure_skip_tls_verify);
    }

    #[test]
    fn test_insecure_env_accepts_boolish_values() {
        let _env = clean_env();

        for (value, expected) in [
            ("1", true),
            ("yes", true),
            ("true", true),
            ("on", true),
            ("0", false),
            ("no", false),
            ("false", false),
        ] {
            unsafe {
                std::env::set_var("SAS_INSECURE_SKIP_TLS_VERIFY", value);
            }
            let cli = Cli::try_parse_from(["viya-token"])
                .unwrap_or_else(|e| panic!("{:?} rejected: {}", value, e));
            assert_eq!(cli.insecure, expected, "value {:?}", value);
        }

        unsafe {
            std::env::remove_var("SAS_INSECURE_SKIP_TLS_VERIFY");
        }
    }

    #[test]
    fn test_env_file_fills_unset_variables() {
        let _env = clean_env();
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(".env");
        std::fs::write(
            &path,
            "SAS_CLIENT_ID=dotenv.client\n\
             SAS_CLIENT_SECRET=dotenv.secret\n\
             SAS_BASE_URL=https://dotenv.example.com\n",
        )
        .unwrap();
        // Variables already in the environment win over the file
        unsafe {
            std::env::set_var("SAS_BASE_URL", "https://real.example.com");
        }

        assert!(load_env_file(Some(&path)).is_none());
        let config = parse_with_env(&[]).apply_overrides(Config::default());

        assert_eq!(config.client_id, "dotenv.client");
        assert_eq!(config.client_secret, "dotenv.secret");
        assert_eq!(config.base_url, "https://real.example.com");

        for var in ENV_VARS {
            unsafe {
                std::env::remove_var(var);
            }
        }
    }

    #[test]
    fn test_missing_env_file_is_ignored() {
        let temp = TempDir::new().unwrap();
        assert!(load_env_file(Some(&temp.path().join(".env"))).is_none());
    }

    #[test]
    fn test_malformed_env_file_is_reported() {
        let _env = clean_env();
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(".env");
        std::fs::write(&path, "SAS_CLIENT_ID='unterminated\n").unwrap();

        assert!(load_env_file(Some(&path)).is_some());
    }

    #[test]
    fn test_explicit_missing_config_file_fails() {
        let cli = parse(&["--config", "/nonexistent/viya-token.toml"]);
        assert!(cli.resolve_config().is_err());
    }
}
