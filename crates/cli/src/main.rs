//! viya-token - obtain SAS Viya OAuth access tokens
//!
//! Prints a usable access token on stdout so other tools can consume it,
//! e.g. `curl -H "Authorization: Bearer $(viya-token)" ...`. Logs and the
//! interactive prompt go to stderr.

mod args;

use anyhow::{Context, Result};
use args::{Cli, Command};
use clap::Parser;
use oauth::{TerminalPrompt, TokenManager, authorization_url};
use tracing::{Level, error, warn};

#[tokio::main]
async fn main() {
    // Values from .env sit below real environment variables and flags
    let dotenv_error = args::load_env_file(None);
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::INFO })
        .with_writer(std::io::stderr)
        .init();

    if let Some(err) = dotenv_error {
        warn!("Ignoring .env file: {}", err);
    }

    if let Err(err) = run(cli).await {
        error!("{:#}", err);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = cli.resolve_config()?;
    let command = cli.command.unwrap_or_default();

    match command {
        Command::Url => {
            println!("{}", authorization_url(&config.base_url, &config.client_id));
        }
        Command::ShowConfig => {
            let rendered = toml::to_string_pretty(&config.redacted())
                .context("failed to render configuration")?;
            print!("{}", rendered);
        }
        Command::Token | Command::Login | Command::Refresh => {
            let prompt = TerminalPrompt::new().with_browser(cli.open_browser);
            let manager =
                TokenManager::new(&config, prompt).context("failed to set up token client")?;

            let token = match command {
                Command::Login => manager.authorize().await,
                Command::Refresh => manager.refresh().await,
                _ => manager.get_token().await,
            }
            .context("failed to obtain access token")?;

            println!("{}", token);
        }
    }

    Ok(())
}
