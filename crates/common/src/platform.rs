use std::path::PathBuf;
use tracing::debug;

/// Application name used for platform directories
pub const APP_NAME: &str = "viya-token";

/// Gets the default configuration file path.
/// - Linux: ~/.config/viya-token/config.toml
/// - macOS: ~/Library/Application Support/viya-token/config.toml
/// - Windows: %APPDATA%/viya-token/config.toml
pub fn get_config_path() -> Option<PathBuf> {
    let config_dir = dirs::config_dir()?;
    Some(config_dir.join(APP_NAME).join("config.toml"))
}

/// Gets the default directory holding the persisted token files.
///
/// Uses the platform data directory when one can be determined, otherwise
/// the current working directory.
pub fn default_token_dir() -> PathBuf {
    if let Some(dirs) = directories::ProjectDirs::from("com", "sas", APP_NAME) {
        return dirs.data_dir().to_path_buf();
    }

    debug!("No platform data directory available, using the working directory");
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}
