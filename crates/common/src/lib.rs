//! Shared configuration and platform helpers for viya-token

pub mod config;
pub mod platform;

pub use config::{Config, ConfigError};
