//! Configuration management for `gsecret`
//!
//! This module provides the `ConfigManager` for loading and saving
//! settings in TOML format.

mod manager;
pub mod settings;

pub use manager::{CONFIG_DIR_ENV, ConfigManager};
pub use settings::{
    AppSettings, DEFAULT_DELETE_COUNTDOWN_SECS, DEFAULT_REMOTE_ENDPOINT,
    DEFAULT_REMOTE_TIMEOUT_SECS, DeleteSettings, LogOutput, LoggingSettings, RemoteSettings,
};
