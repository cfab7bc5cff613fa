//! Shared utility functions used across command modules.

use std::io::{BufRead, IsTerminal, Write};
use std::path::Path;
use std::sync::Arc;

use gsecret_core::cache::JsonFileIndexStore;
use gsecret_core::config::{AppSettings, ConfigManager};
use gsecret_core::error::ConfigError;
use gsecret_core::secret::{
    DecryptionPrompt, GcpSecretManager, KeyringStore, OfflineRemoteStore, RemoteSecretStore,
    SecretEngine, TokenSource,
};
use secrecy::{ExposeSecret, SecretString};

use crate::error::CliError;

/// Global options shared by every command
#[derive(Debug, Clone, Copy)]
pub struct Context<'a> {
    /// Custom configuration directory
    pub config_path: Option<&'a Path>,
    /// Suppress informational output
    pub quiet: bool,
    /// Skip the remote store
    pub offline: bool,
}

impl Context<'_> {
    /// Prints an informational line unless `--quiet` is set
    pub fn info(&self, message: impl std::fmt::Display) {
        if !self.quiet {
            println!("{message}");
        }
    }
}

/// Creates a `ConfigManager` using the optional custom config directory
/// from CLI args.
pub fn create_config_manager(config_path: Option<&Path>) -> Result<ConfigManager, CliError> {
    match config_path {
        Some(path) => Ok(ConfigManager::with_config_dir(path.to_path_buf())),
        None => ConfigManager::new()
            .map_err(|e| CliError::Config(format!("Failed to initialize config: {e}"))),
    }
}

/// Loads settings and the configured project id
pub fn load_project(manager: &ConfigManager) -> Result<(AppSettings, String), CliError> {
    let settings = manager.load_settings()?;
    let project_id = settings
        .project_id()
        .map(str::to_string)
        .ok_or(ConfigError::MissingProjectId)?;
    Ok((settings, project_id))
}

/// Builds the engine for a project
///
/// `--offline` swaps the remote client for one that is never reachable.
pub fn build_engine(
    ctx: &Context<'_>,
    manager: &ConfigManager,
    settings: &AppSettings,
    project_id: &str,
) -> Result<SecretEngine, CliError> {
    let remote: Arc<dyn RemoteSecretStore> = if ctx.offline {
        Arc::new(OfflineRemoteStore)
    } else {
        let client = GcpSecretManager::new(
            project_id,
            &settings.remote,
            TokenSource::from_settings(&settings.remote),
        )
        .map_err(|e| CliError::Secret(e.to_string()))?;
        Arc::new(client)
    };

    let index = JsonFileIndexStore::new(manager.index_cache_path(settings));

    Ok(SecretEngine::new(
        project_id,
        remote,
        Arc::new(KeyringStore::new()),
        Arc::new(index),
    ))
}

/// Creates the runtime used to drive async engine calls
pub fn create_runtime() -> Result<tokio::runtime::Runtime, CliError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| CliError::Config(format!("Failed to create runtime: {e}")))
}

/// Prints the active project banner
pub fn print_banner(ctx: &Context<'_>, project_id: &str) {
    ctx.info(format!("Project: {project_id}"));
}

/// Reads one visible line, without the trailing newline
pub fn prompt_line(label: &str) -> Result<String, CliError> {
    eprint!("{label}");
    std::io::stderr().flush()?;
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Reads a secret: hidden prompt on a terminal, otherwise one line of stdin
pub fn read_secret(label: &str) -> Result<SecretString, CliError> {
    if std::io::stdin().is_terminal() {
        let value = rpassword::prompt_password(label)?;
        Ok(SecretString::from(value))
    } else {
        let mut line = String::new();
        std::io::stdin().lock().read_line(&mut line)?;
        Ok(SecretString::from(
            line.trim_end_matches(['\r', '\n']).to_string(),
        ))
    }
}

/// Asks for an optional decryption password on the terminal
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalPrompt;

impl TerminalPrompt {
    /// Whether an interactive prompt is possible
    pub fn is_available() -> bool {
        std::io::stdin().is_terminal()
    }
}

impl DecryptionPrompt for TerminalPrompt {
    fn request_password(&self, id: &str) -> Option<SecretString> {
        match rpassword::prompt_password(format!("A password to decrypt '{id}'? (optional): ")) {
            Ok(value) if !value.is_empty() => Some(SecretString::from(value)),
            Ok(_) => None,
            Err(e) => {
                tracing::debug!(error = %e, "Decryption prompt unavailable");
                None
            }
        }
    }
}

/// Compares two secrets without exposing them beyond the call
pub fn secrets_match(a: &SecretString, b: &SecretString) -> bool {
    a.expose_secret() == b.expose_secret()
}
