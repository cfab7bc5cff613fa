//! Application settings persisted as TOML

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Default REST endpoint of the remote secret service
pub const DEFAULT_REMOTE_ENDPOINT: &str = "https://secretmanager.googleapis.com/v1";

/// Default request timeout for remote calls, in seconds
pub const DEFAULT_REMOTE_TIMEOUT_SECS: u64 = 15;

/// Default delete confirmation window, in seconds
pub const DEFAULT_DELETE_COUNTDOWN_SECS: u64 = 20;

/// Top-level settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Remote project (account) identifier; also scopes the keyring namespaces
    pub project_id: Option<String>,
    /// Override for the index cache file location
    pub cache_path: Option<PathBuf>,
    /// Remote service settings
    pub remote: RemoteSettings,
    /// Delete confirmation settings
    pub delete: DeleteSettings,
    /// Logging settings
    pub logging: LoggingSettings,
}

impl AppSettings {
    /// Returns the configured project id, ignoring blank values
    #[must_use]
    pub fn project_id(&self) -> Option<&str> {
        self.project_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }
}

/// Remote secret service settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteSettings {
    /// Base URL of the REST API
    pub endpoint: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// Static OAuth access token. Prefer the environment or `gcloud`.
    pub access_token: Option<String>,
}

impl Default for RemoteSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_REMOTE_ENDPOINT.to_string(),
            timeout_secs: DEFAULT_REMOTE_TIMEOUT_SECS,
            access_token: None,
        }
    }
}

/// Delete confirmation settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeleteSettings {
    /// Length of the cancellable countdown before a delete proceeds
    pub countdown_secs: u64,
}

impl Default for DeleteSettings {
    fn default() -> Self {
        Self {
            countdown_secs: DEFAULT_DELETE_COUNTDOWN_SECS,
        }
    }
}

/// Log destination named in `[logging] output`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    /// Standard error
    #[default]
    Stderr,
    /// Standard output
    Stdout,
    /// `[logging] file`, or `gsecret.log` in the configuration directory
    File,
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Level used when no verbosity flag is given
    pub level: String,
    /// Destination
    pub output: LogOutput,
    /// Log file; setting it implies file output
    pub file: Option<PathBuf>,
    /// `EnvFilter` directive replacing the level-derived one
    pub filter: Option<String>,
}

impl LoggingSettings {
    /// Whether logs go to a file
    #[must_use]
    pub fn logs_to_file(&self) -> bool {
        self.output == LogOutput::File || self.file.is_some()
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            output: LogOutput::Stderr,
            file: None,
            filter: None,
        }
    }
}
