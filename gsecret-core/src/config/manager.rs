//! Settings persistence and directory layout

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{ConfigError, ConfigResult};

use super::settings::AppSettings;

/// Environment variable relocating all gsecret state into one directory
pub const CONFIG_DIR_ENV: &str = "GSECRET_CONFIG_DIR";

const APP_DIR: &str = "gsecret";
const SETTINGS_FILE: &str = "settings.toml";
const INDEX_CACHE_FILE: &str = "secret_list_cache.json";
const LOG_FILE: &str = "gsecret.log";

/// Loads and saves [`AppSettings`] and knows where local state lives
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_dir: PathBuf,
    cache_dir: PathBuf,
}

impl ConfigManager {
    /// Creates a manager using `GSECRET_CONFIG_DIR` or the platform directories
    ///
    /// # Errors
    /// Returns `ConfigError::NoConfigDir` if no home directory can be found.
    pub fn new() -> ConfigResult<Self> {
        if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV).filter(|v| !v.is_empty()) {
            return Ok(Self::with_config_dir(PathBuf::from(dir)));
        }

        let config_dir = dirs::config_dir()
            .ok_or(ConfigError::NoConfigDir)?
            .join(APP_DIR);
        let cache_dir = dirs::cache_dir()
            .map(|d| d.join(APP_DIR))
            .unwrap_or_else(|| config_dir.clone());

        Ok(Self {
            config_dir,
            cache_dir,
        })
    }

    /// Creates a manager keeping settings and the index cache in `dir`
    #[must_use]
    pub fn with_config_dir(dir: PathBuf) -> Self {
        Self {
            cache_dir: dir.clone(),
            config_dir: dir,
        }
    }

    /// Directory holding `settings.toml`
    #[must_use]
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Path of the settings file
    #[must_use]
    pub fn settings_path(&self) -> PathBuf {
        self.config_dir.join(SETTINGS_FILE)
    }

    /// Path of the index cache, honouring the `cache_path` override
    #[must_use]
    pub fn index_cache_path(&self, settings: &AppSettings) -> PathBuf {
        settings
            .cache_path
            .clone()
            .unwrap_or_else(|| self.cache_dir.join(INDEX_CACHE_FILE))
    }

    /// Path of the log file, honouring `[logging] file`
    #[must_use]
    pub fn log_file_path(&self, settings: &AppSettings) -> PathBuf {
        settings
            .logging
            .file
            .clone()
            .unwrap_or_else(|| self.config_dir.join(LOG_FILE))
    }

    /// Loads settings; a missing file yields defaults
    ///
    /// # Errors
    /// Returns `ConfigError::Parse` for malformed TOML and `ConfigError::Io`
    /// when the file exists but cannot be read.
    pub fn load_settings(&self) -> ConfigResult<AppSettings> {
        let path = self.settings_path();
        if !path.exists() {
            debug!(path = %path.display(), "Settings file not found, using defaults");
            return Ok(AppSettings::default());
        }

        let content = fs::read_to_string(&path)?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse(format!("{}: {e}", path.display())))
    }

    /// Writes settings, creating the configuration directory if needed
    ///
    /// # Errors
    /// Returns `ConfigError::Serialize` or `ConfigError::Io` on failure.
    pub fn save_settings(&self, settings: &AppSettings) -> ConfigResult<()> {
        fs::create_dir_all(&self.config_dir)?;
        let content =
            toml::to_string_pretty(settings).map_err(|e| ConfigError::Serialize(e.to_string()))?;
        fs::write(self.settings_path(), content)?;
        debug!(path = %self.settings_path().display(), "Settings saved");
        Ok(())
    }

    /// Persists a new project id, keeping all other settings
    ///
    /// # Errors
    /// Returns `ConfigError::MissingProjectId` for a blank id, or any load/save error.
    pub fn set_project_id(&self, project_id: &str) -> ConfigResult<AppSettings> {
        let project_id = project_id.trim();
        if project_id.is_empty() {
            return Err(ConfigError::MissingProjectId);
        }

        let mut settings = self.load_settings()?;
        settings.project_id = Some(project_id.to_string());
        self.save_settings(&settings)?;
        Ok(settings)
    }
}
