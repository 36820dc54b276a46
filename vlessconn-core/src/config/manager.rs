//! Config directory and settings file management.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, ConfigResult};
use crate::storage::FileStore;
use crate::tracing::span_names;

use super::AppSettings;

/// Environment variable that overrides the config directory
pub const CONFIG_DIR_ENV: &str = "VLESSCONN_CONFIG_DIR";

const APP_DIR_NAME: &str = "vlessconn";
const SETTINGS_FILE: &str = "settings.toml";

/// Locates and manages the configuration directory
///
/// The directory holds `settings.toml` and the file-backed profile storage.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_dir: PathBuf,
}

impl ConfigManager {
    /// Creates a manager for the default config directory
    ///
    /// `VLESSCONN_CONFIG_DIR` wins over the platform config directory.
    ///
    /// # Errors
    ///
    /// Returns `NoConfigDir` if neither is available.
    pub fn new() -> ConfigResult<Self> {
        if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV).filter(|v| !v.is_empty()) {
            return Ok(Self::with_config_dir(PathBuf::from(dir)));
        }
        let base = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(Self::with_config_dir(base.join(APP_DIR_NAME)))
    }

    /// Creates a manager rooted at an explicit directory
    #[must_use]
    pub const fn with_config_dir(config_dir: PathBuf) -> Self {
        Self { config_dir }
    }

    /// Returns the config directory
    #[must_use]
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Returns the path of the settings file
    #[must_use]
    pub fn settings_path(&self) -> PathBuf {
        self.config_dir.join(SETTINGS_FILE)
    }

    /// Returns file-backed profile storage inside the config directory
    #[must_use]
    pub fn profile_storage(&self) -> FileStore {
        FileStore::new(self.config_dir.clone())
    }

    /// Loads settings, returning defaults if the file does not exist
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read, parsed, or
    /// holds an invalid value.
    pub fn load_settings(&self) -> ConfigResult<AppSettings> {
        let _span = crate::trace_operation_debug!(span_names::CONFIG_LOAD).entered();
        let path = self.settings_path();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No settings file, using defaults");
            return Ok(AppSettings::default());
        }

        let content = fs::read_to_string(&path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let settings: AppSettings =
            toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Validates and writes settings, creating the directory if needed
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails or the file cannot be written.
    pub fn save_settings(&self, settings: &AppSettings) -> ConfigResult<()> {
        let _span = crate::trace_operation_debug!(span_names::CONFIG_SAVE).entered();
        settings.validate()?;

        let path = self.settings_path();
        let write_error = |e: std::io::Error| ConfigError::Write {
            path: path.display().to_string(),
            reason: e.to_string(),
        };

        let content =
            toml::to_string_pretty(settings).map_err(|e| ConfigError::Parse(e.to_string()))?;
        fs::create_dir_all(&self.config_dir).map_err(write_error)?;
        fs::write(&path, content).map_err(write_error)?;
        tracing::info!(path = %path.display(), "Settings saved");
        Ok(())
    }
}
