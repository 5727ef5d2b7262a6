use std::{env, fs, path::PathBuf};

use super::app_config::{AppConfig, PartialAppConfig, CONFIG_ENV_VAR, CONFIG_FILE_NAME, USER_CONFIG_PATH};
use crate::errors::ConfigError;

/// Configuration loader responsible for locating and reading the config file
pub struct ConfigLoader {
    base_path: Option<PathBuf>,
    explicit_path: Option<PathBuf>,
}

impl ConfigLoader {
    /// Create a new config loader with default paths
    pub fn new() -> Self {
        Self {
            base_path: None,
            explicit_path: None,
        }
    }

    /// Create a config loader with custom base path (for testing)
    pub fn with_base_path(base_path: PathBuf) -> Self {
        Self {
            base_path: Some(base_path),
            explicit_path: None,
        }
    }

    /// Read exactly this file; takes precedence over `SIMPLEDI_CONFIG`
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: None,
            explicit_path: Some(path.into()),
        }
    }

    /// Resolve the config file location
    pub fn config_path(&self) -> PathBuf {
        if let Some(path) = &self.explicit_path {
            return expand(path.to_string_lossy().as_ref());
        }
        if self.base_path.is_none() {
            if let Ok(path) = env::var(CONFIG_ENV_VAR) {
                return expand(&path);
            }
        }
        self.extract_file_path(USER_CONFIG_PATH, CONFIG_FILE_NAME)
    }

    /// Load complete application configuration
    pub fn load_config(&self) -> Result<AppConfig, ConfigError> {
        let config_path = self.config_path();
        let partial = self.load_partial_config(&config_path)?;
        if partial.is_none() {
            tracing::info!(path = %config_path.display(), "Config file not found, using defaults");
        }
        AppConfig::from_partial(partial)
    }

    /// Extract file path with tilde expansion and base path override
    fn extract_file_path(&self, base_dir: &str, file_name: &str) -> PathBuf {
        let expanded_base = match &self.base_path {
            // For testing: use custom base path
            Some(base_path) => base_path.join(base_dir.trim_start_matches("~/")),
            None => expand(base_dir),
        };
        expanded_base.join(file_name)
    }

    /// Load partial configuration from TOML file
    fn load_partial_config(&self, config_path: &PathBuf) -> Result<Option<PartialAppConfig>, ConfigError> {
        if !config_path.exists() {
            return Ok(None);
        }

        let display = config_path.to_string_lossy().to_string();
        let content =
            fs::read_to_string(config_path).map_err(|e| ConfigError::FileRead(display.clone(), e))?;
        let partial = toml::from_str(&content).map_err(|e| ConfigError::TomlParse(display, e))?;

        tracing::debug!(path = %config_path.display(), "Loaded config file");
        Ok(Some(partial))
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn expand(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).as_ref())
}
