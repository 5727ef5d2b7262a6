use serde::Deserialize;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::Level;

use super::{
    loader::ConfigLoader,
    prefab_config::{PartialPrefabConfig, PrefabConfig},
    session_config::{PartialSessionConfig, SessionConfig},
};
use crate::errors::ConfigError;
use crate::logging::{LogFormat, LoggingConfig, LoggingEnvironment};

// Configuration location constants
pub const USER_CONFIG_PATH: &str = "~/.config/simpledi";
pub const CONFIG_FILE_NAME: &str = "config.toml";
/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "SIMPLEDI_CONFIG";

/// Logging section of the config file
///
/// `environment` picks a preset; `level` and `format` override it when set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub environment: LoggingEnvironment,
    pub level: Option<String>,
    pub format: Option<LogFormat>,
}

#[derive(Deserialize, Debug, Default)]
pub struct PartialLogSettings {
    pub environment: Option<LoggingEnvironment>,
    pub level: Option<String>,
    pub format: Option<LogFormat>,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            environment: LoggingEnvironment::Development,
            level: None,
            format: None,
        }
    }
}

impl LogSettings {
    pub fn from_partial(partial: Option<PartialLogSettings>) -> Self {
        let partial = partial.unwrap_or_default();

        Self {
            environment: partial.environment.unwrap_or(LoggingEnvironment::Development),
            level: partial.level,
            format: partial.format,
        }
    }
}

/// Main Application Configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppConfig {
    pub logging: LogSettings,
    pub session: SessionConfig,
    pub prefabs: PrefabConfig,
}

/// Partial Application Configuration for loading from files
#[derive(Deserialize, Debug, Default)]
pub struct PartialAppConfig {
    logging: Option<PartialLogSettings>,
    session: Option<PartialSessionConfig>,
    prefabs: Option<PartialPrefabConfig>,
}

impl AppConfig {
    /// Load configuration from the default location or `SIMPLEDI_CONFIG`
    pub fn load() -> Result<Self, ConfigError> {
        ConfigLoader::new().load_config()
    }

    /// Load configuration with custom base path (for testing)
    pub fn load_with_base_path(base_path: PathBuf) -> Result<Self, ConfigError> {
        ConfigLoader::with_base_path(base_path).load_config()
    }

    pub fn from_partial(partial: Option<PartialAppConfig>) -> Result<Self, ConfigError> {
        let partial = partial.unwrap_or_default();

        let config = AppConfig {
            logging: LogSettings::from_partial(partial.logging),
            session: SessionConfig::from_partial(partial.session),
            prefabs: PrefabConfig::from_partial(partial.prefabs),
        };
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML document; missing sections take their defaults
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let partial: PartialAppConfig = toml::from_str(content)
            .map_err(|e| ConfigError::TomlParse("<inline>".to_string(), e))?;
        Self::from_partial(Some(partial))
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.log_level()?;
        if self.session.scene.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "session.scene",
                value: self.session.scene.clone(),
            });
        }
        Ok(())
    }

    /// Effective log level: the explicit `level`, else the preset's
    pub fn log_level(&self) -> Result<Level, ConfigError> {
        match &self.logging.level {
            Some(level) => Level::from_str(level).map_err(|_| ConfigError::InvalidValue {
                field: "logging.level",
                value: level.clone(),
            }),
            None => Ok(LoggingConfig::for_environment(self.logging.environment).level),
        }
    }

    /// Logging setup derived from the `[logging]` section
    pub fn logging_config(&self) -> Result<LoggingConfig, ConfigError> {
        let preset = LoggingConfig::for_environment(self.logging.environment);
        let format = self.logging.format.unwrap_or(preset.format);
        Ok(preset.with_level(self.log_level()?).with_format(format))
    }
}
