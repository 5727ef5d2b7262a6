use serde::Deserialize;
use std::time::Duration;

/// Configuration for session transitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Scene loaded when a new game session starts
    pub scene: String,
    /// Simulated scene load time in milliseconds
    pub load_delay_ms: u64,
}

/// Partial Session Configuration for loading from files
#[derive(Deserialize, Debug, Default)]
pub struct PartialSessionConfig {
    pub scene: Option<String>,
    pub load_delay_ms: Option<u64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            scene: default_scene(),
            load_delay_ms: default_load_delay_ms(),
        }
    }
}

impl SessionConfig {
    /// Create SessionConfig from partial config with defaults
    pub fn from_partial(partial: Option<PartialSessionConfig>) -> Self {
        let partial = partial.unwrap_or_default();

        Self {
            scene: partial.scene.unwrap_or_else(default_scene),
            load_delay_ms: partial.load_delay_ms.unwrap_or_else(default_load_delay_ms),
        }
    }

    pub fn load_delay(&self) -> Duration {
        Duration::from_millis(self.load_delay_ms)
    }
}

fn default_scene() -> String {
    "GameScene".to_string()
}

fn default_load_delay_ms() -> u64 {
    50
}
