pub mod app_config;
pub mod loader;
pub mod prefab_config;
pub mod session_config;

pub use app_config::{AppConfig, LogSettings};
pub use loader::ConfigLoader;
pub use prefab_config::PrefabConfig;
pub use session_config::SessionConfig;

pub use app_config::{CONFIG_ENV_VAR, CONFIG_FILE_NAME, USER_CONFIG_PATH};
