use std::any::TypeId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Container error: {0}")]
    Container(#[from] DiError),
    #[error("Logging initialization failed: {0}")]
    Logging(String),
    #[error("Invalid key script: {0}")]
    Script(String),
}

/// Errors raised by the dependency container. All of them are programmer
/// errors (misconfiguration); none are retried or caught internally.
#[derive(Debug, Error)]
pub enum DiError {
    #[error("Type {type_name} not registered.")]
    UnregisteredType {
        type_id: TypeId,
        type_name: &'static str,
    },
    #[error("No constructor found for {type_name}")]
    NoConstructor { type_name: &'static str },
    #[error("Member '{member}' of {type_name} carries more than one dependency marker")]
    DuplicateMarker {
        type_name: &'static str,
        member: &'static str,
    },
    #[error("{type_name} is not attached to an entity")]
    NotAttached { type_name: &'static str },
    #[error("Dependency '{member}' of {owner} has not been injected")]
    MissingDependency {
        owner: &'static str,
        member: &'static str,
    },
    #[error("Session transition to '{requested}' rejected: another load is still in progress")]
    SessionTransitionInProgress { requested: String },
}

impl DiError {
    pub fn unregistered<T: ?Sized + 'static>() -> Self {
        DiError::UnregisteredType {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
        }
    }

    pub fn is_unregistered(&self) -> bool {
        matches!(self, DiError::UnregisteredType { .. })
    }
}

pub type DiResult<T> = Result<T, DiError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read file '{0}': {1}")]
    FileRead(String, #[source] std::io::Error),
    #[error("Failed to parse TOML from '{0}': {1}")]
    TomlParse(String, #[source] toml::de::Error),
    #[error("Invalid value for '{field}': {value}")]
    InvalidValue { field: &'static str, value: String },
}
