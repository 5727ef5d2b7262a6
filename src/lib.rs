pub mod config;
pub mod errors;
pub mod infrastructure;
pub mod logging;
pub mod runtime;
pub mod sample;
pub mod session;

// Re-export commonly used items for convenience
pub use config::AppConfig;
pub use errors::{AppError, DiError, DiResult};
pub use infrastructure::{
    Component, Dependency, DependencyContext, DependencyFactory, Injectable, Resolvable,
    TypeDescriptorBuilder,
};
pub use runtime::{Entity, Prefab, Scene};
pub use session::SessionManager;
