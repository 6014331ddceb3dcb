pub mod global;
pub mod loader;

pub use global::{AppConfig, ImportConfig, LoggingConfig, ServerConfig, StoreConfig};
pub use loader::{ConfigLoader, ENV_PREFIX};
