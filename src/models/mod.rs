pub mod app_config;
pub mod schema;

pub use app_config::{AppConfig, ConfigError};
pub use schema::{SchemaFiles, unwrap_data_field};
