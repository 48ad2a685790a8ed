pub mod api_client;
pub mod apply_handler;
pub mod sync_handler;

pub use api_client::{ApiClient, ApiError};
pub use apply_handler::apply_handler;
pub use sync_handler::{DiffOutcome, sync_handler};

use crate::models::ConfigError;
use serde_json::Value;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("{action} {}: {source}", path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid JSON in {}: {source}", path.display())]
    InvalidJson {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Diff file {} not found. Run sync first.", .0.display())]
    MissingDiff(PathBuf),
    #[error("Empty response from {0}; expected a schema snapshot")]
    EmptyResponse(String),
}

impl SchemaError {
    fn io(action: &'static str, path: &Path) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.to_path_buf();
        move |source| SchemaError::Io {
            action,
            path,
            source,
        }
    }
}

/// Writes `value` as 2-space indented JSON.
async fn write_json(path: &Path, value: &Value) -> Result<(), SchemaError> {
    let content = serde_json::to_string_pretty(value).map_err(|e| SchemaError::InvalidJson {
        path: path.to_path_buf(),
        source: e,
    })?;
    tokio::fs::write(path, content)
        .await
        .map_err(SchemaError::io("Failed to write", path))
}

async fn read_json(path: &Path) -> Result<Value, SchemaError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(SchemaError::io("Failed to read", path))?;
    serde_json::from_str(&content).map_err(|e| SchemaError::InvalidJson {
        path: path.to_path_buf(),
        source: e,
    })
}
