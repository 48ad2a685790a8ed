use serde_json::Value;
use std::path::{Path, PathBuf};

pub const SOURCE_SNAPSHOT_FILE: &str = "source.schema.snapshot.json";
pub const DESTINATION_SNAPSHOT_FILE: &str = "destination.schema.snapshot.json";
pub const DIFF_FILE: &str = "schema-diff.json";

/// Where a sync run stores its snapshots and diff.
#[derive(Debug, Clone)]
pub struct SchemaFiles {
    pub dir: PathBuf,
    pub source_snapshot: PathBuf,
    pub destination_snapshot: PathBuf,
    pub diff: PathBuf,
}

impl SchemaFiles {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref().to_path_buf();
        Self {
            source_snapshot: dir.join(SOURCE_SNAPSHOT_FILE),
            destination_snapshot: dir.join(DESTINATION_SNAPSHOT_FILE),
            diff: dir.join(DIFF_FILE),
            dir,
        }
    }
}

/// Some service versions wrap payloads as `{"data": ...}`. Returns the inner
/// document when such a wrapper holds a truthy value, otherwise the body
/// unchanged.
pub fn unwrap_data_field(body: Value) -> Value {
    match body {
        Value::Object(mut map) if map.get("data").is_some_and(is_truthy) => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

/// `null`, `false`, zero and `""` are falsy. Arrays and objects never are,
/// even when empty.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
