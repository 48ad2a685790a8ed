use super::{ApiClient, SchemaError, write_json};
use crate::models::{AppConfig, SchemaFiles, unwrap_data_field};
use serde_json::Value;
use std::path::PathBuf;

const SNAPSHOT_PATH: &str = "/schema/snapshot?export=json";
const DIFF_PATH: &str = "/schema/diff";

#[derive(Debug, PartialEq)]
pub enum DiffOutcome {
    Written(PathBuf),
    /// The destination answered `204`: nothing to apply.
    NoChanges,
}

/// Exports both snapshots, asks the destination for a diff against the
/// source snapshot and stores all three under `files.dir`.
pub async fn sync_handler(
    config: &AppConfig,
    files: &SchemaFiles,
    client: &ApiClient,
) -> Result<DiffOutcome, SchemaError> {
    tokio::fs::create_dir_all(&files.dir)
        .await
        .map_err(SchemaError::io("Failed to create", &files.dir))?;

    let source = config.source()?;
    let destination = config.destination()?;

    println!("Exporting schema from source ({})...", source.base_url);
    let source_snapshot = export_snapshot(client, &source.url(SNAPSHOT_PATH), &source.token).await?;
    write_json(&files.source_snapshot, &source_snapshot).await?;
    println!("Snapshot saved to {}", files.source_snapshot.display());

    println!("Exporting schema from destination ({})...", destination.base_url);
    let destination_snapshot =
        export_snapshot(client, &destination.url(SNAPSHOT_PATH), &destination.token).await?;
    write_json(&files.destination_snapshot, &destination_snapshot).await?;
    println!("Snapshot saved to {}", files.destination_snapshot.display());

    println!("Comparing snapshot with destination schema...");
    let snapshot_body = unwrap_data_field(source_snapshot);
    let diff_response = client
        .post(&destination.url(DIFF_PATH), &destination.token, &snapshot_body)
        .await?;

    let Some(diff_response) = diff_response else {
        remove_stale_diff(files).await?;
        println!("No schema differences found; destination already matches source.");
        return Ok(DiffOutcome::NoChanges);
    };

    let diff_data = unwrap_data_field(diff_response);
    write_json(&files.diff, &diff_data).await?;
    println!("Diff saved to {} (data wrapper processed)", files.diff.display());

    Ok(DiffOutcome::Written(files.diff.clone()))
}

async fn export_snapshot(client: &ApiClient, url: &str, token: &str) -> Result<Value, SchemaError> {
    client
        .get(url, token)
        .await?
        .ok_or_else(|| SchemaError::EmptyResponse(url.to_string()))
}

async fn remove_stale_diff(files: &SchemaFiles) -> Result<(), SchemaError> {
    match tokio::fs::remove_file(&files.diff).await {
        Ok(()) => {
            tracing::debug!(path = %files.diff.display(), "removed stale diff");
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(SchemaError::io("Failed to remove", &files.diff)(e)),
    }
}
