use super::{ApiClient, SchemaError, read_json};
use crate::models::{AppConfig, SchemaFiles};
use serde_json::Value;

const APPLY_PATH: &str = "/schema/apply";

/// Submits the stored diff to the destination. Returns the server's response
/// body, if it sent one.
pub async fn apply_handler(
    config: &AppConfig,
    files: &SchemaFiles,
    client: &ApiClient,
) -> Result<Option<Value>, SchemaError> {
    let diff_exists = tokio::fs::try_exists(&files.diff)
        .await
        .map_err(SchemaError::io("Failed to check", &files.diff))?;
    if !diff_exists {
        return Err(SchemaError::MissingDiff(files.diff.clone()));
    }

    let destination = config.destination()?;
    println!("Applying schema to destination ({})...", destination.base_url);

    let diff = read_json(&files.diff).await?;
    let response = client
        .post(&destination.url(APPLY_PATH), &destination.token, &diff)
        .await?;

    if let Some(body) = &response {
        tracing::debug!(%body, "apply response");
    }
    println!("Destination schema now matches source!");

    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::schema::{DiffOutcome, sync_handler};
    use crate::models::app_config::EnvFile;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn destination_config(server: &MockServer) -> AppConfig {
        let env = format!(
            "DESTINATION_URL={}/\nDESTINATION_TOKEN=dest-token\n",
            server.uri()
        );
        AppConfig::from_sources(&EnvFile::parse(&env), |_| None)
    }

    #[tokio::test]
    async fn test_apply_without_diff_asks_for_sync() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(204))
            .expect(0)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let files = SchemaFiles::new(dir.path());
        let err = apply_handler(&destination_config(&server), &files, &ApiClient::new())
            .await
            .unwrap_err();

        assert!(matches!(err, SchemaError::MissingDiff(_)));
        assert!(err.to_string().contains("Run sync first"));
    }

    #[tokio::test]
    async fn test_apply_without_diff_or_configuration_asks_for_sync() {
        let config = AppConfig::from_sources(&EnvFile::parse(""), |_| None);
        let dir = tempfile::tempdir().unwrap();
        let files = SchemaFiles::new(dir.path());

        let err = apply_handler(&config, &files, &ApiClient::new())
            .await
            .unwrap_err();

        assert!(matches!(err, SchemaError::MissingDiff(_)));
        assert!(err.to_string().contains("Run sync first"));
    }

    #[tokio::test]
    async fn test_apply_with_diff_requires_destination() {
        let config = AppConfig::from_sources(&EnvFile::parse(""), |_| None);
        let dir = tempfile::tempdir().unwrap();
        let files = SchemaFiles::new(dir.path());
        std::fs::write(&files.diff, "{\"diff\": {}}").unwrap();

        let err = apply_handler(&config, &files, &ApiClient::new())
            .await
            .unwrap_err();

        assert!(matches!(err, SchemaError::Config(_)));
    }

    #[tokio::test]
    async fn test_apply_posts_stored_diff() {
        let server = MockServer::start().await;
        let diff = json!({"hash": "abc", "diff": {"collections": [], "fields": []}});
        Mock::given(method("POST"))
            .and(path("/schema/apply"))
            .and(header("Authorization", "Bearer dest-token"))
            .and(header("Content-Type", "application/json"))
            .and(body_json(&diff))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let files = SchemaFiles::new(dir.path());
        std::fs::write(&files.diff, serde_json::to_string_pretty(&diff).unwrap()).unwrap();

        let response = apply_handler(&destination_config(&server), &files, &ApiClient::new())
            .await
            .unwrap();

        assert_eq!(response, None);
    }

    #[tokio::test]
    async fn test_apply_returns_json_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/schema/apply"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": "ok"})))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let files = SchemaFiles::new(dir.path());
        std::fs::write(&files.diff, "{\"diff\": {}}").unwrap();

        let response = apply_handler(&destination_config(&server), &files, &ApiClient::new())
            .await
            .unwrap();

        assert_eq!(response, Some(json!({"data": "ok"})));
    }

    #[tokio::test]
    async fn test_apply_rejected_by_server() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/schema/apply"))
            .respond_with(ResponseTemplate::new(422).set_body_string("hash mismatch"))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let files = SchemaFiles::new(dir.path());
        std::fs::write(&files.diff, "{\"diff\": {}}").unwrap();

        let err = apply_handler(&destination_config(&server), &files, &ApiClient::new())
            .await
            .unwrap_err();

        assert!(err.to_string().contains("422"));
        assert!(err.to_string().contains("hash mismatch"));
    }

    #[tokio::test]
    async fn test_apply_corrupt_diff_file() {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();
        let files = SchemaFiles::new(dir.path());
        std::fs::write(&files.diff, "{not json").unwrap();

        let err = apply_handler(&destination_config(&server), &files, &ApiClient::new())
            .await
            .unwrap_err();

        assert!(matches!(err, SchemaError::InvalidJson { .. }));
    }

    #[tokio::test]
    async fn test_diff_written_by_sync_is_applied_unchanged() {
        let source = MockServer::start().await;
        let destination = MockServer::start().await;
        let diff = json!({
            "hash": "f00d",
            "diff": {
                "collections": [{"collection": "articles", "diff": [{"kind": "N"}]}],
                "fields": [],
                "relations": []
            }
        });

        Mock::given(method("GET"))
            .and(path("/schema/snapshot"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"version": 1}})))
            .mount(&source)
            .await;
        Mock::given(method("GET"))
            .and(path("/schema/snapshot"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"version": 1}})))
            .mount(&destination)
            .await;
        Mock::given(method("POST"))
            .and(path("/schema/diff"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": diff.clone()})))
            .mount(&destination)
            .await;
        Mock::given(method("POST"))
            .and(path("/schema/apply"))
            .and(body_json(&diff))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&destination)
            .await;

        let env = format!(
            "SOURCE_URL={}\nSOURCE_TOKEN=s\nDESTINATION_URL={}\nDESTINATION_TOKEN=dest-token\n",
            source.uri(),
            destination.uri()
        );
        let config = AppConfig::from_sources(&EnvFile::parse(&env), |_| None);
        let dir = tempfile::tempdir().unwrap();
        let files = SchemaFiles::new(dir.path().join("snapshots"));
        let client = ApiClient::new();

        let outcome = sync_handler(&config, &files, &client).await.unwrap();
        assert_eq!(outcome, DiffOutcome::Written(files.diff.clone()));

        apply_handler(&config, &files, &client).await.unwrap();
    }
}
