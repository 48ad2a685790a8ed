use reqwest::header::AUTHORIZATION;
use reqwest::{Method, StatusCode};
use serde_json::Value;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("API Request failed: {status} {status_text} - {body}")]
    Request {
        status: u16,
        status_text: String,
        body: String,
    },
    #[error("Request to {url} failed: {source}")]
    Network { url: String, source: reqwest::Error },
    #[error("Invalid JSON in response from {url}: {source}")]
    Decode {
        url: String,
        source: serde_json::Error,
    },
}

/// Thin JSON client for the schema endpoints. One call per request, no retries.
#[derive(Clone, Debug, Default)]
pub struct ApiClient {
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, url: &str, token: &str) -> Result<Option<Value>, ApiError> {
        self.request(url, token, Method::GET, None).await
    }

    pub async fn post(&self, url: &str, token: &str, body: &Value) -> Result<Option<Value>, ApiError> {
        self.request(url, token, Method::POST, Some(body)).await
    }

    /// Returns `None` for `204 No Content`, the parsed body otherwise.
    pub async fn request(
        &self,
        url: &str,
        token: &str,
        method: Method,
        body: Option<&Value>,
    ) -> Result<Option<Value>, ApiError> {
        let mut request = self
            .http
            .request(method.clone(), url)
            .header(AUTHORIZATION, format!("Bearer {}", token));
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| ApiError::Network {
            url: url.to_string(),
            source: e,
        })?;

        let status = response.status();
        tracing::debug!(%method, url, status = status.as_u16(), "schema API response");

        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|e| format!("Error reading response body: {}", e));
            return Err(ApiError::Request {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
                body,
            });
        }

        if status == StatusCode::NO_CONTENT {
            return Ok(None);
        }

        let text = response.text().await.map_err(|e| ApiError::Network {
            url: url.to_string(),
            source: e,
        })?;
        serde_json::from_str(&text)
            .map(Some)
            .map_err(|e| ApiError::Decode {
                url: url.to_string(),
                source: e,
            })
    }
}
