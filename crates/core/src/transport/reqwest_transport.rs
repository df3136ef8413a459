use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use super::traits::{ApiRequest, ApiResponse, HttpTransport, Method};
use crate::errors::CoreError;

/// [`HttpTransport`] backed by a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self, CoreError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CoreError::InvalidConfig(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, CoreError> {
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self.client.request(method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.body(serde_json::to_vec(body).map_err(|e| {
                CoreError::Serialization(format!("Failed to encode request body: {e}"))
            })?);
        }

        let resp = builder.send().await?;

        let status = resp.status();
        let status_text = status.canonical_reason().unwrap_or_default().to_string();
        let content_type = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        // The status line already arrived; a body that cannot be read is
        // treated as empty rather than as a connectivity failure.
        let body = match resp.text().await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(
                    status = status.as_u16(),
                    error = %e.without_url(),
                    "failed to read response body"
                );
                String::new()
            }
        };

        Ok(ApiResponse {
            status: status.as_u16(),
            status_text,
            content_type,
            body,
        })
    }
}
