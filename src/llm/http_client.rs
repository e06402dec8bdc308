// src/llm/http_client.rs
// Shared HTTP execution for OpenAI-compatible completion endpoints

use anyhow::{Result, anyhow};
use reqwest::Client;
use tracing::debug;

/// HTTP client for completion endpoints.
///
/// One attempt per call and no request timeout: a failure is terminal for
/// that call, and a hung upstream hangs the caller.
#[derive(Debug, Clone, Default)]
pub struct LlmHttpClient {
    client: Client,
}

impl LlmHttpClient {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    /// POST a JSON body with Bearer auth and return the response body text
    pub async fn execute(
        &self,
        request_id: &str,
        url: &str,
        api_key: &str,
        body: String,
    ) -> Result<String> {
        let response = self
            .client
            .post(url)
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| anyhow!("Request failed: {}", e))?;

        let status = response.status();
        debug!(request_id = %request_id, status = %status, "Completion endpoint responded");

        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(anyhow!("API error {}: {}", status, error_body));
        }

        Ok(response.text().await?)
    }
}
