// src/llm/groq.rs
// Groq chat-completions client (OpenAI-compatible, non-streaming)

use crate::llm::http_client::LlmHttpClient;
use crate::llm::openai_compat::{ChatRequest, parse_chat_response};
use crate::llm::provider::{CompletionClient, CompletionRequest};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use std::time::Instant;
use tracing::{Span, debug, info, instrument};
use uuid::Uuid;

pub const GROQ_API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";

/// Groq API client.
///
/// Any OpenAI-compatible endpoint works through `with_api_url`.
pub struct GroqClient {
    api_key: String,
    api_url: String,
    http: LlmHttpClient,
}

impl GroqClient {
    pub fn new(api_key: String) -> Self {
        Self::with_api_url(api_key, GROQ_API_URL.into())
    }

    /// Create a client against a custom OpenAI-compatible endpoint
    pub fn with_api_url(api_key: String, api_url: String) -> Self {
        Self {
            api_key,
            api_url,
            http: LlmHttpClient::new(),
        }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    #[instrument(
        skip(self, request),
        fields(request_id, operation = %request.operation, model = %request.model, message_count = request.messages.len())
    )]
    async fn chat(&self, request: CompletionRequest) -> Result<String> {
        let request_id = Uuid::new_v4().to_string();
        let start_time = Instant::now();

        Span::current().record("request_id", &request_id);

        info!(
            request_id = %request_id,
            operation = %request.operation,
            temperature = request.temperature,
            max_tokens = request.max_tokens,
            "Starting completion request"
        );

        let operation = request.operation;
        let body = ChatRequest::new(request.model, request.messages)
            .with_temperature(request.temperature)
            .with_max_tokens(request.max_tokens);
        let body = serde_json::to_string(&body)?;
        debug!(request_id = %request_id, "Completion request: {}", body);

        let response_body = self
            .http
            .execute(&request_id, &self.api_url, &self.api_key, body)
            .await?;

        let duration_ms = start_time.elapsed().as_millis() as u64;
        let result = parse_chat_response(&response_body, &request_id, duration_ms)?;

        if let Some(ref usage) = result.usage {
            crate::llm::logging::log_usage(&request_id, self.name(), operation, usage);
        }
        crate::llm::logging::log_completion(
            &request_id,
            self.name(),
            operation,
            duration_ms,
            result.content.as_ref().map(|c| c.len()).unwrap_or(0),
            result.finish_reason.as_deref(),
        );

        result
            .content
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| anyhow!("Completion returned no content"))
    }
}

#[async_trait]
impl CompletionClient for GroqClient {
    async fn complete(&self, request: CompletionRequest) -> Result<String> {
        self.chat(request).await
    }

    fn name(&self) -> &'static str {
        "Groq"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrich::Operation;
    use crate::llm::Message;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn priority_request() -> CompletionRequest {
        CompletionRequest::for_operation(
            Operation::SuggestPriority,
            "llama-3.3-70b-versatile",
            vec![Message::system("s"), Message::user("Fix outage")],
        )
    }

    async fn client_for(server: &MockServer) -> GroqClient {
        GroqClient::with_api_url("test-key".into(), format!("{}/v1/chat/completions", server.uri()))
    }

    #[tokio::test]
    async fn test_complete_returns_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer test-key"))
            .and(body_partial_json(serde_json::json!({
                "model": "llama-3.3-70b-versatile",
                "max_tokens": 10
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"role": "assistant", "content": "high"}, "finish_reason": "stop"}],
                "usage": {"prompt_tokens": 20, "completion_tokens": 1, "total_tokens": 21}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let text = client.complete(priority_request()).await.unwrap();
        assert_eq!(text, "high");
    }

    #[tokio::test]
    async fn test_server_error_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let err = client.complete(priority_request()).await.unwrap_err();
        assert!(err.to_string().contains("503"), "got: {}", err);
    }

    #[tokio::test]
    async fn test_empty_content_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"content": null}}]
            })))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let err = client.complete(priority_request()).await.unwrap_err();
        assert!(err.to_string().contains("no content"));
    }

    #[test]
    fn test_default_url() {
        let client = GroqClient::new("k".into());
        assert_eq!(client.api_url(), GROQ_API_URL);
        assert_eq!(client.name(), "Groq");
    }
}
