//! Anthropic Claude provider.
//!
//! Talks to the Messages API: https://docs.anthropic.com/en/api/messages

use crate::client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
use serde::{Deserialize, Serialize};
use taxrag_core::{AppError, AppResult};

/// Default Anthropic API base URL.
pub const DEFAULT_CLAUDE_URL: &str = "https://api.anthropic.com";

/// API version header value.
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Used when a request carries no explicit limit; the API requires one.
const DEFAULT_MAX_TOKENS: u32 = 2000;

/// Messages API request format.
#[derive(Debug, Serialize)]
struct MessagesRequest {
    model: String,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    messages: Vec<Message>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

/// Messages API response format.
#[derive(Debug, Deserialize)]
struct MessagesResponse {
    model: String,
    content: Vec<ContentBlock>,
    #[serde(default)]
    stop_reason: Option<String>,
    #[serde(default)]
    usage: Option<ClaudeUsage>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ClaudeUsage {
    #[serde(default)]
    input_tokens: u32,
    #[serde(default)]
    output_tokens: u32,
}

/// Error body returned with non-2xx statuses.
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(rename = "type")]
    kind: String,
    message: String,
}

/// Claude generation client.
pub struct ClaudeClient {
    /// Base URL for the Anthropic API
    base_url: String,

    /// Credential sent as `x-api-key`
    api_key: String,

    /// HTTP client
    client: reqwest::Client,
}

impl ClaudeClient {
    /// Create a client against the public Anthropic API.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(DEFAULT_CLAUDE_URL, api_key)
    }

    /// Create a client with a custom base URL (proxies, gateways).
    pub fn with_base_url(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Convert LlmRequest to the Messages API format.
    ///
    /// The rendered prompt already carries the system instructions, so it is
    /// sent as a single user message.
    fn to_messages_request(&self, request: &LlmRequest) -> MessagesRequest {
        MessagesRequest {
            model: request.model.clone(),
            max_tokens: request.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            temperature: request.temperature,
            messages: vec![Message {
                role: "user",
                content: request.prompt.clone(),
            }],
        }
    }

    /// Convert a Messages API response to LlmResponse.
    fn convert_response(&self, response: MessagesResponse) -> AppResult<LlmResponse> {
        let content: String = response
            .content
            .iter()
            .filter(|block| block.kind == "text")
            .filter_map(|block| block.text.as_deref())
            .collect();

        if content.is_empty() {
            return Err(AppError::Backend(
                "Claude returned no text content".to_string(),
            ));
        }

        let usage = response
            .usage
            .map(|u| LlmUsage::new(u.input_tokens, u.output_tokens))
            .unwrap_or_default();

        Ok(LlmResponse {
            content,
            model: response.model,
            usage,
            stop_reason: response.stop_reason,
        })
    }
}

/// Build a readable message from an error body, falling back to the raw text.
fn describe_error(status: reqwest::StatusCode, body: &str) -> String {
    match serde_json::from_str::<ErrorResponse>(body) {
        Ok(parsed) => format!(
            "Claude API error ({}): {}: {}",
            status, parsed.error.kind, parsed.error.message
        ),
        Err(_) => format!("Claude API error ({}): {}", status, body),
    }
}

#[async_trait::async_trait]
impl LlmClient for ClaudeClient {
    fn provider_name(&self) -> &str {
        "claude"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        tracing::info!("Sending completion request to Claude ({})", request.model);
        tracing::debug!(
            "Prompt length: {} chars, temperature: {:?}, max_tokens: {:?}",
            request.prompt.chars().count(),
            request.temperature,
            request.max_tokens
        );

        let body = self.to_messages_request(request);
        let url = format!("{}/v1/messages", self.base_url);

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Backend(format!("Failed to send request to Claude: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Backend(describe_error(status, &error_text)));
        }

        let parsed: MessagesResponse = response
            .json()
            .await
            .map_err(|e| AppError::Backend(format!("Failed to parse Claude response: {}", e)))?;

        let converted = self.convert_response(parsed)?;

        tracing::info!(
            "Received completion from Claude ({} output tokens)",
            converted.usage.completion_tokens
        );

        Ok(converted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claude_client_creation() {
        let client = ClaudeClient::with_base_url("http://localhost:8080/", "sk-test");
        assert_eq!(client.provider_name(), "claude");
        assert_eq!(client.base_url, "http://localhost:8080");
    }

    #[test]
    fn test_messages_request_conversion() {
        let client = ClaudeClient::new("sk-test");
        let request = LlmRequest::new("System\n\nQuestion: what is VAT?", "claude-sonnet-4-20250514")
            .with_temperature(0.0)
            .with_max_tokens(1500);

        let body = client.to_messages_request(&request);
        assert_eq!(body.model, "claude-sonnet-4-20250514");
        assert_eq!(body.max_tokens, 1500);
        assert_eq!(body.temperature, Some(0.0));
        assert_eq!(body.messages.len(), 1);
        assert_eq!(body.messages[0].role, "user");
        assert!(body.messages[0].content.contains("what is VAT?"));
    }

    #[test]
    fn test_messages_request_default_max_tokens() {
        let client = ClaudeClient::new("sk-test");
        let body = client.to_messages_request(&LlmRequest::new("hi", "m"));
        assert_eq!(body.max_tokens, DEFAULT_MAX_TOKENS);

        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("temperature").is_none());
    }

    #[test]
    fn test_convert_response_joins_text_blocks() {
        let client = ClaudeClient::new("sk-test");
        let raw = r#"{
            "id": "msg_01",
            "type": "message",
            "role": "assistant",
            "model": "claude-sonnet-4-20250514",
            "content": [
                {"type": "text", "text": "The standard rate "},
                {"type": "text", "text": "is 18%."}
            ],
            "stop_reason": "end_turn",
            "usage": {"input_tokens": 812, "output_tokens": 9}
        }"#;

        let parsed: MessagesResponse = serde_json::from_str(raw).unwrap();
        let response = client.convert_response(parsed).unwrap();
        assert_eq!(response.content, "The standard rate is 18%.");
        assert_eq!(response.usage, LlmUsage::new(812, 9));
        assert_eq!(response.stop_reason.as_deref(), Some("end_turn"));
    }

    #[test]
    fn test_convert_response_without_text_is_backend_error() {
        let client = ClaudeClient::new("sk-test");
        let raw = r#"{"model": "m", "content": []}"#;
        let parsed: MessagesResponse = serde_json::from_str(raw).unwrap();
        assert!(matches!(
            client.convert_response(parsed),
            Err(AppError::Backend(_))
        ));
    }

    #[test]
    fn test_describe_error_body() {
        let body = r#"{"type":"error","error":{"type":"overloaded_error","message":"Overloaded"}}"#;
        let message = describe_error(reqwest::StatusCode::from_u16(529).unwrap(), body);
        assert!(message.contains("overloaded_error"));
        assert!(message.contains("Overloaded"));

        let raw = describe_error(reqwest::StatusCode::BAD_GATEWAY, "<html>bad gateway</html>");
        assert!(raw.contains("bad gateway"));
    }
}
