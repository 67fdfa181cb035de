//! `OpenAI`-compatible provider implementation
//!
//! Talks to a `chat/completions` endpoint with fixed model parameters.
//! The model, temperature, and output cap are compile-time constants,
//! not configuration.

use super::types::{AssistantReply, ChatTurn, WireRole};
use super::{CompletionGateway, GatewayError};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const MODEL: &str = "gpt-4o";
const TEMPERATURE: f32 = 0.7;
const MAX_TOKENS: u32 = 1000;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Provider configuration read at startup
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub api_key: Option<String>,
    /// Base URL of the `OpenAI`-compatible API (the original deployment
    /// pointed this at a proxy)
    pub base_url: String,
}

impl GatewayConfig {
    pub fn from_env() -> Self {
        Self {
            api_key: std::env::var("OPENAI_API_KEY").ok(),
            base_url: std::env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
        }
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

/// Gateway backed by an `OpenAI`-compatible chat completions API
pub struct OpenAIGateway {
    client: Client,
    api_key: String,
    endpoint: String,
}

impl OpenAIGateway {
    pub fn new(config: &GatewayConfig) -> Self {
        let endpoint = format!("{}/chat/completions", config.base_url.trim_end_matches('/'));

        let client = Client::builder()
            .timeout(Duration::from_secs(300))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            api_key: config.api_key.clone().unwrap_or_default(),
            endpoint,
        }
    }
}

#[async_trait]
impl CompletionGateway for OpenAIGateway {
    async fn complete(&self, history: &[ChatTurn]) -> Result<AssistantReply, GatewayError> {
        if history.is_empty() {
            return Err(GatewayError::invalid_input("message history is empty"));
        }

        let request = translate_request(history);

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GatewayError::network(format!("Request timeout: {e}"))
                } else if e.is_connect() {
                    GatewayError::network(format!("Connection failed: {e}"))
                } else {
                    GatewayError::unknown(format!("Request failed: {e}"))
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GatewayError::network(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            return Err(classify_failure(status.as_u16(), &body));
        }

        let response: ChatCompletionResponse = serde_json::from_str(&body).map_err(|e| {
            GatewayError::malformed_response(format!("Failed to parse response: {e}"))
        })?;

        normalize_response(response)
    }

    fn model_id(&self) -> &str {
        MODEL
    }
}

/// Build the provider request, mapping store roles onto the wire
/// vocabulary.
pub(super) fn translate_request(history: &[ChatTurn]) -> ChatCompletionRequest {
    let messages = history
        .iter()
        .map(|turn| WireMessage {
            role: WireRole::from(turn.role),
            content: turn.content.clone(),
        })
        .collect();

    ChatCompletionRequest {
        model: MODEL.to_string(),
        messages,
        temperature: TEMPERATURE,
        max_tokens: MAX_TOKENS,
    }
}

/// Extract the single reply from a 2xx response body.
pub(super) fn normalize_response(
    resp: ChatCompletionResponse,
) -> Result<AssistantReply, GatewayError> {
    let choice = resp
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| GatewayError::malformed_response("No choices in response"))?;

    let content = choice
        .message
        .content
        .ok_or_else(|| GatewayError::malformed_response("No content in response message"))?;

    Ok(AssistantReply::new(content))
}

/// Map a non-2xx status (and its error body, when parsable) onto the
/// error taxonomy.
pub(super) fn classify_failure(status: u16, body: &str) -> GatewayError {
    let message = serde_json::from_str::<ErrorResponse>(body)
        .map_or_else(|_| body.to_string(), |resp| resp.error.message);

    match status {
        401 | 403 => GatewayError::auth(format!("Authentication failed: {message}")),
        429 => GatewayError::rate_limit(format!("Rate limit exceeded: {message}")),
        400 => GatewayError::invalid_request(format!("Invalid request: {message}")),
        500..=599 => GatewayError::server_error(format!("Server error: {message}")),
        _ => GatewayError::unknown(format!("HTTP {status}: {message}")),
    }
}

// Provider wire types

#[derive(Debug, Serialize)]
pub(super) struct ChatCompletionRequest {
    pub(super) model: String,
    pub(super) messages: Vec<WireMessage>,
    pub(super) temperature: f32,
    pub(super) max_tokens: u32,
}

#[derive(Debug, Serialize, Deserialize)]
pub(super) struct WireMessage {
    pub(super) role: WireRole,
    pub(super) content: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct ChatCompletionResponse {
    pub(super) choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ChatChoice {
    pub(super) message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub(super) struct ChatChoiceMessage {
    pub(super) content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::super::GatewayErrorKind;
    use super::*;
    use crate::store::Role;

    #[test]
    fn test_translate_request_maps_roles_and_keeps_order() {
        let history = vec![
            ChatTurn::new(Role::Ai, "你好！我是AI助手，有什么我可以帮助你的吗？"),
            ChatTurn::new(Role::User, "hi"),
        ];

        let request = translate_request(&history);

        assert_eq!(request.model, "gpt-4o");
        assert!((request.temperature - 0.7).abs() < f32::EPSILON);
        assert_eq!(request.max_tokens, 1000);
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[0].role, WireRole::Assistant);
        assert_eq!(request.messages[1].role, WireRole::User);
        assert_eq!(request.messages[1].content, "hi");
    }

    #[test]
    fn test_request_serializes_wire_labels() {
        let request = translate_request(&[ChatTurn::new(Role::Ai, "reply")]);
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["messages"][0]["role"], "assistant");
        assert_eq!(json["messages"][0]["content"], "reply");
        assert_eq!(json["model"], "gpt-4o");
        assert_eq!(json["max_tokens"], 1000);
    }

    #[test]
    fn test_normalize_takes_first_choice() {
        let resp: ChatCompletionResponse = serde_json::from_value(serde_json::json!({
            "choices": [
                { "message": { "role": "assistant", "content": "first" } },
                { "message": { "role": "assistant", "content": "second" } }
            ]
        }))
        .unwrap();

        let reply = normalize_response(resp).unwrap();
        assert_eq!(reply.content, "first");
        assert_eq!(reply.role, Role::Ai);
    }

    #[test]
    fn test_normalize_rejects_empty_choices() {
        let resp: ChatCompletionResponse =
            serde_json::from_value(serde_json::json!({ "choices": [] })).unwrap();

        let err = normalize_response(resp).unwrap_err();
        assert_eq!(err.kind, GatewayErrorKind::MalformedResponse);
    }

    #[test]
    fn test_normalize_rejects_missing_content() {
        let resp: ChatCompletionResponse = serde_json::from_value(serde_json::json!({
            "choices": [{ "message": { "role": "assistant" } }]
        }))
        .unwrap();

        let err = normalize_response(resp).unwrap_err();
        assert_eq!(err.kind, GatewayErrorKind::MalformedResponse);
    }

    #[test]
    fn test_failure_classification_by_status() {
        let cases = [
            (401, GatewayErrorKind::Auth),
            (403, GatewayErrorKind::Auth),
            (429, GatewayErrorKind::RateLimit),
            (400, GatewayErrorKind::InvalidRequest),
            (500, GatewayErrorKind::ServerError),
            (503, GatewayErrorKind::ServerError),
            (302, GatewayErrorKind::Unknown),
        ];

        for (status, kind) in cases {
            let err = classify_failure(status, "oops");
            assert_eq!(err.kind, kind, "status {status}");
        }
    }

    #[test]
    fn test_failure_extracts_upstream_error_message() {
        let body = r#"{ "error": { "message": "model overloaded", "type": "server_error" } }"#;
        let err = classify_failure(500, body);
        assert!(err.message.contains("model overloaded"));

        // Unparsable bodies fall back to the raw text.
        let err = classify_failure(500, "<html>bad gateway</html>");
        assert!(err.message.contains("<html>bad gateway</html>"));
    }

    #[tokio::test]
    async fn test_empty_history_fails_before_any_network() {
        // Unroutable endpoint: the test only passes because the input
        // check short-circuits the request.
        let gateway = OpenAIGateway::new(&GatewayConfig {
            api_key: Some("test-key".to_string()),
            base_url: "http://192.0.2.1:1".to_string(),
        });

        let err = gateway.complete(&[]).await.unwrap_err();
        assert_eq!(err.kind, GatewayErrorKind::InvalidInput);
    }

    #[test]
    fn test_endpoint_tolerates_trailing_slash() {
        let gateway = OpenAIGateway::new(&GatewayConfig {
            api_key: None,
            base_url: "https://api-proxy.example.com/v1/".to_string(),
        });
        assert_eq!(
            gateway.endpoint,
            "https://api-proxy.example.com/v1/chat/completions"
        );
    }
}
