//! Anthropic LLM provider with native API format.

use async_trait::async_trait;
use reqwest::Client;

use super::error::LlmError;
use super::provider::{CompletionRequest, LlmProvider};

/// Anthropic provider with native API format.
pub struct AnthropicProvider {
    client: Client,
    base_url: String,
    api_key: String,
    api_version: String,
}

impl AnthropicProvider {
    pub const DEFAULT_API_VERSION: &'static str = "2023-06-01";

    #[must_use]
    pub fn new(client: Client, base_url: String, api_key: String) -> Self {
        Self {
            client,
            base_url,
            api_key,
            api_version: Self::DEFAULT_API_VERSION.to_string(),
        }
    }
}

#[async_trait]
impl LlmProvider for AnthropicProvider {
    async fn generate(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        let url = format!("{}/v1/messages", self.base_url);

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", &self.api_version)
            .json(&to_request(request))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(LlmError::Api { status, message });
        }

        let body: Response = response.json().await?;
        Ok(from_response(body))
    }
}

// ============================================================================
// Wire Types
// ============================================================================

#[derive(serde::Serialize)]
struct Request {
    model: String,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<RequestMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(serde::Serialize)]
struct RequestMessage {
    role: String,
    content: String,
}

#[derive(serde::Deserialize)]
struct Response {
    content: Vec<Content>,
}

#[derive(serde::Deserialize)]
struct Content {
    #[serde(rename = "type")]
    content_type: String,
    #[serde(default)]
    text: String,
}

fn to_request(request: &CompletionRequest) -> Request {
    Request {
        model: request.model.clone(),
        max_tokens: request.max_tokens.unwrap_or(4096),
        system: request.system_prompt.clone(),
        messages: vec![RequestMessage {
            role: "user".to_string(),
            content: request.prompt.clone(),
        }],
        temperature: request.temperature,
    }
}

fn from_response(response: Response) -> String {
    response
        .content
        .into_iter()
        .filter(|c| c.content_type == "text")
        .map(|c| c.text)
        .collect::<Vec<_>>()
        .join("")
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_defaults_max_tokens() {
        let request = to_request(&CompletionRequest {
            model: "claude-3-5-sonnet-20241022".to_string(),
            system_prompt: None,
            prompt: "Say hi".to_string(),
            temperature: None,
            max_tokens: None,
        });
        assert_eq!(request.max_tokens, 4096);
        assert_eq!(request.messages.len(), 1);
        assert_eq!(request.messages[0].role, "user");
    }

    #[test]
    fn response_concatenates_text_blocks() {
        let json = r#"{
            "id": "msg_123",
            "content": [
                {"type": "text", "text": "Hello "},
                {"type": "tool_use", "text": ""},
                {"type": "text", "text": "world"}
            ],
            "stop_reason": "end_turn"
        }"#;
        let response: Response = serde_json::from_str(json).unwrap();
        assert_eq!(from_response(response), "Hello world");
    }
}
