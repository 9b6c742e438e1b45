//! OpenAI-compatible LLM provider.
//!
//! Works with OpenAI and any endpoint speaking the `chat/completions`
//! format.

use async_trait::async_trait;
use reqwest::Client;

use super::error::LlmError;
use super::provider::{CompletionRequest, LlmProvider};

/// OpenAI-compatible provider.
pub struct OpenAiCompatibleProvider {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl OpenAiCompatibleProvider {
    #[must_use]
    pub fn new(client: Client, base_url: String, api_key: Option<String>) -> Self {
        Self {
            client,
            base_url,
            api_key,
        }
    }
}

#[async_trait]
impl LlmProvider for OpenAiCompatibleProvider {
    async fn generate(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        let url = format!("{}/chat/completions", self.base_url);

        let mut req = self
            .client
            .post(&url)
            .header("Content-Type", "application/json");

        if let Some(ref key) = self.api_key {
            req = req.header("Authorization", format!("Bearer {key}"));
        }

        let response = req.json(&to_request(request)).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(LlmError::Api { status, message });
        }

        let body: Response = response.json().await?;
        Ok(body
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .unwrap_or_default())
    }
}

// ============================================================================
// Wire Types
// ============================================================================

#[derive(serde::Serialize)]
struct Request {
    model: String,
    messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(serde::Deserialize)]
struct Response {
    choices: Vec<Choice>,
}

#[derive(serde::Deserialize)]
struct Choice {
    message: Message,
}

fn to_request(request: &CompletionRequest) -> Request {
    let mut messages = Vec::new();
    if let Some(ref system) = request.system_prompt {
        messages.push(Message {
            role: "system".to_string(),
            content: system.clone(),
        });
    }
    messages.push(Message {
        role: "user".to_string(),
        content: request.prompt.clone(),
    });

    Request {
        model: request.model.clone(),
        messages,
        temperature: request.temperature,
        max_tokens: request.max_tokens,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serialization_skips_absent_options() {
        let request = to_request(&CompletionRequest {
            model: "gpt-4".to_string(),
            system_prompt: Some("You are Mino.".to_string()),
            prompt: "Say hi".to_string(),
            temperature: None,
            max_tokens: None,
        });

        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("\"model\":\"gpt-4\""));
        assert!(json.contains("\"role\":\"system\""));
        assert!(json.contains("\"role\":\"user\""));
        assert!(!json.contains("temperature"));
        assert!(!json.contains("max_tokens"));
    }

    #[test]
    fn request_without_system_prompt_has_single_message() {
        let request = to_request(&CompletionRequest {
            model: "gpt-4".to_string(),
            system_prompt: None,
            prompt: "Say hi".to_string(),
            temperature: Some(0.7),
            max_tokens: Some(256),
        });
        assert_eq!(request.messages.len(), 1);
        assert_eq!(request.messages[0].role, "user");
    }

    #[test]
    fn response_deserialization() {
        let json = r#"{
            "id": "chatcmpl-123",
            "choices": [
                {
                    "index": 0,
                    "message": {"role": "assistant", "content": "Hello there"},
                    "finish_reason": "stop"
                }
            ]
        }"#;
        let response: Response = serde_json::from_str(json).unwrap();
        assert_eq!(response.choices[0].message.content, "Hello there");
    }
}
