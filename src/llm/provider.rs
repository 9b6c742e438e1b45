//! LLM provider trait and request type.

use async_trait::async_trait;

use crate::agent::ConnectionConfig;

use super::error::LlmError;

/// A single text-generation request.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub model: String,
    pub system_prompt: Option<String>,
    pub prompt: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl CompletionRequest {
    /// Build a request from an agent's LLM connection options.
    ///
    /// Returns `None` if the connection is not an LLM provider kind.
    pub fn for_connection(
        connection: &ConnectionConfig,
        system_prompt: Option<String>,
        prompt: impl Into<String>,
    ) -> Option<Self> {
        match connection {
            ConnectionConfig::OpenAi(c) => Some(Self {
                model: c.model().to_string(),
                system_prompt,
                prompt: prompt.into(),
                temperature: c.temperature(),
                max_tokens: c.max_tokens(),
            }),
            ConnectionConfig::Anthropic(c) => Some(Self {
                model: c.model().to_string(),
                system_prompt,
                prompt: prompt.into(),
                temperature: None,
                max_tokens: c.max_tokens(),
            }),
            _ => None,
        }
    }
}

/// Trait for LLM providers with different API formats.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Generate text for a prompt and return the assistant's reply.
    async fn generate(&self, request: &CompletionRequest) -> Result<String, LlmError>;
}
