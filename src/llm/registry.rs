//! Provider registry: resolves an agent's LLM connection to a provider
//! instance.
//!
//! API keys come from environment variables first, then from the credential
//! store written by `configure-connection`. All providers share one
//! `reqwest::Client` for connection pooling.

use std::sync::Arc;

use reqwest::Client;
use tracing::{debug, warn};

use crate::agent::ConnectionConfig;
use crate::credentials::CredentialStore;

use super::anthropic::AnthropicProvider;
use super::openai::OpenAiCompatibleProvider;
use super::provider::LlmProvider;

/// Default base URLs for each provider.
pub mod defaults {
    pub const ANTHROPIC: &str = "https://api.anthropic.com";
    pub const OPENAI: &str = "https://api.openai.com/v1";
}

#[derive(Clone)]
pub struct ProviderRegistry {
    client: Client,
    credentials: CredentialStore,
}

impl ProviderRegistry {
    #[must_use]
    pub fn new(credentials: CredentialStore) -> Self {
        Self {
            client: Client::new(),
            credentials,
        }
    }

    /// Build a registry backed by the default credential store.
    pub fn from_env() -> Self {
        let path = CredentialStore::default_path();
        let credentials = match CredentialStore::load(&path) {
            Ok(store) => store,
            Err(e) => {
                debug!(error = %e, "Failed to load credential store");
                CredentialStore::default()
            }
        };
        Self::new(credentials)
    }

    /// The shared HTTP client.
    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    /// Create a provider for an LLM connection.
    ///
    /// Returns `None` when the connection is not an LLM kind or no API key
    /// is available for it.
    pub fn get(&self, connection: &ConnectionConfig) -> Option<Arc<dyn LlmProvider>> {
        match connection {
            ConnectionConfig::OpenAi(_) => {
                let key = self.secret("openai", "api_key", "OPENAI_API_KEY")?;
                Some(Arc::new(OpenAiCompatibleProvider::new(
                    self.client.clone(),
                    defaults::OPENAI.to_string(),
                    Some(key),
                )))
            }
            ConnectionConfig::Anthropic(_) => {
                let key = self.secret("anthropic", "api_key", "ANTHROPIC_API_KEY")?;
                Some(Arc::new(AnthropicProvider::new(
                    self.client.clone(),
                    defaults::ANTHROPIC.to_string(),
                    key,
                )))
            }
            other => {
                warn!(connection = other.name(), "Not an LLM provider connection");
                None
            }
        }
    }

    fn secret(&self, connection: &str, key: &str, env_var: &str) -> Option<String> {
        if let Ok(value) = std::env::var(env_var) {
            if !value.is_empty() {
                return Some(value);
            }
        }
        self.credentials.get(connection, key).map(str::to_string)
    }
}
