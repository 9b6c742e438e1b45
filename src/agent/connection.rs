//! Typed connection configurations.
//!
//! Each entry in an agent document's `config` array is tagged by its `name`
//! field. Known kinds get a typed variant with range-checked options; unknown
//! kinds are preserved losslessly in a generic fallback. Keys a known kind
//! does not recognize are kept in an `extra` bag so that a loaded profile
//! serializes back to the document it came from.

use std::time::Duration;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use super::error::AgentLoadError;

/// A single connection entry from an agent document.
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionConfig {
    Twitter(TwitterConfig),
    OpenAi(OpenAiConfig),
    Anthropic(AnthropicConfig),
    Other(GenericConfig),
}

impl ConnectionConfig {
    /// The connection's unique name within the agent.
    pub fn name(&self) -> &str {
        match self {
            ConnectionConfig::Twitter(_) => "twitter",
            ConnectionConfig::OpenAi(_) => "openai",
            ConnectionConfig::Anthropic(_) => "anthropic",
            ConnectionConfig::Other(c) => &c.name,
        }
    }

    /// Whether this connection can serve `generate` requests.
    pub fn is_llm_provider(&self) -> bool {
        matches!(
            self,
            ConnectionConfig::OpenAi(_) | ConnectionConfig::Anthropic(_)
        )
    }

    pub(crate) fn validate(&self) -> Result<(), AgentLoadError> {
        match self {
            ConnectionConfig::Twitter(c) => c.validate(),
            ConnectionConfig::OpenAi(c) => c.validate(),
            ConnectionConfig::Anthropic(c) => c.validate(),
            ConnectionConfig::Other(_) => Ok(()),
        }
    }
}

impl<'de> Deserialize<'de> for ConnectionConfig {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let mut entry = Map::<String, Value>::deserialize(deserializer)?;
        let name = match entry.remove("name") {
            Some(Value::String(s)) => s,
            Some(_) => return Err(D::Error::custom("connection 'name' must be a string")),
            None => return Err(D::Error::custom("connection entry is missing 'name'")),
        };

        match name.as_str() {
            "twitter" => serde_json::from_value(Value::Object(entry))
                .map(ConnectionConfig::Twitter)
                .map_err(D::Error::custom),
            "openai" => serde_json::from_value(Value::Object(entry))
                .map(ConnectionConfig::OpenAi)
                .map_err(D::Error::custom),
            "anthropic" => serde_json::from_value(Value::Object(entry))
                .map(ConnectionConfig::Anthropic)
                .map_err(D::Error::custom),
            _ => Ok(ConnectionConfig::Other(GenericConfig {
                name,
                options: entry,
            })),
        }
    }
}

impl Serialize for ConnectionConfig {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = match self {
            ConnectionConfig::Twitter(c) => to_object(c)?,
            ConnectionConfig::OpenAi(c) => to_object(c)?,
            ConnectionConfig::Anthropic(c) => to_object(c)?,
            ConnectionConfig::Other(c) => c.options.clone(),
        };
        map.insert("name".to_string(), Value::String(self.name().to_string()));
        map.serialize(serializer)
    }
}

fn to_object<T: Serialize, E: serde::ser::Error>(config: &T) -> Result<Map<String, Value>, E> {
    match serde_json::to_value(config) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(E::custom("connection config did not serialize to an object")),
        Err(e) => Err(E::custom(e)),
    }
}

// ============================================================================
// Twitter
// ============================================================================

/// Options for the `twitter` connection.
///
/// All fields are optional in the document; accessors supply defaults so
/// that omitted fields stay omitted when the profile is serialized back.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TwitterConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeline_read_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tweet_interval: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub own_tweet_replies_count: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TwitterConfig {
    /// How many tweets to pull when replenishing the timeline queue.
    pub fn timeline_read_count(&self) -> usize {
        self.timeline_read_count.unwrap_or(15) as usize
    }

    /// Minimum gap between two posted tweets.
    pub fn tweet_interval(&self) -> Duration {
        Duration::from_secs(self.tweet_interval.unwrap_or(900) as u64)
    }

    /// How many replies to an own tweet get queued for response.
    pub fn own_tweet_replies_count(&self) -> usize {
        self.own_tweet_replies_count.unwrap_or(2) as usize
    }

    fn validate(&self) -> Result<(), AgentLoadError> {
        require_positive("config.twitter.timeline_read_count", self.timeline_read_count)?;
        require_positive("config.twitter.tweet_interval", self.tweet_interval)?;
        if let Some(n) = self.own_tweet_replies_count {
            if n < 0 {
                return Err(AgentLoadError::validation(
                    "config.twitter.own_tweet_replies_count",
                    format!("must not be negative, got {n}"),
                ));
            }
        }
        Ok(())
    }
}

// ============================================================================
// OpenAI
// ============================================================================

/// Options for the `openai` connection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OpenAiConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl OpenAiConfig {
    pub fn model(&self) -> &str {
        self.model.as_deref().unwrap_or("gpt-3.5-turbo")
    }

    pub fn temperature(&self) -> Option<f32> {
        self.temperature.map(|t| t as f32)
    }

    pub fn max_tokens(&self) -> Option<u32> {
        self.max_tokens.map(|n| n as u32)
    }

    fn validate(&self) -> Result<(), AgentLoadError> {
        if let Some(t) = self.temperature {
            if !(0.0..=2.0).contains(&t) {
                return Err(AgentLoadError::validation(
                    "config.openai.temperature",
                    format!("must be between 0.0 and 2.0, got {t}"),
                ));
            }
        }
        require_positive("config.openai.max_tokens", self.max_tokens)
    }
}

// ============================================================================
// Anthropic
// ============================================================================

/// Options for the `anthropic` connection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnthropicConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AnthropicConfig {
    pub fn model(&self) -> &str {
        self.model.as_deref().unwrap_or("claude-3-5-sonnet-20241022")
    }

    pub fn max_tokens(&self) -> Option<u32> {
        self.max_tokens.map(|n| n as u32)
    }

    fn validate(&self) -> Result<(), AgentLoadError> {
        require_positive("config.anthropic.max_tokens", self.max_tokens)
    }
}

// ============================================================================
// Fallback
// ============================================================================

/// A connection kind this build does not know about, kept losslessly.
#[derive(Debug, Clone, PartialEq)]
pub struct GenericConfig {
    pub name: String,
    pub options: Map<String, Value>,
}

fn require_positive(field: &'static str, value: Option<i64>) -> Result<(), AgentLoadError> {
    match value {
        Some(n) if n <= 0 => Err(AgentLoadError::validation(
            field,
            format!("must be a positive integer, got {n}"),
        )),
        _ => Ok(()),
    }
}

// ============================================================================
// Tests
// ============================================================================
