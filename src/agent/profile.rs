//! Agent profile model and validation.
//!
//! An [`AgentProfile`] is parsed from a JSON document in two stages: the raw
//! serde shape first, then invariant checks that turn schema violations into
//! [`AgentLoadError::Validation`] with the offending field. A validated
//! profile is immutable for the duration of a run and serializes back to the
//! document it was loaded from.

use std::collections::HashSet;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::connection::{ConnectionConfig, TwitterConfig};
use super::error::AgentLoadError;

/// Fields every agent document must carry. Absence is a validation error,
/// not a parse error: the document itself is well-formed.
const REQUIRED_FIELDS: [&str; 7] = [
    "name",
    "bio",
    "traits",
    "examples",
    "loop_delay",
    "config",
    "tasks",
];

/// A named persona configuration driving automated social-media behavior.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentProfile {
    pub name: String,
    /// Lore/background lines, order-significant for prompt construction.
    pub bio: Vec<String>,
    pub traits: Vec<String>,
    /// Sample outputs used for style grounding.
    pub examples: Vec<String>,
    /// Seconds between scheduler ticks.
    pub loop_delay: u64,
    #[serde(rename = "config")]
    pub connections: Vec<ConnectionConfig>,
    pub tasks: Vec<TaskSpec>,
}

/// A weighted candidate action selectable by the scheduler.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskSpec {
    pub name: String,
    pub weight: u32,
    pub description: String,
}

#[derive(Debug, Deserialize)]
struct RawAgentProfile {
    name: String,
    bio: Vec<String>,
    traits: Vec<String>,
    examples: Vec<String>,
    loop_delay: i64,
    config: Vec<ConnectionConfig>,
    tasks: Vec<RawTaskSpec>,
}

#[derive(Debug, Deserialize)]
struct RawTaskSpec {
    name: String,
    weight: i64,
    description: String,
}

impl AgentProfile {
    /// Parse and validate an agent document.
    pub fn from_document(document: Value) -> Result<Self, AgentLoadError> {
        let Some(object) = document.as_object() else {
            return Err(AgentLoadError::validation(
                "document",
                "agent document root must be a JSON object",
            ));
        };

        for field in REQUIRED_FIELDS {
            if !object.contains_key(field) {
                return Err(AgentLoadError::Validation {
                    field,
                    reason: "missing required field".to_string(),
                });
            }
        }

        let raw: RawAgentProfile = serde_json::from_value(document)?;

        if raw.name.trim().is_empty() {
            return Err(AgentLoadError::validation("name", "must not be empty"));
        }

        if raw.loop_delay <= 0 {
            return Err(AgentLoadError::validation(
                "loop_delay",
                format!("must be a positive integer, got {}", raw.loop_delay),
            ));
        }

        let mut connection_names = HashSet::new();
        for connection in &raw.config {
            connection.validate()?;
            if !connection_names.insert(connection.name().to_string()) {
                return Err(AgentLoadError::validation(
                    "config",
                    format!("duplicate connection name '{}'", connection.name()),
                ));
            }
        }

        let mut task_names = HashSet::new();
        let mut tasks = Vec::with_capacity(raw.tasks.len());
        for task in raw.tasks {
            if task.weight < 1 {
                return Err(AgentLoadError::validation(
                    "tasks",
                    format!("task '{}' has weight {}, must be >= 1", task.name, task.weight),
                ));
            }
            if !task_names.insert(task.name.clone()) {
                return Err(AgentLoadError::validation(
                    "tasks",
                    format!("duplicate task name '{}'", task.name),
                ));
            }
            tasks.push(TaskSpec {
                name: task.name,
                weight: task.weight as u32,
                description: task.description,
            });
        }

        Ok(AgentProfile {
            name: raw.name,
            bio: raw.bio,
            traits: raw.traits,
            examples: raw.examples,
            loop_delay: raw.loop_delay as u64,
            connections: raw.config,
            tasks,
        })
    }

    /// Delay between scheduler ticks.
    pub fn loop_delay(&self) -> Duration {
        Duration::from_secs(self.loop_delay)
    }

    /// Whether the scheduler can select anything at all.
    pub fn is_runnable(&self) -> bool {
        !self.tasks.is_empty()
    }

    /// Look up a connection by name.
    pub fn connection(&self, name: &str) -> Option<&ConnectionConfig> {
        self.connections.iter().find(|c| c.name() == name)
    }

    /// The first configured LLM provider connection, if any.
    pub fn llm_connection(&self) -> Option<&ConnectionConfig> {
        self.connections.iter().find(|c| c.is_llm_provider())
    }

    /// The twitter connection options, if configured.
    pub fn twitter(&self) -> Option<&TwitterConfig> {
        self.connections.iter().find_map(|c| match c {
            ConnectionConfig::Twitter(t) => Some(t),
            _ => None,
        })
    }

    /// Build the system prompt from the persona: bio lines first, then the
    /// trait list, then the style examples with a do-not-repeat instruction.
    pub fn system_prompt(&self) -> String {
        let mut parts: Vec<String> = self.bio.clone();

        if !self.traits.is_empty() {
            parts.push("\nYour key traits are:".to_string());
            parts.extend(self.traits.iter().map(|t| format!("- {t}")));
        }

        if !self.examples.is_empty() {
            parts.push(
                "\nHere are some examples of your style (please avoid repeating any of these):"
                    .to_string(),
            );
            parts.extend(self.examples.iter().map(|e| format!("- {e}")));
        }

        parts.join("\n")
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_document() -> Value {
        json!({
            "name": "Mino",
            "bio": ["line1"],
            "traits": ["Curious"],
            "examples": ["ex1"],
            "loop_delay": 60,
            "config": [
                {
                    "name": "twitter",
                    "timeline_read_count": 15,
                    "tweet_interval": 600,
                    "own_tweet_replies_count": 3
                },
                {"name": "openai", "model": "gpt-4"}
            ],
            "tasks": [
                {"name": "post-tweet", "weight": 2, "description": "Post a new tweet"}
            ]
        })
    }

    #[test]
    fn load_valid_document() {
        let profile = AgentProfile::from_document(sample_document()).unwrap();
        assert_eq!(profile.name, "Mino");
        assert_eq!(profile.bio, vec!["line1"]);
        assert_eq!(profile.loop_delay(), Duration::from_secs(60));
        assert_eq!(profile.connections.len(), 2);
        assert_eq!(profile.tasks.len(), 1);
        assert_eq!(profile.tasks[0].weight, 2);
        assert!(profile.is_runnable());
    }

    #[test]
    fn round_trip_preserves_document() {
        let document = sample_document();
        let profile = AgentProfile::from_document(document.clone()).unwrap();
        assert_eq!(serde_json::to_value(&profile).unwrap(), document);
    }

    #[test]
    fn missing_name_is_validation_error() {
        let mut document = sample_document();
        document.as_object_mut().unwrap().remove("name");
        let err = AgentProfile::from_document(document).unwrap_err();
        assert!(matches!(
            err,
            AgentLoadError::Validation { field: "name", .. }
        ));
    }

    #[test]
    fn missing_tasks_is_validation_error() {
        let mut document = sample_document();
        document.as_object_mut().unwrap().remove("tasks");
        let err = AgentProfile::from_document(document).unwrap_err();
        assert!(matches!(
            err,
            AgentLoadError::Validation { field: "tasks", .. }
        ));
    }

    #[test]
    fn non_positive_loop_delay_is_validation_error() {
        for delay in [0, -30] {
            let mut document = sample_document();
            document["loop_delay"] = json!(delay);
            let err = AgentProfile::from_document(document).unwrap_err();
            assert!(matches!(
                err,
                AgentLoadError::Validation {
                    field: "loop_delay",
                    ..
                }
            ));
        }
    }

    #[test]
    fn empty_name_is_validation_error() {
        let mut document = sample_document();
        document["name"] = json!("  ");
        let err = AgentProfile::from_document(document).unwrap_err();
        assert!(matches!(
            err,
            AgentLoadError::Validation { field: "name", .. }
        ));
    }

    #[test]
    fn duplicate_task_names_rejected() {
        let mut document = sample_document();
        document["tasks"] = json!([
            {"name": "post-tweet", "weight": 2, "description": "a"},
            {"name": "post-tweet", "weight": 1, "description": "b"}
        ]);
        let err = AgentProfile::from_document(document).unwrap_err();
        match err {
            AgentLoadError::Validation { field, reason } => {
                assert_eq!(field, "tasks");
                assert!(reason.contains("duplicate"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn duplicate_connection_names_rejected() {
        let mut document = sample_document();
        document["config"] = json!([
            {"name": "openai", "model": "gpt-4"},
            {"name": "openai", "model": "gpt-3.5-turbo"}
        ]);
        let err = AgentProfile::from_document(document).unwrap_err();
        assert!(matches!(
            err,
            AgentLoadError::Validation { field: "config", .. }
        ));
    }

    #[test]
    fn zero_weight_task_rejected() {
        let mut document = sample_document();
        document["tasks"] = json!([
            {"name": "post-tweet", "weight": 0, "description": "a"}
        ]);
        let err = AgentProfile::from_document(document).unwrap_err();
        assert!(matches!(
            err,
            AgentLoadError::Validation { field: "tasks", .. }
        ));
    }

    #[test]
    fn empty_task_list_loads_but_is_not_runnable() {
        let mut document = sample_document();
        document["tasks"] = json!([]);
        let profile = AgentProfile::from_document(document).unwrap();
        assert!(!profile.is_runnable());
    }

    #[test]
    fn system_prompt_layout() {
        let profile = AgentProfile::from_document(sample_document()).unwrap();
        let prompt = profile.system_prompt();
        assert!(prompt.starts_with("line1"));
        let traits_at = prompt.find("Your key traits are:").unwrap();
        let examples_at = prompt.find("examples of your style").unwrap();
        assert!(traits_at < examples_at);
        assert!(prompt.contains("- Curious"));
        assert!(prompt.contains("- ex1"));
    }

    #[test]
    fn llm_connection_prefers_first_provider() {
        let profile = AgentProfile::from_document(sample_document()).unwrap();
        let llm = profile.llm_connection().unwrap();
        assert_eq!(llm.name(), "openai");
        assert!(profile.twitter().is_some());
    }

    #[test]
    fn non_object_document_rejected() {
        let err = AgentProfile::from_document(json!(["not", "an", "object"])).unwrap_err();
        assert!(matches!(err, AgentLoadError::Validation { .. }));
    }
}
