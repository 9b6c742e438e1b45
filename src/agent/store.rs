//! Agent document storage.
//!
//! Agents live as `<name>.json` documents in a single directory. The store
//! is read-only: it resolves names to documents and never mutates them.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use super::error::AgentLoadError;
use super::profile::AgentProfile;

/// Read-only access to a directory of agent documents.
#[derive(Debug, Clone)]
pub struct AgentStore {
    agents_dir: PathBuf,
}

impl AgentStore {
    pub fn new(agents_dir: impl Into<PathBuf>) -> Self {
        Self {
            agents_dir: agents_dir.into(),
        }
    }

    /// The directory this store reads from.
    pub fn agents_dir(&self) -> &Path {
        &self.agents_dir
    }

    /// Load and validate the named agent.
    pub fn load(&self, name: &str) -> Result<AgentProfile, AgentLoadError> {
        let path = self.agents_dir.join(format!("{name}.json"));
        debug!(agent = name, path = %path.display(), "Loading agent document");

        let contents = match fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(AgentLoadError::NotFound(name.to_string()));
            }
            Err(e) => return Err(AgentLoadError::Io(e)),
        };

        let document: Value = serde_json::from_str(&contents)?;
        AgentProfile::from_document(document)
    }

    /// Names of all agents on file, sorted. Each call re-reads the
    /// directory, so the sequence is restartable; sorting keeps it stable
    /// within a process run.
    pub fn list(&self) -> Result<Vec<String>, AgentLoadError> {
        let entries = match fs::read_dir(&self.agents_dir) {
            Ok(e) => e,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(AgentLoadError::Io(e)),
        };

        let mut names = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }
}

// ============================================================================
// Tests
// ============================================================================
