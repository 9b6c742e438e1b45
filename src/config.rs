//! Runtime configuration.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::credentials::CredentialStore;

#[derive(Debug, Deserialize)]
pub struct Config {
    /// Directory holding `<name>.json` agent documents.
    #[serde(default = "default_agents_dir")]
    pub agents_dir: PathBuf,
    /// Where connection secrets are stored. Defaults to
    /// `~/.mino/credentials.json`.
    #[serde(default)]
    pub credentials_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            agents_dir: default_agents_dir(),
            credentials_path: None,
        }
    }
}

impl Config {
    /// Load configuration from a YAML file. A missing file yields defaults.
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let contents = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(ConfigError::Io(e)),
        };
        serde_saphyr::from_str(&contents).map_err(ConfigError::Yaml)
    }

    /// The agents directory, resolved relative to the config file's
    /// directory when it is relative.
    pub fn resolved_agents_dir(&self, config_path: &str) -> PathBuf {
        resolve_path(Path::new(config_path), &self.agents_dir)
    }

    /// The credentials file path, resolved the same way.
    pub fn resolved_credentials_path(&self, config_path: &str) -> PathBuf {
        match &self.credentials_path {
            Some(path) => resolve_path(Path::new(config_path), path),
            None => CredentialStore::default_path(),
        }
    }
}

fn default_agents_dir() -> PathBuf {
    PathBuf::from("agents")
}

/// Resolve `path` relative to the directory containing `config_path`.
pub fn resolve_path(config_path: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    let config_dir = config_path.parent().unwrap_or_else(|| Path::new("."));
    config_dir.join(path)
}

// ============================================================================
// ConfigError
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Yaml(serde_saphyr::Error),
}

// ============================================================================
// Tests
// ============================================================================
