//! Credential storage for connection secrets.
//!
//! `configure-connection` writes API keys and tokens here; the provider
//! registry and the Twitter client read them back, with environment
//! variables taking precedence.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Secrets keyed by connection name, then by option name.
///
/// Persists to `~/.mino/credentials.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CredentialStore {
    #[serde(flatten)]
    connections: HashMap<String, HashMap<String, String>>,
}

impl CredentialStore {
    /// Default path for the credentials file.
    pub fn default_path() -> PathBuf {
        let home = match std::env::var("HOME") {
            Ok(h) => h,
            Err(_) => {
                tracing::warn!("HOME not set, using /tmp for credentials");
                "/tmp".to_string()
            }
        };
        PathBuf::from(home).join(".mino").join("credentials.json")
    }

    /// Load credentials from disk. Returns empty storage if the file
    /// doesn't exist.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => {
                return Err(anyhow::Error::new(e)
                    .context(format!("reading credentials file: {}", path.display())));
            }
        };
        let store: Self = serde_json::from_str(&contents)
            .with_context(|| format!("parsing credentials file: {}", path.display()))?;
        Ok(store)
    }

    /// Save credentials to disk with restricted permissions.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating directory: {}", parent.display()))?;
        }

        let contents = serde_json::to_string_pretty(self)?;

        #[cfg(unix)]
        {
            use std::io::Write;
            use std::os::unix::fs::OpenOptionsExt;
            let mut file = std::fs::OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .mode(0o600)
                .open(path)
                .with_context(|| format!("writing credentials file: {}", path.display()))?;
            file.write_all(contents.as_bytes())
                .with_context(|| format!("writing credentials file: {}", path.display()))?;
            file.sync_all()
                .with_context(|| format!("syncing credentials file: {}", path.display()))?;
        }
        #[cfg(not(unix))]
        {
            std::fs::write(path, &contents)
                .with_context(|| format!("writing credentials file: {}", path.display()))?;
        }

        Ok(())
    }

    /// Get a secret for a connection.
    pub fn get(&self, connection: &str, key: &str) -> Option<&str> {
        self.connections
            .get(connection)
            .and_then(|options| options.get(key))
            .map(String::as_str)
    }

    /// Set a secret for a connection.
    pub fn set(&mut self, connection: &str, key: &str, value: impl Into<String>) {
        self.connections
            .entry(connection.to_string())
            .or_default()
            .insert(key.to_string(), value.into());
    }

    /// Whether any secret is stored for the connection.
    pub fn has_connection(&self, connection: &str) -> bool {
        self.connections
            .get(connection)
            .is_some_and(|options| !options.is_empty())
    }
}
