//! CLI command implementations.

use std::path::Path;

use anyhow::{Context, Result};

use mino::config::Config;

pub mod configure;
pub mod list;
pub mod load;
pub mod start;

/// Load the runtime config and apply the CLI agents-dir override.
pub(crate) fn load_config(config_path: &str, agents_dir_override: Option<&Path>) -> Result<Config> {
    let mut config = Config::load(config_path)
        .with_context(|| format!("loading config file: {config_path}"))?;
    if let Some(dir) = agents_dir_override {
        config.agents_dir = dir.to_path_buf();
    }
    Ok(config)
}
