//! `list-agents` command implementation.

use std::path::Path;

use anyhow::Result;

use mino::agent::AgentStore;

pub fn run(config_path: &str, agents_dir_override: Option<&Path>) -> Result<()> {
    let config = super::load_config(config_path, agents_dir_override)?;
    let agents_dir = config.resolved_agents_dir(config_path);
    let store = AgentStore::new(&agents_dir);

    let names = store.list()?;
    if names.is_empty() {
        println!("No agents found in {}", agents_dir.display());
        return Ok(());
    }

    println!("Available agents:");
    for name in names {
        println!("- {name}");
    }
    Ok(())
}
