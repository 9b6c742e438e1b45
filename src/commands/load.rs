//! `load-agent` command implementation.

use std::path::Path;

use anyhow::Result;

use mino::agent::AgentStore;

pub fn run(name: &str, config_path: &str, agents_dir_override: Option<&Path>) -> Result<()> {
    let config = super::load_config(config_path, agents_dir_override)?;
    let store = AgentStore::new(config.resolved_agents_dir(config_path));

    let profile = store.load(name)?;

    println!("Loaded agent '{}'", profile.name);
    println!("  loop delay: {}s", profile.loop_delay);
    println!("  bio lines: {}", profile.bio.len());
    println!("  traits: {}", profile.traits.join(", "));

    let connections: Vec<&str> = profile.connections.iter().map(|c| c.name()).collect();
    println!("  connections: {}", connections.join(", "));

    println!("  tasks:");
    for task in &profile.tasks {
        println!("    - {} (weight {}): {}", task.name, task.weight, task.description);
    }

    if !profile.is_runnable() {
        println!("  note: this agent has no tasks and cannot be started");
    }
    Ok(())
}
