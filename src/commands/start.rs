//! `start` command implementation.

use std::path::Path;
use std::sync::Arc;

use anyhow::{anyhow, bail, Result};
use tokio::signal;
use tokio::sync::watch;
use tracing::info;

use mino::agent::{AgentLoadError, AgentStore};
use mino::credentials::CredentialStore;
use mino::llm::ProviderRegistry;
use mino::scheduler::{AgentRunner, TaskSelector};
use mino::social::{TwitterClient, TwitterCredentials, DEFAULT_BASE_URL};

pub async fn run(
    agent_name: &str,
    config_path: &str,
    agents_dir_override: Option<&Path>,
    seed: Option<u64>,
) -> Result<()> {
    let config = super::load_config(config_path, agents_dir_override)?;
    let store = AgentStore::new(config.resolved_agents_dir(config_path));

    let profile = match store.load(agent_name) {
        Ok(profile) => profile,
        Err(AgentLoadError::NotFound(_)) => {
            let available = store.list().unwrap_or_default();
            let available = if available.is_empty() {
                "none".to_string()
            } else {
                available.join(", ")
            };
            bail!("Agent '{agent_name}' not found. Available agents: {available}");
        }
        Err(e) => return Err(e.into()),
    };

    let selector = match seed {
        Some(seed) => TaskSelector::with_seed(&profile.tasks, seed),
        None => TaskSelector::new(&profile.tasks),
    }?;

    let credentials_path = config.resolved_credentials_path(config_path);
    let credentials = CredentialStore::load(&credentials_path)?;
    let registry = ProviderRegistry::new(credentials);

    let llm_connection = profile
        .llm_connection()
        .ok_or_else(|| anyhow!("Agent '{agent_name}' configures no LLM provider connection"))?;
    let llm = registry.get(llm_connection).ok_or_else(|| {
        anyhow!(
            "Provider '{0}' is not configured. Set the API key environment variable \
             or run `mino configure-connection {0}`.",
            llm_connection.name()
        )
    })?;

    let twitter_credentials = TwitterCredentials::resolve(registry.credentials())?;
    let own_username = twitter_credentials.username.clone();
    let twitter = Arc::new(TwitterClient::new(
        registry.client().clone(),
        DEFAULT_BASE_URL.to_string(),
        twitter_credentials,
    ));

    let runner = AgentRunner::new(profile, llm, twitter, selector, Some(own_username))?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let loop_handle = tokio::spawn(runner.run(shutdown_rx));

    shutdown_signal().await;
    info!("Shutdown requested, stopping at the next tick boundary");
    let _ = shutdown_tx.send(true);
    loop_handle.await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
