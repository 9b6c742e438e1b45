//! `configure-connection` command implementation.

use std::io::{self, Write};

use anyhow::{bail, Result};

use mino::credentials::CredentialStore;

/// Secrets each known connection kind needs, with a prompt label.
fn secret_keys(connection: &str) -> Option<&'static [(&'static str, &'static str)]> {
    match connection {
        "twitter" => Some(&[
            ("access_token", "Twitter API access token"),
            ("user_id", "Twitter numeric user id"),
            ("username", "Twitter account handle (without @)"),
        ]),
        "openai" => Some(&[("api_key", "OpenAI API key")]),
        "anthropic" => Some(&[("api_key", "Anthropic API key")]),
        _ => None,
    }
}

pub fn run(name: &str, config_path: &str) -> Result<()> {
    let Some(keys) = secret_keys(name) else {
        bail!("Unknown connection '{name}'. Known connections: twitter, openai, anthropic");
    };

    let config = super::load_config(config_path, None)?;
    let path = config.resolved_credentials_path(config_path);
    let mut store = CredentialStore::load(&path)?;

    if store.has_connection(name) {
        println!("Connection '{name}' is already configured. Leave a prompt empty to keep the stored value.");
    }

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    for (key, label) in keys {
        print!("{label}: ");
        stdout.flush()?;

        let mut input = String::new();
        stdin.read_line(&mut input)?;
        let value = input.trim();
        if !value.is_empty() {
            store.set(name, key, value);
        }
    }

    store.save(&path)?;
    println!("Saved credentials for '{name}' to {}", path.display());
    Ok(())
}
