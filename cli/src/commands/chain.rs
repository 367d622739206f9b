use anyhow::{Context, Result};
use colored::Colorize;
use multicall_call::{Engine, Transport};
use serde_json::json;

use super::connect;
use crate::config::Config;

/// Print the endpoint's chain id, network name and state-override support
pub async fn execute(config: &Config) -> Result<()> {
    let transport = connect(config)?;
    let chain_id = transport
        .chain_id_async()
        .await
        .with_context(|| format!("Failed to query chain id from {}", config.rpc_endpoint))?;

    let registry = Engine::global().registry();
    let network = registry.resolve(chain_id);
    let supports_override = registry.supports_state_override(network);

    eprintln!("{} {}", "Network:".bold(), network.to_string().cyan());
    println!(
        "{}",
        serde_json::to_string_pretty(&json!({
            "endpoint": config.rpc_endpoint,
            "chain_id": chain_id,
            "network": network.name(),
            "state_override": supports_override,
        }))?
    );
    Ok(())
}
