use anyhow::{Context, Result};
use colored::Colorize;
use futures::future::join_all;
use multicall_call::{Call, Invocation, Transport};
use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use super::{connect, CallSpec};
use crate::config::Config;

pub fn load_specs(path: &Path) -> Result<Vec<CallSpec>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read batch file {:?}", path))?;
    serde_json::from_str(&contents).with_context(|| format!("Failed to parse batch file {:?}", path))
}

/// Run every call in `file` concurrently on the async path. Results are
/// printed in input order; one failed call does not abort the batch.
pub async fn execute(file: &Path, config: &Config) -> Result<()> {
    let specs = load_specs(file)?;
    let transport: Arc<dyn Transport> = connect(config)?;

    let calls = specs
        .iter()
        .enumerate()
        .map(|(index, spec)| {
            spec.build(Arc::clone(&transport))
                .with_context(|| format!("Invalid call #{} in batch", index))
        })
        .collect::<Result<Vec<Call>>>()?;

    info!(calls = calls.len(), endpoint = %config.rpc_endpoint, "running batch");
    let results = join_all(calls.iter().map(|call| call.invoke_async(Invocation::new()))).await;

    let mut failures = 0;
    let rendered: Vec<Value> = calls
        .iter()
        .zip(results)
        .map(|(call, result)| match result {
            Ok(result) => json!({ "call": call.to_string(), "result": result }),
            Err(err) => {
                failures += 1;
                json!({ "call": call.to_string(), "error": err.to_string() })
            }
        })
        .collect();

    println!("{}", serde_json::to_string_pretty(&rendered)?);

    if failures == 0 {
        eprintln!("{} {} calls succeeded", "✓".green(), rendered.len());
    } else {
        eprintln!(
            "{} {} of {} calls failed",
            "✗".red(),
            failures,
            rendered.len()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_load_specs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("batch.json");
        fs::write(
            &path,
            r#"[
                {"address": "0x06AF07097C9Eeb7fD685c692751D5C66dB49c215", "signature": "name()(string)", "returns": ["name"]},
                {"address": "0x06AF07097C9Eeb7fD685c692751D5C66dB49c215", "signature": "balanceOf(address)(uint256)",
                 "args": ["0x3ee18B2214AFF97000D974cf647E7C347E8fa585"], "returns": ["balance:wei"], "block": "latest"}
            ]"#,
        )
        .unwrap();

        let specs = load_specs(&path).unwrap();
        assert_eq!(specs.len(), 2);
        assert_eq!(specs[1].args.len(), 1);
        assert_eq!(specs[1].block.as_deref(), Some("latest"));
    }

    #[test]
    fn test_load_specs_rejects_objects() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("batch.json");
        fs::write(&path, r#"{"address": "0x00"}"#).unwrap();
        assert!(load_specs(&path).is_err());
    }
}
