use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use multicall_call::{Invocation, Transport};
use std::sync::Arc;
use tracing::debug;

use super::{connect, CallSpec};
use crate::config::Config;

#[derive(Args, Debug)]
pub struct CallArgs {
    /// Contract address
    pub address: String,

    /// Function signature with outputs, e.g. "balanceOf(address)(uint256)"
    pub signature: String,

    /// Function arguments, one per input type
    #[arg(allow_hyphen_values = true)]
    pub args: Vec<String>,

    /// Named output as name[:handler]; handlers: wei, gwei, decN, hex, string, bool-success
    #[arg(short = 'R', long = "returns")]
    pub returns: Vec<String>,

    /// Block number, 0x quantity or tag (latest, pending, safe, finalized, earliest)
    #[arg(short, long)]
    pub block: Option<String>,

    /// Gas limit for the simulated call
    #[arg(short, long)]
    pub gas: Option<u64>,

    /// Address the call is simulated from
    #[arg(long)]
    pub from: Option<String>,

    /// Bytecode replacing the target's code for this call
    #[arg(long)]
    pub override_code: Option<String>,

    /// Use the async execution path
    #[arg(long = "async")]
    pub use_async: bool,
}

impl From<CallArgs> for CallSpec {
    fn from(args: CallArgs) -> Self {
        Self {
            address: args.address,
            signature: args.signature,
            args: args.args,
            returns: args.returns,
            block: args.block,
            gas: args.gas,
            from: args.from,
            override_code: args.override_code,
        }
    }
}

pub async fn execute(args: CallArgs, config: &Config) -> Result<()> {
    let use_async = args.use_async;
    let transport: Arc<dyn Transport> = connect(config)?;
    let call = CallSpec::from(args).build(transport)?;
    let label = call.to_string();
    debug!(call = %label, use_async, "executing");

    let result = if use_async {
        call.invoke_async(Invocation::new()).await?
    } else {
        // The blocking client owns a runtime of its own, so the call and its
        // transport must be used and dropped off the async executor.
        tokio::task::spawn_blocking(move || call.invoke(Invocation::new()))
            .await
            .context("Blocking call task failed")??
    };

    eprintln!("{} {}", "✓".green(), label.bold());
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
