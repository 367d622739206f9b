// multicall/cli/src/main.rs

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use multicall_call::Engine;
use std::path::PathBuf;
use tracing::warn;

mod commands;
mod config;
mod logging;

use commands::call::CallArgs;
use config::Config;
use logging::{init_logging, LogConfig};

#[derive(Parser)]
#[command(
    name = "multicall",
    version,
    about = "Read-only smart contract calls with ABI-aware decoding",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, global = true, env = "MULTICALL_CONFIG")]
    config: Option<PathBuf>,

    /// RPC endpoint
    #[arg(short, long, global = true, env = "MULTICALL_RPC")]
    rpc: Option<String>,

    /// Verbosity level
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Call a contract function and print the decoded result
    Call(CallArgs),

    /// Run a JSON array of calls concurrently
    Batch {
        /// Path to the batch file
        file: PathBuf,
    },

    /// Show the endpoint's chain and feature support
    Chain,

    /// Initialize configuration
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&LogConfig::from_env().with_verbosity(cli.verbose))?;

    if let Commands::Init { force } = cli.command {
        let path = Config::init(cli.config.as_deref(), force)?;
        println!(
            "{} {}",
            "✓ Configuration initialized at".green(),
            path.display()
        );
        return Ok(());
    }

    let config = Config::load(cli.config.as_deref(), cli.rpc.as_deref())?;
    if Engine::install_global(&config.engine_config()).is_err() {
        warn!("engine already initialized, ignoring configured engine settings");
    }

    match cli.command {
        Commands::Call(args) => commands::call::execute(args, &config).await?,
        Commands::Batch { file } => commands::batch::execute(&file, &config).await?,
        Commands::Chain => commands::chain::execute(&config).await?,
        Commands::Init { .. } => {}
    }

    Ok(())
}
