//! Command-line invoker for the lot ledger.
//!
//! ```text
//! lot-ledger --config ledger.toml InitLedger
//! lot-ledger --config ledger.toml CreateAsset 006 Seed 2026-10-01 "3 grams"
//! lot-ledger --config ledger.toml GetAllAssets
//! ```
//!
//! Without `--config` the ledger lives in memory for the duration of one
//! invocation.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use lot_ledger::{Config, LotContract, LotLedger};
use tracing_subscriber::EnvFilter;

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(about = "Invoke lot ledger operations")]
struct Args {
    /// Path to config file (TOML).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Operation to invoke, e.g. CreateAsset or GetAllAssets.
    function: String,

    /// Positional arguments of the operation.
    args: Vec<String>,
}

impl Args {
    fn load_config(&self) -> anyhow::Result<Config> {
        match &self.config {
            Some(path) => {
                let contents = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read config {}", path.display()))?;
                let config: Config = toml::from_str(&contents)
                    .with_context(|| format!("failed to parse config {}", path.display()))?;
                Ok(config)
            }
            None => Ok(Config::default()),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = args.load_config()?;

    let contract = LotContract::new(LotLedger::open(config).await?);
    let result = contract.invoke(&args.function, args.args.as_slice()).await;
    contract.into_ledger().close().await?;

    let output = result?;
    if !output.is_empty() {
        println!("{}", output);
    }
    Ok(())
}
