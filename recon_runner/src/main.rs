use std::path::PathBuf;

use clap::Parser;
use ledger_tools::{LedgerApi, LedgerConfig};
use log::*;
use recon_engine::{sources::CsvFileSource, stores::JsonFileStore, ReconPipeline};

/// Reconcile one e-commerce order export into double-entry ledger postings.
///
/// Runs are not idempotent: reprocessing the same export will double-post any order that was already recorded.
/// Check the ledger before re-running a partially failed batch.
#[derive(Parser, Debug)]
#[command(version)]
pub struct Arguments {
    /// Path to the order export CSV file (line-item granular, header row first)
    #[arg(short = 'f', long = "file")]
    export: PathBuf,
    /// Path to the JSON credential bundle. Rewritten on every run when the refresh token rotates.
    #[arg(short = 'c', long = "credentials", default_value = "credentials.json")]
    credentials: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();
    let args = Arguments::parse();
    let config = LedgerConfig::new_from_env_or_default();
    let ledger = LedgerApi::new(config)?;
    let store = JsonFileStore::new(&args.credentials);
    let source = CsvFileSource::new(&args.export);
    let pipeline = ReconPipeline::new(ledger, store, source);
    let summary = pipeline.run().await?;
    if !summary.failed.is_empty() {
        warn!("{} orders failed to post and need manual follow-up", summary.failed.len());
    }
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
