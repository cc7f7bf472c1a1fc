// washgraph/src/main.rs
//
// washgraph — wash-trading detection over per-asset NFT transfer graphs
//
// One batch run:
//   load    — CSV / JSONL transaction table, fully materialized, strict
//   detect  — per-token transfer graph → SCC clusters → five detectors
//   report  — console summary + one artifact per detection category
//
// Usage:
//   washgraph --input nft_transactions.csv
//   washgraph --input transfers.jsonl --format jsonl --output ./findings
//   washgraph --input nft_transactions.csv --recurrence-scope accounts --dry-run

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod engine;
mod error;
mod events;
mod loader;
mod report;
mod state;
mod workers;

use config::{ArtifactFormat, DetectorConfig, RecurrenceScope};
use engine::{dispatcher::Dispatcher, pipeline::Pipeline};
use loader::InputFormat;

// ── CLI ───────────────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name    = "washgraph",
    about   = "Wash-trading detection over per-asset transfer graphs",
    version = env!("CARGO_PKG_VERSION"),
)]
struct Cli {
    #[arg(long, default_value = "nft_transactions.csv",
          help = "Transaction table (token_id, from_account, to_account, price, tx_timestamp)")]
    input: PathBuf,

    #[arg(long, value_enum, help = "Input format [default: from file extension]")]
    input_format: Option<InputFormat>,

    #[arg(long, default_value = "./washgraph_output",
          help = "Artifact output directory")]
    output: PathBuf,

    #[arg(long, value_enum, default_value = "csv", help = "Artifact format")]
    format: ArtifactFormat,

    #[arg(long, value_enum, default_value = "asset",
          help = "Key repeated clusters per token (asset) or by account set alone (accounts)")]
    recurrence_scope: RecurrenceScope,

    #[arg(long, default_value = "8", help = "Decimal places for zero-risk balance rounding")]
    price_decimals: u32,

    #[arg(long, default_value = "2", help = "Cluster members a funder must pay to be reported")]
    min_funder_overlap: usize,

    #[arg(long, help = "Print the summary without writing artifacts")]
    dry_run: bool,
}

impl Cli {
    fn detector_config(&self) -> DetectorConfig {
        DetectorConfig {
            price_decimals:     self.price_decimals,
            min_funder_overlap: self.min_funder_overlap,
            recurrence_scope:   self.recurrence_scope,
        }
    }
}

// ── Main ──────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env()
            .add_directive("washgraph=info".parse()?))
        .compact().init();

    let cli          = Cli::parse();
    let input_format = cli.input_format.unwrap_or_else(|| InputFormat::from_path(&cli.input));
    let pipeline     = Pipeline::new(cli.detector_config());
    info!("Input {} ({:?}), {:?}", cli.input.display(), input_format, pipeline.config());

    let records = loader::load_transactions(&cli.input, input_format)
        .await
        .with_context(|| format!("loading {}", cli.input.display()))?;

    let report = pipeline.run(&records).await?;
    report.print_summary();

    if cli.dry_run {
        info!("Dry run: no artifacts written");
        return Ok(());
    }

    let dispatcher = Dispatcher::new(&cli.output, cli.format)?;
    let written    = dispatcher.dispatch(&report).await?;
    info!("Wrote {} artifacts to {}", written.len(), dispatcher.output_dir().display());
    Ok(())
}
