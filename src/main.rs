//! Headless Tick Runner
//!
//! Feeds newline-delimited snapshot JSON through the tactical core and
//! prints one encoded action per line.

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter};
use std::path::PathBuf;

use clap::Parser;
use squad_tactics::battle::TacticalCore;
use squad_tactics::core::{Result, TacticsConfig};

/// Headless Tick Runner - drive the squad AI from recorded snapshots
#[derive(Parser, Debug)]
#[command(name = "squad-tactics")]
#[command(about = "Run snapshots through the squad AI and print encoded actions")]
struct Args {
    /// Tactics config TOML (defaults built in when omitted)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// Snapshot file, one JSON object per line (stdin when omitted)
    #[arg(long)]
    input: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("squad_tactics=info")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => TacticsConfig::load(path)?,
        None => TacticsConfig::default(),
    };
    config.validate()?;

    let seed = args.seed.unwrap_or_else(rand::random);
    tracing::info!("Squad tactics runner starting (seed {})", seed);
    let mut core = TacticalCore::with_seed(&config, seed);

    let reader: Box<dyn BufRead> = match &args.input {
        Some(path) => Box::new(BufReader::new(File::open(path)?)),
        None => Box::new(BufReader::new(io::stdin())),
    };
    let out = BufWriter::new(io::stdout().lock());
    let ticks = core.run_stream(reader, out)?;

    tracing::info!("Processed {} snapshots", ticks);
    Ok(())
}
