//! simsweep - all-pairs cosine similarity over embedded text records
//!
//! Loads a corpus of precomputed embedding vectors, then either benchmarks
//! the full pairwise sweep or ranks every record's nearest neighbors
//! (translation-memory style fuzzy matching).

mod cli;
mod config;
mod ingest;
mod reporters;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    // RUST_LOG wins over --log-level; logs go to stderr so reports stay pipeable
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    cli::run(cli)
}
