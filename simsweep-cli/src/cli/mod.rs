//! CLI command definitions and handlers

mod bench;
mod compare;
mod init;
mod search;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use console::style;
use std::path::{Path, PathBuf};

use crate::config::{load_config_file, load_project_config, ProjectConfig, MAX_WORKERS};
use crate::reporters::OutputFormat;

/// Parse and validate workers count (1-256)
fn parse_workers(s: &str) -> Result<usize, String> {
    let n: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;
    if n == 0 {
        Err("workers must be at least 1".to_string())
    } else if n > MAX_WORKERS {
        Err(format!("workers cannot exceed {}", MAX_WORKERS))
    } else {
        Ok(n)
    }
}

/// Parse and validate top-k (at least 1)
fn parse_top_k(s: &str) -> Result<usize, String> {
    let k: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;
    if k == 0 {
        Err("top-k must be at least 1".to_string())
    } else {
        Ok(k)
    }
}

/// simsweep - brute-force cosine similarity over embedded records
#[derive(Parser, Debug)]
#[command(name = "simsweep")]
#[command(
    version,
    about = "Brute-force cosine similarity: all-pairs throughput and exact top-K neighbors",
    long_about = "simsweep scores every pair of embedded records with cosine similarity. \
It can time a full all-pairs sweep, or report the exact top-K most similar records \
for every record in a corpus.\n\n\
Input is a JSON array or JSON Lines file of {\"id\", \"text\", \"vector\"} records.",
    after_help = "\
Examples:
  simsweep bench --random 1000 --dim 25        Time a sweep over synthetic vectors
  simsweep bench corpus.jsonl --workers 1      Single-threaded baseline
  simsweep search corpus.jsonl --top-k 5       Top-5 neighbors per record
  simsweep search corpus.jsonl --format json   JSON output for scripting
  simsweep compare corpus.jsonl row-1 row-2    Score one pair
  simsweep init                                Write an example simsweep.toml"
)]
pub struct Cli {
    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info", value_parser = ["error", "warn", "info", "debug", "trace"])]
    pub log_level: String,

    /// Number of worker threads (1-256, default: all available)
    #[arg(long, global = true, env = "SIMSWEEP_WORKERS", value_parser = parse_workers)]
    pub workers: Option<usize>,

    /// Config file (default: ./simsweep.toml when present)
    #[arg(long, global = true, env = "SIMSWEEP_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Time a full all-pairs sweep (scores are computed and discarded)
    #[command(after_help = "\
Examples:
  simsweep bench corpus.jsonl                  Sweep a corpus file
  simsweep bench --random 5000 --dim 384       Synthetic unit vectors
  simsweep bench --random 1000 --seed 7        Different synthetic corpus")]
    Bench {
        /// Corpus file (JSON array or JSON Lines)
        #[arg(required_unless_present = "random")]
        input: Option<PathBuf>,

        /// Generate N random unit vectors instead of reading a file
        #[arg(long, value_name = "N", conflicts_with = "input")]
        random: Option<usize>,

        /// Dimensionality of generated vectors
        #[arg(long, default_value = "25", requires = "random")]
        dim: usize,

        /// Seed for generated vectors
        #[arg(long, default_value_t = simsweep_fast::synthetic::DEFAULT_SEED, requires = "random")]
        seed: u64,

        /// Output format: text, json
        #[arg(long, short = 'f', value_parser = ["text", "json"])]
        format: Option<String>,
    },

    /// Report the top-K most similar records for every record
    Search {
        /// Corpus file (JSON array or JSON Lines)
        input: PathBuf,

        /// Neighbors kept per record
        #[arg(long, short = 'k', env = "SIMSWEEP_TOP_K", value_parser = parse_top_k)]
        top_k: Option<usize>,

        /// Metric precision: single, double
        #[arg(long, env = "SIMSWEEP_PRECISION", value_parser = ["single", "double"])]
        precision: Option<String>,

        /// Output format: text, json
        #[arg(long, short = 'f', value_parser = ["text", "json"])]
        format: Option<String>,

        /// Hide matches scoring below this value
        #[arg(long)]
        min_score: Option<f64>,

        /// Output file path (default: stdout)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Score a single pair of records by id
    Compare {
        /// Corpus file (JSON array or JSON Lines)
        input: PathBuf,

        /// Id of the first record
        id_a: String,

        /// Id of the second record
        id_b: String,

        /// Metric precision: single, double
        #[arg(long, env = "SIMSWEEP_PRECISION", value_parser = ["single", "double"])]
        precision: Option<String>,
    },

    /// Write an example simsweep.toml in the current directory
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Explicit `--config` must load; the implicit ./simsweep.toml is best-effort.
fn resolve_config(explicit: Option<&Path>) -> Result<ProjectConfig> {
    match explicit {
        Some(path) => load_config_file(path),
        None => Ok(load_project_config(Path::new("."))),
    }
}

/// `--format` flag wins over the `[output]` table.
fn resolve_format(flag: Option<&str>, config: &ProjectConfig) -> Result<OutputFormat> {
    flag.unwrap_or_else(|| config.format()).parse()
}

/// Print a rendered report, or write it to `path`.
fn emit(output: &str, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, output)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            // stderr keeps stdout clean for machine-readable formats
            eprintln!(
                "{} Report written to: {}",
                style("✓").green(),
                style(path.display()).cyan()
            );
        }
        None => println!("{}", output.trim_end()),
    }
    Ok(())
}

/// Run the CLI with parsed arguments
pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Init { force } => init::run(Path::new("."), force),

        Commands::Bench {
            input,
            random,
            dim,
            seed,
            format,
        } => {
            let config = resolve_config(cli.config.as_deref())?;
            let source = match random {
                Some(n) => bench::Source::Random { n, dim, seed },
                // clap guarantees one of the two
                None => bench::Source::File(input.unwrap_or_default()),
            };
            bench::run(&config, source, cli.workers, format.as_deref())
        }

        Commands::Search {
            input,
            top_k,
            precision,
            format,
            min_score,
            output,
        } => {
            let config = resolve_config(cli.config.as_deref())?;
            search::run(
                &config,
                &input,
                search::SearchOptions {
                    workers: cli.workers,
                    top_k,
                    precision: precision.as_deref(),
                    format: format.as_deref(),
                    min_score,
                    output: output.as_deref(),
                },
            )
        }

        Commands::Compare {
            input,
            id_a,
            id_b,
            precision,
        } => {
            let config = resolve_config(cli.config.as_deref())?;
            compare::run(&config, &input, &id_a, &id_b, precision.as_deref())
        }
    }
}
