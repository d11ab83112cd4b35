//! Bench command - time a full all-pairs sweep

use anyhow::{Context, Result};
use simsweep_fast::{synthetic, SimilarityEngine, VectorCorpus};
use std::path::PathBuf;
use tracing::info;

use super::{emit, resolve_format};
use crate::config::ProjectConfig;
use crate::ingest::load_corpus;
use crate::reporters::render_benchmark;

/// Where the benchmark corpus comes from
#[derive(Debug)]
pub enum Source {
    File(PathBuf),
    Random { n: usize, dim: usize, seed: u64 },
}

impl Source {
    fn load(self) -> Result<VectorCorpus> {
        match self {
            Source::File(path) => Ok(load_corpus(&path)?.corpus),
            Source::Random { n, dim, seed } => {
                info!(
                    "Generating {} random unit vectors (dim {}, seed {})",
                    n, dim, seed
                );
                Ok(synthetic::random_unit_corpus(n, dim, seed))
            }
        }
    }
}

/// Run the bench command
pub fn run(
    config: &ProjectConfig,
    source: Source,
    workers: Option<usize>,
    format: Option<&str>,
) -> Result<()> {
    let format = resolve_format(format, config)?;
    let engine_config = config.engine_config(workers, None, None)?;
    let engine = SimilarityEngine::new(engine_config).context("Failed to start engine")?;

    let corpus = source.load()?;
    let report = engine
        .benchmark_all_pairs(&corpus)
        .context("Full sweep failed")?;
    info!(
        "Scored {} pairs in {} ms on {} threads",
        report.pairs,
        report.elapsed_ms(),
        report.threads
    );

    emit(&render_benchmark(&report, format)?, None)
}
