//! Search command - top-K neighbors for every record

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use simsweep_fast::{Precision, SimilarityEngine};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use super::{emit, resolve_format};
use crate::config::ProjectConfig;
use crate::ingest::load_corpus;
use crate::reporters::{render_matches, MatchReport};

/// Command-line overrides for a search run
#[derive(Debug, Default)]
pub struct SearchOptions<'a> {
    pub workers: Option<usize>,
    pub top_k: Option<usize>,
    pub precision: Option<&'a str>,
    pub format: Option<&'a str>,
    pub min_score: Option<f64>,
    pub output: Option<&'a Path>,
}

/// Run the search command
pub fn run(config: &ProjectConfig, input: &Path, opts: SearchOptions<'_>) -> Result<()> {
    let format = resolve_format(opts.format, config)?;
    let precision = opts
        .precision
        .map(str::parse::<Precision>)
        .transpose()
        .map_err(anyhow::Error::msg)?;
    let engine_config = config.engine_config(opts.workers, opts.top_k, precision)?;

    let loaded = load_corpus(input)?;
    let corpus = loaded.corpus;

    // Draws on stderr and hides itself when stderr is not a terminal.
    let bar = ProgressBar::new(corpus.len() as u64);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} records ({eta})")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-"),
    );
    let progress_bar = bar.clone();
    let engine = SimilarityEngine::new(engine_config)
        .context("Failed to start engine")?
        .with_progress(Arc::new(move |done: usize, _total: usize| {
            progress_bar.set_position(done as u64);
        }));

    let top = engine
        .find_top_matches(&corpus)
        .with_context(|| format!("Search over {} failed", input.display()))?;
    bar.finish_and_clear();

    info!(
        "Found top-{} matches for {} records in {} ms",
        top.k,
        top.len(),
        top.elapsed.as_millis()
    );

    let report = MatchReport {
        corpus: &corpus,
        top: &top,
        min_score: opts.min_score.or_else(|| config.min_score()),
    };
    emit(&render_matches(&report, format)?, opts.output)
}
