//! Similarity engine: ties corpus, metric, scanner and selector together.
//!
//! Two operations:
//! - [`SimilarityEngine::benchmark_all_pairs`] scores every unordered pair and
//!   drops each score, reporting pair count and wall-clock time.
//! - [`SimilarityEngine::find_top_matches`] ranks the K nearest neighbors of
//!   every item (the translation-memory fuzzy-match use case).
//!
//! The engine owns a dedicated rayon pool sized from [`Concurrency`].
//! Configuration is validated once in [`SimilarityEngine::new`] and on
//! explicit `k` overrides, always before any parallel work starts.
//! Timings are returned as values; the engine holds no global stopwatches.

use indexmap::IndexMap;
use rayon::prelude::*;
use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::corpus::VectorCorpus;
use crate::errors::{Result, SimilarityError};
use crate::scanner::{CancelToken, PairwiseScanner, ScanMode};
use crate::similarity::Precision;
use crate::topk::RankedMatch;

/// Worker count for the engine's pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Concurrency {
    /// One worker per available hardware thread.
    #[default]
    Auto,
    /// Exactly this many workers (must be at least 1).
    Fixed(usize),
}

impl Concurrency {
    /// `None` or `Some(0)` mean [`Concurrency::Auto`].
    pub fn from_workers(workers: Option<usize>) -> Self {
        match workers {
            None | Some(0) => Concurrency::Auto,
            Some(n) => Concurrency::Fixed(n),
        }
    }

    /// Thread count handed to rayon (`0` lets rayon pick).
    fn num_threads(self) -> usize {
        match self {
            Concurrency::Auto => 0,
            Concurrency::Fixed(n) => n,
        }
    }
}

/// Engine configuration surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    pub concurrency: Concurrency,
    pub top_k: usize,
    pub precision: Precision,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            concurrency: Concurrency::Auto,
            top_k: 5,
            precision: Precision::Single,
        }
    }
}

impl EngineConfig {
    pub fn with_concurrency(mut self, concurrency: Concurrency) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_precision(mut self, precision: Precision) -> Self {
        self.precision = precision;
        self
    }

    /// Reject `top_k == 0` and `Fixed(0)`.
    pub fn validate(&self) -> Result<()> {
        if self.top_k == 0 {
            return Err(SimilarityError::InvalidTopK(self.top_k));
        }
        if self.concurrency == Concurrency::Fixed(0) {
            return Err(SimilarityError::InvalidConcurrency(0));
        }
        Ok(())
    }
}

/// Progress hook: `(completed, total)` items.
pub type ProgressCallback = Arc<dyn Fn(usize, usize) + Send + Sync>;

/// Outcome of a full-sweep throughput run.
#[derive(Debug, Clone)]
pub struct BenchmarkReport {
    pub items: usize,
    pub pairs: u64,
    pub elapsed: Duration,
    pub threads: usize,
}

impl BenchmarkReport {
    pub fn elapsed_ms(&self) -> u128 {
        self.elapsed.as_millis()
    }

    pub fn pairs_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs == 0.0 {
            return 0.0;
        }
        self.pairs as f64 / secs
    }
}

/// Ranked neighbors of one corpus item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryMatches {
    pub index: usize,
    pub identity: String,
    pub matches: Vec<RankedMatch>,
}

/// Outcome of a per-item top-K search, in corpus order.
#[derive(Debug, Clone)]
pub struct TopMatches {
    pub k: usize,
    pub results: Vec<QueryMatches>,
    pub comparisons: u64,
    pub elapsed: Duration,
    pub threads: usize,
}

impl TopMatches {
    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&QueryMatches> {
        self.results.get(index)
    }

    /// Identity -> ranked matches, in corpus order. When identities repeat,
    /// the first item carrying the identity wins.
    pub fn by_identity(&self) -> IndexMap<&str, &[RankedMatch]> {
        let mut map = IndexMap::with_capacity(self.results.len());
        for r in &self.results {
            map.entry(r.identity.as_str())
                .or_insert(r.matches.as_slice());
        }
        map
    }
}

pub struct SimilarityEngine {
    config: EngineConfig,
    pool: rayon::ThreadPool,
    cancel: CancelToken,
    progress: Option<ProgressCallback>,
}

impl std::fmt::Debug for SimilarityEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimilarityEngine")
            .field("config", &self.config)
            .field("threads", &self.pool.current_num_threads())
            .field("cancelled", &self.cancel.is_cancelled())
            .finish()
    }
}

impl SimilarityEngine {
    /// Validate `config` and build the worker pool.
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.concurrency.num_threads())
            .thread_name(|i| format!("simsweep-{i}"))
            .build()?;

        debug!(
            "Similarity engine ready: {} workers, top_k={}, precision={}",
            pool.current_num_threads(),
            config.top_k,
            config.precision.as_str()
        );

        Ok(Self {
            config,
            pool,
            cancel: CancelToken::new(),
            progress: None,
        })
    }

    /// Report `(completed, total)` as query items finish.
    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.progress = Some(callback);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Token that aborts the engine's running and future sweeps until reset.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    fn scanner<'c>(&self, corpus: &'c VectorCorpus) -> PairwiseScanner<'c> {
        PairwiseScanner::new(corpus, self.config.precision).with_cancel(self.cancel.clone())
    }

    fn log_degraded(corpus: &VectorCorpus) {
        let report = corpus.dimension_report();
        if !report.is_consistent() {
            debug!(
                "{} of {} items will score 0.0 ({} absent, {} off dimension {:?})",
                report.degraded_count(),
                corpus.len(),
                report.absent.len(),
                report.mismatched.len(),
                report.dimension
            );
        }
    }

    /// Score every unordered pair once and discard the scores.
    ///
    /// An empty corpus is valid and reports zero pairs.
    pub fn benchmark_all_pairs(&self, corpus: &VectorCorpus) -> Result<BenchmarkReport> {
        Self::log_degraded(corpus);
        let scanner = self.scanner(corpus);

        debug!("Full sweep over {} items", corpus.len());
        let start = Instant::now();
        let pairs = self.pool.install(|| {
            scanner.scan(ScanMode::FullSweep, |pair| {
                std::hint::black_box(pair.score);
            })
        })?;
        let elapsed = start.elapsed();
        debug!("Full sweep scored {} pairs in {:?}", pairs, elapsed);

        Ok(BenchmarkReport {
            items: corpus.len(),
            pairs,
            elapsed,
            threads: self.threads(),
        })
    }

    /// Top-K neighbors of every item, with K from the engine config.
    pub fn find_top_matches(&self, corpus: &VectorCorpus) -> Result<TopMatches> {
        self.search(corpus, self.config.top_k)
    }

    /// Top-`k` neighbors of every item, overriding the configured K.
    pub fn find_top_matches_k(&self, corpus: &VectorCorpus, k: usize) -> Result<TopMatches> {
        if k == 0 {
            return Err(SimilarityError::InvalidTopK(k));
        }
        self.search(corpus, k)
    }

    /// Ranked neighbors of a single item, candidates split across workers.
    pub fn find_matches_for(&self, corpus: &VectorCorpus, query: usize) -> Result<Vec<RankedMatch>> {
        if corpus.is_empty() {
            return Err(SimilarityError::EmptyCorpus);
        }
        let scanner = self.scanner(corpus);
        let k = self.config.top_k;
        let selector = self.pool.install(|| scanner.top_k_for(query, k))?;
        Ok(selector.into_sorted_vec())
    }

    fn search(&self, corpus: &VectorCorpus, k: usize) -> Result<TopMatches> {
        if corpus.is_empty() {
            return Err(SimilarityError::EmptyCorpus);
        }
        Self::log_degraded(corpus);

        let item_count = corpus.len();
        let scanner = self.scanner(corpus);
        let completed = AtomicUsize::new(0);

        debug!("Top-{} search over {} items", k, item_count);
        let start = Instant::now();
        // One selector per query, each fed by that query's per-query scan.
        let results: Vec<QueryMatches> = self.pool.install(|| {
            (0..item_count)
                .into_par_iter()
                .map(|q| {
                    let matches = scanner.top_k_for(q, k)?.into_sorted_vec();

                    let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                    if let Some(ref callback) = self.progress {
                        callback(done, item_count);
                    }

                    Ok(QueryMatches {
                        index: q,
                        identity: corpus.identity(q).unwrap_or_default().to_string(),
                        matches,
                    })
                })
                .collect::<Result<Vec<_>>>()
        })?;
        let elapsed = start.elapsed();

        if self.cancel.is_cancelled() {
            return Err(SimilarityError::Cancelled);
        }

        let n = item_count as u64;
        debug!("Top-{} search finished in {:?}", k, elapsed);
        Ok(TopMatches {
            k,
            results,
            comparisons: n * (n - 1),
            elapsed,
            threads: self.threads(),
        })
    }
}
