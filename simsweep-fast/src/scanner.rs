//! Pairwise scanner: enumerates item pairs and scores them.
//!
//! Two modes share one scanner:
//! - full sweep: every unordered pair `(i, j)` with `i < j`, exactly once
//! - per-query sweep: one fixed query `q` against every `j != q`
//!
//! Scores are never collected into an O(N²) buffer. Each one is handed to a
//! visitor (and usually dropped) or folded into a [`TopKSelector`].
//!
//! Parallelism comes from the ambient rayon pool: callers run the scanner
//! inside `ThreadPool::install` to pin the worker count. Outer indices are
//! claimed dynamically through work stealing, which balances the triangular
//! full sweep where early rows carry far more pairs than late ones.

use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::corpus::VectorCorpus;
use crate::errors::{Result, SimilarityError};
use crate::similarity::Precision;
use crate::topk::TopKSelector;

/// One scored comparison. Lives only for the duration of a scan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredPair {
    pub i: usize,
    pub j: usize,
    pub score: f64,
}

/// Which pairs a scan enumerates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanMode {
    /// Upper triangle: `i < j` over the whole corpus.
    FullSweep,
    /// Query `q` against every other index.
    PerQuery(usize),
}

/// Cooperative cancel flag shared between a caller and running scans.
///
/// Checked once per outer index, so a cancelled scan stops within one row.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    /// Clear the flag so the token can guard the next run.
    pub fn reset(&self) {
        self.0.store(false, Ordering::Relaxed);
    }
}

/// Scores pairs of a borrowed corpus with one metric precision.
#[derive(Debug, Clone)]
pub struct PairwiseScanner<'c> {
    corpus: &'c VectorCorpus,
    precision: Precision,
    cancel: Option<CancelToken>,
}

impl<'c> PairwiseScanner<'c> {
    pub fn new(corpus: &'c VectorCorpus, precision: Precision) -> Self {
        Self {
            corpus,
            precision,
            cancel: None,
        }
    }

    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn corpus(&self) -> &'c VectorCorpus {
        self.corpus
    }

    #[inline]
    fn cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancelToken::is_cancelled)
    }

    fn check_cancelled(&self) -> Result<()> {
        if self.cancelled() {
            Err(SimilarityError::Cancelled)
        } else {
            Ok(())
        }
    }

    #[inline]
    fn score(&self, i: usize, j: usize) -> f64 {
        self.precision
            .cosine(self.corpus.vector(i), self.corpus.vector(j))
    }

    #[inline]
    fn pair(&self, i: usize, j: usize) -> ScoredPair {
        ScoredPair {
            i,
            j,
            score: self.score(i, j),
        }
    }

    /// Enumerate the pairs of `mode` in parallel, folding each into a
    /// per-worker accumulator, then combining the accumulators with `reduce`.
    ///
    /// This is the only place pairs are enumerated. A full sweep splits work
    /// by row `i` and visits `(i, j)` for `j > i`; a per-query scan splits the
    /// candidates `j != q`. Cancellation is checked once per row or candidate.
    pub fn fold_scan<T, ID, F, R>(
        &self,
        mode: ScanMode,
        identity: ID,
        fold: F,
        reduce: R,
    ) -> Result<T>
    where
        T: Send,
        ID: Fn() -> T + Sync + Send,
        F: Fn(T, ScoredPair) -> T + Sync + Send,
        R: Fn(T, T) -> T + Sync + Send,
    {
        // Fixed once: the hot loops compare against a plain integer.
        let item_count = self.corpus.len();

        let folded = match mode {
            ScanMode::FullSweep => (0..item_count)
                .into_par_iter()
                .fold(&identity, |mut acc, i| {
                    if self.cancelled() {
                        return acc;
                    }
                    for j in (i + 1)..item_count {
                        acc = fold(acc, self.pair(i, j));
                    }
                    acc
                })
                .reduce(&identity, &reduce),
            ScanMode::PerQuery(q) => {
                if q >= item_count {
                    return Err(SimilarityError::QueryOutOfBounds {
                        index: q,
                        len: item_count,
                    });
                }
                (0..item_count)
                    .into_par_iter()
                    .filter(|&j| j != q)
                    .fold(&identity, |acc, j| {
                        if self.cancelled() {
                            acc
                        } else {
                            fold(acc, self.pair(q, j))
                        }
                    })
                    .reduce(&identity, &reduce)
            }
        };

        self.check_cancelled()?;
        Ok(folded)
    }

    /// Run `mode`, handing every scored pair to `visit`. Returns the number
    /// of pairs scored.
    pub fn scan<F>(&self, mode: ScanMode, visit: F) -> Result<u64>
    where
        F: Fn(ScoredPair) + Sync + Send,
    {
        self.fold_scan(
            mode,
            || 0u64,
            |scored, pair| {
                visit(pair);
                scored + 1
            },
            |a, b| a + b,
        )
    }

    /// Top-`k` neighbors of `q` from a per-query scan. Each worker fills its
    /// own selector and the partials are merged.
    pub fn top_k_for(&self, q: usize, k: usize) -> Result<TopKSelector> {
        self.fold_scan(
            ScanMode::PerQuery(q),
            || TopKSelector::excluding(k, q),
            |mut selector, pair| {
                selector.push_pair(pair);
                selector
            },
            |mut a, b| {
                a.merge(b);
                a
            },
        )
    }
}
