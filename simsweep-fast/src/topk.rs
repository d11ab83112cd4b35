//! Bounded top-K selection.
//!
//! A selector keeps only the K best candidates seen so far in a binary heap
//! whose top is the current worst kept entry. Each push is O(log K), so a
//! query over N candidates costs O(N log K) instead of a full sort.
//!
//! Ranking is a strict total order: higher score first, then lower candidate
//! index. The kept set therefore depends only on which candidates were pushed,
//! never on the order they arrived in, which keeps results identical across
//! thread counts and scheduling.

use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::scanner::ScoredPair;

/// One ranked neighbor of a query item.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RankedMatch {
    /// Position of the candidate in the corpus.
    pub index: usize,
    pub score: f64,
}

impl RankedMatch {
    pub fn new(index: usize, score: f64) -> Self {
        Self { index, score }
    }

    /// `Less` means `self` ranks ahead of `other`.
    #[inline]
    pub fn rank_cmp(&self, other: &Self) -> Ordering {
        other
            .score
            .total_cmp(&self.score)
            .then_with(|| self.index.cmp(&other.index))
    }
}

/// Heap entry ordered by rank, so the heap top is the worst kept match.
#[derive(Debug, Clone, Copy)]
struct Kept(RankedMatch);

impl PartialEq for Kept {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Kept {}

impl PartialOrd for Kept {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Kept {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.rank_cmp(&other.0)
    }
}

/// Accumulates the K best candidates for a single query.
///
/// A selector belongs to exactly one query. Parallel contributors each fill
/// their own selector and combine them with [`TopKSelector::merge`].
#[derive(Debug, Clone)]
pub struct TopKSelector {
    k: usize,
    exclude: Option<usize>,
    heap: BinaryHeap<Kept>,
}

impl TopKSelector {
    pub fn new(k: usize) -> Self {
        Self {
            k,
            exclude: None,
            heap: BinaryHeap::with_capacity(k.saturating_add(1).min(1024)),
        }
    }

    /// Selector that silently drops the query's own index.
    pub fn excluding(k: usize, query: usize) -> Self {
        Self {
            exclude: Some(query),
            ..Self::new(k)
        }
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Offer a candidate. Returns `true` if it was kept.
    #[inline]
    pub fn push(&mut self, index: usize, score: f64) -> bool {
        if self.k == 0 || self.exclude == Some(index) {
            return false;
        }

        let entry = Kept(RankedMatch::new(index, score));
        if self.heap.len() < self.k {
            self.heap.push(entry);
            return true;
        }

        match self.heap.peek_mut() {
            Some(mut worst) if entry < *worst => {
                *worst = entry;
                true
            }
            _ => false,
        }
    }

    /// Offer a scored pair. The candidate is whichever side is not the query.
    pub fn push_pair(&mut self, pair: ScoredPair) -> bool {
        let candidate = match self.exclude {
            Some(q) if pair.i == q => pair.j,
            _ => pair.i,
        };
        self.push(candidate, pair.score)
    }

    /// Fold another selector's candidates into this one.
    pub fn merge(&mut self, other: TopKSelector) {
        for Kept(m) in other.heap.into_vec() {
            self.push(m.index, m.score);
        }
    }

    /// Current worst kept score, once the selector is full.
    pub fn threshold(&self) -> Option<f64> {
        if self.heap.len() < self.k {
            return None;
        }
        self.heap.peek().map(|k| k.0.score)
    }

    /// Kept matches, best first.
    pub fn into_sorted_vec(self) -> Vec<RankedMatch> {
        self.heap.into_sorted_vec().into_iter().map(|k| k.0).collect()
    }
}
