//! Error types for the similarity kernel.
//!
//! Only configuration problems are errors. Bad individual vectors (absent,
//! mismatched length, zero magnitude) never surface here; the metric resolves
//! them to a zero score inside the scan.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimilarityError {
    /// `top_k` must be at least 1.
    #[error("invalid top_k: {0} (must be at least 1)")]
    InvalidTopK(usize),

    /// An explicit worker count must be at least 1.
    #[error("invalid concurrency degree: {0} (must be at least 1)")]
    InvalidConcurrency(usize),

    /// Neighbor search was asked for on a corpus with no items.
    #[error("corpus is empty, there are no neighbors to search")]
    EmptyCorpus,

    /// A query index does not address an item in the corpus.
    #[error("query index out of bounds: {index} >= {len}")]
    QueryOutOfBounds { index: usize, len: usize },

    /// The sweep was aborted through its cancel token. Partial results are dropped.
    #[error("sweep cancelled")]
    Cancelled,

    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

pub type Result<T> = std::result::Result<T, SimilarityError>;
