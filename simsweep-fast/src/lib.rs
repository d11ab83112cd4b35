//! simsweep-fast: brute-force nearest-neighbor search over embedding vectors.
//!
//! Given a corpus of texts already turned into fixed-length vectors, score
//! cosine similarity across every pair and surface each item's most similar
//! counterparts. Exact all-pairs scoring, no approximate index.
//!
//! Components, leaves first:
//! - [`corpus`]: `VectorCorpus` of `(identity, text, vector)` items, built once
//! - [`similarity`]: tolerant cosine metric (absent / mismatched / zero -> 0.0)
//! - [`scanner`]: full-sweep and per-query pair enumeration on rayon
//! - [`topk`]: bounded, deterministic top-K selection
//! - [`engine`]: `SimilarityEngine`, the façade owning the worker pool
//!
//! Extras: [`text`] edit-distance similarity and [`synthetic`] seeded corpora.
//!
//! ```
//! use simsweep_fast::{Concurrency, EngineConfig, SimilarityEngine, VectorCorpus};
//!
//! let corpus = VectorCorpus::from_vectors(vec![
//!     ("a", vec![1.0, 0.0]),
//!     ("b", vec![1.0, 0.0]),
//!     ("c", vec![0.0, 1.0]),
//! ]);
//! let engine = SimilarityEngine::new(
//!     EngineConfig::default()
//!         .with_concurrency(Concurrency::Fixed(2))
//!         .with_top_k(1),
//! )?;
//! let top = engine.find_top_matches(&corpus)?;
//! assert_eq!(top.results[0].matches[0].index, 1);
//! # Ok::<(), simsweep_fast::SimilarityError>(())
//! ```

pub mod corpus;
pub mod engine;
mod errors;
pub mod scanner;
pub mod similarity;
pub mod synthetic;
pub mod text;
pub mod topk;

pub use corpus::{DimensionReport, EmbeddedItem, EmbeddingProvider, VectorCorpus};
pub use engine::{
    BenchmarkReport, Concurrency, EngineConfig, ProgressCallback, QueryMatches, SimilarityEngine,
    TopMatches,
};
pub use errors::{Result, SimilarityError};
pub use scanner::{CancelToken, PairwiseScanner, ScanMode, ScoredPair};
pub use similarity::{cosine, cosine_similarity, cosine_similarity_f64, Precision};
pub use topk::{RankedMatch, TopKSelector};
