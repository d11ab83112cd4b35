//! Reproducible synthetic corpora for throughput runs.
//!
//! Seeded ChaCha8 keeps every run (and every machine) on the same vectors,
//! so timings compare like with like.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::corpus::{EmbeddedItem, VectorCorpus};

/// Default seed for benchmark corpora.
pub const DEFAULT_SEED: u64 = 42;

/// One random vector with components in `[-1, 1)`, scaled to unit length.
///
/// Redraws in the (practically unreachable) all-zero case.
fn random_unit_vector(rng: &mut ChaCha8Rng, dim: usize) -> Vec<f32> {
    if dim == 0 {
        return Vec::new();
    }
    loop {
        let v: Vec<f32> = (0..dim).map(|_| rng.gen_range(-1.0f32..1.0)).collect();
        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > f32::EPSILON {
            return v.into_iter().map(|x| x / norm).collect();
        }
    }
}

/// `n` random unit vectors of dimensionality `dim`, identities `item-0..`.
pub fn random_unit_corpus(n: usize, dim: usize, seed: u64) -> VectorCorpus {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut corpus = VectorCorpus::with_capacity(n);
    for i in 0..n {
        corpus.push(EmbeddedItem::new(
            format!("item-{i}"),
            Some(random_unit_vector(&mut rng, dim)),
        ));
    }
    corpus
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vectors_are_unit_length() {
        let corpus = random_unit_corpus(50, 25, DEFAULT_SEED);
        assert_eq!(corpus.len(), 50);
        for item in &corpus {
            let v = item.vector().unwrap();
            assert_eq!(v.len(), 25);
            let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
            assert!((norm - 1.0).abs() < 1e-4, "norm {norm}");
        }
    }

    #[test]
    fn test_same_seed_same_corpus() {
        let a = random_unit_corpus(10, 8, 7);
        let b = random_unit_corpus(10, 8, 7);
        let c = random_unit_corpus(10, 8, 8);
        assert_eq!(a.items(), b.items());
        assert_ne!(a.items(), c.items());
    }

    #[test]
    fn test_identities_follow_position() {
        let corpus = random_unit_corpus(3, 2, 1);
        assert_eq!(corpus.identity(2), Some("item-2"));
    }
}
