//! Cosine similarity between embedding vectors.
//!
//! Every function here is tolerant: an absent vector, a length mismatch or a
//! zero-magnitude vector scores `0.0` instead of failing or producing NaN.
//! One malformed row must never abort a bulk sweep.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Accumulation precision for the metric.
///
/// A single run uses one precision for every pair so scores stay comparable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Precision {
    #[default]
    Single,
    Double,
}

impl FromStr for Precision {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "single" | "f32" => Ok(Precision::Single),
            "double" | "f64" => Ok(Precision::Double),
            _ => Err(format!(
                "Unknown precision '{}'. Valid values: single, double",
                s
            )),
        }
    }
}

impl Precision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Precision::Single => "single",
            Precision::Double => "double",
        }
    }

    /// Score two possibly-absent vectors at this precision.
    #[inline]
    pub fn cosine(self, a: Option<&[f32]>, b: Option<&[f32]>) -> f64 {
        match (a, b) {
            (Some(a), Some(b)) => match self {
                Precision::Single => cosine_similarity(a, b) as f64,
                Precision::Double => cosine_similarity_f64(a, b),
            },
            _ => 0.0,
        }
    }
}

fn dot_product(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

#[inline]
fn finish(score: f32) -> f32 {
    if !score.is_finite() {
        return 0.0;
    }
    // `+ 0.0` folds -0.0 into 0.0
    score.clamp(-1.0, 1.0) + 0.0
}

/// Cosine with every component divided by its vector's max magnitude first,
/// so the squared sums stay inside the `f32` range for any finite input.
fn scaled_cosine(a: &[f32], b: &[f32]) -> f32 {
    if a.iter().chain(b.iter()).any(|x| !x.is_finite()) {
        return 0.0;
    }
    let max_abs = |v: &[f32]| v.iter().fold(0.0f32, |m, x| m.max(x.abs()));
    let (scale_a, scale_b) = (max_abs(a), max_abs(b));
    if scale_a == 0.0 || scale_b == 0.0 {
        return 0.0;
    }

    let mut dot = 0.0f32;
    let mut mag_a = 0.0f32;
    let mut mag_b = 0.0f32;
    for (&x, &y) in a.iter().zip(b.iter()) {
        let (x, y) = (x / scale_a, y / scale_b);
        dot += x * y;
        mag_a += x * x;
        mag_b += y * y;
    }
    finish(dot / (mag_a.sqrt() * mag_b.sqrt()))
}

/// Cosine similarity with `f32` accumulation.
///
/// Returns `0.0` for mismatched lengths, zero-magnitude inputs, and NaN or
/// infinite components. The result is clamped to `[-1, 1]`.
///
/// Vectors whose squared magnitude overflows or underflows `f32` are rescaled
/// before scoring, so any finite non-zero vector still has self-similarity 1.
#[inline]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot = dot_product(a, b);
    let mag_a = dot_product(a, a);
    let mag_b = dot_product(b, b);

    // Zero, subnormal, infinite and NaN magnitudes all take the slow path.
    if mag_a.is_normal() && mag_b.is_normal() && dot.is_finite() {
        // Divide in a fixed order so cosine(a, b) == cosine(b, a) bit for bit
        // without risking overflow in the norm product.
        let (lo, hi) = if mag_a <= mag_b {
            (mag_a, mag_b)
        } else {
            (mag_b, mag_a)
        };
        return finish(dot / lo.sqrt() / hi.sqrt());
    }
    scaled_cosine(a, b)
}

/// Cosine similarity with `f64` accumulation. Same degradation rules as
/// [`cosine_similarity`].
#[inline]
pub fn cosine_similarity_f64(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() {
        return 0.0;
    }

    let mut dot = 0.0f64;
    let mut mag_a = 0.0f64;
    let mut mag_b = 0.0f64;
    for (&x, &y) in a.iter().zip(b.iter()) {
        let (x, y) = (x as f64, y as f64);
        dot += x * y;
        mag_a += x * x;
        mag_b += y * y;
    }

    let norm_a = mag_a.sqrt();
    let norm_b = mag_b.sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    let score = dot / (norm_a * norm_b);
    if !score.is_finite() {
        return 0.0;
    }
    // `+ 0.0` folds -0.0 into 0.0
    score.clamp(-1.0, 1.0) + 0.0
}

/// Single-precision cosine over possibly-absent vectors.
#[inline]
pub fn cosine(a: Option<&[f32]>, b: Option<&[f32]>) -> f32 {
    match (a, b) {
        (Some(a), Some(b)) => cosine_similarity(a, b),
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-6;

    #[test]
    fn test_identical_vectors() {
        let a = [0.3, -1.2, 4.0, 0.5];
        assert!((cosine_similarity(&a, &a) - 1.0).abs() < 1e-6);
        assert!((cosine_similarity_f64(&a, &a) - 1.0).abs() < EPS);
    }

    #[test]
    fn test_orthogonal_and_opposite() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]), -1.0);
        assert_eq!(cosine_similarity_f64(&[1.0, 0.0], &[-1.0, 0.0]), -1.0);
    }

    #[test]
    fn test_symmetry() {
        let a = [0.1, 0.7, -0.2];
        let b = [0.9, -0.3, 0.4];
        assert_eq!(cosine_similarity(&a, &b), cosine_similarity(&b, &a));
        assert_eq!(cosine_similarity_f64(&a, &b), cosine_similarity_f64(&b, &a));
    }

    #[test]
    fn test_symmetry_across_magnitudes() {
        let a = [3.0e15, -1.0e12, 7.0e14];
        let b = [2.0e-3, 5.0e-4, -1.0e-3];
        assert_eq!(cosine_similarity(&a, &b), cosine_similarity(&b, &a));
        let c = [1e20, 3e19, -2e20];
        assert_eq!(cosine_similarity(&a, &c), cosine_similarity(&c, &a));
    }

    #[test]
    fn test_zero_vector_scores_zero() {
        let zero = [0.0, 0.0, 0.0];
        let a = [1.0, 2.0, 3.0];
        assert_eq!(cosine_similarity(&zero, &a), 0.0);
        assert_eq!(cosine_similarity(&a, &zero), 0.0);
        assert_eq!(cosine_similarity(&zero, &zero), 0.0);
        assert_eq!(cosine_similarity_f64(&zero, &a), 0.0);
    }

    #[test]
    fn test_length_mismatch_scores_zero() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[1.0, 0.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity_f64(&[1.0], &[1.0, 0.0]), 0.0);
    }

    #[test]
    fn test_absent_vector_scores_zero() {
        let a = [1.0f32, 0.0];
        assert_eq!(cosine(None, Some(&a)), 0.0);
        assert_eq!(cosine(Some(&a), None), 0.0);
        assert_eq!(cosine(None, None), 0.0);
        assert_eq!(Precision::Double.cosine(None, Some(&a)), 0.0);
    }

    #[test]
    fn test_non_finite_input_scores_zero() {
        let b = [1.0, 1.0];
        assert_eq!(cosine_similarity(&[f32::NAN, 1.0], &b), 0.0);
        assert_eq!(cosine_similarity(&[f32::INFINITY, 1.0], &b), 0.0);
        assert_eq!(cosine_similarity(&b, &[1.0, f32::NEG_INFINITY]), 0.0);
        assert_eq!(cosine_similarity_f64(&[f32::NAN, 1.0], &b), 0.0);
    }

    #[test]
    fn test_self_similarity_at_extreme_magnitudes() {
        let cases: [[f32; 2]; 4] = [
            [1e20, 2e20],
            [1e-23, 2e-23],
            [f32::MAX, f32::MAX],
            [1e-45, 3e-45],
        ];
        for v in &cases {
            let single = cosine_similarity(v, v);
            assert!((single - 1.0).abs() < 1e-6, "{v:?}: single {single}");
            let double = cosine_similarity_f64(v, v);
            assert!((double - 1.0).abs() < EPS, "{v:?}: double {double}");
        }
    }

    #[test]
    fn test_extreme_magnitudes_keep_direction() {
        let big = [f32::MAX, f32::MAX];
        assert!((cosine_similarity(&big, &[1.0, 1.0]) - 1.0).abs() < 1e-6);
        assert!((cosine_similarity(&[1e20, 0.0], &[0.0, 1e-23])).abs() < 1e-6);
        assert!((cosine_similarity(&[1e20, 0.0], &[-1e-23, 0.0]) + 1.0).abs() < 1e-6);
        let single = Precision::Single.cosine(Some(&[3e19, -4e19]), Some(&[4e-22, 3e-22]));
        let double = Precision::Double.cosine(Some(&[3e19, -4e19]), Some(&[4e-22, 3e-22]));
        assert!((single - double).abs() < 1e-5);
    }

    #[test]
    fn test_range_holds() {
        let vs: [[f32; 3]; 4] = [
            [0.1, 0.2, 0.3],
            [-5.0, 2.0, 0.0],
            [1e-3, 1e-3, 1e-3],
            [7.0, -7.0, 7.0],
        ];
        for a in &vs {
            for b in &vs {
                let s = cosine_similarity(a, b);
                assert!((-1.0..=1.0).contains(&s), "{s} out of range");
                let d = cosine_similarity_f64(a, b);
                assert!((-1.0..=1.0).contains(&d), "{d} out of range");
            }
        }
    }

    #[test]
    fn test_precisions_agree() {
        let a = [0.25, -0.5, 0.75, 1.0];
        let b = [0.5, 0.5, -0.25, 0.1];
        let single = Precision::Single.cosine(Some(&a), Some(&b));
        let double = Precision::Double.cosine(Some(&a), Some(&b));
        assert!((single - double).abs() < 1e-5);
    }

    #[test]
    fn test_precision_parsing() {
        assert_eq!("single".parse::<Precision>(), Ok(Precision::Single));
        assert_eq!("DOUBLE".parse::<Precision>(), Ok(Precision::Double));
        assert_eq!("f64".parse::<Precision>(), Ok(Precision::Double));
        assert!("half".parse::<Precision>().unwrap_err().contains("half"));
        assert_eq!(Precision::Double.as_str(), "double");
    }
}
