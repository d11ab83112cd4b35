//! In-memory corpus of embedded items.
//!
//! The corpus is built once (bulk load), then shared read-only by every sweep.
//! Scans borrow it immutably, so the borrow checker rules out any writer
//! overlapping a running scan.

use rustc_hash::FxHashMap;
use tracing::debug;

/// Turns text into a fixed-dimensionality vector.
///
/// Text normalization, tokenization and model loading live behind this trait.
/// Returning `None` marks the text as un-embeddable (empty, out of vocabulary);
/// such items stay in the corpus and score `0.0` against everything.
pub trait EmbeddingProvider {
    fn embed(&self, text: &str) -> Option<Vec<f32>>;
}

impl<F> EmbeddingProvider for F
where
    F: Fn(&str) -> Option<Vec<f32>>,
{
    fn embed(&self, text: &str) -> Option<Vec<f32>> {
        self(text)
    }
}

/// One corpus record after embedding. Immutable once created.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddedItem {
    identity: String,
    text: Option<String>,
    vector: Option<Vec<f32>>,
}

impl EmbeddedItem {
    pub fn new(identity: impl Into<String>, vector: Option<Vec<f32>>) -> Self {
        Self {
            identity: identity.into(),
            text: None,
            vector,
        }
    }

    /// Keep the source text alongside the vector for diagnostics and output.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn vector(&self) -> Option<&[f32]> {
        self.vector.as_deref()
    }
}

/// Dimensionality survey of a corpus, for ingestion-time data-quality checks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DimensionReport {
    /// Most common vector length (ties go to the smaller length).
    pub dimension: Option<usize>,
    /// Items whose vector length differs from `dimension`.
    pub mismatched: Vec<usize>,
    /// Items with no vector at all.
    pub absent: Vec<usize>,
}

impl DimensionReport {
    /// Items that will score `0.0` against every well-formed item.
    pub fn degraded_count(&self) -> usize {
        self.mismatched.len() + self.absent.len()
    }

    pub fn is_consistent(&self) -> bool {
        self.degraded_count() == 0
    }
}

/// Ordered collection of embedded items, addressed by position `0..len`.
#[derive(Debug, Clone, Default)]
pub struct VectorCorpus {
    items: Vec<EmbeddedItem>,
}

impl VectorCorpus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
        }
    }

    pub fn from_items(items: Vec<EmbeddedItem>) -> Self {
        Self { items }
    }

    /// Build a corpus from `(identity, vector)` pairs.
    pub fn from_vectors<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, Vec<f32>)>,
        S: Into<String>,
    {
        Self {
            items: pairs
                .into_iter()
                .map(|(id, v)| EmbeddedItem::new(id, Some(v)))
                .collect(),
        }
    }

    /// Embed every `(identity, text)` record exactly once.
    ///
    /// Vectors are computed here and reused by every later sweep; scanning
    /// never calls back into the provider.
    pub fn embed_all<I, S, T, P>(records: I, provider: &P) -> Self
    where
        I: IntoIterator<Item = (S, T)>,
        S: Into<String>,
        T: Into<String>,
        P: EmbeddingProvider + ?Sized,
    {
        let items: Vec<EmbeddedItem> = records
            .into_iter()
            .map(|(id, text)| {
                let text = text.into();
                let vector = provider.embed(&text);
                EmbeddedItem::new(id, vector).with_text(text)
            })
            .collect();

        let missing = items.iter().filter(|i| i.vector.is_none()).count();
        debug!(
            "Embedded {} items ({} without a vector)",
            items.len(),
            missing
        );

        Self { items }
    }

    /// Append an item during the load phase.
    pub fn push(&mut self, item: EmbeddedItem) {
        self.items.push(item);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&EmbeddedItem> {
        self.items.get(index)
    }

    pub fn items(&self) -> &[EmbeddedItem] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, EmbeddedItem> {
        self.items.iter()
    }

    /// Vector at `index`, `None` if the item is absent or has no vector.
    #[inline]
    pub fn vector(&self, index: usize) -> Option<&[f32]> {
        self.items.get(index).and_then(EmbeddedItem::vector)
    }

    pub fn identity(&self, index: usize) -> Option<&str> {
        self.items.get(index).map(EmbeddedItem::identity)
    }

    /// Position of the first item with this identity.
    pub fn position(&self, identity: &str) -> Option<usize> {
        self.items.iter().position(|item| item.identity == identity)
    }

    /// Number of unordered pairs a full sweep scores: `n * (n - 1) / 2`.
    pub fn pair_count(&self) -> u64 {
        let n = self.items.len() as u64;
        n * n.saturating_sub(1) / 2
    }

    /// Survey vector lengths. Mismatched items are not rejected; each pair
    /// involving them degrades to a zero score at scan time.
    pub fn dimension_report(&self) -> DimensionReport {
        let mut counts: FxHashMap<usize, usize> = FxHashMap::default();
        let mut absent = Vec::new();
        for (i, item) in self.items.iter().enumerate() {
            match &item.vector {
                Some(v) => *counts.entry(v.len()).or_insert(0) += 1,
                None => absent.push(i),
            }
        }

        let dimension = counts
            .iter()
            .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)))
            .map(|(&dim, _)| dim);

        let mismatched = match dimension {
            Some(dim) => self
                .items
                .iter()
                .enumerate()
                .filter(|(_, item)| item.vector.as_ref().is_some_and(|v| v.len() != dim))
                .map(|(i, _)| i)
                .collect(),
            None => Vec::new(),
        };

        DimensionReport {
            dimension,
            mismatched,
            absent,
        }
    }
}

impl FromIterator<EmbeddedItem> for VectorCorpus {
    fn from_iter<I: IntoIterator<Item = EmbeddedItem>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a VectorCorpus {
    type Item = &'a EmbeddedItem;
    type IntoIter = std::slice::Iter<'a, EmbeddedItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
