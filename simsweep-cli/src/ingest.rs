//! Corpus ingestion
//!
//! Reads embedded records from a JSON array or a JSON Lines file:
//!
//! ```json
//! {"id": "row-1", "text": "Open the gate", "vector": [0.12, -0.40, ...]}
//! ```
//!
//! - `id` may be a string or a number; when missing, the 1-based record
//!   number is used.
//! - A record with neither text nor vector is an empty row and is skipped.
//! - A record without a vector is kept; it scores 0.0 against everything.

use anyhow::{bail, Context, Result};
use rayon::prelude::*;
use rustc_hash::FxHashSet;
use serde::Deserialize;
use simsweep_fast::{DimensionReport, EmbeddedItem, VectorCorpus};
use std::path::Path;
use tracing::{debug, info, warn};

#[derive(Debug, Deserialize)]
struct RawRecord {
    #[serde(default)]
    id: Option<serde_json::Value>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    vector: Option<Vec<f32>>,
}

impl RawRecord {
    fn is_empty_row(&self) -> bool {
        self.vector.is_none() && self.text.as_deref().map_or(true, |t| t.trim().is_empty())
    }

    fn into_item(self, record_number: usize) -> EmbeddedItem {
        let identity = match self.id {
            Some(serde_json::Value::String(s)) => s,
            Some(serde_json::Value::Null) | None => record_number.to_string(),
            Some(other) => other.to_string(),
        };
        let item = EmbeddedItem::new(identity, self.vector);
        match self.text {
            Some(text) => item.with_text(text),
            None => item,
        }
    }
}

/// A loaded corpus plus ingestion statistics.
#[derive(Debug)]
pub struct LoadedCorpus {
    pub corpus: VectorCorpus,
    /// Empty rows dropped during loading
    pub skipped: usize,
    pub dimensions: DimensionReport,
}

/// Load a corpus file (JSON array or JSON Lines).
pub fn load_corpus(path: &Path) -> Result<LoadedCorpus> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read corpus file {}", path.display()))?;
    let loaded = parse_corpus(&content)
        .with_context(|| format!("Failed to parse corpus file {}", path.display()))?;

    info!(
        "Loaded {} records from {} (dimension {}, {} empty rows skipped)",
        loaded.corpus.len(),
        path.display(),
        loaded
            .dimensions
            .dimension
            .map_or_else(|| "?".to_string(), |d| d.to_string()),
        loaded.skipped
    );
    Ok(loaded)
}

/// Parse corpus content. A leading `[` selects JSON-array mode.
pub fn parse_corpus(content: &str) -> Result<LoadedCorpus> {
    let records: Vec<RawRecord> = if content.trim_start().starts_with('[') {
        serde_json::from_str(content).context("Invalid JSON array")?
    } else {
        parse_json_lines(content)?
    };

    let total = records.len();
    let items: Vec<EmbeddedItem> = records
        .into_iter()
        .enumerate()
        .filter(|(_, r)| !r.is_empty_row())
        .map(|(i, r)| r.into_item(i + 1))
        .collect();
    let skipped = total - items.len();

    warn_duplicate_identities(&items);

    let corpus = VectorCorpus::from_items(items);
    let dimensions = corpus.dimension_report();
    if !dimensions.is_consistent() {
        warn!(
            "{} records will score 0.0: {} without a vector, {} not matching dimension {}",
            dimensions.degraded_count(),
            dimensions.absent.len(),
            dimensions.mismatched.len(),
            dimensions
                .dimension
                .map_or_else(|| "?".to_string(), |d| d.to_string())
        );
    } else if let Some(dim) = dimensions.dimension {
        debug!("All vectors share dimension {}", dim);
    }

    Ok(LoadedCorpus {
        corpus,
        skipped,
        dimensions,
    })
}

/// Parse JSON Lines in parallel, keeping line order. Blank lines are skipped.
fn parse_json_lines(content: &str) -> Result<Vec<RawRecord>> {
    let lines: Vec<(usize, &str)> = content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .collect();

    let parsed: Vec<std::result::Result<RawRecord, (usize, serde_json::Error)>> = lines
        .par_iter()
        .map(|&(n, line)| serde_json::from_str::<RawRecord>(line).map_err(|e| (n + 1, e)))
        .collect();

    let mut records = Vec::with_capacity(parsed.len());
    for result in parsed {
        match result {
            Ok(record) => records.push(record),
            Err((line, e)) => bail!("Invalid JSON on line {}: {}", line, e),
        }
    }
    Ok(records)
}

fn warn_duplicate_identities(items: &[EmbeddedItem]) {
    let mut seen: FxHashSet<&str> = FxHashSet::default();
    let duplicates = items
        .iter()
        .filter(|item| !seen.insert(item.identity()))
        .count();
    if duplicates > 0 {
        warn!(
            "{} records reuse an existing id; lookups by id resolve to the first",
            duplicates
        );
    }
}
