//! Output reporters for simsweep results
//!
//! Supports two output formats:
//! - `text` - Terminal output with colors
//! - `json` - Machine-readable JSON

mod json;
mod text;

use anyhow::{anyhow, Result};
use simsweep_fast::{BenchmarkReport, RankedMatch, TopMatches, VectorCorpus};
use std::str::FromStr;

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" | "terminal" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(anyhow!("Unknown format '{}'. Valid formats: text, json", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Search results joined back to the corpus they were computed over.
pub struct MatchReport<'a> {
    pub corpus: &'a VectorCorpus,
    pub top: &'a TopMatches,
    /// Hide matches below this score (ranking itself is untouched)
    pub min_score: Option<f64>,
}

impl MatchReport<'_> {
    /// Matches for result `i` that pass the score filter, best first.
    pub fn visible(&self, i: usize) -> impl Iterator<Item = &RankedMatch> + '_ {
        let min = self.min_score.unwrap_or(f64::NEG_INFINITY);
        self.top.results[i]
            .matches
            .iter()
            .filter(move |m| m.score >= min)
    }
}

/// Render search results in the requested format
pub fn render_matches(report: &MatchReport<'_>, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => text::render_matches(report),
        OutputFormat::Json => json::render_matches(report),
    }
}

/// Render a full-sweep benchmark in the requested format
pub fn render_benchmark(report: &BenchmarkReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => text::render_benchmark(report),
        OutputFormat::Json => json::render_benchmark(report),
    }
}
