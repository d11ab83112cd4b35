//! JSON reporter
//!
//! Machine-readable output, useful for piping to jq or further processing.

use super::MatchReport;
use anyhow::Result;
use serde::Serialize;
use simsweep_fast::BenchmarkReport;

#[derive(Serialize)]
struct JsonMatch<'a> {
    id: &'a str,
    index: usize,
    score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
}

#[derive(Serialize)]
struct JsonResult<'a> {
    id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
    matches: Vec<JsonMatch<'a>>,
}

#[derive(Serialize)]
struct JsonSearch<'a> {
    k: usize,
    items: usize,
    comparisons: u64,
    elapsed_ms: u128,
    threads: usize,
    results: Vec<JsonResult<'a>>,
}

/// Render search results as pretty-printed JSON
pub fn render_matches(report: &MatchReport<'_>) -> Result<String> {
    let corpus = report.corpus;
    let results = report
        .top
        .results
        .iter()
        .enumerate()
        .map(|(i, r)| JsonResult {
            id: &r.identity,
            text: corpus.get(r.index).and_then(|item| item.text()),
            matches: report
                .visible(i)
                .map(|m| JsonMatch {
                    id: corpus.identity(m.index).unwrap_or_default(),
                    index: m.index,
                    score: m.score,
                    text: corpus.get(m.index).and_then(|item| item.text()),
                })
                .collect(),
        })
        .collect();

    let out = JsonSearch {
        k: report.top.k,
        items: report.top.len(),
        comparisons: report.top.comparisons,
        elapsed_ms: report.top.elapsed.as_millis(),
        threads: report.top.threads,
        results,
    };
    Ok(serde_json::to_string_pretty(&out)?)
}

#[derive(Serialize)]
struct JsonBenchmark {
    items: usize,
    pairs: u64,
    elapsed_ms: u128,
    pairs_per_second: f64,
    threads: usize,
}

/// Render a benchmark report as pretty-printed JSON
pub fn render_benchmark(report: &BenchmarkReport) -> Result<String> {
    let out = JsonBenchmark {
        items: report.items,
        pairs: report.pairs,
        elapsed_ms: report.elapsed_ms(),
        pairs_per_second: report.pairs_per_second(),
        threads: report.threads,
    };
    Ok(serde_json::to_string_pretty(&out)?)
}
