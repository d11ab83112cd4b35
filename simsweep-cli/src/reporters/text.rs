//! Text (terminal) reporter with colors and formatting

use super::MatchReport;
use anyhow::Result;
use console::style;
use simsweep_fast::BenchmarkReport;
use std::fmt::Write;

/// Longest text snippet shown per line
const SNIPPET_CHARS: usize = 60;

fn snippet(text: &str) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(SNIPPET_CHARS).collect();
    if chars.next().is_some() {
        format!("{}…", head)
    } else {
        head
    }
}

/// Render search results as terminal output
pub fn render_matches(report: &MatchReport<'_>) -> Result<String> {
    let corpus = report.corpus;
    let top = report.top;
    let mut out = String::new();

    writeln!(
        out,
        "{} top-{} matches for {} records ({} comparisons, {} ms, {} threads)\n",
        style("simsweep").bold(),
        top.k,
        top.len(),
        top.comparisons,
        top.elapsed.as_millis(),
        top.threads
    )?;

    for (i, result) in top.results.iter().enumerate() {
        let text = corpus
            .get(result.index)
            .and_then(|item| item.text())
            .map(|t| format!("  {}", style(snippet(t)).dim()))
            .unwrap_or_default();
        writeln!(out, "{}{}", style(&result.identity).cyan().bold(), text)?;

        let mut shown = 0;
        for (rank, m) in report.visible(i).enumerate() {
            let id = corpus.identity(m.index).unwrap_or_default();
            let text = corpus
                .get(m.index)
                .and_then(|item| item.text())
                .map(|t| format!("  {}", style(snippet(t)).dim()))
                .unwrap_or_default();
            writeln!(out, "  {:>2}. {:.4}  {}{}", rank + 1, m.score, id, text)?;
            shown += 1;
        }
        if shown == 0 {
            writeln!(out, "      {}", style("(no matches)").dim())?;
        }
    }

    Ok(out)
}

/// Render a benchmark report as terminal output
pub fn render_benchmark(report: &BenchmarkReport) -> Result<String> {
    let mut out = String::new();
    writeln!(out, "{}", style("simsweep full sweep").bold())?;
    writeln!(out, "Items:     {}", report.items)?;
    writeln!(out, "Pairs:     {}", report.pairs)?;
    writeln!(out, "Threads:   {}", report.threads)?;
    writeln!(out, "Elapsed:   {} ms", report.elapsed_ms())?;
    writeln!(out, "Pairs/sec: {:.0}", report.pairs_per_second())?;
    Ok(out)
}
