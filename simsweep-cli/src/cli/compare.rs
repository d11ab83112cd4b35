//! Compare command - score one pair of records

use anyhow::{anyhow, Result};
use console::style;
use simsweep_fast::{text::normalized_levenshtein, Precision, VectorCorpus};
use std::path::Path;

use crate::config::ProjectConfig;
use crate::ingest::load_corpus;

fn find(corpus: &VectorCorpus, id: &str) -> Result<usize> {
    corpus
        .position(id)
        .ok_or_else(|| anyhow!("No record with id '{}'", id))
}

/// Run the compare command
pub fn run(
    config: &ProjectConfig,
    input: &Path,
    id_a: &str,
    id_b: &str,
    precision: Option<&str>,
) -> Result<()> {
    let precision = match precision {
        Some(p) => p.parse::<Precision>().map_err(anyhow::Error::msg)?,
        None => config.precision(),
    };
    let corpus = load_corpus(input)?.corpus;
    let (a, b) = (find(&corpus, id_a)?, find(&corpus, id_b)?);

    let score = precision.cosine(corpus.vector(a), corpus.vector(b));
    println!(
        "{} {} vs {}",
        style("Compare").bold(),
        style(id_a).cyan(),
        style(id_b).cyan()
    );
    println!("Cosine ({}):  {:.6}", precision.as_str(), score);

    let texts = corpus
        .get(a)
        .and_then(|item| item.text())
        .zip(corpus.get(b).and_then(|item| item.text()));
    match texts {
        Some((ta, tb)) => println!("Levenshtein:      {:.6}", normalized_levenshtein(ta, tb)),
        None => println!("Levenshtein:      {}", style("n/a (missing text)").dim()),
    }
    Ok(())
}
