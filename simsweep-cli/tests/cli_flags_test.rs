//! CLI flag contract tests
//!
//! Runs the built binary against small corpora in a temp directory and checks
//! the observable contract of each command: exit codes, stdout reports, and
//! config precedence.

use std::path::Path;
use std::process::Command;

fn simsweep_bin() -> String {
    env!("CARGO_BIN_EXE_simsweep").to_string()
}

const CORPUS: &str = r#"{"id": "a", "text": "open the gate", "vector": [1.0, 0.0]}
{"id": "b", "text": "open the door", "vector": [1.0, 0.0]}
{"id": "c", "text": "red apple", "vector": [0.0, 1.0]}
{"id": "d", "text": "close the gate", "vector": [-1.0, 0.0]}
"#;

fn setup_corpus() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("corpus.jsonl"), CORPUS).unwrap();
    dir
}

/// Run simsweep inside `dir` with a clean environment. Returns (code, stdout, stderr).
fn run(dir: &Path, args: &[&str]) -> (i32, String, String) {
    let output = Command::new(simsweep_bin())
        .args(args)
        .arg("--log-level")
        .arg("error")
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .env_remove("SIMSWEEP_WORKERS")
        .env_remove("SIMSWEEP_TOP_K")
        .env_remove("SIMSWEEP_PRECISION")
        .env_remove("SIMSWEEP_CONFIG")
        .output()
        .expect("Failed to run simsweep");
    (
        output.status.code().unwrap_or(-1),
        String::from_utf8_lossy(&output.stdout).to_string(),
        String::from_utf8_lossy(&output.stderr).to_string(),
    )
}

fn search_json(dir: &Path, extra_args: &[&str]) -> serde_json::Value {
    let mut args = vec!["search", "corpus.jsonl", "--format", "json"];
    args.extend_from_slice(extra_args);
    let (code, stdout, stderr) = run(dir, &args);
    assert_eq!(code, 0, "search failed: {}", stderr);
    serde_json::from_str(&stdout).expect("Invalid JSON")
}

fn match_ids(result: &serde_json::Value) -> Vec<String> {
    result["matches"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["id"].as_str().unwrap().to_string())
        .collect()
}

// ============================================================================
// search
// ============================================================================

#[test]
fn test_search_top_k_ranks_neighbors() {
    let dir = setup_corpus();
    let json = search_json(dir.path(), &["--top-k", "2"]);

    assert_eq!(json["k"], 2);
    let results = json["results"].as_array().unwrap();
    assert_eq!(results.len(), 4);
    assert_eq!(match_ids(&results[0]), vec!["b", "c"]);
    assert_eq!(results[0]["matches"][0]["score"], 1.0);
    // d is opposite to a and b; c ties at 0.0 and wins on index
    assert_eq!(match_ids(&results[3]), vec!["c", "a"]);
}

#[test]
fn test_search_default_k_caps_at_corpus_size() {
    let dir = setup_corpus();
    let json = search_json(dir.path(), &[]);
    for result in json["results"].as_array().unwrap() {
        assert_eq!(result["matches"].as_array().unwrap().len(), 3);
    }
}

#[test]
fn test_search_min_score_filters_report() {
    let dir = setup_corpus();
    let json = search_json(dir.path(), &["--top-k", "3", "--min-score", "0.5"]);
    assert_eq!(match_ids(&json["results"][0]), vec!["b"]);
    assert!(match_ids(&json["results"][2]).is_empty());
}

#[test]
fn test_search_output_is_identical_across_workers() {
    let dir = setup_corpus();
    let strip = |mut v: serde_json::Value| {
        v["elapsed_ms"] = serde_json::Value::Null;
        v["threads"] = serde_json::Value::Null;
        v
    };
    let one = strip(search_json(dir.path(), &["--workers", "1"]));
    let many = strip(search_json(dir.path(), &["--workers", "8"]));
    assert_eq!(one, many);
}

#[test]
fn test_search_writes_output_file() {
    let dir = setup_corpus();
    let (code, stdout, _) = run(
        dir.path(),
        &["search", "corpus.jsonl", "--format", "json", "-o", "out.json"],
    );
    assert_eq!(code, 0);
    assert!(stdout.trim().is_empty());
    let written = std::fs::read_to_string(dir.path().join("out.json")).unwrap();
    let json: serde_json::Value = serde_json::from_str(&written).unwrap();
    assert_eq!(json["items"], 4);
}

#[test]
fn test_search_text_format() {
    let dir = setup_corpus();
    let (code, stdout, _) = run(dir.path(), &["search", "corpus.jsonl", "-k", "1"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("top-1 matches for 4 records"));
    assert!(stdout.contains("1.0000  b"));
}

#[test]
fn test_search_rejects_zero_top_k() {
    let dir = setup_corpus();
    let (code, _, stderr) = run(dir.path(), &["search", "corpus.jsonl", "--top-k", "0"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("top-k must be at least 1"));
}

#[test]
fn test_search_empty_corpus_fails() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("corpus.jsonl"), "").unwrap();
    let (code, _, stderr) = run(dir.path(), &["search", "corpus.jsonl"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("empty"), "stderr: {}", stderr);
}

#[test]
fn test_search_missing_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let (code, _, stderr) = run(dir.path(), &["search", "nope.jsonl"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("Failed to read corpus file"));
}

// ============================================================================
// workers
// ============================================================================

#[test]
fn test_workers_out_of_range_rejected() {
    let dir = setup_corpus();
    for bad in ["0", "257", "lots"] {
        let (code, _, _) = run(dir.path(), &["bench", "corpus.jsonl", "--workers", bad]);
        assert_ne!(code, 0, "--workers {} should be rejected", bad);
    }
}

// ============================================================================
// bench
// ============================================================================

#[test]
fn test_bench_random_reports_pair_count() {
    let dir = tempfile::tempdir().unwrap();
    let (code, stdout, stderr) = run(
        dir.path(),
        &["bench", "--random", "1000", "--dim", "25", "--format", "json"],
    );
    assert_eq!(code, 0, "bench failed: {}", stderr);
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(json["items"], 1000);
    assert_eq!(json["pairs"], 499_500);
}

#[test]
fn test_bench_corpus_file() {
    let dir = setup_corpus();
    let (code, stdout, _) = run(dir.path(), &["bench", "corpus.jsonl", "--workers", "2"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("Pairs:     6"));
    assert!(stdout.contains("Threads:   2"));
}

#[test]
fn test_bench_empty_corpus_is_zero_pairs() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("corpus.jsonl"), "").unwrap();
    let (code, stdout, _) = run(dir.path(), &["bench", "corpus.jsonl", "--format", "json"]);
    assert_eq!(code, 0);
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(json["pairs"], 0);
}

// ============================================================================
// compare
// ============================================================================

#[test]
fn test_compare_pair() {
    let dir = setup_corpus();
    let (code, stdout, _) = run(dir.path(), &["compare", "corpus.jsonl", "a", "d"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("Cosine (single):  -1.000000"));
    assert!(stdout.contains("Levenshtein:"));
}

#[test]
fn test_compare_unknown_id_fails() {
    let dir = setup_corpus();
    let (code, _, stderr) = run(dir.path(), &["compare", "corpus.jsonl", "a", "zzz"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("No record with id 'zzz'"));
}

// ============================================================================
// config
// ============================================================================

#[test]
fn test_init_then_config_is_honored() {
    let dir = setup_corpus();
    let (code, _, _) = run(dir.path(), &["init"]);
    assert_eq!(code, 0);
    assert!(dir.path().join("simsweep.toml").exists());

    std::fs::write(
        dir.path().join("simsweep.toml"),
        "[engine]\ntop_k = 1\n\n[output]\nformat = \"json\"\n",
    )
    .unwrap();
    let (code, stdout, _) = run(dir.path(), &["search", "corpus.jsonl"]);
    assert_eq!(code, 0);
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(json["k"], 1);

    // Flag beats file
    let json = search_json(dir.path(), &["--top-k", "2"]);
    assert_eq!(json["k"], 2);
}

#[test]
fn test_explicit_config_must_exist() {
    let dir = setup_corpus();
    let (code, _, stderr) = run(
        dir.path(),
        &["search", "corpus.jsonl", "--config", "missing.toml"],
    );
    assert_ne!(code, 0);
    assert!(stderr.contains("missing.toml"));
}

#[test]
fn test_config_workers_above_cap_rejected() {
    let dir = setup_corpus();
    std::fs::write(dir.path().join("simsweep.toml"), "[engine]\nworkers = 100000\n").unwrap();
    let (code, _, stderr) = run(dir.path(), &["bench", "corpus.jsonl"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("exceeds the maximum of 256"), "stderr: {}", stderr);
}
