//! Project-level configuration support
//!
//! Loads configuration from `simsweep.toml` in the working directory, or from
//! an explicit `--config` path.
//!
//! # Configuration Format
//!
//! ```toml
//! # simsweep.toml
//!
//! [engine]
//! workers = 8            # 0 or omitted = all available hardware threads
//! top_k = 5
//! precision = "single"   # or "double"
//!
//! [output]
//! format = "text"        # or "json"
//! min_score = 0.0
//! ```
//!
//! Precedence: CLI flag (or its `SIMSWEEP_*` env var) > config file > defaults.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use simsweep_fast::{Concurrency, EngineConfig, Precision};
use std::path::Path;
use tracing::{debug, warn};

/// Largest worker count accepted from a flag, env var or config file.
pub const MAX_WORKERS: usize = 256;

/// Default config file name looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "simsweep.toml";

/// Example file written by `simsweep init`.
pub const EXAMPLE_CONFIG: &str = r#"# simsweep configuration

[engine]
# Worker threads for the similarity sweep (0 = all available)
workers = 0

# Neighbors kept per record by `simsweep search`
top_k = 5

# Metric accumulation precision: "single" or "double"
precision = "single"

[output]
# Report format for `simsweep search`: "text" or "json"
format = "text"

# Hide matches scoring below this value in reports
min_score = 0.0
"#;

/// Top-level project configuration
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
pub struct ProjectConfig {
    #[serde(default)]
    pub engine: EngineSection,

    #[serde(default)]
    pub output: OutputSection,
}

/// `[engine]` table
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
pub struct EngineSection {
    /// Worker threads (0 = auto)
    #[serde(default)]
    pub workers: Option<usize>,

    /// Neighbors kept per record
    #[serde(default)]
    pub top_k: Option<usize>,

    /// "single" or "double"
    #[serde(default)]
    pub precision: Option<Precision>,
}

/// `[output]` table
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
pub struct OutputSection {
    /// "text" or "json"
    #[serde(default)]
    pub format: Option<String>,

    /// Drop matches below this score in reports
    #[serde(default)]
    pub min_score: Option<f64>,
}

impl ProjectConfig {
    pub fn precision(&self) -> Precision {
        self.engine.precision.unwrap_or_default()
    }

    pub fn format(&self) -> &str {
        self.output.format.as_deref().unwrap_or("text")
    }

    pub fn min_score(&self) -> Option<f64> {
        self.output.min_score
    }

    /// Merge CLI overrides over file values into a validated engine config.
    ///
    /// # Errors
    /// Fails when the merged `top_k` is 0 or `workers` exceeds [`MAX_WORKERS`].
    pub fn engine_config(
        &self,
        workers: Option<usize>,
        top_k: Option<usize>,
        precision: Option<Precision>,
    ) -> Result<EngineConfig> {
        let workers = workers.or(self.engine.workers);
        if let Some(n) = workers.filter(|&n| n > MAX_WORKERS) {
            bail!(
                "Invalid engine configuration: workers = {} exceeds the maximum of {}",
                n,
                MAX_WORKERS
            );
        }

        let defaults = EngineConfig::default();
        let config = EngineConfig {
            concurrency: Concurrency::from_workers(workers),
            top_k: top_k.or(self.engine.top_k).unwrap_or(defaults.top_k),
            precision: precision.unwrap_or_else(|| self.precision()),
        };

        if let Err(e) = config.validate() {
            bail!("Invalid engine configuration: {}", e);
        }
        Ok(config)
    }
}

/// Load `simsweep.toml` from `dir`, or defaults when absent or unreadable.
pub fn load_project_config(dir: &Path) -> ProjectConfig {
    let toml_path = dir.join(CONFIG_FILE_NAME);
    if toml_path.exists() {
        match load_config_file(&toml_path) {
            Ok(config) => {
                debug!("Loaded project config from {}", toml_path.display());
                return config;
            }
            Err(e) => {
                warn!("Failed to load {}: {:#}", toml_path.display(), e);
            }
        }
    }

    debug!("No project config found, using defaults");
    ProjectConfig::default()
}

/// Load configuration from an explicit TOML file.
pub fn load_config_file(path: &Path) -> Result<ProjectConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let config: ProjectConfig =
        toml::from_str(&content).with_context(|| format!("Invalid TOML in {}", path.display()))?;
    Ok(config)
}
