//! Configuration module for simsweep
//!
//! This module handles:
//! - Project-level configuration (simsweep.toml)
//! - Engine settings (workers, top_k, precision)
//! - Report defaults (format, min_score)

mod project_config;

pub use project_config::{
    load_config_file, load_project_config, ProjectConfig, CONFIG_FILE_NAME, EXAMPLE_CONFIG,
    MAX_WORKERS,
};
