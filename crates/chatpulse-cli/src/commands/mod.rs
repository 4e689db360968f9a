//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `config` - Show the resolved engine configuration
//! - `formula` - Formula validation and evaluation
//! - `insights` - Insight generation and export (text, JSON, CSV)
//! - `metrics` - Metric catalog listing
//! - `serve` - Web server command

pub mod config;
pub mod formula;
pub mod insights;
pub mod metrics;
pub mod serve;

// Re-export command functions for main.rs
pub use config::*;
pub use formula::*;
pub use insights::*;
pub use metrics::*;
pub use serve::*;

use std::path::Path;

use anyhow::{Context, Result};
use chatpulse_core::EngineConfig;

/// Truncate a string to a maximum length, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Load engine configuration from `--config` or the default location
pub fn load_engine_config(config_path: Option<&Path>) -> Result<EngineConfig> {
    match config_path {
        Some(path) => EngineConfig::load_from(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => EngineConfig::load().context("Failed to load engine config"),
    }
}
