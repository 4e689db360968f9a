//! Insight engine configuration
//!
//! Controls how many insights the headline view returns, which analyzers run,
//! and the minimum-sample guards each analyzer applies.
//!
//! ## Configuration Resolution
//!
//! Config is loaded with a two-layer resolution:
//! 1. Explicit path, or the override in the data dir
//!    (~/.local/share/chatpulse/config/insights.toml)
//! 2. Fall back to embedded defaults (compiled into binary)
//!
//! Any key missing from an override keeps its default value.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::insights::AnalyzerKind;

/// Embedded default config (compiled into binary)
pub const DEFAULT_CONFIG: &str = include_str!("../../../config/insights.toml");

/// Minimum-sample guards for the analyzers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Guards {
    pub peak_min_days: usize,
    pub inconsistent_activity_min_days: usize,
    pub engagement_min_days: usize,
    pub consistency_min_days: usize,
    pub anomaly_min_days: usize,
    pub growth_bucket_days: usize,
    pub growth_min_tail_days: usize,
    pub concentration_min_members: usize,
    pub leadership_min_members: usize,
    pub diversity_min_members: usize,
}

impl Default for Guards {
    fn default() -> Self {
        Self {
            peak_min_days: 3,
            inconsistent_activity_min_days: 7,
            engagement_min_days: 7,
            consistency_min_days: 7,
            anomaly_min_days: 7,
            growth_bucket_days: 7,
            growth_min_tail_days: 3,
            concentration_min_members: 5,
            leadership_min_members: 4,
            diversity_min_members: 8,
        }
    }
}

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngineConfig {
    /// Insights returned by the headline view
    pub top_n: usize,
    /// Analyzers that are not registered
    pub disabled: Vec<AnalyzerKind>,
    pub guards: Guards,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            top_n: 3,
            disabled: Vec::new(),
            guards: Guards::default(),
        }
    }
}

impl EngineConfig {
    /// Load from the default override location, falling back to embedded defaults
    pub fn load() -> Result<Self> {
        load_config(None)
    }

    /// Load from an explicit path (embedded defaults if the file does not exist)
    pub fn load_from(path: &Path) -> Result<Self> {
        load_config(Some(path))
    }

    pub fn is_enabled(&self, kind: AnalyzerKind) -> bool {
        !self.disabled.contains(&kind)
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("chatpulse").join("config").join("insights.toml"))
}

/// Which file a configuration would be read from, if any
pub fn resolve_config_path(override_path: Option<&Path>) -> Option<PathBuf> {
    match override_path {
        Some(path) if path.exists() => Some(path.to_path_buf()),
        Some(_) => None,
        None => default_config_path().filter(|p| p.exists()),
    }
}

/// Load configuration (override first, then default)
fn load_config(override_path: Option<&Path>) -> Result<EngineConfig> {
    let content = match resolve_config_path(override_path) {
        Some(path) => {
            tracing::debug!(path = %path.display(), "Loading engine config override");
            fs::read_to_string(&path)
                .map_err(|e| Error::Config(format!("Failed to read config: {}", e)))?
        }
        None => DEFAULT_CONFIG.to_string(),
    };

    parse_config(&content)
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawConfig {
    engine: Option<RawEngine>,
    guards: Option<RawGuards>,
}

#[derive(Debug, Deserialize)]
struct RawEngine {
    top_n: Option<usize>,
    disabled: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct RawGuards {
    peak_min_days: Option<usize>,
    inconsistent_activity_min_days: Option<usize>,
    engagement_min_days: Option<usize>,
    consistency_min_days: Option<usize>,
    anomaly_min_days: Option<usize>,
    growth_bucket_days: Option<usize>,
    growth_min_tail_days: Option<usize>,
    concentration_min_members: Option<usize>,
    leadership_min_members: Option<usize>,
    diversity_min_members: Option<usize>,
}

/// Parse config from TOML content
pub fn parse_config(content: &str) -> Result<EngineConfig> {
    let raw: RawConfig = toml::from_str(content)
        .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

    let mut config = EngineConfig::default();

    if let Some(engine) = raw.engine {
        if let Some(top_n) = engine.top_n {
            config.top_n = top_n;
        }
        if let Some(disabled) = engine.disabled {
            config.disabled = disabled
                .iter()
                .map(|name| name.parse::<AnalyzerKind>().map_err(Error::Config))
                .collect::<Result<Vec<_>>>()?;
        }
    }

    if let Some(raw_guards) = raw.guards {
        let guards = &mut config.guards;
        let overrides = [
            (raw_guards.peak_min_days, &mut guards.peak_min_days),
            (
                raw_guards.inconsistent_activity_min_days,
                &mut guards.inconsistent_activity_min_days,
            ),
            (raw_guards.engagement_min_days, &mut guards.engagement_min_days),
            (raw_guards.consistency_min_days, &mut guards.consistency_min_days),
            (raw_guards.anomaly_min_days, &mut guards.anomaly_min_days),
            (raw_guards.growth_bucket_days, &mut guards.growth_bucket_days),
            (raw_guards.growth_min_tail_days, &mut guards.growth_min_tail_days),
            (
                raw_guards.concentration_min_members,
                &mut guards.concentration_min_members,
            ),
            (
                raw_guards.leadership_min_members,
                &mut guards.leadership_min_members,
            ),
            (raw_guards.diversity_min_members, &mut guards.diversity_min_members),
        ];
        for (value, slot) in overrides {
            if let Some(value) = value {
                *slot = value;
            }
        }
    }

    if config.guards.growth_bucket_days == 0 {
        return Err(Error::Config(
            "growth_bucket_days must be at least 1".to_string(),
        ));
    }
    if config.guards.leadership_min_members < 2 {
        return Err(Error::Config(
            "leadership_min_members must be at least 2".to_string(),
        ));
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_default_config() {
        let config = parse_config(DEFAULT_CONFIG).unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let config = parse_config(
            r#"
            [engine]
            top_n = 5
            disabled = ["time_pattern"]

            [guards]
            leadership_min_members = 6
            "#,
        )
        .unwrap();

        assert_eq!(config.top_n, 5);
        assert!(!config.is_enabled(AnalyzerKind::TimePattern));
        assert!(config.is_enabled(AnalyzerKind::ActivityPeak));
        assert_eq!(config.guards.leadership_min_members, 6);
        assert_eq!(config.guards.diversity_min_members, 8);
    }

    #[test]
    fn test_unknown_analyzer_rejected() {
        let err = parse_config("[engine]\ndisabled = [\"mood_ring\"]").unwrap_err();
        assert!(err.to_string().contains("mood_ring"));
    }

    #[test]
    fn test_invalid_toml_rejected() {
        assert!(parse_config("[engine\ntop_n = ").is_err());
        assert!(parse_config("[guards]\ngrowth_bucket_days = 0").is_err());
    }

    #[test]
    fn test_leadership_guard_needs_two_members() {
        let err = parse_config("[guards]\nleadership_min_members = 1").unwrap_err();
        assert!(err.to_string().contains("leadership_min_members"));
        assert!(parse_config("[guards]\nleadership_min_members = 0").is_err());
        assert_eq!(
            parse_config("[guards]\nleadership_min_members = 2")
                .unwrap()
                .guards
                .leadership_min_members,
            2
        );
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[engine]\ntop_n = 10").unwrap();

        let config = EngineConfig::load_from(file.path()).unwrap();
        assert_eq!(config.top_n, 10);
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = EngineConfig::load_from(&dir.path().join("missing.toml")).unwrap();
        assert_eq!(config, EngineConfig::default());
    }
}
