//! Aggregate providers
//!
//! The engine does not care where aggregates come from. A provider hands out
//! one group's data for a period; a failure only affects that group.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::models::{GroupAnalysisInput, Period};

/// Source of per-group aggregates
pub trait AggregateProvider: Send + Sync {
    /// Aggregates for one group restricted to `period`
    fn fetch(&self, group_id: &str, period: &Period) -> Result<GroupAnalysisInput>;
}

/// Restrict a group's daily stats to a period
///
/// Member totals are kept as supplied; they cannot be re-windowed from
/// aggregates alone.
pub fn restrict_to_period(mut input: GroupAnalysisInput, period: &Period) -> Result<GroupAnalysisInput> {
    input
        .daily_stats
        .retain(|d| d.date >= period.start && d.date <= period.end);
    if input.daily_stats.is_empty() {
        return Err(Error::Provider(format!(
            "no activity for group {} in {}",
            input.group_id, period
        )));
    }
    input.period = *period;
    Ok(input)
}

/// Provider over groups already held in memory
pub struct InMemoryProvider {
    groups: BTreeMap<String, GroupAnalysisInput>,
}

impl InMemoryProvider {
    pub fn new(groups: Vec<GroupAnalysisInput>) -> Self {
        Self {
            groups: groups
                .into_iter()
                .map(|g| (g.group_id.clone(), g))
                .collect(),
        }
    }

    pub fn group_ids(&self) -> Vec<String> {
        self.groups.keys().cloned().collect()
    }
}

impl AggregateProvider for InMemoryProvider {
    fn fetch(&self, group_id: &str, period: &Period) -> Result<GroupAnalysisInput> {
        let group = self
            .groups
            .get(group_id)
            .ok_or_else(|| Error::NotFound(format!("group {}", group_id)))?;
        restrict_to_period(group.clone(), period)
    }
}

/// Provider reading `<dir>/<group_id>.json`
pub struct JsonDirProvider {
    dir: PathBuf,
}

impl JsonDirProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, group_id: &str) -> Result<PathBuf> {
        let valid = !group_id.is_empty()
            && group_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
            && !group_id.starts_with('.');
        if !valid {
            return Err(Error::InvalidData(format!("invalid group id: {}", group_id)));
        }
        Ok(self.dir.join(format!("{}.json", group_id)))
    }
}

impl AggregateProvider for JsonDirProvider {
    fn fetch(&self, group_id: &str, period: &Period) -> Result<GroupAnalysisInput> {
        let path = self.path_for(group_id)?;
        if !path.exists() {
            return Err(Error::NotFound(format!("{}", path.display())));
        }
        let content = std::fs::read_to_string(&path)?;
        let group: GroupAnalysisInput = serde_json::from_str(&content)?;
        tracing::debug!(group = group_id, path = %path.display(), "Loaded group aggregates");
        restrict_to_period(group, period)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(Box<GroupAnalysisInput>),
    Many(Vec<GroupAnalysisInput>),
}

/// Parse a JSON document holding one group object or an array of groups
pub fn parse_groups(content: &str) -> Result<Vec<GroupAnalysisInput>> {
    match serde_json::from_str::<OneOrMany>(content) {
        Ok(OneOrMany::One(group)) => Ok(vec![*group]),
        Ok(OneOrMany::Many(groups)) => Ok(groups),
        // Re-parse for a useful message; untagged errors say nothing
        Err(_) => match serde_json::from_str::<GroupAnalysisInput>(content) {
            Ok(group) => Ok(vec![group]),
            Err(e) => Err(Error::InvalidData(format!("invalid group data: {}", e))),
        },
    }
}

/// Read a groups file (one group or an array)
pub fn load_groups(path: &Path) -> Result<Vec<GroupAnalysisInput>> {
    let content = std::fs::read_to_string(path)?;
    parse_groups(&content)
}
