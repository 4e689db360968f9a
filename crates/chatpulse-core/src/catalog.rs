//! Metric catalog
//!
//! The single list of metric names formulas may reference. The evaluator
//! validates identifiers against it, the metric binder computes a value for
//! every entry, and the CLI and API list it for formula authors.
//!
//! Besides the canonical names, formulas may use two decorated forms:
//! - `prev_<name>`: the same metric over the previous window
//! - `<name>_7d`, `<name>_30d`, `<name>_90d`: the metric over the trailing
//!   7, 30 or 90 days ending on the group's last day
//!
//! Both can be combined (`prev_total_messages_30d`).

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::{Error, Result};

/// Bump whenever an entry is added, removed or renamed
pub const CATALOG_VERSION: u32 = 1;

/// Prefix for previous-period values
pub const PREVIOUS_PREFIX: &str = "prev_";

/// Trailing windows, in days, a metric name may be suffixed with
pub const WINDOW_DAYS: &[i64] = &[7, 30, 90];

/// Suffix naming a trailing window (`_7d`)
pub fn window_suffix(days: i64) -> String {
    format!("_{}d", days)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricCategory {
    Basic,
    Growth,
    Quality,
    Distribution,
    Temporal,
    Advanced,
}

impl MetricCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Growth => "growth",
            Self::Quality => "quality",
            Self::Distribution => "distribution",
            Self::Temporal => "temporal",
            Self::Advanced => "advanced",
        }
    }

    pub fn all() -> &'static [MetricCategory] {
        &[
            Self::Basic,
            Self::Growth,
            Self::Quality,
            Self::Distribution,
            Self::Temporal,
            Self::Advanced,
        ]
    }
}

impl fmt::Display for MetricCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for MetricCategory {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::InvalidData(format!("Unknown metric category: {}", s)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricType {
    Count,
    Percentage,
    Average,
    Score,
}

impl MetricType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Count => "count",
            Self::Percentage => "percentage",
            Self::Average => "average",
            Self::Score => "score",
        }
    }
}

/// One catalog entry
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricDescriptor {
    pub name: &'static str,
    pub label: &'static str,
    pub category: MetricCategory,
    pub value_type: MetricType,
    /// Typical magnitude, shown to formula authors
    pub example: f64,
}

const fn metric(
    name: &'static str,
    label: &'static str,
    category: MetricCategory,
    value_type: MetricType,
    example: f64,
) -> MetricDescriptor {
    MetricDescriptor {
        name,
        label,
        category,
        value_type,
        example,
    }
}

use MetricCategory::*;
use MetricType::*;

static METRICS: &[MetricDescriptor] = &[
    // Basic
    metric("total_messages", "Total messages", Basic, Count, 1250.0),
    metric("active_members", "Active members", Basic, Count, 24.0),
    metric("total_members", "Total members", Basic, Count, 40.0),
    metric("total_days", "Days in window", Basic, Count, 30.0),
    metric("active_days", "Days with activity", Basic, Count, 26.0),
    metric("avg_messages_per_day", "Messages per day", Basic, Average, 41.7),
    metric("avg_messages_per_member", "Messages per member", Basic, Average, 52.1),
    metric("media_messages", "Media messages", Basic, Count, 180.0),
    metric("total_words", "Total words", Basic, Count, 9800.0),
    // Growth
    metric("message_growth_rate", "Message growth", Growth, Percentage, 12.5),
    metric("member_growth_rate", "Active member growth", Growth, Percentage, 4.0),
    metric("engagement_growth_rate", "Messages per active member growth", Growth, Percentage, 8.0),
    metric("weekly_trend", "Weekly trend (messages/day per week)", Growth, Average, 1.8),
    // Quality
    metric("avg_message_length", "Words per message", Quality, Average, 9.4),
    metric("media_ratio", "Media share", Quality, Percentage, 14.4),
    metric("text_ratio", "Text share", Quality, Percentage, 85.6),
    metric("avg_words_per_member", "Words per member", Quality, Average, 408.3),
    // Distribution
    metric("participation_rate", "Participation rate", Distribution, Percentage, 60.0),
    metric("concentration_index", "Top 3 share", Distribution, Percentage, 45.0),
    metric("top_member_share", "Top member share", Distribution, Percentage, 18.0),
    metric("leader_gap", "Leader gap over runner-up", Distribution, Percentage, 35.0),
    metric("diversity_index", "Diversity index", Distribution, Score, 82.0),
    metric("gini_coefficient", "Gini coefficient", Distribution, Score, 48.0),
    // Temporal
    metric("activity_frequency", "Active days share", Temporal, Percentage, 86.7),
    metric("peak_hour", "Busiest hour", Temporal, Count, 20.0),
    metric("peak_hour_share", "Busiest hour share", Temporal, Percentage, 11.5),
    metric("peak_activity_ratio", "Peak day vs average", Temporal, Average, 2.4),
    metric("weekend_ratio", "Weekend share", Temporal, Percentage, 31.0),
    metric("night_activity_ratio", "Night share (00-06)", Temporal, Percentage, 4.5),
    // Advanced
    metric("consistency_score", "Consistency score", Advanced, Score, 72.0),
    metric("volatility", "Daily volatility (CV)", Advanced, Percentage, 46.0),
    metric("anomaly_count", "Anomalous days", Advanced, Count, 1.0),
    metric("avg_active_members", "Active members per day", Advanced, Average, 9.2),
    metric("health_score", "Group health score", Advanced, Score, 68.0),
];

/// Every catalog entry, in display order
pub fn all() -> &'static [MetricDescriptor] {
    METRICS
}

/// Entries in one category
pub fn by_category(category: MetricCategory) -> impl Iterator<Item = &'static MetricDescriptor> {
    METRICS.iter().filter(move |m| m.category == category)
}

/// Look up a canonical metric name
pub fn lookup(name: &str) -> Option<&'static MetricDescriptor> {
    METRICS.iter().find(|m| m.name == name)
}

/// Resolve a possibly decorated name to its catalog entry
///
/// Accepts `name`, `prev_name`, `name_30d` and `prev_name_30d`.
pub fn resolve(name: &str) -> Option<&'static MetricDescriptor> {
    if let Some(found) = lookup(name) {
        return Some(found);
    }

    let base = name.strip_prefix(PREVIOUS_PREFIX).unwrap_or(name);
    if let Some(found) = lookup(base) {
        return Some(found);
    }

    WINDOW_DAYS
        .iter()
        .find_map(|&days| base.strip_suffix(window_suffix(days).as_str()))
        .and_then(lookup)
}

/// Whether a formula may reference this identifier
pub fn is_known_variable(name: &str) -> bool {
    resolve(name).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_names_are_unique() {
        let names: HashSet<&str> = all().iter().map(|m| m.name).collect();
        assert_eq!(names.len(), all().len());
        assert!(all().len() >= 30);
    }

    #[test]
    fn test_every_category_populated() {
        for category in MetricCategory::all() {
            assert!(by_category(*category).count() > 0, "{} is empty", category);
        }
    }

    #[test]
    fn test_decorated_names() {
        assert!(is_known_variable("total_messages"));
        assert!(is_known_variable("prev_total_messages"));
        assert!(is_known_variable("total_messages_30d"));
        assert!(is_known_variable("prev_participation_rate_7d"));
        assert!(!is_known_variable("total_messages_14d"));
        assert!(!is_known_variable("prev_prev_total_messages"));
        assert!(!is_known_variable("foo_bar"));

        assert_eq!(resolve("prev_media_ratio_90d").map(|m| m.name), Some("media_ratio"));
    }

    #[test]
    fn test_category_from_str() {
        assert_eq!("Growth".parse::<MetricCategory>().unwrap(), MetricCategory::Growth);
        assert!("money".parse::<MetricCategory>().is_err());
    }
}
