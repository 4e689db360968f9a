//! Core types for the Insight Engine

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::models::GroupAnalysisInput;

/// The ten built-in analyzers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalyzerKind {
    ActivityPeak,
    GrowthTrend,
    EngagementPattern,
    MemberConcentration,
    TimePattern,
    ContentQuality,
    Consistency,
    AnomalyDetection,
    LeadershipEmergence,
    MemberDiversity,
}

impl AnalyzerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalyzerKind::ActivityPeak => "activity_peak",
            AnalyzerKind::GrowthTrend => "growth_trend",
            AnalyzerKind::EngagementPattern => "engagement_pattern",
            AnalyzerKind::MemberConcentration => "member_concentration",
            AnalyzerKind::TimePattern => "time_pattern",
            AnalyzerKind::ContentQuality => "content_quality",
            AnalyzerKind::Consistency => "consistency",
            AnalyzerKind::AnomalyDetection => "anomaly_detection",
            AnalyzerKind::LeadershipEmergence => "leadership_emergence",
            AnalyzerKind::MemberDiversity => "member_diversity",
        }
    }

    /// All analyzers in registration order
    pub fn all() -> &'static [AnalyzerKind] {
        &[
            AnalyzerKind::ActivityPeak,
            AnalyzerKind::GrowthTrend,
            AnalyzerKind::EngagementPattern,
            AnalyzerKind::MemberConcentration,
            AnalyzerKind::TimePattern,
            AnalyzerKind::ContentQuality,
            AnalyzerKind::Consistency,
            AnalyzerKind::AnomalyDetection,
            AnalyzerKind::LeadershipEmergence,
            AnalyzerKind::MemberDiversity,
        ]
    }
}

impl fmt::Display for AnalyzerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AnalyzerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AnalyzerKind::all()
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("Unknown analyzer: {}", s))
    }
}

/// Closed set of insight categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightType {
    ActivityPeak,
    InconsistentActivity,
    AcceleratingGrowth,
    DecliningGrowth,
    SteadyGrowth,
    EngagementGrowth,
    /// Highest-weight insight in the catalog
    ParticipationDecline,
    StableEngagement,
    MemberConcentration,
    BalancedDistribution,
    PeakHours,
    PremiumContent,
    SuperficialContent,
    ExceptionalConsistency,
    CriticalInconsistency,
    ActivityAnomaly,
    NaturalLeadership,
    BalancedEcosystem,
}

impl InsightType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InsightType::ActivityPeak => "activity_peak",
            InsightType::InconsistentActivity => "inconsistent_activity",
            InsightType::AcceleratingGrowth => "accelerating_growth",
            InsightType::DecliningGrowth => "declining_growth",
            InsightType::SteadyGrowth => "steady_growth",
            InsightType::EngagementGrowth => "engagement_growth",
            InsightType::ParticipationDecline => "participation_decline",
            InsightType::StableEngagement => "stable_engagement",
            InsightType::MemberConcentration => "member_concentration",
            InsightType::BalancedDistribution => "balanced_distribution",
            InsightType::PeakHours => "peak_hours",
            InsightType::PremiumContent => "premium_content",
            InsightType::SuperficialContent => "superficial_content",
            InsightType::ExceptionalConsistency => "exceptional_consistency",
            InsightType::CriticalInconsistency => "critical_inconsistency",
            InsightType::ActivityAnomaly => "activity_anomaly",
            InsightType::NaturalLeadership => "natural_leadership",
            InsightType::BalancedEcosystem => "balanced_ecosystem",
        }
    }

    /// Category label reported in insight metadata
    pub fn category(&self) -> &'static str {
        match self {
            InsightType::ActivityPeak | InsightType::InconsistentActivity => "activity",
            InsightType::AcceleratingGrowth
            | InsightType::DecliningGrowth
            | InsightType::SteadyGrowth => "growth",
            InsightType::EngagementGrowth
            | InsightType::ParticipationDecline
            | InsightType::StableEngagement => "engagement",
            InsightType::MemberConcentration | InsightType::BalancedDistribution => "distribution",
            InsightType::PeakHours => "temporal",
            InsightType::PremiumContent | InsightType::SuperficialContent => "quality",
            InsightType::ExceptionalConsistency | InsightType::CriticalInconsistency => {
                "consistency"
            }
            InsightType::ActivityAnomaly => "anomaly",
            InsightType::NaturalLeadership => "leadership",
            InsightType::BalancedEcosystem => "diversity",
        }
    }
}

impl fmt::Display for InsightType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How urgent an insight is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Critical => "critical",
        }
    }

    /// Numeric rank for sorting (higher = more urgent)
    pub fn rank(&self) -> u8 {
        match self {
            Priority::Low => 1,
            Priority::Medium => 2,
            Priority::High => 3,
            Priority::Critical => 4,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Up,
    Down,
    Stable,
    Warning,
    Critical,
}

impl Trend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Trend::Up => "up",
            Trend::Down => "down",
            Trend::Stable => "stable",
            Trend::Warning => "warning",
            Trend::Critical => "critical",
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Headline value of an insight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InsightValue {
    Number(f64),
    Text(String),
}

impl InsightValue {
    pub fn is_finite(&self) -> bool {
        match self {
            InsightValue::Number(n) => n.is_finite(),
            InsightValue::Text(_) => true,
        }
    }
}

impl fmt::Display for InsightValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InsightValue::Number(n) if n.fract() == 0.0 => write!(f, "{:.0}", n),
            InsightValue::Number(n) => write!(f, "{:.1}", n),
            InsightValue::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<f64> for InsightValue {
    fn from(value: f64) -> Self {
        InsightValue::Number(value)
    }
}

impl From<String> for InsightValue {
    fn from(value: String) -> Self {
        InsightValue::Text(value)
    }
}

impl From<&str> for InsightValue {
    fn from(value: &str) -> Self {
        InsightValue::Text(value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightMetadata {
    /// Human-readable analysis window
    pub period: String,
    /// Number of days or members the insight was computed from
    pub data_points: usize,
    /// 0-100
    pub confidence: u8,
    pub category: String,
}

/// One emitted observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmartInsight {
    /// Stable per (group, analyzer, insight type)
    pub id: String,
    #[serde(rename = "type")]
    pub insight_type: InsightType,
    pub priority: Priority,
    /// 0-100 ranking score
    pub weight: u8,
    pub title: String,
    pub description: String,
    pub recommendation: String,
    pub value: InsightValue,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change: Option<f64>,
    pub trend: Trend,
    pub actionable: bool,
    pub metadata: InsightMetadata,
    pub group_id: String,
    pub group_name: String,
}

impl SmartInsight {
    /// Create an insight for a group; metadata is filled from the group's period
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        input: &GroupAnalysisInput,
        analyzer: AnalyzerKind,
        insight_type: InsightType,
        priority: Priority,
        weight: u8,
        title: impl Into<String>,
        description: impl Into<String>,
        value: impl Into<InsightValue>,
    ) -> Self {
        Self {
            id: format!("{}:{}:{}", input.group_id, analyzer, insight_type),
            insight_type,
            priority,
            weight: weight.min(100),
            title: title.into(),
            description: description.into(),
            recommendation: String::new(),
            value: value.into(),
            change: None,
            trend: Trend::Stable,
            actionable: false,
            metadata: InsightMetadata {
                period: input.period.to_string(),
                data_points: 0,
                confidence: 0,
                category: insight_type.category().to_string(),
            },
            group_id: input.group_id.clone(),
            group_name: input.group_name.clone(),
        }
    }

    /// Recommendation text; marks the insight actionable
    pub fn with_recommendation(mut self, recommendation: impl Into<String>) -> Self {
        self.recommendation = recommendation.into();
        self.actionable = true;
        self
    }

    /// Closing note for insights that need no action
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.recommendation = note.into();
        self.actionable = false;
        self
    }

    pub fn with_trend(mut self, trend: Trend) -> Self {
        self.trend = trend;
        self
    }

    pub fn with_change(mut self, change: f64) -> Self {
        self.change = Some(change);
        self
    }

    /// Record how many samples backed the insight and derive confidence
    ///
    /// Confidence grows linearly from 40 to 100 as `data_points` approaches
    /// `saturation`.
    pub fn with_data_points(mut self, data_points: usize, saturation: usize) -> Self {
        let ratio = if saturation == 0 {
            1.0
        } else {
            (data_points as f64 / saturation as f64).min(1.0)
        };
        self.metadata.data_points = data_points;
        self.metadata.confidence = (40.0 + 60.0 * ratio).round() as u8;
        self
    }

    /// Whether every number carried by the insight is finite
    pub fn is_finite(&self) -> bool {
        self.value.is_finite() && self.change.map_or(true, f64::is_finite)
    }
}
