//! Consistency Insight
//!
//! Scores day-to-day volatility (coefficient of variation) and how many days
//! of the window had any activity. The two checks are independent.

use crate::config::Guards;
use crate::error::Result;
use crate::models::GroupAnalysisInput;
use crate::stats::consistency_score;

use super::engine::Analyzer;
use super::types::{AnalyzerKind, InsightType, Priority, SmartInsight, Trend};

const DAY_SATURATION: usize = 30;

pub struct ConsistencyAnalyzer {
    /// Minimum days before scoring (default 7)
    min_days: usize,
}

impl ConsistencyAnalyzer {
    pub fn new() -> Self {
        Self::from_guards(&Guards::default())
    }

    pub fn from_guards(guards: &Guards) -> Self {
        Self {
            min_days: guards.consistency_min_days,
        }
    }
}

impl Default for ConsistencyAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl Analyzer for ConsistencyAnalyzer {
    fn kind(&self) -> AnalyzerKind {
        AnalyzerKind::Consistency
    }

    fn name(&self) -> &'static str {
        "Consistency"
    }

    fn analyze(&self, input: &GroupAnalysisInput) -> Result<Vec<SmartInsight>> {
        if input.daily_stats.len() < self.min_days {
            return Ok(vec![]);
        }

        let score = consistency_score(&input.daily_messages());
        let frequency = input.active_days_ratio() * 100.0;

        Ok([
            exceptional_consistency(input, score, frequency),
            critical_inconsistency(input, score, frequency),
        ]
        .into_iter()
        .flatten()
        .collect())
    }
}

fn exceptional_consistency(
    input: &GroupAnalysisInput,
    score: f64,
    frequency: f64,
) -> Option<SmartInsight> {
    let qualifies = score > 75.0 && frequency > 85.0;
    if !qualifies {
        return None;
    }
    let total_days = input.daily_stats.len();

    Some(
        SmartInsight::new(
            input,
            AnalyzerKind::Consistency,
            InsightType::ExceptionalConsistency,
            Priority::High,
            82,
            "Exceptional consistency",
            format!(
                "Consistency score {:.0}/100 with activity on {:.0}% of {} days.",
                score, frequency, total_days
            ),
            score,
        )
        .with_note("The group has a reliable daily rhythm; no action needed.")
        .with_trend(Trend::Up)
        .with_data_points(total_days, DAY_SATURATION),
    )
}

/// Fires on low activity frequency whatever the consistency score
fn critical_inconsistency(
    input: &GroupAnalysisInput,
    score: f64,
    frequency: f64,
) -> Option<SmartInsight> {
    let qualifies = frequency < 60.0;
    if !qualifies {
        return None;
    }
    let total_days = input.daily_stats.len();

    Some(
        SmartInsight::new(
            input,
            AnalyzerKind::Consistency,
            InsightType::CriticalInconsistency,
            Priority::Critical,
            90,
            "Critical inconsistency",
            format!(
                "The group was active on only {:.0}% of {} days (consistency score {:.0}/100).",
                frequency, total_days, score
            ),
            frequency,
        )
        .with_recommendation(
            "Establish a predictable rhythm, such as a fixed weekly topic or check-in day.",
        )
        .with_trend(Trend::Critical)
        .with_data_points(total_days, DAY_SATURATION),
    )
}
