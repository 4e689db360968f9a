//! Engagement Pattern Insight
//!
//! Splits the window in half and compares message volume and active members
//! between the halves.

use crate::config::Guards;
use crate::error::Result;
use crate::models::{DailyStat, GroupAnalysisInput};
use crate::stats::{mean, percent_change};

use super::engine::Analyzer;
use super::types::{AnalyzerKind, InsightType, Priority, SmartInsight, Trend};

const DAY_SATURATION: usize = 30;

pub struct EngagementPatternAnalyzer {
    /// Minimum days before comparing halves (default 7)
    min_days: usize,
}

impl EngagementPatternAnalyzer {
    pub fn new() -> Self {
        Self::from_guards(&Guards::default())
    }

    pub fn from_guards(guards: &Guards) -> Self {
        Self {
            min_days: guards.engagement_min_days,
        }
    }
}

impl Default for EngagementPatternAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

fn half_means(days: &[DailyStat]) -> (f64, f64) {
    let messages: Vec<f64> = days.iter().map(|d| d.total_messages as f64).collect();
    let members: Vec<f64> = days.iter().map(|d| d.active_members as f64).collect();
    (mean(&messages), mean(&members))
}

impl Analyzer for EngagementPatternAnalyzer {
    fn kind(&self) -> AnalyzerKind {
        AnalyzerKind::EngagementPattern
    }

    fn name(&self) -> &'static str {
        "Engagement Pattern"
    }

    fn analyze(&self, input: &GroupAnalysisInput) -> Result<Vec<SmartInsight>> {
        let total_days = input.daily_stats.len();
        let (first, second) = input.daily_stats.split_at(total_days / 2);
        if total_days < self.min_days || first.is_empty() || second.is_empty() {
            return Ok(vec![]);
        }

        let (first_messages, first_members) = half_means(first);
        let (second_messages, second_members) = half_means(second);
        let message_trend = percent_change(first_messages, second_messages);
        let active_ratio = input.active_days_ratio();

        let comparison = format!(
            "Messages per day went from {:.1} to {:.1} ({:+.0}%) and active members from {:.1} to {:.1} between the first and second half of the window.",
            first_messages, second_messages, message_trend, first_members, second_members
        );

        let insight = if message_trend > 15.0 && second_members > first_members {
            Some(
                SmartInsight::new(
                    input,
                    AnalyzerKind::EngagementPattern,
                    InsightType::EngagementGrowth,
                    Priority::High,
                    85,
                    "Engagement is growing",
                    comparison,
                    message_trend,
                )
                .with_recommendation(
                    "More members are joining the conversation; give newcomers easy ways to contribute.",
                )
                .with_trend(Trend::Up)
                .with_change(message_trend),
            )
        } else if message_trend < -15.0 {
            Some(
                SmartInsight::new(
                    input,
                    AnalyzerKind::EngagementPattern,
                    InsightType::ParticipationDecline,
                    Priority::Critical,
                    95,
                    "Participation is declining",
                    comparison,
                    message_trend,
                )
                .with_recommendation(
                    "Reach out to previously active members and ask what would bring them back.",
                )
                .with_trend(Trend::Critical)
                .with_change(message_trend),
            )
        } else if active_ratio > 0.80 && second_messages > 5.0 {
            Some(
                SmartInsight::new(
                    input,
                    AnalyzerKind::EngagementPattern,
                    InsightType::StableEngagement,
                    Priority::Medium,
                    75,
                    "Stable engagement",
                    format!(
                        "{} The group was active on {:.0}% of days.",
                        comparison,
                        active_ratio * 100.0
                    ),
                    second_messages,
                )
                .with_recommendation(
                    "Keep the current cadence and recognize the members who sustain it.",
                )
                .with_trend(Trend::Stable)
                .with_change(message_trend),
            )
        } else {
            None
        };

        Ok(insight
            .map(|i| i.with_data_points(total_days, DAY_SATURATION))
            .into_iter()
            .collect())
    }
}
