//! Growth Trend Insight
//!
//! Buckets the window into consecutive weeks and compares the latest week
//! against the average of the earlier ones, confirming the direction with a
//! least-squares slope over the weekly means.

use crate::config::Guards;
use crate::error::Result;
use crate::models::{DailyStat, GroupAnalysisInput};
use crate::stats::{linear_regression_slope, mean, percent_change};

use super::engine::Analyzer;
use super::types::{AnalyzerKind, InsightType, Priority, SmartInsight, Trend};

const DAY_SATURATION: usize = 30;

/// Mean daily activity of one period bucket
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BucketMeans {
    pub messages: f64,
    pub active_members: f64,
}

pub struct GrowthTrendAnalyzer {
    /// Days per bucket (default 7)
    bucket_days: usize,
    /// A trailing partial bucket shorter than this is dropped (default 3)
    min_tail_days: usize,
}

impl GrowthTrendAnalyzer {
    pub fn new() -> Self {
        Self::from_guards(&Guards::default())
    }

    pub fn from_guards(guards: &Guards) -> Self {
        Self {
            bucket_days: guards.growth_bucket_days.max(1),
            min_tail_days: guards.growth_min_tail_days,
        }
    }

    /// Per-bucket means, chronological
    pub fn bucket_means(&self, days: &[DailyStat]) -> Vec<BucketMeans> {
        days.chunks(self.bucket_days)
            .filter(|chunk| chunk.len() == self.bucket_days || chunk.len() >= self.min_tail_days)
            .map(|chunk| {
                let messages: Vec<f64> = chunk.iter().map(|d| d.total_messages as f64).collect();
                let members: Vec<f64> = chunk.iter().map(|d| d.active_members as f64).collect();
                BucketMeans {
                    messages: mean(&messages),
                    active_members: mean(&members),
                }
            })
            .collect()
    }
}

impl Default for GrowthTrendAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl Analyzer for GrowthTrendAnalyzer {
    fn kind(&self) -> AnalyzerKind {
        AnalyzerKind::GrowthTrend
    }

    fn name(&self) -> &'static str {
        "Growth Trend"
    }

    fn analyze(&self, input: &GroupAnalysisInput) -> Result<Vec<SmartInsight>> {
        let buckets = self.bucket_means(&input.daily_stats);
        let Some((last, prior)) = buckets.split_last() else {
            return Ok(vec![]);
        };
        if prior.is_empty() {
            return Ok(vec![]);
        }

        let prior_means: Vec<f64> = prior.iter().map(|b| b.messages).collect();
        let prior_avg = mean(&prior_means);
        let growth_pct = percent_change(prior_avg, last.messages);

        let all_means: Vec<f64> = buckets.iter().map(|b| b.messages).collect();
        let weekly_trend = linear_regression_slope(&all_means);

        let summary = format!(
            "Latest week averaged {:.1} messages/day ({:.1} active members) vs {:.1} in the {} earlier week(s): {:+.0}% with a slope of {:+.2} messages/day per week.",
            last.messages,
            last.active_members,
            prior_avg,
            prior.len(),
            growth_pct,
            weekly_trend
        );

        let insight = if growth_pct > 20.0 && weekly_trend > 0.5 {
            Some(
                SmartInsight::new(
                    input,
                    AnalyzerKind::GrowthTrend,
                    InsightType::AcceleratingGrowth,
                    Priority::High,
                    88,
                    "Accelerating growth",
                    summary,
                    growth_pct,
                )
                .with_recommendation(
                    "Capitalize on the momentum: welcome new voices and pin the threads that are working.",
                )
                .with_trend(Trend::Up)
                .with_change(growth_pct),
            )
        } else if growth_pct < -20.0 && weekly_trend < -0.5 {
            Some(
                SmartInsight::new(
                    input,
                    AnalyzerKind::GrowthTrend,
                    InsightType::DecliningGrowth,
                    Priority::Critical,
                    92,
                    "Activity in decline",
                    summary,
                    growth_pct,
                )
                .with_recommendation(
                    "Re-engage the group with a question, poll or event before the decline settles in.",
                )
                .with_trend(Trend::Down)
                .with_change(growth_pct),
            )
        } else if weekly_trend.abs() < 0.3 && last.messages > 3.0 {
            Some(
                SmartInsight::new(
                    input,
                    AnalyzerKind::GrowthTrend,
                    InsightType::SteadyGrowth,
                    Priority::Medium,
                    70,
                    "Steady, sustainable activity",
                    summary,
                    last.messages,
                )
                .with_recommendation(
                    "Activity is stable; experiment with one new format to lift it without disrupting the rhythm.",
                )
                .with_trend(Trend::Stable)
                .with_change(growth_pct),
            )
        } else {
            None
        };

        Ok(insight
            .map(|i| i.with_data_points(input.daily_stats.len(), DAY_SATURATION))
            .into_iter()
            .collect())
    }
}
