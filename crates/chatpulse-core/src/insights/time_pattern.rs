//! Time Pattern Insight
//!
//! Aggregates hourly activity across the window and reports a dominant
//! time slot when one hour clearly stands out.

use crate::error::Result;
use crate::models::GroupAnalysisInput;

use super::engine::Analyzer;
use super::types::{AnalyzerKind, InsightType, Priority, SmartInsight, Trend};

const DAY_SATURATION: usize = 30;

pub struct TimePatternAnalyzer {
    /// Minimum share of all hourly messages for the top hour, in percent
    min_share: f64,
    /// Minimum absolute message count for the top hour
    min_count: u64,
}

impl TimePatternAnalyzer {
    pub fn new() -> Self {
        Self {
            min_share: 12.0,
            min_count: 15,
        }
    }
}

impl Default for TimePatternAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// Hours ordered by volume, busiest first; ties resolve to the earlier hour
pub fn top_hours(histogram: &[u64; 24], n: usize) -> Vec<(usize, u64)> {
    let mut hours: Vec<(usize, u64)> = histogram
        .iter()
        .copied()
        .enumerate()
        .filter(|(_, count)| *count > 0)
        .collect();
    hours.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    hours.truncate(n);
    hours
}

fn hour_label(hour: usize) -> String {
    format!("{:02}:00", hour)
}

impl Analyzer for TimePatternAnalyzer {
    fn kind(&self) -> AnalyzerKind {
        AnalyzerKind::TimePattern
    }

    fn name(&self) -> &'static str {
        "Time Pattern"
    }

    fn analyze(&self, input: &GroupAnalysisInput) -> Result<Vec<SmartInsight>> {
        let histogram = input.hourly_histogram();
        let total: u64 = histogram.iter().sum();
        if total == 0 {
            return Ok(vec![]);
        }

        let top = top_hours(&histogram, 3);
        let &[(peak_hour, peak_count), ..] = top.as_slice() else {
            return Ok(vec![]);
        };
        let share = peak_count as f64 / total as f64 * 100.0;
        if share <= self.min_share || peak_count <= self.min_count {
            return Ok(vec![]);
        }

        let listed = top
            .iter()
            .map(|(hour, count)| format!("{} ({} msgs)", hour_label(*hour), count))
            .collect::<Vec<_>>()
            .join(", ");

        Ok(vec![SmartInsight::new(
            input,
            AnalyzerKind::TimePattern,
            InsightType::PeakHours,
            Priority::Medium,
            75,
            "Peak activity window",
            format!(
                "{} concentrates {:.1}% of {} hourly messages. Busiest hours: {}.",
                hour_label(peak_hour),
                share,
                total,
                listed
            ),
            hour_label(peak_hour),
        )
        .with_recommendation(format!(
            "Post announcements and important questions around {} to reach the most members.",
            hour_label(peak_hour)
        ))
        .with_trend(Trend::Stable)
        .with_data_points(input.daily_stats.len(), DAY_SATURATION)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::insights::types::InsightValue;
    use crate::models::DailyStat;
    use crate::test_utils::{day, group_with_days};

    #[test]
    fn test_dominant_hour_reported() {
        let days = vec![
            DailyStat::new(day(0), 30, 4).with_hourly([(20, 12), (9, 8), (13, 10)]),
            DailyStat::new(day(1), 30, 4).with_hourly([(20, 14), (9, 6), (13, 10)]),
        ];
        let insights = TimePatternAnalyzer::new()
            .analyze(&group_with_days("g", days))
            .unwrap();

        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].value, InsightValue::Text("20:00".to_string()));
        assert!(insights[0].description.contains("20:00 (26 msgs)"));
        assert!(insights[0].description.contains("13:00 (20 msgs)"));
        assert!(insights[0].description.contains("09:00 (14 msgs)"));
    }

    #[test]
    fn test_low_volume_top_hour_is_silent() {
        let days = vec![DailyStat::new(day(0), 12, 2).with_hourly([(8, 10), (9, 2)])];
        assert!(TimePatternAnalyzer::new()
            .analyze(&group_with_days("g", days))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_evenly_spread_hours_are_silent() {
        let hourly: Vec<(u8, u64)> = (0..24).map(|h| (h, 20)).collect();
        let days = vec![DailyStat::new(day(0), 480, 10).with_hourly(hourly)];
        assert!(TimePatternAnalyzer::new()
            .analyze(&group_with_days("g", days))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_no_hourly_data_is_silent() {
        let days = vec![DailyStat::new(day(0), 100, 10)];
        assert!(TimePatternAnalyzer::new()
            .analyze(&group_with_days("g", days))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_top_hours_tie_break() {
        let mut histogram = [0u64; 24];
        histogram[22] = 5;
        histogram[7] = 5;
        histogram[3] = 9;
        assert_eq!(top_hours(&histogram, 3), vec![(3, 9), (7, 5), (22, 5)]);
    }
}
