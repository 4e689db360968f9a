//! Activity Peak Insight
//!
//! Flags days whose message volume sits far above the group's normal level
//! (more than two standard deviations and 1.5x the mean). Also reports groups
//! that are silent on most days of the window.

use crate::config::Guards;
use crate::error::Result;
use crate::models::GroupAnalysisInput;
use crate::stats::{mean, std_dev};

use super::engine::Analyzer;
use super::types::{AnalyzerKind, InsightType, Priority, SmartInsight, Trend};

const DAY_SATURATION: usize = 30;

pub struct ActivityPeakAnalyzer {
    /// Minimum days before looking for peaks (default 3)
    min_days: usize,
    /// Minimum days before reporting inconsistent activity (default 7)
    inconsistent_min_days: usize,
}

impl ActivityPeakAnalyzer {
    pub fn new() -> Self {
        Self::from_guards(&Guards::default())
    }

    pub fn from_guards(guards: &Guards) -> Self {
        Self {
            min_days: guards.peak_min_days,
            inconsistent_min_days: guards.inconsistent_activity_min_days,
        }
    }

    fn peak(&self, input: &GroupAnalysisInput) -> Option<SmartInsight> {
        let values = input.daily_messages();
        let avg = mean(&values);
        if avg == 0.0 {
            return None;
        }
        let sd = std_dev(&values);

        let (peak_index, peak) = values
            .iter()
            .copied()
            .enumerate()
            .filter(|(_, v)| *v > avg + 2.0 * sd && *v > 1.5 * avg)
            .fold(None, |best: Option<(usize, f64)>, (i, v)| match best {
                Some((_, b)) if b >= v => best,
                _ => Some((i, v)),
            })?;

        let pct_above = (peak - avg) / avg * 100.0;
        if pct_above <= 50.0 {
            return None;
        }

        let priority = if pct_above > 200.0 {
            Priority::Critical
        } else if pct_above > 100.0 {
            Priority::High
        } else {
            Priority::Medium
        };
        let weight = (80.0 + pct_above / 10.0).min(100.0).round() as u8;
        let date = input.daily_stats[peak_index].date;

        Some(
            SmartInsight::new(
                input,
                AnalyzerKind::ActivityPeak,
                InsightType::ActivityPeak,
                priority,
                weight,
                "Exceptional activity peak",
                format!(
                    "On {} the group sent {:.0} messages, {:.0}% above its daily average of {:.1} (std dev {:.1}).",
                    date, peak, pct_above, avg, sd
                ),
                peak,
            )
            .with_recommendation(format!(
                "Review what was discussed on {} and repeat the topics or formats that drove the spike.",
                date
            ))
            .with_trend(Trend::Up)
            .with_change(pct_above)
            .with_data_points(values.len(), DAY_SATURATION),
        )
    }

    fn inconsistent_activity(&self, input: &GroupAnalysisInput) -> Option<SmartInsight> {
        let total_days = input.daily_stats.len();
        let ratio = input.active_days_ratio();
        if total_days < self.inconsistent_min_days || ratio >= 0.30 {
            return None;
        }

        let active_pct = ratio * 100.0;
        Some(
            SmartInsight::new(
                input,
                AnalyzerKind::ActivityPeak,
                InsightType::InconsistentActivity,
                Priority::Medium,
                65,
                "Inconsistent activity",
                format!(
                    "The group was active on only {} of {} days ({:.0}%).",
                    input.active_days(),
                    total_days,
                    active_pct
                ),
                active_pct,
            )
            .with_recommendation(
                "Set a recurring prompt or weekly thread so members have a reason to return.",
            )
            .with_trend(Trend::Warning)
            .with_data_points(total_days, DAY_SATURATION),
        )
    }
}

impl Default for ActivityPeakAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl Analyzer for ActivityPeakAnalyzer {
    fn kind(&self) -> AnalyzerKind {
        AnalyzerKind::ActivityPeak
    }

    fn name(&self) -> &'static str {
        "Activity Peak"
    }

    fn analyze(&self, input: &GroupAnalysisInput) -> Result<Vec<SmartInsight>> {
        if input.daily_stats.len() < self.min_days {
            return Ok(vec![]);
        }

        Ok(self
            .peak(input)
            .into_iter()
            .chain(self.inconsistent_activity(input))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::insights::types::InsightValue;
    use crate::test_utils::{days_from, flat_days, group_with_days, spiky_days};

    #[test]
    fn test_spike_fires_peak() {
        let group = group_with_days("g", spiky_days());
        let insights = ActivityPeakAnalyzer::new().analyze(&group).unwrap();

        assert_eq!(insights.len(), 1);
        let peak = &insights[0];
        assert_eq!(peak.insight_type, InsightType::ActivityPeak);
        assert_eq!(peak.value, InsightValue::Number(300.0));
        assert_eq!(peak.trend, Trend::Up);
        // mean 75, 300 is 300% above
        assert_eq!(peak.priority, Priority::Critical);
        assert_eq!(peak.weight, 100);
        assert!(peak.description.contains("300 messages"));
        assert!(peak.description.contains("75.0"));
    }

    #[test]
    fn test_moderate_peak_priority_and_weight() {
        let mut values = vec![15; 14];
        values.push(50);

        let group = group_with_days("g", days_from(&values));
        let insights = ActivityPeakAnalyzer::new().analyze(&group).unwrap();
        let peak = insights
            .iter()
            .find(|i| i.insight_type == InsightType::ActivityPeak)
            .unwrap();
        // mean 17.33, peak is ~188% above -> high
        assert_eq!(peak.priority, Priority::High);
        assert_eq!(peak.weight, 99);
    }

    #[test]
    fn test_fewer_than_three_days_emit_nothing() {
        let group = group_with_days("g", days_from(&[1, 500]));
        assert!(ActivityPeakAnalyzer::new().analyze(&group).unwrap().is_empty());
    }

    #[test]
    fn test_flat_activity_has_no_peak() {
        let group = group_with_days("g", flat_days(10, 40));
        assert!(ActivityPeakAnalyzer::new().analyze(&group).unwrap().is_empty());
    }

    #[test]
    fn test_mostly_silent_group_is_inconsistent() {
        let group = group_with_days("g", days_from(&[0, 0, 4, 0, 0, 0, 0, 0, 4, 0]));
        let insights = ActivityPeakAnalyzer::new().analyze(&group).unwrap();

        let inconsistent = insights
            .iter()
            .find(|i| i.insight_type == InsightType::InconsistentActivity)
            .unwrap();
        assert_eq!(inconsistent.weight, 65);
        assert_eq!(inconsistent.priority, Priority::Medium);
        assert!(inconsistent.description.contains("2 of 10 days"));
    }

    #[test]
    fn test_inconsistency_requires_a_week() {
        let group = group_with_days("g", days_from(&[0, 0, 5, 0, 0, 0]));
        let insights = ActivityPeakAnalyzer::new().analyze(&group).unwrap();
        assert!(insights
            .iter()
            .all(|i| i.insight_type != InsightType::InconsistentActivity));
    }
}
