//! Anomaly Detection Insight
//!
//! Reports the first day (in input order) whose volume deviates from the mean
//! by more than 2.5 standard deviations.

use crate::config::Guards;
use crate::error::Result;
use crate::models::GroupAnalysisInput;
use crate::stats::{mean, std_dev};

use super::engine::Analyzer;
use super::types::{AnalyzerKind, InsightType, Priority, SmartInsight, Trend};

const DAY_SATURATION: usize = 30;
const Z_THRESHOLD: f64 = 2.5;

pub struct AnomalyDetectionAnalyzer {
    /// Minimum days before looking for anomalies (default 7)
    min_days: usize,
}

impl AnomalyDetectionAnalyzer {
    pub fn new() -> Self {
        Self::from_guards(&Guards::default())
    }

    pub fn from_guards(guards: &Guards) -> Self {
        Self {
            min_days: guards.anomaly_min_days,
        }
    }
}

impl Default for AnomalyDetectionAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl Analyzer for AnomalyDetectionAnalyzer {
    fn kind(&self) -> AnalyzerKind {
        AnalyzerKind::AnomalyDetection
    }

    fn name(&self) -> &'static str {
        "Anomaly Detection"
    }

    fn analyze(&self, input: &GroupAnalysisInput) -> Result<Vec<SmartInsight>> {
        if input.daily_stats.len() < self.min_days {
            return Ok(vec![]);
        }

        let values = input.daily_messages();
        let avg = mean(&values);
        let sd = std_dev(&values);

        // First match, not the largest deviation
        let Some((index, value)) = values
            .iter()
            .copied()
            .enumerate()
            .find(|(_, v)| (v - avg).abs() > Z_THRESHOLD * sd && *v > 0.0)
        else {
            return Ok(vec![]);
        };

        let deviation = (value - avg) / avg * 100.0;
        let above = value > avg;
        let label = if above { "extraordinary" } else { "anomalous" };
        let date = input.daily_stats[index].date;

        Ok(vec![SmartInsight::new(
            input,
            AnalyzerKind::AnomalyDetection,
            InsightType::ActivityAnomaly,
            Priority::Medium,
            73,
            format!("{}{} day detected", label[..1].to_uppercase(), &label[1..]),
            format!(
                "{} had {:.0} messages, an {} {:+.0}% deviation from the {:.1} daily average (more than {} standard deviations of {:.1}).",
                date, value, label, deviation, avg, Z_THRESHOLD, sd
            ),
            value,
        )
        .with_recommendation(if above {
            format!("Find out what happened on {} and whether it can be repeated.", date)
        } else {
            format!("Check whether something disrupted the group on {}.", date)
        })
        .with_trend(if above { Trend::Up } else { Trend::Down })
        .with_change(deviation)
        .with_data_points(values.len(), DAY_SATURATION)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::insights::types::InsightValue;
    use crate::test_utils::{days_from, flat_days, group_with_days, spiky_days};

    #[test]
    fn test_spike_is_extraordinary() {
        let insights = AnomalyDetectionAnalyzer::new()
            .analyze(&group_with_days("g", spiky_days()))
            .unwrap();

        assert_eq!(insights.len(), 1);
        let anomaly = &insights[0];
        assert_eq!(anomaly.value, InsightValue::Number(300.0));
        assert_eq!(anomaly.trend, Trend::Up);
        assert!(anomaly.description.contains("extraordinary"));
        assert!((anomaly.change.unwrap() - 300.0).abs() < 1e-9);
    }

    #[test]
    fn test_first_anomaly_wins_over_larger_one() {
        let mut values = vec![10u64; 40];
        values[5] = 120;
        values[30] = 200;
        let insights = AnomalyDetectionAnalyzer::new()
            .analyze(&group_with_days("g", days_from(&values)))
            .unwrap();

        assert_eq!(insights[0].value, InsightValue::Number(120.0));
    }

    #[test]
    fn test_dip_is_anomalous() {
        let mut values = vec![100u64; 40];
        values[12] = 1;
        let insights = AnomalyDetectionAnalyzer::new()
            .analyze(&group_with_days("g", days_from(&values)))
            .unwrap();

        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].trend, Trend::Down);
        assert!(insights[0].description.contains("anomalous"));
        assert!(insights[0].change.unwrap() < 0.0);
    }

    #[test]
    fn test_zero_days_are_never_anomalies() {
        let mut values = vec![100u64; 40];
        values[12] = 0;
        let insights = AnomalyDetectionAnalyzer::new()
            .analyze(&group_with_days("g", days_from(&values)))
            .unwrap();
        assert!(insights.is_empty());
    }

    #[test]
    fn test_flat_and_short_windows_are_silent() {
        let analyzer = AnomalyDetectionAnalyzer::new();
        assert!(analyzer
            .analyze(&group_with_days("g", flat_days(14, 9)))
            .unwrap()
            .is_empty());
        assert!(analyzer
            .analyze(&group_with_days("g", days_from(&[1, 1, 1, 90, 1, 1])))
            .unwrap()
            .is_empty());
    }
}
