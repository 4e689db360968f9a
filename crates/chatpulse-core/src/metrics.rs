//! Metric binder
//!
//! Computes the value of every catalog metric for a group, producing the
//! variable map custom formulas are evaluated against.

use std::collections::BTreeMap;
use std::ops::Deref;

use chrono::{Datelike, Duration, Weekday};
use serde::{Deserialize, Serialize};

use crate::catalog::{self, window_suffix, PREVIOUS_PREFIX, WINDOW_DAYS};
use crate::insights::growth_trend::GrowthTrendAnalyzer;
use crate::insights::member_concentration::concentration_ratio;
use crate::insights::member_diversity::participation_tiers;
use crate::insights::time_pattern::top_hours;
use crate::models::{DailyStat, GroupAnalysisInput, Period};
use crate::stats::{
    coefficient_of_variation, consistency_score, linear_regression_slope, mean, percent_change,
    std_dev,
};

/// Metric name to value, ordered by name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetricValues(BTreeMap<String, f64>);

impl MetricValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: f64) {
        self.0.insert(name.into(), value);
    }

    /// Value of a metric, 0.0 when absent
    pub fn value(&self, name: &str) -> f64 {
        self.0.get(name).copied().unwrap_or(0.0)
    }

    pub fn into_inner(self) -> BTreeMap<String, f64> {
        self.0
    }
}

impl Deref for MetricValues {
    type Target = BTreeMap<String, f64>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<BTreeMap<String, f64>> for MetricValues {
    fn from(map: BTreeMap<String, f64>) -> Self {
        Self(map)
    }
}

impl Extend<(String, f64)> for MetricValues {
    fn extend<I: IntoIterator<Item = (String, f64)>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

fn pct(numerator: f64, denominator: f64) -> f64 {
    ratio(numerator, denominator) * 100.0
}

/// Messages per active member-day over a run of days
fn engagement(days: &[DailyStat]) -> f64 {
    let messages: u64 = days.iter().map(|d| d.total_messages).sum();
    let members: u64 = days.iter().map(|d| d.active_members).sum();
    ratio(messages as f64, members as f64)
}

fn daily_means(days: &[DailyStat]) -> (f64, f64) {
    let messages: Vec<f64> = days.iter().map(|d| d.total_messages as f64).collect();
    let members: Vec<f64> = days.iter().map(|d| d.active_members as f64).collect();
    (mean(&messages), mean(&members))
}

/// Gini coefficient of member message counts, scaled to 0..=100
fn gini(counts: &[u64]) -> f64 {
    let total: u64 = counts.iter().sum();
    if counts.is_empty() || total == 0 {
        return 0.0;
    }
    let mut sorted = counts.to_vec();
    sorted.sort_unstable();
    let n = sorted.len() as f64;
    let weighted: f64 = sorted
        .iter()
        .enumerate()
        .map(|(i, &x)| (i as f64 + 1.0) * x as f64)
        .sum();
    ((2.0 * weighted) / (n * total as f64) - (n + 1.0) / n) * 100.0
}

/// Every catalog metric for one window, plus each metric over the trailing
/// 7, 30 and 90 days as `<name>_7d`, `<name>_30d` and `<name>_90d`
///
/// Growth rates compare the second half of the window against the first.
/// Trailing windows end on the last day in `daily_stats` and reuse the
/// member totals as supplied.
pub fn compute_metrics(input: &GroupAnalysisInput) -> MetricValues {
    let mut m = base_metrics(input);

    for &days in WINDOW_DAYS {
        let suffix = window_suffix(days);
        let windowed = base_metrics(&trailing_days(input, days));
        m.extend(
            windowed
                .into_inner()
                .into_iter()
                .map(|(name, value)| (format!("{}{}", name, suffix), value)),
        );
    }
    m
}

/// `input` restricted to the `days` days ending on its last day
fn trailing_days(input: &GroupAnalysisInput, days: i64) -> GroupAnalysisInput {
    let mut windowed = input.clone();
    if let Some(last) = input.daily_stats.iter().map(|d| d.date).max() {
        let start = last - Duration::days(days - 1);
        windowed.daily_stats.retain(|d| d.date >= start);
        windowed.period = Period::new(start.max(input.period.start), last);
    }
    windowed
}

fn base_metrics(input: &GroupAnalysisInput) -> MetricValues {
    let days = &input.daily_stats;
    let members = &input.member_stats;
    let daily = input.daily_messages();
    let mut m = MetricValues::new();

    // Basic
    let total_messages = input.total_messages() as f64;
    let active_members = if members.is_empty() {
        days.iter().map(|d| d.active_members).max().unwrap_or(0)
    } else {
        members.iter().filter(|s| s.message_count > 0).count() as u64
    } as f64;
    let total_members = if members.is_empty() {
        active_members
    } else {
        members.len() as f64
    };
    let total_days = days.len() as f64;
    let member_messages: u64 = members.iter().map(|s| s.message_count).sum();
    let media: u64 = members.iter().map(|s| s.media_count).sum();
    let words: u64 = members.iter().map(|s| s.word_count).sum();
    let text_messages = member_messages.saturating_sub(media);

    m.insert("total_messages", total_messages);
    m.insert("active_members", active_members);
    m.insert("total_members", total_members);
    m.insert("total_days", total_days);
    m.insert("active_days", input.active_days() as f64);
    m.insert("avg_messages_per_day", ratio(total_messages, total_days));
    m.insert("avg_messages_per_member", ratio(total_messages, active_members));
    m.insert("media_messages", media as f64);
    m.insert("total_words", words as f64);

    // Growth
    let (first, second) = days.split_at(days.len() / 2);
    if first.is_empty() {
        m.insert("message_growth_rate", 0.0);
        m.insert("member_growth_rate", 0.0);
        m.insert("engagement_growth_rate", 0.0);
    } else {
        let (first_msgs, first_members) = daily_means(first);
        let (second_msgs, second_members) = daily_means(second);
        m.insert("message_growth_rate", percent_change(first_msgs, second_msgs));
        m.insert("member_growth_rate", percent_change(first_members, second_members));
        m.insert(
            "engagement_growth_rate",
            percent_change(engagement(first), engagement(second)),
        );
    }
    let weekly: Vec<f64> = GrowthTrendAnalyzer::new()
        .bucket_means(days)
        .iter()
        .map(|b| b.messages)
        .collect();
    m.insert("weekly_trend", linear_regression_slope(&weekly));

    // Quality
    let media_ratio = pct(media as f64, member_messages as f64);
    m.insert("avg_message_length", ratio(words as f64, text_messages as f64));
    m.insert("media_ratio", media_ratio);
    m.insert(
        "text_ratio",
        if member_messages == 0 {
            0.0
        } else {
            100.0 - media_ratio
        },
    );
    m.insert("avg_words_per_member", ratio(words as f64, active_members));

    // Distribution
    let ranked = input.members_by_activity();
    let concentration = concentration_ratio(input).unwrap_or(0.0);
    let leader_gap = match ranked.as_slice() {
        [leader, second, ..] if second.message_count > 0 => percent_change(
            second.message_count as f64,
            leader.message_count as f64,
        ),
        _ => 0.0,
    };
    let counts: Vec<u64> = members.iter().map(|s| s.message_count).collect();
    let participation = pct(active_members, total_members);

    m.insert("participation_rate", participation);
    m.insert("concentration_index", concentration);
    m.insert(
        "top_member_share",
        ranked
            .first()
            .map_or(0.0, |top| pct(top.message_count as f64, member_messages as f64)),
    );
    m.insert("leader_gap", leader_gap);
    m.insert("diversity_index", participation_tiers(input).diversity_index());
    m.insert("gini_coefficient", gini(&counts));

    // Temporal
    let histogram = input.hourly_histogram();
    let hourly_total: u64 = histogram.iter().sum();
    let (peak_hour, peak_count) = top_hours(&histogram, 1).first().copied().unwrap_or((0, 0));
    let weekend: u64 = days
        .iter()
        .filter(|d| matches!(d.date.weekday(), Weekday::Sat | Weekday::Sun))
        .map(|d| d.total_messages)
        .sum();
    let night: u64 = histogram[..6].iter().sum();
    let avg_daily = mean(&daily);
    let max_daily = daily.iter().copied().fold(0.0, f64::max);
    let activity_frequency = input.active_days_ratio() * 100.0;

    m.insert("activity_frequency", activity_frequency);
    m.insert("peak_hour", peak_hour as f64);
    m.insert("peak_hour_share", pct(peak_count as f64, hourly_total as f64));
    m.insert("peak_activity_ratio", ratio(max_daily, avg_daily));
    m.insert("weekend_ratio", pct(weekend as f64, total_messages));
    m.insert("night_activity_ratio", pct(night as f64, hourly_total as f64));

    // Advanced
    let consistency = consistency_score(&daily);
    let sd = std_dev(&daily);
    let anomalies = daily
        .iter()
        .filter(|&&v| (v - avg_daily).abs() > 2.5 * sd && v > 0.0)
        .count();
    let daily_members: Vec<f64> = days.iter().map(|d| d.active_members as f64).collect();
    let health =
        (consistency + activity_frequency + participation + (100.0 - concentration)) / 4.0;

    m.insert("consistency_score", consistency);
    m.insert("volatility", coefficient_of_variation(&daily) * 100.0);
    m.insert("anomaly_count", anomalies as f64);
    m.insert("avg_active_members", mean(&daily_members));
    m.insert("health_score", health.clamp(0.0, 100.0));

    debug_assert!(catalog::all().iter().all(|d| m.contains_key(d.name)));
    m
}

/// Metrics for `current` plus `prev_`-prefixed metrics for `previous`
///
/// Growth rates compare the two windows instead of the halves of `current`.
pub fn compute_metrics_with_previous(
    current: &GroupAnalysisInput,
    previous: &GroupAnalysisInput,
) -> MetricValues {
    let mut m = compute_metrics(current);
    let prev = compute_metrics(previous);

    m.insert(
        "message_growth_rate",
        percent_change(prev.value("avg_messages_per_day"), m.value("avg_messages_per_day")),
    );
    m.insert(
        "member_growth_rate",
        percent_change(prev.value("active_members"), m.value("active_members")),
    );
    m.insert(
        "engagement_growth_rate",
        percent_change(
            prev.value("avg_messages_per_member"),
            m.value("avg_messages_per_member"),
        ),
    );

    m.extend(
        prev.into_inner()
            .into_iter()
            .map(|(name, value)| (format!("{}{}", PREVIOUS_PREFIX, name), value)),
    );
    m
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MemberStat;
    use crate::test_utils::{days_from, flat_days, group_with_days, group_with_members, members};

    #[test]
    fn test_every_catalog_metric_is_bound() {
        let values = compute_metrics(&group_with_members("g", members(&[30, 20, 10, 0])));
        for descriptor in catalog::all() {
            let v = values.get(descriptor.name);
            assert!(v.is_some(), "{} missing", descriptor.name);
            assert!(v.unwrap().is_finite(), "{} not finite", descriptor.name);
        }
        assert_eq!(values.len(), catalog::all().len() * (1 + WINDOW_DAYS.len()));
    }

    #[test]
    fn test_empty_group_is_all_finite() {
        let values = compute_metrics(&group_with_days("g", vec![]));
        assert!(values.values().all(|v| v.is_finite()));
        assert_eq!(values.value("total_messages"), 0.0);
    }

    #[test]
    fn test_basic_and_distribution() {
        let group = group_with_members(
            "g",
            vec![
                MemberStat::new("a", 40).with_words(300).with_media(10),
                MemberStat::new("b", 20).with_words(100),
                MemberStat::new("c", 0),
            ],
        );
        let values = compute_metrics(&group);

        assert_eq!(values.value("total_messages"), 70.0);
        assert_eq!(values.value("active_members"), 2.0);
        assert_eq!(values.value("total_members"), 3.0);
        assert!((values.value("participation_rate") - 66.666).abs() < 0.01);
        assert!((values.value("media_ratio") - 16.666).abs() < 0.01);
        // 400 words / 50 text messages
        assert_eq!(values.value("avg_message_length"), 8.0);
        assert_eq!(values.value("leader_gap"), 100.0);
        assert_eq!(values.value("concentration_index"), 100.0);
    }

    #[test]
    fn test_half_window_growth() {
        let values = compute_metrics(&group_with_days("g", days_from(&[10, 10, 10, 20, 20, 20])));
        assert_eq!(values.value("message_growth_rate"), 100.0);
        assert_eq!(values.value("member_growth_rate"), 0.0);
    }

    #[test]
    fn test_previous_window() {
        let current = group_with_days("g", flat_days(7, 30));
        let previous = group_with_days("g", flat_days(7, 20));
        let values = compute_metrics_with_previous(&current, &previous);

        assert_eq!(values.value("prev_total_messages"), 140.0);
        assert_eq!(values.value("total_messages"), 210.0);
        assert_eq!(values.value("message_growth_rate"), 50.0);
        assert_eq!(
            values.len(),
            catalog::all().len() * (1 + WINDOW_DAYS.len()) * 2
        );
        assert_eq!(values.value("prev_total_messages_7d"), 140.0);
    }

    #[test]
    fn test_trailing_windows() {
        let values = compute_metrics(&group_with_days("g", flat_days(30, 20)));

        assert_eq!(values.value("total_messages"), 600.0);
        assert_eq!(values.value("total_messages_7d"), 140.0);
        assert_eq!(values.value("total_days_7d"), 7.0);
        assert_eq!(values.value("total_messages_30d"), 600.0);
        // shorter history than the window keeps every day
        assert_eq!(values.value("total_messages_90d"), 600.0);
        assert_eq!(values.value("avg_messages_per_day_7d"), 20.0);
    }

    #[test]
    fn test_windowed_names_resolve_and_bind() {
        let values = compute_metrics(&group_with_members("g", members(&[30, 20, 10])));
        for name in values.keys() {
            assert!(catalog::is_known_variable(name), "{} not in catalog", name);
        }
        assert!(values.contains_key("participation_rate_90d"));
    }

    #[test]
    fn test_gini() {
        assert_eq!(gini(&[10, 10, 10, 10]), 0.0);
        assert_eq!(gini(&[]), 0.0);
        assert!((gini(&[0, 0, 0, 100]) - 75.0).abs() < 1e-9);
    }

    #[test]
    fn test_anomaly_count_matches_detector() {
        let values = compute_metrics(&group_with_days("g", crate::test_utils::spiky_days()));
        assert_eq!(values.value("anomaly_count"), 1.0);
        assert_eq!(values.value("peak_activity_ratio"), 4.0);
    }
}
