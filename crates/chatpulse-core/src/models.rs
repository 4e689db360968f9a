//! Aggregate data model consumed by the insight engine and the metric binder
//!
//! These types are produced by an aggregate provider (database, JSON files,
//! API request bodies) and are treated as immutable by the core. Field names
//! serialize in camelCase to match the dashboard contract.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One calendar day of aggregate activity for a group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyStat {
    pub date: NaiveDate,
    pub total_messages: u64,
    pub active_members: u64,
    /// Hour of day (0-23) to message count; only hours with activity present
    #[serde(default)]
    pub hourly_activity: BTreeMap<u8, u64>,
}

impl DailyStat {
    pub fn new(date: NaiveDate, total_messages: u64, active_members: u64) -> Self {
        Self {
            date,
            total_messages,
            active_members,
            hourly_activity: BTreeMap::new(),
        }
    }

    /// Attach an hourly histogram
    pub fn with_hourly(mut self, hourly: impl IntoIterator<Item = (u8, u64)>) -> Self {
        self.hourly_activity = hourly.into_iter().collect();
        self
    }

    pub fn is_active(&self) -> bool {
        self.total_messages > 0
    }
}

/// One member's message count on one day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberDay {
    pub date: NaiveDate,
    pub message_count: u64,
}

/// One member's aggregate activity over the analysis window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberStat {
    /// Display name (not guaranteed unique)
    pub name: String,
    pub message_count: u64,
    #[serde(default)]
    pub word_count: u64,
    #[serde(default)]
    pub media_count: u64,
    #[serde(default)]
    pub daily_stats: Vec<MemberDay>,
}

impl MemberStat {
    pub fn new(name: impl Into<String>, message_count: u64) -> Self {
        Self {
            name: name.into(),
            message_count,
            word_count: 0,
            media_count: 0,
            daily_stats: Vec::new(),
        }
    }

    pub fn with_words(mut self, word_count: u64) -> Self {
        self.word_count = word_count;
        self
    }

    pub fn with_media(mut self, media_count: u64) -> Self {
        self.media_count = media_count;
        self
    }

    /// Messages that carry text (media excluded)
    pub fn text_messages(&self) -> u64 {
        self.message_count.saturating_sub(self.media_count)
    }

    /// Average words per text message, 0 when there are no text messages
    pub fn avg_words_per_message(&self) -> f64 {
        let text = self.text_messages();
        if text == 0 {
            0.0
        } else {
            self.word_count as f64 / text as f64
        }
    }
}

/// The window a set of aggregates summarizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Period {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub days: u32,
}

impl Period {
    /// Inclusive date range; `days` is derived from the bounds
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        let days = (end - start).num_days().max(0) as u32 + 1;
        Self { start, end, days }
    }

    /// The period spanned by a chronological slice of daily stats
    pub fn covering(daily: &[DailyStat]) -> Option<Self> {
        let first = daily.first()?;
        let last = daily.last()?;
        Some(Self::new(first.date, last.date))
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {} ({} days)", self.start, self.end, self.days)
    }
}

/// The unit of work handed to the insight engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupAnalysisInput {
    pub group_id: String,
    pub group_name: String,
    /// Chronological daily aggregates
    #[serde(default)]
    pub daily_stats: Vec<DailyStat>,
    #[serde(default)]
    pub member_stats: Vec<MemberStat>,
    pub period: Period,
}

impl GroupAnalysisInput {
    /// Build an input whose period covers the supplied days
    pub fn new(
        group_id: impl Into<String>,
        group_name: impl Into<String>,
        daily_stats: Vec<DailyStat>,
        member_stats: Vec<MemberStat>,
    ) -> Self {
        let period = Period::covering(&daily_stats).unwrap_or_else(|| {
            let today = chrono::Utc::now().date_naive();
            Period::new(today, today)
        });
        Self {
            group_id: group_id.into(),
            group_name: group_name.into(),
            daily_stats,
            member_stats,
            period,
        }
    }

    /// Daily message totals as floats, in input order
    pub fn daily_messages(&self) -> Vec<f64> {
        self.daily_stats
            .iter()
            .map(|d| d.total_messages as f64)
            .collect()
    }

    /// Number of days with at least one message
    pub fn active_days(&self) -> usize {
        self.daily_stats.iter().filter(|d| d.is_active()).count()
    }

    /// Fraction of days with activity (0.0 when there are no days)
    pub fn active_days_ratio(&self) -> f64 {
        if self.daily_stats.is_empty() {
            0.0
        } else {
            self.active_days() as f64 / self.daily_stats.len() as f64
        }
    }

    pub fn total_messages(&self) -> u64 {
        self.daily_stats.iter().map(|d| d.total_messages).sum()
    }

    /// Members sorted by message count, most active first
    ///
    /// Ties keep input order so rankings are deterministic.
    pub fn members_by_activity(&self) -> Vec<&MemberStat> {
        let mut members: Vec<&MemberStat> = self.member_stats.iter().collect();
        members.sort_by(|a, b| b.message_count.cmp(&a.message_count));
        members
    }

    /// Hour-of-day histogram summed across all days
    pub fn hourly_histogram(&self) -> [u64; 24] {
        let mut histogram = [0u64; 24];
        for day in &self.daily_stats {
            for (&hour, &count) in &day.hourly_activity {
                if let Some(slot) = histogram.get_mut(hour as usize) {
                    *slot += count;
                }
            }
        }
        histogram
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    #[test]
    fn test_avg_words_per_message_excludes_media() {
        let member = MemberStat::new("Ana", 12).with_words(100).with_media(2);
        assert_eq!(member.text_messages(), 10);
        assert!((member.avg_words_per_message() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_avg_words_per_message_all_media() {
        let member = MemberStat::new("Bo", 3).with_words(0).with_media(3);
        assert_eq!(member.avg_words_per_message(), 0.0);
    }

    #[test]
    fn test_period_covering_counts_inclusive_days() {
        let days = vec![DailyStat::new(date(1), 1, 1), DailyStat::new(date(10), 1, 1)];
        let period = Period::covering(&days).unwrap();
        assert_eq!(period.days, 10);
        assert_eq!(period.to_string(), "2024-03-01 to 2024-03-10 (10 days)");
    }

    #[test]
    fn test_hourly_histogram_ignores_out_of_range_hours() {
        let input = GroupAnalysisInput::new(
            "g",
            "Group",
            vec![
                DailyStat::new(date(1), 10, 2).with_hourly([(9, 4), (30, 5)]),
                DailyStat::new(date(2), 10, 2).with_hourly([(9, 6)]),
            ],
            vec![],
        );
        let histogram = input.hourly_histogram();
        assert_eq!(histogram[9], 10);
        assert_eq!(histogram.iter().sum::<u64>(), 10);
    }

    #[test]
    fn test_deserialize_camel_case_with_string_hour_keys() {
        let json = serde_json::json!({
            "groupId": "g1",
            "groupName": "Family",
            "dailyStats": [
                {"date": "2024-03-01", "totalMessages": 12, "activeMembers": 3,
                 "hourlyActivity": {"8": 5, "21": 7}}
            ],
            "memberStats": [
                {"name": "Ana", "messageCount": 12, "wordCount": 80, "mediaCount": 1,
                 "dailyStats": [{"date": "2024-03-01", "messageCount": 12}]}
            ],
            "period": {"start": "2024-03-01", "end": "2024-03-01", "days": 1}
        });
        let input: GroupAnalysisInput = serde_json::from_value(json).unwrap();
        assert_eq!(input.daily_stats[0].hourly_activity.get(&21), Some(&7));
        assert_eq!(input.member_stats[0].daily_stats.len(), 1);
    }
}
