//! Fixture builders for tests
//!
//! Available to other crates through the `test-utils` feature.

use chrono::{Duration, NaiveDate};

use crate::models::{DailyStat, GroupAnalysisInput, MemberStat};

/// First day of every fixture window
pub fn base_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid fixture date")
}

/// The fixture date `offset` days after [`base_date`]
pub fn day(offset: usize) -> NaiveDate {
    base_date() + Duration::days(offset as i64)
}

/// Consecutive days with the given message totals and 5 active members on
/// active days
pub fn days_from(messages: &[u64]) -> Vec<DailyStat> {
    days_with_members(messages, &vec![5; messages.len()])
}

/// Consecutive days with explicit message totals and active-member counts
pub fn days_with_members(messages: &[u64], members: &[u64]) -> Vec<DailyStat> {
    messages
        .iter()
        .zip(members)
        .enumerate()
        .map(|(i, (&total, &active))| {
            let active = if total == 0 { 0 } else { active };
            DailyStat::new(day(i), total, active)
        })
        .collect()
}

/// `count` days with the same message total
pub fn flat_days(count: usize, messages: u64) -> Vec<DailyStat> {
    days_from(&vec![messages; count])
}

/// Ten days: nine at 50 messages and one spike of 300 on the sixth day
pub fn spiky_days() -> Vec<DailyStat> {
    days_from(&[50, 50, 50, 50, 50, 300, 50, 50, 50, 50])
}

/// Members named `member-1`, `member-2`, ... with the given message counts
pub fn members(counts: &[u64]) -> Vec<MemberStat> {
    counts
        .iter()
        .enumerate()
        .map(|(i, &count)| MemberStat::new(format!("member-{}", i + 1), count))
        .collect()
}

/// A group with daily stats only
pub fn group_with_days(id: &str, days: Vec<DailyStat>) -> GroupAnalysisInput {
    GroupAnalysisInput::new(id, format!("Group {}", id), days, vec![])
}

/// A group with a week of flat activity and the given members
pub fn group_with_members(id: &str, member_stats: Vec<MemberStat>) -> GroupAnalysisInput {
    GroupAnalysisInput::new(id, format!("Group {}", id), flat_days(7, 10), member_stats)
}
