//! Member Concentration Insight
//!
//! Measures how much of the conversation the three most active members
//! account for. Values between 35% and 70% are considered healthy and are not
//! reported.

use crate::config::Guards;
use crate::error::Result;
use crate::models::GroupAnalysisInput;

use super::engine::Analyzer;
use super::types::{AnalyzerKind, InsightType, Priority, SmartInsight, Trend};

const MEMBER_SATURATION: usize = 20;

pub struct MemberConcentrationAnalyzer {
    /// Minimum members before measuring concentration (default 5)
    min_members: usize,
}

impl MemberConcentrationAnalyzer {
    pub fn new() -> Self {
        Self::from_guards(&Guards::default())
    }

    pub fn from_guards(guards: &Guards) -> Self {
        Self {
            min_members: guards.concentration_min_members,
        }
    }
}

impl Default for MemberConcentrationAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// Share of all messages sent by the top three members, in percent
pub fn concentration_ratio(input: &GroupAnalysisInput) -> Option<f64> {
    let ranked = input.members_by_activity();
    let total: u64 = ranked.iter().map(|m| m.message_count).sum();
    if total == 0 {
        return None;
    }
    let top3: u64 = ranked.iter().take(3).map(|m| m.message_count).sum();
    Some(top3 as f64 / total as f64 * 100.0)
}

impl Analyzer for MemberConcentrationAnalyzer {
    fn kind(&self) -> AnalyzerKind {
        AnalyzerKind::MemberConcentration
    }

    fn name(&self) -> &'static str {
        "Member Concentration"
    }

    fn analyze(&self, input: &GroupAnalysisInput) -> Result<Vec<SmartInsight>> {
        let member_count = input.member_stats.len();
        if member_count < self.min_members {
            return Ok(vec![]);
        }
        let Some(ratio) = concentration_ratio(input) else {
            return Ok(vec![]);
        };
        let ranked = input.members_by_activity();
        let [top, ..] = ranked.as_slice() else {
            return Ok(vec![]);
        };

        let insight = if ratio > 70.0 {
            Some(
                SmartInsight::new(
                    input,
                    AnalyzerKind::MemberConcentration,
                    InsightType::MemberConcentration,
                    Priority::Critical,
                    85,
                    "Extreme concentration",
                    format!(
                        "The top 3 of {} members sent {:.1}% of all messages; {} alone sent {}.",
                        member_count, ratio, top.name, top.message_count
                    ),
                    ratio,
                )
                .with_recommendation(format!(
                    "Invite quieter members into the conversation so it does not depend on {}.",
                    top.name
                ))
                .with_trend(Trend::Warning),
            )
        } else if ratio < 35.0 {
            Some(
                SmartInsight::new(
                    input,
                    AnalyzerKind::MemberConcentration,
                    InsightType::BalancedDistribution,
                    Priority::High,
                    80,
                    "Ideal distribution",
                    format!(
                        "The top 3 of {} members account for only {:.1}% of messages; participation is widely shared.",
                        member_count, ratio
                    ),
                    ratio,
                )
                .with_note("Participation is healthy; no action needed.")
                .with_trend(Trend::Up),
            )
        } else {
            None
        };

        Ok(insight
            .map(|i| i.with_data_points(member_count, MEMBER_SATURATION))
            .into_iter()
            .collect())
    }
}
