//! Member Diversity Insight
//!
//! Buckets active members into participation tiers relative to the average
//! and rewards groups whose middle tier holds about half the members.

use crate::config::Guards;
use crate::error::Result;
use crate::models::GroupAnalysisInput;

use super::engine::Analyzer;
use super::types::{AnalyzerKind, InsightType, Priority, SmartInsight, Trend};

const MEMBER_SATURATION: usize = 20;

pub struct MemberDiversityAnalyzer {
    /// Minimum members before scoring diversity (default 8)
    min_members: usize,
}

impl MemberDiversityAnalyzer {
    pub fn new() -> Self {
        Self::from_guards(&Guards::default())
    }

    pub fn from_guards(guards: &Guards) -> Self {
        Self {
            min_members: guards.diversity_min_members,
        }
    }
}

impl Default for MemberDiversityAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// Member counts per participation tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ParticipationTiers {
    pub low: usize,
    pub medium: usize,
    pub high: usize,
}

impl ParticipationTiers {
    pub fn active(&self) -> usize {
        self.low + self.medium + self.high
    }

    /// `100 - |50 - mediumRatio|`, 0 when nobody is active
    pub fn diversity_index(&self) -> f64 {
        let active = self.active();
        if active == 0 {
            return 0.0;
        }
        let medium_ratio = self.medium as f64 / active as f64 * 100.0;
        100.0 - (50.0 - medium_ratio).abs()
    }
}

/// Classify members with at least one message against `0.25·avg` and `2·avg`
pub fn participation_tiers(input: &GroupAnalysisInput) -> ParticipationTiers {
    let active: Vec<u64> = input
        .member_stats
        .iter()
        .map(|m| m.message_count)
        .filter(|&c| c > 0)
        .collect();
    if active.is_empty() {
        return ParticipationTiers::default();
    }

    let avg = active.iter().sum::<u64>() as f64 / active.len() as f64;
    let (low_cut, high_cut) = (avg * 0.25, avg * 2.0);

    active
        .iter()
        .fold(ParticipationTiers::default(), |mut tiers, &count| {
            let count = count as f64;
            if count < low_cut {
                tiers.low += 1;
            } else if count > high_cut {
                tiers.high += 1;
            } else {
                tiers.medium += 1;
            }
            tiers
        })
}

impl Analyzer for MemberDiversityAnalyzer {
    fn kind(&self) -> AnalyzerKind {
        AnalyzerKind::MemberDiversity
    }

    fn name(&self) -> &'static str {
        "Member Diversity"
    }

    fn analyze(&self, input: &GroupAnalysisInput) -> Result<Vec<SmartInsight>> {
        if input.member_stats.len() < self.min_members {
            return Ok(vec![]);
        }

        let tiers = participation_tiers(input);
        let index = tiers.diversity_index();
        if index <= 75.0 || tiers.medium < 4 {
            return Ok(vec![]);
        }

        Ok(vec![SmartInsight::new(
            input,
            AnalyzerKind::MemberDiversity,
            InsightType::BalancedEcosystem,
            Priority::High,
            83,
            "Balanced participation ecosystem",
            format!(
                "Diversity index {:.0}/100: {} high, {} regular and {} occasional participants among {} active members.",
                index,
                tiers.high,
                tiers.medium,
                tiers.low,
                tiers.active()
            ),
            index,
        )
        .with_note("The group has a healthy mix of core, regular and occasional voices.")
        .with_trend(Trend::Stable)
        .with_data_points(tiers.active(), MEMBER_SATURATION)])
    }
}
