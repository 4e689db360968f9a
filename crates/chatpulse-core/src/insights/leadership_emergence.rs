//! Leadership Emergence Insight
//!
//! Detects a single member pulling clearly ahead of everyone else.

use crate::config::Guards;
use crate::error::Result;
use crate::models::GroupAnalysisInput;

use super::engine::Analyzer;
use super::types::{AnalyzerKind, InsightType, Priority, SmartInsight, Trend};

const MEMBER_SATURATION: usize = 20;

pub struct LeadershipEmergenceAnalyzer {
    /// Minimum members before looking for a leader (default 4)
    min_members: usize,
}

impl LeadershipEmergenceAnalyzer {
    pub fn new() -> Self {
        Self::from_guards(&Guards::default())
    }

    pub fn from_guards(guards: &Guards) -> Self {
        Self {
            min_members: guards.leadership_min_members,
        }
    }
}

impl Default for LeadershipEmergenceAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl Analyzer for LeadershipEmergenceAnalyzer {
    fn kind(&self) -> AnalyzerKind {
        AnalyzerKind::LeadershipEmergence
    }

    fn name(&self) -> &'static str {
        "Leadership Emergence"
    }

    fn analyze(&self, input: &GroupAnalysisInput) -> Result<Vec<SmartInsight>> {
        if input.member_stats.len() < self.min_members {
            return Ok(vec![]);
        }

        let ranked = input.members_by_activity();
        let [leader, second, ..] = ranked.as_slice() else {
            return Ok(vec![]);
        };
        if second.message_count == 0 {
            return Ok(vec![]);
        }

        let total: u64 = ranked.iter().map(|m| m.message_count).sum();
        let gap = (leader.message_count as f64 - second.message_count as f64)
            / second.message_count as f64
            * 100.0;
        let share = leader.message_count as f64 / total as f64 * 100.0;

        if gap <= 75.0 || leader.message_count <= 30 || share <= 20.0 {
            return Ok(vec![]);
        }

        Ok(vec![SmartInsight::new(
            input,
            AnalyzerKind::LeadershipEmergence,
            InsightType::NaturalLeadership,
            Priority::High,
            77,
            "Natural leader emerging",
            format!(
                "{} sent {} messages ({:.1}% of the group), {:.0}% more than the next most active member, {}.",
                leader.name, leader.message_count, share, gap, second.name
            ),
            leader.name.as_str(),
        )
        .with_recommendation(format!(
            "Consider inviting {} to co-moderate and share responsibility for keeping the group active.",
            leader.name
        ))
        .with_trend(Trend::Up)
        .with_change(gap)
        .with_data_points(input.member_stats.len(), MEMBER_SATURATION)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::insights::types::InsightValue;
    use crate::test_utils::{group_with_members, members};

    #[test]
    fn test_clear_leader() {
        let group = group_with_members("g", members(&[100, 40, 30, 20]));
        let insights = LeadershipEmergenceAnalyzer::new().analyze(&group).unwrap();

        assert_eq!(insights.len(), 1);
        let insight = &insights[0];
        assert_eq!(insight.insight_type, InsightType::NaturalLeadership);
        assert_eq!(insight.value, InsightValue::Text("member-1".to_string()));
        assert!(insight.actionable);
        assert!(insight.recommendation.contains("co-moderate"));
        assert!((insight.change.unwrap() - 150.0).abs() < 1e-9);
    }

    #[test]
    fn test_close_race_is_silent() {
        let group = group_with_members("g", members(&[100, 80, 30, 20]));
        assert!(LeadershipEmergenceAnalyzer::new().analyze(&group).unwrap().is_empty());
    }

    #[test]
    fn test_small_leader_is_silent() {
        let group = group_with_members("g", members(&[30, 10, 5, 5]));
        assert!(LeadershipEmergenceAnalyzer::new().analyze(&group).unwrap().is_empty());
    }

    #[test]
    fn test_silent_runner_up_skips() {
        let group = group_with_members("g", members(&[100, 0, 0, 0]));
        assert!(LeadershipEmergenceAnalyzer::new().analyze(&group).unwrap().is_empty());
    }

    #[test]
    fn test_requires_four_members() {
        let group = group_with_members("g", members(&[100, 10, 10]));
        assert!(LeadershipEmergenceAnalyzer::new().analyze(&group).unwrap().is_empty());
    }

    #[test]
    fn test_lowered_guard_with_single_member() {
        let guards = Guards {
            leadership_min_members: 0,
            ..Guards::default()
        };
        let analyzer = LeadershipEmergenceAnalyzer::from_guards(&guards);

        assert!(analyzer.analyze(&group_with_members("g", members(&[50]))).unwrap().is_empty());
        assert!(analyzer.analyze(&group_with_members("g", members(&[]))).unwrap().is_empty());
    }
}
