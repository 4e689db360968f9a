//! Insight Engine - orchestrates the analyzer battery and ranks findings

use crate::config::EngineConfig;
use crate::error::Result;
use crate::models::{GroupAnalysisInput, Period};
use crate::provider::AggregateProvider;

use super::types::{AnalyzerKind, SmartInsight};
use super::{
    ActivityPeakAnalyzer, AnomalyDetectionAnalyzer, ConsistencyAnalyzer, ContentQualityAnalyzer,
    EngagementPatternAnalyzer, GrowthTrendAnalyzer, LeadershipEmergenceAnalyzer,
    MemberConcentrationAnalyzer, MemberDiversityAnalyzer, TimePatternAnalyzer,
};

/// Trait for insight analyzers
///
/// Analyzers are pure: they read only the group input and never observe each
/// other's output.
pub trait Analyzer: Send + Sync {
    /// Unique identifier for this analyzer
    fn kind(&self) -> AnalyzerKind;

    /// Human-readable name
    fn name(&self) -> &'static str;

    /// Analyze one group and produce zero or more insights
    fn analyze(&self, input: &GroupAnalysisInput) -> Result<Vec<SmartInsight>>;
}

/// The main insight engine that runs every analyzer over every group
pub struct InsightEngine {
    analyzers: Vec<Box<dyn Analyzer>>,
    top_n: usize,
}

impl Default for InsightEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl InsightEngine {
    /// Create an engine with the built-in analyzers and default guards
    pub fn new() -> Self {
        Self::with_config(&EngineConfig::default())
    }

    /// Create an engine from configuration
    ///
    /// Disabled analyzers are not registered.
    pub fn with_config(config: &EngineConfig) -> Self {
        let mut engine = Self {
            analyzers: vec![],
            top_n: config.top_n,
        };
        let guards = &config.guards;

        let builtin: Vec<Box<dyn Analyzer>> = vec![
            Box::new(ActivityPeakAnalyzer::from_guards(guards)),
            Box::new(GrowthTrendAnalyzer::from_guards(guards)),
            Box::new(EngagementPatternAnalyzer::from_guards(guards)),
            Box::new(MemberConcentrationAnalyzer::from_guards(guards)),
            Box::new(TimePatternAnalyzer::new()),
            Box::new(ContentQualityAnalyzer::new()),
            Box::new(ConsistencyAnalyzer::from_guards(guards)),
            Box::new(AnomalyDetectionAnalyzer::from_guards(guards)),
            Box::new(LeadershipEmergenceAnalyzer::from_guards(guards)),
            Box::new(MemberDiversityAnalyzer::from_guards(guards)),
        ];

        for analyzer in builtin {
            if config.is_enabled(analyzer.kind()) {
                engine.register(analyzer);
            } else {
                tracing::debug!(analyzer = analyzer.kind().as_str(), "Analyzer disabled");
            }
        }

        engine
    }

    /// Register an analyzer
    pub fn register(&mut self, analyzer: Box<dyn Analyzer>) {
        self.analyzers.push(analyzer);
    }

    /// Get list of registered analyzers
    pub fn analyzer_kinds(&self) -> Vec<AnalyzerKind> {
        self.analyzers.iter().map(|a| a.kind()).collect()
    }

    /// Number of insights returned by the headline view
    pub fn top_n(&self) -> usize {
        self.top_n
    }

    /// Run every analyzer over one group
    ///
    /// A failing analyzer, or one that produced a non-finite number, emits
    /// nothing; the remaining analyzers still run.
    pub fn analyze_group(&self, input: &GroupAnalysisInput) -> Vec<SmartInsight> {
        let mut insights = vec![];

        for analyzer in &self.analyzers {
            match analyzer.analyze(input) {
                Ok(found) if found.iter().all(SmartInsight::is_finite) => {
                    tracing::debug!(
                        group = input.group_id.as_str(),
                        analyzer = analyzer.kind().as_str(),
                        count = found.len(),
                        "Analyzer complete"
                    );
                    insights.extend(found);
                }
                Ok(_) => {
                    tracing::warn!(
                        group = input.group_id.as_str(),
                        analyzer = analyzer.kind().as_str(),
                        "Analyzer produced non-finite values, discarding output"
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        group = input.group_id.as_str(),
                        analyzer = analyzer.kind().as_str(),
                        error = %e,
                        "Analyzer failed"
                    );
                }
            }
        }

        insights
    }

    /// Analyze every group and return the full list ranked by weight
    pub fn rank_insights(&self, groups: &[GroupAnalysisInput]) -> Vec<SmartInsight> {
        let mut all: Vec<SmartInsight> = groups.iter().flat_map(|g| self.analyze_group(g)).collect();
        sort_by_weight(&mut all);

        tracing::info!(
            groups = groups.len(),
            insights = all.len(),
            "Insight analysis complete"
        );
        all
    }

    /// Headline insights: the global top N across all groups
    pub fn generate_insights(&self, groups: &[GroupAnalysisInput]) -> Vec<SmartInsight> {
        top_insights(self.rank_insights(groups), self.top_n)
    }

    /// Fetch each group from a provider and return the full ranked list
    ///
    /// Groups the provider fails to supply are logged and skipped.
    pub fn generate_from_provider(
        &self,
        provider: &dyn AggregateProvider,
        group_ids: &[String],
        period: &Period,
    ) -> Vec<SmartInsight> {
        let groups: Vec<GroupAnalysisInput> = group_ids
            .iter()
            .filter_map(|id| match provider.fetch(id, period) {
                Ok(input) => Some(input),
                Err(e) => {
                    tracing::warn!(group = id.as_str(), error = %e, "Skipping group, no data");
                    None
                }
            })
            .collect();

        self.rank_insights(&groups)
    }
}

/// Sort insights by weight, highest first
///
/// Equal weights fall back to priority, most urgent first. The sort is
/// stable, so full ties keep group order, then analyzer order.
pub fn sort_by_weight(insights: &mut [SmartInsight]) {
    insights.sort_by(|a, b| {
        b.weight
            .cmp(&a.weight)
            .then_with(|| b.priority.rank().cmp(&a.priority.rank()))
    });
}

/// Truncate a ranked list to its first `n` insights
pub fn top_insights(mut ranked: Vec<SmartInsight>, n: usize) -> Vec<SmartInsight> {
    ranked.truncate(n);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::insights::types::{InsightType, Priority};
    use crate::provider::InMemoryProvider;
    use crate::test_utils::{flat_days, group_with_days, spiky_days};

    struct FailingAnalyzer;

    impl Analyzer for FailingAnalyzer {
        fn kind(&self) -> AnalyzerKind {
            AnalyzerKind::ContentQuality
        }

        fn name(&self) -> &'static str {
            "Failing"
        }

        fn analyze(&self, _input: &GroupAnalysisInput) -> Result<Vec<SmartInsight>> {
            Err(Error::Analysis("boom".to_string()))
        }
    }

    struct NanAnalyzer;

    impl Analyzer for NanAnalyzer {
        fn kind(&self) -> AnalyzerKind {
            AnalyzerKind::AnomalyDetection
        }

        fn name(&self) -> &'static str {
            "NaN"
        }

        fn analyze(&self, input: &GroupAnalysisInput) -> Result<Vec<SmartInsight>> {
            Ok(vec![SmartInsight::new(
                input,
                AnalyzerKind::AnomalyDetection,
                InsightType::ActivityAnomaly,
                Priority::Critical,
                100,
                "bad",
                "bad",
                f64::INFINITY,
            )])
        }
    }

    #[test]
    fn test_engine_registers_all_analyzers() {
        let engine = InsightEngine::new();
        assert_eq!(engine.analyzer_kinds(), AnalyzerKind::all().to_vec());
        assert_eq!(engine.top_n(), 3);
    }

    #[test]
    fn test_disabled_analyzers_skipped() {
        let config = EngineConfig {
            disabled: vec![AnalyzerKind::TimePattern, AnalyzerKind::Consistency],
            ..Default::default()
        };
        let kinds = InsightEngine::with_config(&config).analyzer_kinds();
        assert_eq!(kinds.len(), 8);
        assert!(!kinds.contains(&AnalyzerKind::TimePattern));
    }

    #[test]
    fn test_failing_and_non_finite_analyzers_are_contained() {
        let mut engine = InsightEngine::new();
        engine.register(Box::new(FailingAnalyzer));
        engine.register(Box::new(NanAnalyzer));

        let group = group_with_days("g", spiky_days());
        let insights = engine.analyze_group(&group);

        assert!(!insights.is_empty());
        assert!(insights.iter().all(|i| i.title != "bad"));
    }

    #[test]
    fn test_rank_is_sorted_and_top_n_truncates() {
        let engine = InsightEngine::new();
        let groups = vec![
            group_with_days("a", spiky_days()),
            group_with_days("b", flat_days(14, 20)),
        ];

        let ranked = engine.rank_insights(&groups);
        assert!(ranked.len() > 3);
        assert!(ranked.windows(2).all(|w| w[0].weight >= w[1].weight));

        let top = engine.generate_insights(&groups);
        assert_eq!(top.len(), 3);
        assert_eq!(top[..], ranked[..3]);
    }

    #[test]
    fn test_equal_weights_rank_by_priority() {
        let group = group_with_days("g", flat_days(7, 10));
        let insight = |title: &str, priority: Priority, weight| {
            SmartInsight::new(
                &group,
                AnalyzerKind::ActivityPeak,
                InsightType::ActivityPeak,
                priority,
                weight,
                title,
                "",
                1.0,
            )
        };
        let mut insights = vec![
            insight("medium", Priority::Medium, 85),
            insight("high-first", Priority::High, 85),
            insight("low-heavy", Priority::Low, 90),
            insight("critical", Priority::Critical, 85),
            insight("high-second", Priority::High, 85),
        ];

        sort_by_weight(&mut insights);

        let titles: Vec<&str> = insights.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(
            titles,
            vec!["low-heavy", "critical", "high-first", "high-second", "medium"]
        );
    }

    #[test]
    fn test_generate_is_idempotent() {
        let engine = InsightEngine::new();
        let groups = vec![
            group_with_days("a", spiky_days()),
            group_with_days("b", flat_days(21, 8)),
        ];

        let first = engine.rank_insights(&groups);
        let second = engine.rank_insights(&groups);
        let ids = |v: &[SmartInsight]| v.iter().map(|i| i.id.clone()).collect::<Vec<_>>();
        assert_eq!(ids(&first), ids(&second));
        assert_eq!(first, second);
    }

    #[test]
    fn test_provider_failures_skip_group() {
        let engine = InsightEngine::new();
        let provider = InMemoryProvider::new(vec![group_with_days("known", spiky_days())]);
        let period = group_with_days("known", spiky_days()).period;

        let insights = engine.generate_from_provider(
            &provider,
            &["missing".to_string(), "known".to_string()],
            &period,
        );

        assert!(!insights.is_empty());
        assert!(insights.iter().all(|i| i.group_id == "known"));
    }
}
