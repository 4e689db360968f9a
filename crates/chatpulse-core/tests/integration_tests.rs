//! Integration tests for chatpulse-core
//!
//! These tests exercise the public API end to end: aggregates → engine →
//! ranked insights, and aggregates → metric binder → formula evaluation.

use chatpulse_core::{
    compute_metrics, config,
    formula::{ConditionOperator, ConditionValue},
    evaluate, Condition, DailyStat, EngineConfig, FormulaError, FormulaExpression,
    GroupAnalysisInput, InMemoryProvider, InsightEngine, InsightType, InsightValue, MemberStat,
    Period, Priority, SmartInsight, Trend, Value, Variables,
};
use chrono::{Duration, NaiveDate};

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 2, 5).unwrap()
}

fn days(messages: &[u64]) -> Vec<DailyStat> {
    messages
        .iter()
        .enumerate()
        .map(|(i, &m)| DailyStat::new(start() + Duration::days(i as i64), m, if m > 0 { 6 } else { 0 }))
        .collect()
}

fn named_members(counts: &[u64]) -> Vec<MemberStat> {
    const NAMES: [&str; 10] = [
        "Ana", "Bruno", "Carla", "Diego", "Elena", "Fabio", "Gina", "Hugo", "Iris", "Joao",
    ];
    counts
        .iter()
        .zip(NAMES)
        .map(|(&count, name)| MemberStat::new(name, count))
        .collect()
}

fn group(id: &str, daily: Vec<DailyStat>, members: Vec<MemberStat>) -> GroupAnalysisInput {
    GroupAnalysisInput::new(id, format!("Group {}", id), daily, members)
}

fn of_type(insights: &[SmartInsight], kind: InsightType) -> Vec<&SmartInsight> {
    insights.iter().filter(|i| i.insight_type == kind).collect()
}

fn vars(pairs: &[(&str, f64)]) -> Variables {
    pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

// =============================================================================
// Insight Engine
// =============================================================================

#[test]
fn test_single_spike_fires_activity_peak() {
    let engine = InsightEngine::new();
    let g = group("spike", days(&[50, 50, 50, 50, 50, 300, 50, 50, 50, 50]), vec![]);

    let ranked = engine.rank_insights(&[g]);
    let peaks = of_type(&ranked, InsightType::ActivityPeak);

    assert_eq!(peaks.len(), 1);
    assert_eq!(peaks[0].value, InsightValue::Number(300.0));
    assert_eq!(peaks[0].trend, Trend::Up);
    assert!(matches!(peaks[0].priority, Priority::High | Priority::Critical));
    assert_eq!(peaks[0].metadata.period, "2024-02-05 to 2024-02-14 (10 days)");
}

#[test]
fn test_extreme_concentration_names_top_member() {
    let engine = InsightEngine::new();
    let g = group(
        "talkers",
        days(&[30; 7]),
        named_members(&[500, 450, 400, 10, 8, 5]),
    );

    let ranked = engine.rank_insights(&[g]);
    let found = of_type(&ranked, InsightType::MemberConcentration);

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].priority, Priority::Critical);
    assert!(found[0].description.contains("Ana"));
    assert!(found[0].description.contains("98.3%"));
}

#[test]
fn test_three_week_growth_is_accelerating() {
    let mut messages = vec![10u64; 14];
    messages.extend([25u64; 7]);
    let engine = InsightEngine::new();

    let ranked = engine.rank_insights(&[group("growing", days(&messages), vec![])]);

    let accelerating = of_type(&ranked, InsightType::AcceleratingGrowth);
    assert_eq!(accelerating.len(), 1);
    assert_eq!(accelerating[0].change, Some(150.0));
    assert!(of_type(&ranked, InsightType::DecliningGrowth).is_empty());
    assert!(of_type(&ranked, InsightType::SteadyGrowth).is_empty());
}

#[test]
fn test_minimum_sample_guards() {
    let engine = InsightEngine::new();

    let two_days = group("short", days(&[5, 500]), vec![]);
    assert!(of_type(&engine.rank_insights(&[two_days]), InsightType::ActivityPeak).is_empty());

    let three_members = group("trio", days(&[20; 7]), named_members(&[300, 20, 10]));
    assert!(of_type(&engine.rank_insights(&[three_members]), InsightType::NaturalLeadership)
        .is_empty());

    let seven_members = group(
        "seven",
        days(&[20; 7]),
        named_members(&[100, 100, 10, 10, 10, 10, 1]),
    );
    assert!(of_type(&engine.rank_insights(&[seven_members]), InsightType::BalancedEcosystem)
        .is_empty());
}

#[test]
fn test_ranking_is_monotonic_and_idempotent() {
    let engine = InsightEngine::new();
    let groups = vec![
        group("a", days(&[50, 50, 50, 50, 50, 300, 50, 50, 50, 50]), vec![]),
        group("b", days(&[30; 14]), named_members(&[500, 450, 400, 10, 8, 5])),
        group("c", days(&[9, 0, 0, 0, 0, 0, 0, 0, 0, 4]), named_members(&[5, 4, 3, 2, 1])),
    ];

    let first = engine.rank_insights(&groups);
    let second = engine.rank_insights(&groups);

    assert_eq!(first, second);
    assert!(first.windows(2).all(|w| w[0].weight >= w[1].weight));
    assert!(first.iter().all(|i| i.weight <= 100));
    assert!(first.iter().all(|i| i.metadata.confidence >= 40 && i.metadata.confidence <= 100));

    let headline = engine.generate_insights(&groups);
    assert_eq!(headline.len(), 3);
    assert_eq!(headline[..], first[..3]);
}

#[test]
fn test_disabled_analyzer_from_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("insights.toml");
    std::fs::write(
        &path,
        "[engine]\ntop_n = 5\ndisabled = [\"activity_peak\"]\n",
    )
    .unwrap();

    let config = EngineConfig::load_from(&path).unwrap();
    let engine = InsightEngine::with_config(&config);
    let ranked = engine.rank_insights(&[group(
        "spike",
        days(&[50, 50, 50, 50, 50, 300, 50, 50, 50, 50]),
        vec![],
    )]);

    assert_eq!(engine.top_n(), 5);
    assert!(of_type(&ranked, InsightType::ActivityPeak).is_empty());
    assert!(!of_type(&ranked, InsightType::ActivityAnomaly).is_empty());
}

#[test]
fn test_embedded_default_config_parses() {
    let config = config::parse_config(config::DEFAULT_CONFIG).unwrap();
    assert_eq!(config, EngineConfig::default());
}

#[test]
fn test_provider_batch_skips_missing_groups() {
    let engine = InsightEngine::new();
    let spike = group("spike", days(&[50, 50, 50, 50, 50, 300, 50, 50, 50, 50]), vec![]);
    let period = Period::new(start(), start() + Duration::days(9));
    let provider = InMemoryProvider::new(vec![spike]);

    let ranked = engine.generate_from_provider(
        &provider,
        &["ghost".to_string(), "spike".to_string()],
        &period,
    );

    assert!(!ranked.is_empty());
    assert!(ranked.iter().all(|i| i.group_name == "Group spike"));
}

// =============================================================================
// Formula Evaluator
// =============================================================================

#[test]
fn test_formula_over_catalog_metrics() {
    let eval = evaluate(
        "total_messages > 100 && participation_rate > 50",
        &vars(&[("total_messages", 150.0), ("participation_rate", 62.0)]),
        vec![],
    )
    .unwrap();

    assert_eq!(eval.substituted_expression, "150 > 100 && 62 > 50");
    assert_eq!(eval.result, Some(Value::Bool(true)));
    assert!(eval.triggered);
}

#[test]
fn test_unknown_identifier_rejected_before_evaluation() {
    let err = FormulaExpression::new("foo_bar > 10", vec![]).unwrap_err();
    assert!(err.is_validation());
    assert!(err.to_string().contains("foo_bar"));
}

#[test]
fn test_prefixed_names_do_not_collide() {
    let eval = evaluate(
        "prev_total_messages + total_messages",
        &vars(&[("prev_total_messages", 10.0), ("total_messages", 5.0)]),
        vec![],
    )
    .unwrap();
    assert_eq!(eval.result, Some(Value::Number(15.0)));
}

#[test]
fn test_division_by_zero_never_panics() {
    let eval = evaluate(
        "total_messages / active_members",
        &vars(&[("total_messages", 8.0), ("active_members", 0.0)]),
        vec![],
    )
    .unwrap();
    assert_eq!(eval.result, Some(Value::Number(f64::INFINITY)));
}

#[test]
fn test_conditions_require_all() {
    let conditions = vec![
        Condition::new("result", ConditionOperator::Gt, ConditionValue::Single(100.0)),
        Condition::new("active_members", ConditionOperator::Lt, ConditionValue::Single(5.0)),
    ];
    let formula = FormulaExpression::new("total_messages", conditions).unwrap();

    assert!(formula.evaluate(&vars(&[("total_messages", 150.0), ("active_members", 3.0)])).triggered);
    assert!(!formula.evaluate(&vars(&[("total_messages", 90.0), ("active_members", 3.0)])).triggered);
    assert!(!formula.evaluate(&vars(&[("total_messages", 150.0), ("active_members", 7.0)])).triggered);
}

#[test]
fn test_bad_condition_field_is_validation_error() {
    let err = FormulaExpression::new(
        "total_messages > 1",
        vec![Condition::new("mood", ConditionOperator::Eq, ConditionValue::Single(1.0))],
    )
    .unwrap_err();
    assert_eq!(err, FormulaError::UnknownConditionField("mood".into()));
}

#[test]
fn test_formula_bound_to_group_metrics() {
    let g = group(
        "bound",
        days(&[20; 10]),
        named_members(&[80, 60, 40, 20, 0]),
    );
    let metrics = compute_metrics(&g);

    let eval = evaluate(
        "total_messages >= 200 and participation_rate == 80",
        &metrics,
        vec![],
    )
    .unwrap();

    assert!(eval.triggered, "{:?}", eval);
    assert_eq!(eval.substituted_expression, "200 >= 200 and 80 == 80");
}

#[test]
fn test_windowed_formula_bound_to_group_metrics() {
    let g = group("windowed", days(&[20; 10]), named_members(&[80, 60, 40]));
    let metrics = compute_metrics(&g);

    let eval = evaluate("total_messages_7d * 2 > total_messages_30d", &metrics, vec![]).unwrap();

    assert!(eval.triggered, "{:?}", eval);
    assert!(eval.error.is_none());
    assert_eq!(eval.substituted_expression, "140 * 2 > 200");
}
