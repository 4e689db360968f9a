//! ChatPulse Core Library
//!
//! Shared functionality for ChatPulse group chat analytics:
//! - Aggregate data model (daily and per-member statistics)
//! - Insight engine with ten pluggable analyzers
//! - Custom formula language (lexer, parser, evaluator, conditions)
//! - Metric catalog and the binder that computes its values for a group
//! - Aggregate providers (in-memory, JSON directory)
//! - Engine configuration with embedded defaults

pub mod catalog;
pub mod config;
pub mod error;
pub mod formula;
pub mod insights;
pub mod metrics;
pub mod models;
pub mod provider;
pub mod stats;

/// Fixture builders shared with the CLI and server tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use catalog::{MetricCategory, MetricDescriptor, MetricType, CATALOG_VERSION};
pub use config::EngineConfig;
pub use error::{Error, Result};
pub use formula::{
    evaluate, evaluate_batch, extract_variable_names, Condition, Evaluation, FormulaDefinition,
    FormulaError, FormulaExpression, FormulaReport, Value, Variables,
};
pub use insights::{
    AnalyzerKind, InsightEngine, InsightType, InsightValue, Priority, SmartInsight, Trend,
};
pub use metrics::{compute_metrics, compute_metrics_with_previous, MetricValues};
pub use models::{DailyStat, GroupAnalysisInput, MemberDay, MemberStat, Period};
pub use provider::{AggregateProvider, InMemoryProvider, JsonDirProvider};
