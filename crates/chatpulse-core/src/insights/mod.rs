//! Insight Engine - Proactive Group Insights
//!
//! The Insight Engine is a pluggable system that surfaces what is interesting,
//! actionable, or concerning about a set of groups. Each analyzer looks at one
//! group's aggregates in isolation; the engine merges everything they emit and
//! ranks it by weight.
//!
//! ## Analyzers
//!
//! - **Activity Peak** - Days far above the group's normal volume
//! - **Growth Trend** - Week-over-week volume trajectory
//! - **Engagement Pattern** - First half vs second half of the window
//! - **Member Concentration** - How much the top 3 members dominate
//! - **Time Pattern** - Dominant hour of day
//! - **Content Quality** - Words per message
//! - **Consistency** - Volatility and active-day frequency
//! - **Anomaly Detection** - Days more than 2.5σ from the mean
//! - **Leadership Emergence** - One member far ahead of the rest
//! - **Member Diversity** - Spread of participation tiers
//!
//! ## Usage
//!
//! ```rust,ignore
//! use chatpulse_core::insights::InsightEngine;
//!
//! let engine = InsightEngine::new();
//! let headline = engine.generate_insights(&groups);
//! ```

pub mod activity_peak;
pub mod anomaly_detection;
pub mod consistency;
pub mod content_quality;
pub mod engagement_pattern;
pub mod engine;
pub mod growth_trend;
pub mod leadership_emergence;
pub mod member_concentration;
pub mod member_diversity;
pub mod time_pattern;
pub mod types;

pub use activity_peak::ActivityPeakAnalyzer;
pub use anomaly_detection::AnomalyDetectionAnalyzer;
pub use consistency::ConsistencyAnalyzer;
pub use content_quality::ContentQualityAnalyzer;
pub use engagement_pattern::EngagementPatternAnalyzer;
pub use engine::{sort_by_weight, top_insights, Analyzer, InsightEngine};
pub use growth_trend::GrowthTrendAnalyzer;
pub use leadership_emergence::LeadershipEmergenceAnalyzer;
pub use member_concentration::MemberConcentrationAnalyzer;
pub use member_diversity::MemberDiversityAnalyzer;
pub use time_pattern::TimePatternAnalyzer;
pub use types::{
    AnalyzerKind, InsightMetadata, InsightType, InsightValue, Priority, SmartInsight, Trend,
};
