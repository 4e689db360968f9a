//! Content Quality Insight
//!
//! Average words per text message across all members. Very long messages
//! signal substantive discussion, very short ones mostly reactions.

use crate::error::Result;
use crate::models::GroupAnalysisInput;

use super::engine::Analyzer;
use super::types::{AnalyzerKind, InsightType, Priority, SmartInsight, Trend};

const MEMBER_SATURATION: usize = 20;

pub struct ContentQualityAnalyzer {
    /// Above this many words per message content is "premium" (default 20)
    premium_words: f64,
    /// Below this many words per message content is "superficial" (default 6)
    superficial_words: f64,
}

impl ContentQualityAnalyzer {
    pub fn new() -> Self {
        Self {
            premium_words: 20.0,
            superficial_words: 6.0,
        }
    }
}

impl Default for ContentQualityAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// Group-wide words per text message, `None` when there are no text messages
pub fn avg_words_per_message(input: &GroupAnalysisInput) -> Option<f64> {
    let words: u64 = input.member_stats.iter().map(|m| m.word_count).sum();
    let messages: u64 = input.member_stats.iter().map(|m| m.message_count).sum();
    let media: u64 = input.member_stats.iter().map(|m| m.media_count).sum();
    let text = messages.saturating_sub(media);
    if text == 0 {
        None
    } else {
        Some(words as f64 / text as f64)
    }
}

impl Analyzer for ContentQualityAnalyzer {
    fn kind(&self) -> AnalyzerKind {
        AnalyzerKind::ContentQuality
    }

    fn name(&self) -> &'static str {
        "Content Quality"
    }

    fn analyze(&self, input: &GroupAnalysisInput) -> Result<Vec<SmartInsight>> {
        let Some(avg_words) = avg_words_per_message(input) else {
            return Ok(vec![]);
        };

        let insight = if avg_words > self.premium_words {
            Some(
                SmartInsight::new(
                    input,
                    AnalyzerKind::ContentQuality,
                    InsightType::PremiumContent,
                    Priority::High,
                    78,
                    "Premium content",
                    format!(
                        "Messages average {:.1} words, well above the {:.0}-word mark for in-depth discussion.",
                        avg_words, self.premium_words
                    ),
                    avg_words,
                )
                .with_note("Conversations are substantive; no action needed.")
                .with_trend(Trend::Up),
            )
        } else if avg_words < self.superficial_words {
            Some(
                SmartInsight::new(
                    input,
                    AnalyzerKind::ContentQuality,
                    InsightType::SuperficialContent,
                    Priority::Medium,
                    65,
                    "Superficial conversations",
                    format!(
                        "Messages average only {:.1} words, below the {:.0}-word mark; most exchanges are short reactions.",
                        avg_words, self.superficial_words
                    ),
                    avg_words,
                )
                .with_recommendation(
                    "Open threads with questions that invite longer answers, such as opinions or experiences.",
                )
                .with_trend(Trend::Warning),
            )
        } else {
            None
        };

        Ok(insight
            .map(|i| i.with_data_points(input.member_stats.len(), MEMBER_SATURATION))
            .into_iter()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MemberStat;
    use crate::test_utils::group_with_members;

    #[test]
    fn test_premium_content() {
        let group = group_with_members(
            "g",
            vec![
                MemberStat::new("a", 10).with_words(300).with_media(0),
                MemberStat::new("b", 12).with_words(250).with_media(2),
            ],
        );
        // 550 words / 20 text messages
        let insights = ContentQualityAnalyzer::new().analyze(&group).unwrap();
        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].insight_type, InsightType::PremiumContent);
        assert!(!insights[0].actionable);
        assert!(insights[0].description.contains("27.5 words"));
    }

    #[test]
    fn test_superficial_content() {
        let group = group_with_members("g", vec![MemberStat::new("a", 100).with_words(300)]);
        let insights = ContentQualityAnalyzer::new().analyze(&group).unwrap();
        assert_eq!(insights[0].insight_type, InsightType::SuperficialContent);
        assert!(insights[0].actionable);
        assert_eq!(insights[0].weight, 65);
    }

    #[test]
    fn test_middle_band_is_silent() {
        let group = group_with_members("g", vec![MemberStat::new("a", 10).with_words(100)]);
        assert!(ContentQualityAnalyzer::new().analyze(&group).unwrap().is_empty());
    }

    #[test]
    fn test_media_only_group_is_silent() {
        let group = group_with_members("g", vec![MemberStat::new("a", 5).with_media(5)]);
        assert!(ContentQualityAnalyzer::new().analyze(&group).unwrap().is_empty());
    }
}
