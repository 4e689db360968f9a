//! Insight command implementations

use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use chatpulse_core::provider::{self, JsonDirProvider};
use chatpulse_core::{InsightEngine, Period, Priority, SmartInsight};
use chrono::{Duration, NaiveDate, Utc};

use super::{load_engine_config, truncate};

/// Length of the default analysis window for `--dir`
const DEFAULT_WINDOW_DAYS: i64 = 30;

/// Where the command reads group aggregates from
#[derive(Debug, Clone)]
pub enum InsightSource {
    /// A JSON file holding one group or an array of groups
    File(PathBuf),
    /// A directory of `<group_id>.json` files restricted to a window
    Dir {
        dir: PathBuf,
        groups: Vec<String>,
        period: Period,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    Csv,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            _ => anyhow::bail!("Unknown format: {}. Available: text, json, csv", s),
        }
    }
}

/// Resolve `--from`/`--to` into an inclusive window
///
/// Missing `--to` means today; missing `--from` means 29 days before `--to`.
pub fn resolve_window(from: Option<&str>, to: Option<&str>) -> Result<Period> {
    let end = match to {
        Some(to) => NaiveDate::parse_from_str(to, "%Y-%m-%d")
            .context("Invalid --to date format (use YYYY-MM-DD)")?,
        None => Utc::now().date_naive(),
    };
    let start = match from {
        Some(from) => NaiveDate::parse_from_str(from, "%Y-%m-%d")
            .context("Invalid --from date format (use YYYY-MM-DD)")?,
        None => end - Duration::days(DEFAULT_WINDOW_DAYS - 1),
    };
    if start > end {
        anyhow::bail!("--from ({}) is after --to ({})", start, end);
    }
    Ok(Period::new(start, end))
}

/// Run the engine over a source and return the ranked list
pub fn collect_insights(engine: &InsightEngine, source: &InsightSource) -> Result<Vec<SmartInsight>> {
    match source {
        InsightSource::File(path) => {
            let groups = provider::load_groups(path)
                .with_context(|| format!("Failed to read groups from {}", path.display()))?;
            Ok(engine.rank_insights(&groups))
        }
        InsightSource::Dir {
            dir,
            groups,
            period,
        } => {
            let provider = JsonDirProvider::new(dir);
            Ok(engine.generate_from_provider(&provider, groups, period))
        }
    }
}

/// Headline top N, or the whole ranked list with `--all`, then `--limit`
pub fn select_insights(
    ranked: Vec<SmartInsight>,
    top_n: usize,
    all: bool,
    limit: Option<usize>,
) -> Vec<SmartInsight> {
    let mut selected = ranked;
    if !all {
        selected.truncate(top_n);
    }
    if let Some(limit) = limit {
        selected.truncate(limit);
    }
    selected
}

pub fn cmd_insights(
    config_path: Option<&Path>,
    source: &InsightSource,
    all: bool,
    limit: Option<usize>,
    format: OutputFormat,
) -> Result<()> {
    let config = load_engine_config(config_path)?;
    let engine = InsightEngine::with_config(&config);

    let ranked = collect_insights(&engine, source)?;
    let total = ranked.len();
    let insights = select_insights(ranked, engine.top_n(), all, limit);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match format {
        OutputFormat::Text => write_text(&mut out, &insights, total)?,
        OutputFormat::Json => write_json(&mut out, &insights)?,
        OutputFormat::Csv => write_csv(&mut out, &insights)?,
    }
    out.flush()?;

    Ok(())
}

fn priority_icon(priority: Priority) -> &'static str {
    match priority {
        Priority::Critical => "🔴",
        Priority::High => "🟠",
        Priority::Medium => "🟡",
        Priority::Low => "⚪",
    }
}

/// Human-readable listing
pub fn write_text<W: Write>(out: &mut W, insights: &[SmartInsight], total: usize) -> Result<()> {
    if insights.is_empty() {
        writeln!(out, "No insights. Groups may need more activity before patterns emerge.")?;
        return Ok(());
    }

    writeln!(out)?;
    writeln!(out, "💡 Insights ({} of {})", insights.len(), total)?;
    writeln!(out, "   ─────────────────────────────────────────────────────────")?;

    for (i, insight) in insights.iter().enumerate() {
        writeln!(
            out,
            "   {}. {} [{:>3}] {} · {}",
            i + 1,
            priority_icon(insight.priority),
            insight.weight,
            insight.title,
            truncate(&insight.group_name, 30)
        )?;
        writeln!(out, "      {}", insight.description)?;

        let change = insight
            .change
            .map(|c| format!(" ({:+.1}%)", c))
            .unwrap_or_default();
        writeln!(
            out,
            "      Value: {}{} · Trend: {} · Confidence: {}%",
            insight.value, change, insight.trend, insight.metadata.confidence
        )?;
        if !insight.recommendation.is_empty() {
            writeln!(out, "      → {}", insight.recommendation)?;
        }
        writeln!(out)?;
    }

    Ok(())
}

pub fn write_json<W: Write>(out: &mut W, insights: &[SmartInsight]) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, insights)?;
    writeln!(out)?;
    Ok(())
}

pub fn write_csv<W: Write>(out: &mut W, insights: &[SmartInsight]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record([
        "group_id",
        "group_name",
        "type",
        "priority",
        "weight",
        "title",
        "value",
        "change",
        "trend",
        "actionable",
        "confidence",
        "period",
        "description",
        "recommendation",
    ])?;

    for insight in insights {
        writer.write_record([
            insight.group_id.clone(),
            insight.group_name.clone(),
            insight.insight_type.to_string(),
            insight.priority.to_string(),
            insight.weight.to_string(),
            insight.title.clone(),
            insight.value.to_string(),
            insight.change.map(|c| format!("{:.1}", c)).unwrap_or_default(),
            insight.trend.to_string(),
            insight.actionable.to_string(),
            insight.metadata.confidence.to_string(),
            insight.metadata.period.clone(),
            insight.description.clone(),
            insight.recommendation.clone(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}
