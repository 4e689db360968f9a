//! Metric catalog command

use std::path::Path;

use anyhow::{Context, Result};
use chatpulse_core::{catalog, compute_metrics, provider, MetricCategory, MetricValues};

use super::truncate;

pub fn cmd_metrics(category: Option<&str>, group: Option<&Path>) -> Result<()> {
    let filter: Option<MetricCategory> = category.map(str::parse).transpose()?;

    let values: Option<(String, MetricValues)> = match group {
        Some(path) => {
            let groups = provider::load_groups(path)
                .with_context(|| format!("Failed to read group from {}", path.display()))?;
            let Some(first) = groups.first() else {
                anyhow::bail!("{} holds no groups", path.display());
            };
            if groups.len() > 1 {
                tracing::warn!(
                    count = groups.len(),
                    "Multiple groups in file, showing metrics for the first"
                );
            }
            Some((first.group_name.clone(), compute_metrics(first)))
        }
        None => None,
    };

    println!();
    match &values {
        Some((name, _)) => println!("📏 Metric catalog v{} · {}", catalog::CATALOG_VERSION, name),
        None => println!("📏 Metric catalog v{}", catalog::CATALOG_VERSION),
    }
    println!("   Any metric can also be used as prev_<name> or <name>_7d/_30d/_90d");

    for cat in MetricCategory::all() {
        if filter.is_some_and(|f| f != *cat) {
            continue;
        }

        println!();
        println!("   {}", cat.as_str().to_uppercase());
        println!("   ─────────────────────────────────────────────────────────");
        for metric in catalog::by_category(*cat) {
            let shown = match &values {
                Some((_, v)) => format!("{:>10.1}", v.value(metric.name)),
                None => format!("{:>10}", format!("e.g. {}", metric.example)),
            };
            println!(
                "   {:<26} {:<36} {:<10} {}",
                metric.name,
                truncate(metric.label, 36),
                metric.value_type.as_str(),
                shown
            );
        }
    }

    Ok(())
}
