//! Config command implementation

use std::path::Path;

use anyhow::Result;
use chatpulse_core::config::resolve_config_path;
use chatpulse_core::insights::AnalyzerKind;

use super::load_engine_config;

pub fn cmd_config(config_path: Option<&Path>) -> Result<()> {
    let config = load_engine_config(config_path)?;

    println!();
    println!("⚙️  Insight engine configuration");
    println!("   ─────────────────────────────────────────────────────────");
    match resolve_config_path(config_path) {
        Some(path) => println!("   Source:     {}", path.display()),
        None => println!("   Source:     built-in defaults"),
    }
    if let Some(path) = config_path.filter(|p| !p.exists()) {
        println!("   ⚠️  {} not found, using built-in defaults", path.display());
    }
    println!("   Top N:      {}", config.top_n);

    println!();
    println!("   Analyzers:");
    for kind in AnalyzerKind::all() {
        let status = if config.is_enabled(*kind) { "✓" } else { "✗ disabled" };
        println!("      {:<22} {}", kind.as_str(), status);
    }

    let g = &config.guards;
    println!();
    println!("   Guards:");
    println!("      peak_min_days                  {}", g.peak_min_days);
    println!("      inconsistent_activity_min_days {}", g.inconsistent_activity_min_days);
    println!("      engagement_min_days            {}", g.engagement_min_days);
    println!("      consistency_min_days           {}", g.consistency_min_days);
    println!("      anomaly_min_days               {}", g.anomaly_min_days);
    println!("      growth_bucket_days             {}", g.growth_bucket_days);
    println!("      growth_min_tail_days           {}", g.growth_min_tail_days);
    println!("      concentration_min_members      {}", g.concentration_min_members);
    println!("      leadership_min_members         {}", g.leadership_min_members);
    println!("      diversity_min_members          {}", g.diversity_min_members);

    Ok(())
}
