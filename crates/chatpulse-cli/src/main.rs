//! ChatPulse CLI - Group chat analytics
//!
//! Usage:
//!   chatpulse insights --input groups.json      Ranked insights for exported groups
//!   chatpulse formula eval --expr "..." --var x=1  Evaluate a custom formula
//!   chatpulse metrics                           List the metric catalog
//!   chatpulse serve --port 3000                 Start web server

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Insights {
            input,
            dir,
            group,
            from,
            to,
            all,
            limit,
            format,
        } => {
            let source = match (input, dir) {
                (Some(path), _) => commands::InsightSource::File(path),
                (None, Some(dir)) => {
                    let period = commands::resolve_window(from.as_deref(), to.as_deref())?;
                    commands::InsightSource::Dir {
                        dir,
                        groups: group,
                        period,
                    }
                }
                (None, None) => anyhow::bail!("Provide --input <file> or --dir <dir> --group <id>"),
            };
            let format: commands::OutputFormat = format.parse()?;
            commands::cmd_insights(config_path, &source, all, limit, format)
        }
        Commands::Formula { action } => match action {
            FormulaAction::Check { expr, conditions } => {
                commands::cmd_formula_check(&expr, &conditions)
            }
            FormulaAction::Eval {
                expr,
                vars,
                conditions,
                group,
                previous,
                json,
            } => commands::cmd_formula_eval(
                &expr,
                &vars,
                &conditions,
                group.as_deref(),
                previous.as_deref(),
                json,
            ),
        },
        Commands::Metrics { category, group } => {
            commands::cmd_metrics(category.as_deref(), group.as_deref())
        }
        Commands::Config => commands::cmd_config(config_path),
        Commands::Serve {
            port,
            host,
            static_dir,
        } => commands::cmd_serve(config_path, &host, port, static_dir.as_deref()).await,
    }
}
