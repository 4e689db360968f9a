//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// ChatPulse - Smart insights for group chats
#[derive(Parser)]
#[command(name = "chatpulse")]
#[command(about = "Group chat analytics: smart insights and custom formulas", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Engine config file
    ///
    /// Defaults to ~/.local/share/chatpulse/config/insights.toml when present,
    /// otherwise the built-in defaults.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate ranked insights for one or more groups
    Insights {
        /// JSON file with one group or an array of groups
        #[arg(short, long, conflicts_with = "dir")]
        input: Option<PathBuf>,

        /// Directory of <group_id>.json files
        #[arg(short, long, requires = "group")]
        dir: Option<PathBuf>,

        /// Group id to load from --dir (repeatable)
        #[arg(short, long)]
        group: Vec<String>,

        /// Window start for --dir (YYYY-MM-DD, defaults to 29 days before --to)
        #[arg(long)]
        from: Option<String>,

        /// Window end for --dir (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        to: Option<String>,

        /// Show the full ranked list instead of the headline insights
        #[arg(long)]
        all: bool,

        /// Maximum number of insights to show
        #[arg(short, long)]
        limit: Option<usize>,

        /// Output format: text, json, csv
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Validate and evaluate custom formulas
    Formula {
        #[command(subcommand)]
        action: FormulaAction,
    },

    /// List the metric catalog
    Metrics {
        /// Only show one category (basic, growth, quality, distribution, temporal, advanced)
        #[arg(short, long)]
        category: Option<String>,

        /// Also show computed values for this group file
        #[arg(short, long)]
        group: Option<PathBuf>,
    },

    /// Show the resolved engine configuration
    Config,

    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Directory of static files to serve (e.g., ui/dist)
        #[arg(long)]
        static_dir: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum FormulaAction {
    /// Validate a formula and list its variables
    Check {
        /// Expression, e.g. "participation_rate > 70 && active_members > 20"
        #[arg(short, long)]
        expr: String,

        /// Condition as field:operator:value (between takes min,max)
        #[arg(short, long = "condition")]
        conditions: Vec<String>,
    },

    /// Evaluate a formula
    Eval {
        /// Expression to evaluate
        #[arg(short, long)]
        expr: String,

        /// Variable binding as name=value (repeatable, overrides group metrics)
        #[arg(long = "var")]
        vars: Vec<String>,

        /// Condition as field:operator:value (between takes min,max)
        #[arg(short, long = "condition")]
        conditions: Vec<String>,

        /// Bind catalog metrics computed from this group file
        #[arg(short, long)]
        group: Option<PathBuf>,

        /// Previous-period group file for prev_ metrics and growth rates
        #[arg(short, long, requires = "group")]
        previous: Option<PathBuf>,

        /// Print the evaluation as JSON
        #[arg(long)]
        json: bool,
    },
}
