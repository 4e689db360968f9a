//! Server command implementation

use std::path::Path;

use anyhow::Result;

use super::load_engine_config;

pub async fn cmd_serve(
    config_path: Option<&Path>,
    host: &str,
    port: u16,
    static_dir: Option<&Path>,
) -> Result<()> {
    let config = load_engine_config(config_path)?;

    // Comma-separated CORS origins; empty means same-origin only
    let allowed_origins: Vec<String> = std::env::var("CHATPULSE_ALLOWED_ORIGINS")
        .unwrap_or_default()
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    println!("🚀 Starting ChatPulse web server...");
    println!("   Listening: http://{}:{}", host, port);
    if let Some(dir) = static_dir {
        println!("   Static files: {}", dir.display());
    }
    println!(
        "   Analyzers: {} enabled, top {} headline insights",
        chatpulse_core::insights::AnalyzerKind::all()
            .iter()
            .filter(|k| config.is_enabled(**k))
            .count(),
        config.top_n
    );
    if !allowed_origins.is_empty() {
        println!(
            "   🌐 Allowed origins: {} (CHATPULSE_ALLOWED_ORIGINS)",
            allowed_origins.join(", ")
        );
    }
    println!();
    println!("   Press Ctrl+C to stop");

    let server_config = chatpulse_server::ServerConfig { allowed_origins };

    chatpulse_server::serve_with_config(config, host, port, static_dir, server_config).await?;

    Ok(())
}
