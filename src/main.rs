//! yt-transcript CLI entry point.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use yt_transcript::cli::{commands, Cli, Commands};
use yt_transcript::config::Settings;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    // stdout is reserved for command output and JSON-RPC
    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("yt_transcript={}", log_level)),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let config_path = cli.config.as_ref().map(PathBuf::from);
    let settings = Settings::load_from(config_path.as_ref())?;

    match &cli.command {
        Commands::Get {
            url,
            language,
            format,
            output,
        } => {
            commands::run_get(url, language, format, output.clone(), settings).await?;
        }

        Commands::Search {
            url,
            query,
            language,
            context,
        } => {
            commands::run_search(url, query, language, *context, settings).await?;
        }

        Commands::Summary { url, language, minutes } => {
            commands::run_summary(url, language, *minutes, settings).await?;
        }

        Commands::Batch { urls, language } => {
            commands::run_batch(urls, language, settings).await?;
        }

        Commands::Mcp { transport } => {
            commands::run_mcp(transport.as_deref(), settings).await?;
        }

        Commands::Serve { host, port } => {
            commands::run_serve(host.as_deref(), *port, settings).await?;
        }

        Commands::Doctor => {
            commands::run_doctor(&settings, config_path.as_ref()).await?;
        }

        Commands::Config { action } => {
            commands::run_config(action, &settings, config_path.as_ref())?;
        }
    }

    Ok(())
}
