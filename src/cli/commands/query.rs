//! Transcript query commands: get, search, summary, batch.

use crate::cli::{preflight, Output};
use crate::config::Settings;
use crate::engine::QueryEngine;
use crate::transcript::OutputFormat;
use anyhow::Result;
use std::future::Future;
use std::sync::Arc;

/// Build an engine, run one query under a spinner, and close the engine
/// whether or not the query succeeded.
async fn run_query<F, Fut>(settings: &Settings, message: &str, query: F) -> Result<String>
where
    F: FnOnce(Arc<QueryEngine>) -> Fut,
    Fut: Future<Output = crate::Result<String>>,
{
    preflight::check(settings)?;
    let engine = Arc::new(QueryEngine::from_settings(settings)?);

    let spinner = Output::spinner(message);
    let outcome = query(Arc::clone(&engine)).await;
    spinner.finish_and_clear();

    engine.close().await;
    Ok(outcome?)
}

/// Run the get command.
pub async fn run_get(
    url: &str,
    language: &str,
    format: &str,
    output: Option<String>,
    settings: Settings,
) -> Result<()> {
    let format: OutputFormat = format.parse().map_err(|e: String| anyhow::anyhow!(e))?;

    let text = run_query(&settings, "Fetching transcript...", |engine| async move {
        engine.get_transcript(url, language, format).await
    })
    .await?;

    match output {
        Some(path) => {
            std::fs::write(&path, &text)?;
            Output::success(&format!("Transcript written to {}", path));
        }
        None => println!("{}", text),
    }
    Ok(())
}

/// Run the search command.
pub async fn run_search(
    url: &str,
    query: &str,
    language: &str,
    context: usize,
    settings: Settings,
) -> Result<()> {
    let text = run_query(&settings, "Searching transcript...", |engine| async move {
        engine.search_transcript(url, query, language, context).await
    })
    .await?;

    println!("{}", text);
    Ok(())
}

/// Run the summary command.
pub async fn run_summary(url: &str, language: &str, minutes: u32, settings: Settings) -> Result<()> {
    let text = run_query(&settings, "Fetching transcript...", |engine| async move {
        engine.summarize(url, language, minutes).await
    })
    .await?;

    println!("{}", text);
    Ok(())
}

/// Run the batch command.
pub async fn run_batch(urls: &[String], language: &str, settings: Settings) -> Result<()> {
    let message = format!("Fetching {} transcripts...", urls.len());
    let text = run_query(&settings, &message, |engine| async move {
        engine.batch_transcripts(urls, language).await
    })
    .await?;

    println!("{}", text);
    Ok(())
}
