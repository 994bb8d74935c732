//! HTTP MCP server command.

use crate::cli::Output;
use crate::config::Settings;
use crate::engine::QueryEngine;
use crate::mcp::{serve_http, McpServer};
use anyhow::Result;
use std::sync::Arc;

/// Run the MCP server over HTTP. `host` and `port` override the configuration.
pub async fn run_serve(host: Option<&str>, port: Option<u16>, settings: Settings) -> Result<()> {
    let host = host.unwrap_or(&settings.server.host).to_string();
    let port = port.unwrap_or(settings.server.port);

    let engine = Arc::new(QueryEngine::from_settings(&settings)?);
    let server = Arc::new(McpServer::new(Arc::clone(&engine)));

    Output::header("yt-transcript MCP Server");
    println!();
    Output::kv("Provider", engine.provider_name());
    Output::kv("MCP", &format!("POST http://{}:{}/mcp", host, port));
    Output::kv("Health", &format!("GET  http://{}:{}/health", host, port));
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    let outcome = serve_http(server, &host, port).await;
    engine.close().await;
    outcome
}
