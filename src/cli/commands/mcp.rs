//! MCP command implementation.

use super::serve::run_serve;
use crate::config::{Settings, Transport};
use crate::engine::QueryEngine;
use crate::mcp::McpServer;
use anyhow::Result;
use std::sync::Arc;

/// Run the MCP server on the requested or configured transport.
pub async fn run_mcp(transport: Option<&str>, settings: Settings) -> Result<()> {
    let transport = match transport {
        Some(t) => t.parse::<Transport>().map_err(|e| anyhow::anyhow!(e))?,
        None => settings.server.transport,
    };

    match transport {
        Transport::Http => run_serve(None, None, settings).await,
        Transport::Stdio => {
            // stdout carries JSON-RPC, so nothing else may print to it here
            let engine = Arc::new(QueryEngine::from_settings(&settings)?);
            let server = Arc::new(McpServer::new(Arc::clone(&engine)));

            let outcome = server.run_stdio().await;
            engine.close().await;
            outcome
        }
    }
}
