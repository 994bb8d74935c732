//! HTTP transport for the MCP server.
//!
//! One JSON-RPC message per `POST /mcp`; notifications are acknowledged with
//! `202 Accepted` and an empty body.

use super::McpServer;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

/// Build the router for the MCP endpoints.
pub fn router(server: Arc<McpServer>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/mcp", post(handle_mcp))
        .layer(cors)
        .with_state(server)
}

/// Bind and serve until Ctrl-C.
pub async fn serve_http(server: Arc<McpServer>, host: &str, port: u16) -> anyhow::Result<()> {
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("MCP server listening on http://{}/mcp", listener.local_addr()?);

    axum::serve(listener, router(server))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("MCP server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn handle_mcp(State(server): State<Arc<McpServer>>, body: String) -> Response {
    match server.handle_message(&body).await {
        Some(response) => Json(response).into_response(),
        None => StatusCode::ACCEPTED.into_response(),
    }
}
