//! MCP server implementation.

use super::prompts::{get_prompts, get_resources, render_prompt, CACHE_STATS_URI, HELP_TEXT, HELP_URI};
use super::protocol::*;
use super::tools::{call_tool, get_tools};
use crate::engine::QueryEngine;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

const PROTOCOL_VERSION: &str = "2024-11-05";
const SERVER_NAME: &str = "yt-transcript";
const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// MCP server over a shared query engine.
pub struct McpServer {
    engine: Arc<QueryEngine>,
}

impl McpServer {
    pub fn new(engine: Arc<QueryEngine>) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &Arc<QueryEngine> {
        &self.engine
    }

    /// Serve JSON-RPC over stdin/stdout until stdin closes.
    pub async fn run_stdio(self: Arc<Self>) -> anyhow::Result<()> {
        info!("MCP server listening on stdio");
        self.serve(tokio::io::stdin(), tokio::io::stdout()).await
    }

    /// Serve newline-delimited JSON-RPC from `reader` to `writer`.
    ///
    /// Each message is handled in its own task, so a slow fetch does not hold
    /// up other requests. Responses may therefore arrive out of order.
    pub async fn serve<R, W>(self: Arc<Self>, reader: R, writer: W) -> anyhow::Result<()>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<String>();

        let writer_task = tokio::spawn(async move {
            let mut writer = writer;
            while let Some(line) = rx.recv().await {
                writer.write_all(line.as_bytes()).await?;
                writer.write_all(b"\n").await?;
                writer.flush().await?;
            }
            writer.shutdown().await?;
            Ok::<_, std::io::Error>(())
        });

        let mut lines = BufReader::new(reader).lines();
        let mut handlers = JoinSet::new();

        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            let server = Arc::clone(&self);
            let tx = tx.clone();
            handlers.spawn(async move {
                if let Some(response) = server.handle_message(&line).await {
                    match serde_json::to_string(&response) {
                        Ok(encoded) => {
                            forward(&tx, encoded);
                        }
                        Err(e) => warn!("Failed to encode response: {}", e),
                    }
                }
            });
        }

        debug!("Input closed, waiting for {} in-flight requests", handlers.len());
        while handlers.join_next().await.is_some() {}
        drop(tx);
        writer_task.await??;

        Ok(())
    }

    /// Handle one raw JSON-RPC message. Returns `None` for notifications.
    pub async fn handle_message(&self, raw: &str) -> Option<JsonRpcResponse> {
        let value: Value = match serde_json::from_str(raw) {
            Ok(value) => value,
            Err(e) => {
                warn!("Failed to parse request: {}", e);
                return Some(JsonRpcResponse::error(None, PARSE_ERROR, "Parse error"));
            }
        };

        let request: JsonRpcRequest = match serde_json::from_value(value) {
            Ok(request) => request,
            Err(e) => {
                return Some(JsonRpcResponse::error(
                    None,
                    INVALID_REQUEST,
                    &format!("Invalid request: {}", e),
                ))
            }
        };

        self.handle_request(request).await
    }

    /// Handle a single JSON-RPC request.
    pub async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        debug!("Request: {}", request.method);

        if request.is_notification() {
            // initialized, cancelled and friends need no reply
            return None;
        }

        let id = request.id;
        let response = match request.method.as_str() {
            "initialize" => self.handle_initialize(id),
            "ping" => JsonRpcResponse::success(id, json!({})),
            "tools/list" => JsonRpcResponse::success(id, json!({ "tools": get_tools() })),
            "tools/call" => self.handle_tools_call(id, request.params).await,
            "prompts/list" => JsonRpcResponse::success(id, json!({ "prompts": get_prompts() })),
            "prompts/get" => self.handle_prompts_get(id, request.params),
            "resources/list" => JsonRpcResponse::success(id, json!({ "resources": get_resources() })),
            "resources/read" => self.handle_resources_read(id, request.params),
            _ => JsonRpcResponse::error(
                id,
                METHOD_NOT_FOUND,
                &format!("Method not found: {}", request.method),
            ),
        };

        Some(response)
    }

    fn handle_initialize(&self, id: Option<Value>) -> JsonRpcResponse {
        let result = InitializeResult {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: ListCapability { list_changed: false },
                prompts: ListCapability { list_changed: false },
                resources: ResourcesCapability {
                    subscribe: false,
                    list_changed: false,
                },
            },
            server_info: ServerInfo {
                name: SERVER_NAME.to_string(),
                version: SERVER_VERSION.to_string(),
            },
            instructions: Some(format!(
                "Fetch, search, and summarize YouTube transcripts. Read {} for usage.",
                HELP_URI
            )),
        };

        respond(id, &result)
    }

    async fn handle_tools_call(&self, id: Option<Value>, params: Option<Value>) -> JsonRpcResponse {
        let params: ToolCallParams = match parse_params(params) {
            Ok(params) => params,
            Err(message) => return JsonRpcResponse::error(id, INVALID_PARAMS, &message),
        };

        info!("Tool call: {}", params.name);
        let result = call_tool(&self.engine, &params.name, params.arguments).await;
        respond(id, &result)
    }

    fn handle_prompts_get(&self, id: Option<Value>, params: Option<Value>) -> JsonRpcResponse {
        let params: PromptGetParams = match parse_params(params) {
            Ok(params) => params,
            Err(message) => return JsonRpcResponse::error(id, INVALID_PARAMS, &message),
        };

        match render_prompt(&params.name, &params.arguments) {
            Ok((description, text)) => respond(
                id,
                &PromptGetResult {
                    description,
                    messages: vec![PromptMessage {
                        role: "user".to_string(),
                        content: TextContent::Text { text },
                    }],
                },
            ),
            Err(message) => JsonRpcResponse::error(id, INVALID_PARAMS, &message),
        }
    }

    fn handle_resources_read(&self, id: Option<Value>, params: Option<Value>) -> JsonRpcResponse {
        let params: ResourceReadParams = match parse_params(params) {
            Ok(params) => params,
            Err(message) => return JsonRpcResponse::error(id, INVALID_PARAMS, &message),
        };

        let (mime_type, text) = match params.uri.as_str() {
            HELP_URI => ("text/markdown", HELP_TEXT.to_string()),
            CACHE_STATS_URI => match serde_json::to_string_pretty(&self.engine.stats()) {
                Ok(json) => ("application/json", json),
                Err(e) => return JsonRpcResponse::error(id, -32603, &e.to_string()),
            },
            other => {
                return JsonRpcResponse::error(id, INVALID_PARAMS, &format!("Unknown resource: {}", other))
            }
        };

        respond(
            id,
            &ResourceReadResult {
                contents: vec![ResourceContents {
                    uri: params.uri,
                    mime_type: mime_type.to_string(),
                    text,
                }],
            },
        )
    }
}

/// Queue an encoded response for the writer. Returns `false` if the writer
/// has already stopped and the response was dropped.
fn forward(tx: &mpsc::UnboundedSender<String>, encoded: String) -> bool {
    if tx.send(encoded).is_err() {
        warn!("Response dropped: output writer has stopped");
        return false;
    }
    true
}

fn parse_params<T: DeserializeOwned>(params: Option<Value>) -> Result<T, String> {
    let params = params.ok_or_else(|| "Missing params".to_string())?;
    serde_json::from_value(params).map_err(|e| format!("Invalid params: {}", e))
}

fn respond<T: Serialize>(id: Option<Value>, result: &T) -> JsonRpcResponse {
    match serde_json::to_value(result) {
        Ok(value) => JsonRpcResponse::success(id, value),
        Err(e) => JsonRpcResponse::error(id, -32603, &format!("Internal error: {}", e)),
    }
}
