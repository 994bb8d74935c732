//! MCP (Model Context Protocol) server.
//!
//! Exposes the transcript tools, prompts and resources to AI assistants over
//! JSON-RPC 2.0, on stdio or HTTP.

mod http;
mod prompts;
mod protocol;
mod server;
mod tools;

pub use http::{router, serve_http};
pub use protocol::{JsonRpcRequest, JsonRpcResponse};
pub use server::McpServer;
