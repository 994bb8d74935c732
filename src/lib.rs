//! yt-transcript - YouTube transcripts for humans and AI assistants
//!
//! Fetches YouTube transcripts through a pluggable provider, caches them, and
//! answers queries over them: full text, keyword search with context,
//! time-chunked summaries and batch previews. The same queries are exposed as
//! CLI commands and as Model Context Protocol tools.
//!
//! # Architecture
//!
//! - `video_id` - URL / video ID parsing
//! - `rate_limit` - Sliding-window request limiter
//! - `cache` - Bounded TTL cache of fetched transcripts
//! - `provider` - Transcript sources (local yt-dlp extraction, remote backend)
//! - `engine` - Cache-then-provider retrieval, search, chunking, batch
//! - `mcp` - JSON-RPC server over stdio or HTTP
//! - `config` - Configuration management
//!
//! # Example
//!
//! ```rust,no_run
//! use yt_transcript::config::Settings;
//! use yt_transcript::engine::QueryEngine;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let engine = QueryEngine::from_settings(&settings)?;
//!
//!     let transcript = engine.get_cached("dQw4w9WgXcQ", "en").await?;
//!     println!("{} segments", transcript.segments.len());
//!
//!     engine.close().await;
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod mcp;
pub mod provider;
pub mod rate_limit;
pub mod transcript;
pub mod video_id;

pub use error::{Result, TranscriptError};
