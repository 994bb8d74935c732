//! MCP tool definitions and dispatch.

use super::protocol::{Tool, ToolCallResult};
use crate::engine::QueryEngine;
use crate::error::Result;
use crate::transcript::OutputFormat;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;

fn default_language() -> String {
    "en".to_string()
}

fn default_format() -> String {
    "text".to_string()
}

fn default_context() -> usize {
    1
}

fn default_chunk_minutes() -> u32 {
    5
}

#[derive(Debug, Deserialize)]
struct GetTranscriptArgs {
    url: String,
    #[serde(default = "default_language")]
    language: String,
    #[serde(default = "default_format")]
    format: String,
}

#[derive(Debug, Deserialize)]
struct SearchTranscriptArgs {
    url: String,
    query: String,
    #[serde(default = "default_language")]
    language: String,
    #[serde(default = "default_context")]
    context_segments: usize,
}

#[derive(Debug, Deserialize)]
struct SummaryArgs {
    url: String,
    #[serde(default = "default_language")]
    language: String,
    #[serde(default = "default_chunk_minutes")]
    chunk_minutes: u32,
}

#[derive(Debug, Deserialize)]
struct BatchArgs {
    urls: Vec<String>,
    #[serde(default = "default_language")]
    language: String,
}

/// Get all available tools.
pub fn get_tools() -> Vec<Tool> {
    vec![
        Tool {
            name: "get_transcript".to_string(),
            description: "Get the transcript of a YouTube video. \
                Formats: 'text' (plain text), 'segments' (timestamped), 'both', 'json', 'srt' or 'vtt'."
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "url": {
                        "type": "string",
                        "description": "YouTube video URL or video ID"
                    },
                    "language": {
                        "type": "string",
                        "description": "Language code (e.g. 'en', 'de', 'es')",
                        "default": "en"
                    },
                    "format": {
                        "type": "string",
                        "description": "Output format",
                        "enum": ["text", "segments", "both", "json", "srt", "vtt"],
                        "default": "text"
                    }
                },
                "required": ["url"]
            }),
        },
        Tool {
            name: "search_transcript".to_string(),
            description: "Search for keywords in a YouTube video transcript. \
                Case-insensitive; returns timestamped matches with surrounding context."
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "url": {
                        "type": "string",
                        "description": "YouTube video URL or video ID"
                    },
                    "query": {
                        "type": "string",
                        "description": "Search query (case-insensitive)"
                    },
                    "language": {
                        "type": "string",
                        "description": "Language code",
                        "default": "en"
                    },
                    "context_segments": {
                        "type": "integer",
                        "description": "Number of surrounding segments to include",
                        "minimum": 0,
                        "default": 1
                    }
                },
                "required": ["url", "query"]
            }),
        },
        Tool {
            name: "get_transcript_summary".to_string(),
            description: "Get a transcript structured in time chunks for easier analysis."
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "url": {
                        "type": "string",
                        "description": "YouTube video URL or video ID"
                    },
                    "language": {
                        "type": "string",
                        "description": "Language code",
                        "default": "en"
                    },
                    "chunk_minutes": {
                        "type": "integer",
                        "description": "Size of each time chunk in minutes",
                        "minimum": 1,
                        "default": 5
                    }
                },
                "required": ["url"]
            }),
        },
        Tool {
            name: "batch_transcripts".to_string(),
            description: "Get transcripts for multiple YouTube videos at once (max 10)."
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "urls": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "List of YouTube video URLs or IDs (max 10)"
                    },
                    "language": {
                        "type": "string",
                        "description": "Language code",
                        "default": "en"
                    }
                },
                "required": ["urls"]
            }),
        },
    ]
}

/// Run a tool against the engine.
pub async fn call_tool(engine: &QueryEngine, name: &str, arguments: Option<Value>) -> ToolCallResult {
    let outcome = match name {
        "get_transcript" => match parse_args::<GetTranscriptArgs>(arguments) {
            Ok(args) => {
                let format: OutputFormat = args.format.parse().unwrap_or_default();
                engine.get_transcript(&args.url, &args.language, format).await
            }
            Err(result) => return result,
        },
        "search_transcript" => match parse_args::<SearchTranscriptArgs>(arguments) {
            Ok(args) => {
                engine
                    .search_transcript(&args.url, &args.query, &args.language, args.context_segments)
                    .await
            }
            Err(result) => return result,
        },
        "get_transcript_summary" => match parse_args::<SummaryArgs>(arguments) {
            Ok(args) => engine.summarize(&args.url, &args.language, args.chunk_minutes).await,
            Err(result) => return result,
        },
        "batch_transcripts" => match parse_args::<BatchArgs>(arguments) {
            Ok(args) => engine.batch_transcripts(&args.urls, &args.language).await,
            Err(result) => return result,
        },
        _ => return ToolCallResult::error(format!("Unknown tool: {}", name)),
    };

    into_result(name, outcome)
}

fn parse_args<T: DeserializeOwned>(arguments: Option<Value>) -> std::result::Result<T, ToolCallResult> {
    let arguments = arguments.unwrap_or_else(|| json!({}));
    serde_json::from_value(arguments)
        .map_err(|e| ToolCallResult::error(format!("Invalid arguments: {}", e)))
}

fn into_result(name: &str, outcome: Result<String>) -> ToolCallResult {
    match outcome {
        Ok(text) => ToolCallResult::text(text),
        Err(e) => {
            warn!("Tool {} failed: {}", name, e);
            ToolCallResult::error(e.to_string())
        }
    }
}
