//! CLI module for yt-transcript.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// yt-transcript - YouTube transcripts for humans and AI assistants
///
/// Fetch, search and summarize YouTube transcripts from the command line, or
/// serve them to AI assistants over the Model Context Protocol.
#[derive(Parser, Debug)]
#[command(name = "yt-transcript")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the transcript of a video
    Get {
        /// YouTube URL or video ID
        url: String,

        /// Language code
        #[arg(short, long, default_value = "en")]
        language: String,

        /// Output format (text, segments, both, json, srt, vtt)
        #[arg(short, long, default_value = "text")]
        format: String,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Search a transcript for a keyword
    Search {
        /// YouTube URL or video ID
        url: String,

        /// Search query (case-insensitive)
        query: String,

        /// Language code
        #[arg(short, long, default_value = "en")]
        language: String,

        /// Number of surrounding segments to show
        #[arg(short = 'C', long, default_value = "1")]
        context: usize,
    },

    /// Print a transcript grouped into time chunks
    Summary {
        /// YouTube URL or video ID
        url: String,

        /// Language code
        #[arg(short, long, default_value = "en")]
        language: String,

        /// Chunk size in minutes
        #[arg(short, long, default_value = "5")]
        minutes: u32,
    },

    /// Preview transcripts of several videos
    Batch {
        /// YouTube URLs or video IDs
        #[arg(required = true)]
        urls: Vec<String>,

        /// Language code
        #[arg(short, long, default_value = "en")]
        language: String,
    },

    /// Start the MCP server for AI assistant integration
    Mcp {
        /// Transport (stdio or http); defaults to the configured one
        #[arg(short, long)]
        transport: Option<String>,
    },

    /// Start the MCP server over HTTP
    Serve {
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Check external tools and backend connectivity
    Doctor,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,
}
