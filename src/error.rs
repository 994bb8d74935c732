//! Error types for yt-transcript.

use thiserror::Error;

/// Library-level error type for transcript retrieval and queries.
#[derive(Error, Debug)]
pub enum TranscriptError {
    #[error("Invalid YouTube URL or video ID: {0}")]
    InvalidVideoId(String),

    #[error("Rate limit exceeded ({limit}/min). Try again in a few seconds.")]
    RateLimitExceeded { limit: u32 },

    #[error("No transcript available for {video_id}: {reason}")]
    TranscriptUnavailable { video_id: String, reason: String },

    #[error("Upstream service error: {0}")]
    Upstream(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Maximum {max} videos per batch (got {count})")]
    TooManyVideos { count: usize, max: usize },

    #[error("Caption extraction failed: {0}")]
    Extraction(String),

    #[error("External tool not found: {0}. Please install it and ensure it's in your PATH.")]
    ToolNotFound(String),

    #[error("External tool failed: {0}")]
    ToolFailed(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

/// Coarse classification of a [`TranscriptError`], for callers that branch on
/// the kind of failure rather than on its source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidIdentifier,
    RateLimited,
    Unavailable,
    UpstreamTransport,
    Other,
}

impl TranscriptError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TranscriptError::InvalidVideoId(_) => ErrorKind::InvalidIdentifier,
            TranscriptError::RateLimitExceeded { .. } => ErrorKind::RateLimited,
            TranscriptError::TranscriptUnavailable { .. } => ErrorKind::Unavailable,
            TranscriptError::Upstream(_) | TranscriptError::Http(_) => ErrorKind::UpstreamTransport,
            _ => ErrorKind::Other,
        }
    }
}

/// Result type alias for transcript operations.
pub type Result<T> = std::result::Result<T, TranscriptError>;
