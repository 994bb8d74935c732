//! Data models for transcripts.

use serde::{Deserialize, Serialize};

/// One timestamped span of transcript text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Caption text.
    pub text: String,
    /// Start time in seconds.
    pub start: f64,
    /// Duration in seconds.
    pub duration: f64,
}

impl Segment {
    /// Create a new segment.
    pub fn new(text: impl Into<String>, start: f64, duration: f64) -> Self {
        Self {
            text: text.into(),
            start,
            duration,
        }
    }

    /// End time in seconds.
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }
}

/// A complete transcript as delivered by a provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptResult {
    /// Canonical 11-character video ID.
    pub video_id: String,
    /// Language code of the captions.
    pub language: String,
    /// Whether the captions were generated automatically.
    pub is_generated: bool,
    /// Segments in source order.
    pub segments: Vec<Segment>,
    /// Full transcript text.
    pub text: String,
    /// Where the transcript came from ("local" or a backend-reported method).
    pub method: String,
}

impl TranscriptResult {
    /// Build a transcript whose full text is the space-joined segment text.
    pub fn from_segments(
        video_id: impl Into<String>,
        language: impl Into<String>,
        is_generated: bool,
        segments: Vec<Segment>,
        method: impl Into<String>,
    ) -> Self {
        let text = segments
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");

        Self {
            video_id: video_id.into(),
            language: language.into(),
            is_generated,
            segments,
            text,
            method: method.into(),
        }
    }

    /// End time of the last segment, or zero for an empty transcript.
    pub fn duration_seconds(&self) -> f64 {
        self.segments.last().map(Segment::end).unwrap_or(0.0)
    }
}

/// Format seconds as M:SS, or H:MM:SS from one hour on.
pub fn format_timestamp(seconds: f64) -> String {
    let total_seconds = seconds.max(0.0) as u64;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let secs = total_seconds % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{}:{:02}", minutes, secs)
    }
}
