//! Transcript data model and output formatting.

mod format;
mod models;

pub use format::{format_transcript, segments_to_markdown, OutputFormat, SegmentExport, TranscriptExport};
pub use models::{format_timestamp, Segment, TranscriptResult};
