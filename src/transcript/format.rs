//! Transcript output formatting (markdown, JSON, SRT, VTT).

use super::{format_timestamp, Segment, TranscriptResult};
use serde::Serialize;

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Plain full text.
    #[default]
    Text,
    /// Timestamped markdown lines.
    Segments,
    /// Full text followed by timestamped lines.
    Both,
    Json,
    Srt,
    Vtt,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" | "txt" => Ok(OutputFormat::Text),
            "segments" => Ok(OutputFormat::Segments),
            "both" => Ok(OutputFormat::Both),
            "json" => Ok(OutputFormat::Json),
            "srt" => Ok(OutputFormat::Srt),
            "vtt" | "webvtt" => Ok(OutputFormat::Vtt),
            _ => Err(format!(
                "Unknown format: {}. Use text, segments, both, json, srt, or vtt.",
                s
            )),
        }
    }
}

/// JSON-serializable transcript for export.
#[derive(Debug, Serialize)]
pub struct TranscriptExport<'a> {
    pub video_id: &'a str,
    pub language: &'a str,
    pub is_generated: bool,
    pub method: &'a str,
    pub duration_seconds: f64,
    pub segments: Vec<SegmentExport<'a>>,
}

#[derive(Debug, Serialize)]
pub struct SegmentExport<'a> {
    pub text: &'a str,
    pub start: f64,
    pub duration: f64,
}

impl<'a> From<&'a TranscriptResult> for TranscriptExport<'a> {
    fn from(transcript: &'a TranscriptResult) -> Self {
        Self {
            video_id: &transcript.video_id,
            language: &transcript.language,
            is_generated: transcript.is_generated,
            method: &transcript.method,
            duration_seconds: transcript.duration_seconds(),
            segments: transcript
                .segments
                .iter()
                .map(|s| SegmentExport {
                    text: &s.text,
                    start: s.start,
                    duration: s.duration,
                })
                .collect(),
        }
    }
}

/// Format the body of a transcript (no header) in the given format.
pub fn format_transcript(transcript: &TranscriptResult, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => transcript.text.clone(),
        OutputFormat::Segments => segments_to_markdown(&transcript.segments),
        OutputFormat::Both => format!(
            "### Full Text\n{}\n\n### Timestamped Segments\n{}",
            transcript.text,
            segments_to_markdown(&transcript.segments)
        ),
        OutputFormat::Json => format_json(transcript),
        OutputFormat::Srt => format_srt(&transcript.segments),
        OutputFormat::Vtt => format_vtt(&transcript.segments),
    }
}

/// Render segments as `**[m:ss]** text` lines.
pub fn segments_to_markdown(segments: &[Segment]) -> String {
    segments
        .iter()
        .map(|s| format!("**[{}]** {}", format_timestamp(s.start), s.text))
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_json(transcript: &TranscriptResult) -> String {
    let export = TranscriptExport::from(transcript);
    serde_json::to_string_pretty(&export).unwrap_or_else(|_| "{}".to_string())
}

/// Format as SRT (SubRip).
fn format_srt(segments: &[Segment]) -> String {
    let mut output = String::new();

    for (i, segment) in segments.iter().enumerate() {
        output.push_str(&format!("{}\n", i + 1));
        output.push_str(&format!(
            "{} --> {}\n",
            cue_timestamp(segment.start, ','),
            cue_timestamp(segment.end(), ',')
        ));
        output.push_str(&segment.text);
        output.push_str("\n\n");
    }

    output
}

/// Format as WebVTT.
fn format_vtt(segments: &[Segment]) -> String {
    let mut output = String::from("WEBVTT\n\n");

    for (i, segment) in segments.iter().enumerate() {
        output.push_str(&format!("{}\n", i + 1));
        output.push_str(&format!(
            "{} --> {}\n",
            cue_timestamp(segment.start, '.'),
            cue_timestamp(segment.end(), '.')
        ));
        output.push_str(&segment.text);
        output.push_str("\n\n");
    }

    output
}

/// `00:00:00,000` for SRT, `00:00:00.000` for VTT.
fn cue_timestamp(seconds: f64, ms_separator: char) -> String {
    let total_ms = (seconds.max(0.0) * 1000.0).round() as u64;
    let hours = total_ms / 3_600_000;
    let minutes = (total_ms % 3_600_000) / 60_000;
    let secs = (total_ms % 60_000) / 1000;
    let ms = total_ms % 1000;

    format!("{:02}:{:02}:{:02}{}{:03}", hours, minutes, secs, ms_separator, ms)
}
