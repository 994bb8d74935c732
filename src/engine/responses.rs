//! Markdown responses shared by the MCP tools and the CLI.
//!
//! Every operation checks the rate limit first and returns
//! `RateLimitExceeded` as an error. Other failures are rendered into the
//! response text.

use super::{chunk, search, QueryEngine};
use crate::error::{Result, TranscriptError};
use crate::transcript::{format_timestamp, format_transcript, OutputFormat, TranscriptResult};
use crate::video_id::parse_video_id;

const PREVIEW_CHARS: usize = 500;

impl QueryEngine {
    /// Full transcript with a short header.
    pub async fn get_transcript(&self, input: &str, language: &str, format: OutputFormat) -> Result<String> {
        self.check_rate_limit()?;

        let (video_id, result) = match self.resolve(input, language).await {
            Ok(found) => found,
            Err(message) => return Ok(message),
        };

        let header = format!(
            "## Transcript: {}\n**Language:** {} | **Method:** {}\n",
            video_id, result.language, result.method
        );
        Ok(format!("{}\n{}", header, format_transcript(&result, format)))
    }

    /// Keyword search with `context` segments around each hit.
    pub async fn search_transcript(
        &self,
        input: &str,
        query: &str,
        language: &str,
        context: usize,
    ) -> Result<String> {
        self.check_rate_limit()?;

        let Some(video_id) = parse_video_id(input) else {
            return Ok(invalid_input(input));
        };
        if query.trim().is_empty() {
            return Ok("Error: Search query cannot be empty.".to_string());
        }
        let result = match self.get_cached(&video_id, language).await {
            Ok(result) => result,
            Err(e) => return Ok(fetch_failed(&video_id, &e)),
        };

        let groups = search(&result, query, context);
        if groups.is_empty() {
            return Ok(format!("No matches found for '{}' in {}.", query, video_id));
        }

        let body = groups
            .iter()
            .map(|group| {
                group
                    .lines()
                    .map(|(_, segment, is_match)| {
                        format!(
                            "{}**[{}]** {}",
                            if is_match { "> " } else { "  " },
                            format_timestamp(segment.start),
                            segment.text
                        )
                    })
                    .collect::<Vec<_>>()
                    .join("\n")
            })
            .collect::<Vec<_>>()
            .join("\n\n---\n\n");

        Ok(format!(
            "## Search Results: '{}' in {}\n**{} match(es) found**\n\n{}",
            query,
            video_id,
            groups.len(),
            body
        ))
    }

    /// Transcript grouped into `chunk_minutes`-long sections.
    pub async fn summarize(&self, input: &str, language: &str, chunk_minutes: u32) -> Result<String> {
        self.check_rate_limit()?;

        if chunk_minutes == 0 {
            return Ok("Error: chunk_minutes must be at least 1.".to_string());
        }
        let (video_id, result) = match self.resolve(input, language).await {
            Ok(found) => found,
            Err(message) => return Ok(message),
        };

        let sections = chunk(&result, f64::from(chunk_minutes) * 60.0)
            .iter()
            .map(|c| {
                format!(
                    "### [{} - {}]\n{}",
                    format_timestamp(c.start_seconds),
                    format_timestamp(c.end_seconds),
                    c.text()
                )
            })
            .collect::<Vec<_>>()
            .join("\n\n");

        Ok(format!(
            "## Transcript Summary: {}\n**Language:** {} | **Chunk size:** {}min\n\n{}",
            video_id, result.language, chunk_minutes, sections
        ))
    }

    /// Preview of several transcripts, one section per input.
    pub async fn batch_transcripts(&self, inputs: &[String], language: &str) -> Result<String> {
        self.check_rate_limit()?;

        let entries = match self.batch(inputs, language).await {
            Ok(entries) => entries,
            Err(TranscriptError::TooManyVideos { max, .. }) => {
                return Ok(format!("Error: Maximum {} videos per batch.", max));
            }
            Err(e) => return Err(e),
        };

        let sections = entries
            .iter()
            .map(|entry| match &entry.outcome {
                Ok(result) => format!(
                    "### {}\n**Language:** {} | **Segments:** {}\n\n{}\n",
                    result.video_id,
                    result.language,
                    result.segments.len(),
                    preview(&result.text)
                ),
                Err(err) => format!("### {}\n**Error:** {}\n", err.video_id, err.message),
            })
            .collect::<Vec<_>>()
            .join("\n---\n\n");

        Ok(format!("## Batch Transcripts ({} videos)\n{}", inputs.len(), sections))
    }

    /// Parse and fetch, or produce the error text to return instead.
    async fn resolve(
        &self,
        input: &str,
        language: &str,
    ) -> std::result::Result<(String, TranscriptResult), String> {
        let video_id = parse_video_id(input).ok_or_else(|| invalid_input(input))?;
        let result = self
            .get_cached(&video_id, language)
            .await
            .map_err(|e| fetch_failed(&video_id, &e))?;
        Ok((video_id, result))
    }
}

fn invalid_input(input: &str) -> String {
    format!("Error: Invalid YouTube URL or video ID: {}", input)
}

fn fetch_failed(video_id: &str, err: &TranscriptError) -> String {
    format!("Error fetching transcript for {}: {}", video_id, err)
}

fn preview(text: &str) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}
