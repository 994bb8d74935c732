//! Local caption extraction.
//!
//! Extraction is a blocking routine, so it runs on tokio's blocking thread
//! pool and the calling task is suspended until it finishes.

use super::vtt::parse_vtt;
use super::TranscriptProvider;
use crate::error::{Result, TranscriptError};
use crate::transcript::{Segment, TranscriptResult};
use crate::video_id::watch_url;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Language tried after the requested one.
const FALLBACK_LANGUAGE: &str = "en";

/// Captions found by an extractor.
#[derive(Debug, Clone)]
pub struct ExtractedCaptions {
    /// The candidate language that matched.
    pub language: String,
    pub is_generated: bool,
    pub segments: Vec<Segment>,
}

/// A synchronous caption source.
pub trait CaptionExtractor: Send + Sync + 'static {
    /// Return captions in the first of `languages` that has any.
    fn extract(&self, video_id: &str, languages: &[String]) -> Result<ExtractedCaptions>;
}

/// Provider backed by an in-process [`CaptionExtractor`].
pub struct LocalExtractionProvider {
    extractor: Arc<dyn CaptionExtractor>,
}

impl LocalExtractionProvider {
    pub fn new(extractor: Arc<dyn CaptionExtractor>) -> Self {
        Self { extractor }
    }
}

/// `[language, "en"]` without duplicates.
fn candidate_languages(language: &str) -> Vec<String> {
    let mut languages = vec![language.to_string()];
    if language != FALLBACK_LANGUAGE {
        languages.push(FALLBACK_LANGUAGE.to_string());
    }
    languages
}

#[async_trait]
impl TranscriptProvider for LocalExtractionProvider {
    fn name(&self) -> &'static str {
        "local"
    }

    #[instrument(skip(self))]
    async fn fetch_one(&self, video_id: &str, language: &str) -> Result<TranscriptResult> {
        let extractor = Arc::clone(&self.extractor);
        let languages = candidate_languages(language);
        let id = video_id.to_string();

        let captions = tokio::task::spawn_blocking(move || extractor.extract(&id, &languages))
            .await
            .map_err(|e| TranscriptError::Extraction(format!("extraction task failed: {}", e)))??;

        debug!(
            segments = captions.segments.len(),
            language = %captions.language,
            "Extracted captions"
        );

        Ok(TranscriptResult::from_segments(
            video_id,
            captions.language,
            captions.is_generated,
            captions.segments,
            "local",
        ))
    }

    async fn close(&self) {}
}

/// Caption extractor that drives `yt-dlp` and parses the WebVTT it writes.
///
/// For each candidate language, uploaded subtitles are preferred over
/// automatic captions.
pub struct YtDlpExtractor {
    binary: PathBuf,
}

impl YtDlpExtractor {
    pub fn new() -> Self {
        Self::with_binary("yt-dlp")
    }

    pub fn with_binary(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Run yt-dlp once for one language and caption kind. `Ok(None)` means no
    /// subtitle file was produced.
    fn download_subtitles(
        &self,
        video_id: &str,
        language: &str,
        automatic: bool,
    ) -> Result<Option<String>> {
        let temp_dir = tempfile::tempdir()?;
        let template = temp_dir.path().join("%(id)s.%(ext)s");

        let output = Command::new(&self.binary)
            .arg("--skip-download")
            .arg(if automatic { "--write-auto-sub" } else { "--write-sub" })
            .arg("--sub-lang").arg(language)
            .arg("--sub-format").arg("vtt")
            .arg("--output").arg(&template)
            .arg("--no-playlist")
            .arg("--no-warnings")
            .arg("--quiet")
            .arg(watch_url(video_id))
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    TranscriptError::ToolNotFound(self.binary.display().to_string())
                } else {
                    TranscriptError::ToolFailed(format!("Failed to run yt-dlp: {}", e))
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let reason = stderr.trim().lines().last().unwrap_or("").to_string();
            return Err(classify_failure(video_id, &reason));
        }

        match first_vtt_file(temp_dir.path())? {
            Some(path) => Ok(Some(std::fs::read_to_string(path)?)),
            None => Ok(None),
        }
    }
}

impl Default for YtDlpExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptionExtractor for YtDlpExtractor {
    fn extract(&self, video_id: &str, languages: &[String]) -> Result<ExtractedCaptions> {
        for language in languages {
            for automatic in [false, true] {
                if let Some(vtt) = self.download_subtitles(video_id, language, automatic)? {
                    info!(video_id, language = %language, automatic, "Found captions");
                    return Ok(ExtractedCaptions {
                        language: language.clone(),
                        is_generated: automatic,
                        segments: parse_vtt(&vtt, automatic),
                    });
                }
            }
        }

        Err(TranscriptError::TranscriptUnavailable {
            video_id: video_id.to_string(),
            reason: format!("no captions found for languages [{}]", languages.join(", ")),
        })
    }
}

/// Map a yt-dlp error line to an error kind.
fn classify_failure(video_id: &str, reason: &str) -> TranscriptError {
    let lower = reason.to_lowercase();
    let unavailable = ["video unavailable", "private video", "subtitles are disabled", "no subtitles"]
        .iter()
        .any(|marker| lower.contains(marker));

    if unavailable {
        TranscriptError::TranscriptUnavailable {
            video_id: video_id.to_string(),
            reason: reason.to_string(),
        }
    } else {
        TranscriptError::ToolFailed(format!("yt-dlp failed for {}: {}", video_id, reason))
    }
}

fn first_vtt_file(dir: &Path) -> Result<Option<PathBuf>> {
    let mut found: Vec<PathBuf> = std::fs::read_dir(dir)?
        .flatten()
        .map(|entry| entry.path())
        .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("vtt"))
        .collect();
    found.sort();
    Ok(found.into_iter().next())
}
