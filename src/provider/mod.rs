//! Transcript provider abstraction.
//!
//! A provider turns a video ID into a [`TranscriptResult`]. Two variants ship
//! with the crate: [`LocalExtractionProvider`] runs a caption extractor on the
//! blocking thread pool, and [`RemoteServiceProvider`] talks to an HTTP
//! transcript backend.

mod local;
mod remote;
mod vtt;

pub use local::{CaptionExtractor, ExtractedCaptions, LocalExtractionProvider, YtDlpExtractor};
pub use remote::RemoteServiceProvider;
pub use vtt::parse_vtt;

use crate::config::{ProviderMode, Settings};
use crate::error::{ErrorKind, Result, TranscriptError};
use crate::transcript::TranscriptResult;
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// A failure confined to one slot of a batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemError {
    /// The video ID, or the raw input when it could not be parsed.
    pub video_id: String,
    #[serde(skip)]
    pub kind: ErrorKind,
    pub message: String,
}

impl ItemError {
    pub fn new(video_id: impl Into<String>, kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            video_id: video_id.into(),
            kind,
            message: message.into(),
        }
    }

    pub fn from_error(video_id: impl Into<String>, err: &TranscriptError) -> Self {
        Self::new(video_id, err.kind(), err.to_string())
    }
}

impl std::fmt::Display for ItemError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Outcome of one slot in a batch fetch.
pub type BatchResult = std::result::Result<TranscriptResult, ItemError>;

/// Trait for transcript sources.
#[async_trait]
pub trait TranscriptProvider: Send + Sync {
    /// Short name for logs and diagnostics.
    fn name(&self) -> &'static str;

    /// Fetch the transcript of a single video.
    async fn fetch_one(&self, video_id: &str, language: &str) -> Result<TranscriptResult>;

    /// Fetch several transcripts. The returned vector has one entry per input,
    /// in input order; a failing video never aborts the others.
    async fn fetch_batch(&self, video_ids: &[String], language: &str) -> Result<Vec<BatchResult>> {
        Ok(sequential_batch(self, video_ids, language).await)
    }

    /// Release held resources. Safe to call more than once.
    async fn close(&self);
}

/// Fetch each video in turn with `fetch_one`, wrapping failures per item.
pub async fn sequential_batch<P>(provider: &P, video_ids: &[String], language: &str) -> Vec<BatchResult>
where
    P: TranscriptProvider + ?Sized,
{
    let mut results = Vec::with_capacity(video_ids.len());
    for video_id in video_ids {
        let outcome = provider
            .fetch_one(video_id, language)
            .await
            .map_err(|e| ItemError::from_error(video_id.as_str(), &e));
        results.push(outcome);
    }
    results
}

/// Create the provider selected by the configuration.
pub fn create_provider(settings: &Settings) -> Result<Arc<dyn TranscriptProvider>> {
    match settings.provider.mode {
        ProviderMode::Local => {
            info!("Local extraction mode");
            Ok(Arc::new(LocalExtractionProvider::new(Arc::new(YtDlpExtractor::new()))))
        }
        ProviderMode::Remote => {
            info!("Remote mode: {}", settings.provider.backend_url);
            let provider = RemoteServiceProvider::with_config(
                &settings.provider.backend_url,
                settings.provider.backend_api_key.as_deref(),
                Duration::from_secs(settings.provider.timeout_seconds),
            )?;
            Ok(Arc::new(provider))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::Segment;

    struct FlakyProvider;

    #[async_trait]
    impl TranscriptProvider for FlakyProvider {
        fn name(&self) -> &'static str {
            "flaky"
        }

        async fn fetch_one(&self, video_id: &str, language: &str) -> Result<TranscriptResult> {
            if video_id.starts_with("bad") {
                return Err(TranscriptError::TranscriptUnavailable {
                    video_id: video_id.to_string(),
                    reason: "captions disabled".to_string(),
                });
            }
            Ok(TranscriptResult::from_segments(
                video_id,
                language,
                false,
                vec![Segment::new("hi", 0.0, 1.0)],
                "test",
            ))
        }

        async fn close(&self) {}
    }

    #[tokio::test]
    async fn test_default_batch_isolates_failures() {
        let ids = vec![
            "good1______".to_string(),
            "bad________".to_string(),
            "good2______".to_string(),
        ];

        let results = FlakyProvider.fetch_batch(&ids, "en").await.unwrap();

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_ref().unwrap().video_id, "good1______");
        let err = results[1].as_ref().unwrap_err();
        assert_eq!(err.video_id, "bad________");
        assert_eq!(err.kind, ErrorKind::Unavailable);
        assert!(err.message.contains("captions disabled"));
        assert_eq!(results[2].as_ref().unwrap().video_id, "good2______");
    }

    #[tokio::test]
    async fn test_default_batch_empty_input() {
        let results = FlakyProvider.fetch_batch(&[], "en").await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_create_remote_provider() {
        let mut settings = Settings::default();
        settings.provider.mode = ProviderMode::Remote;
        let provider = create_provider(&settings).unwrap();
        assert_eq!(provider.name(), "remote");
    }

    #[test]
    fn test_create_local_provider() {
        let provider = create_provider(&Settings::default()).unwrap();
        assert_eq!(provider.name(), "local");
    }
}
