//! Query engine: cache-then-provider retrieval and transcript queries.
//!
//! The engine is built once per process and shared as `Arc<QueryEngine>` by
//! the CLI and the MCP server. It owns the rate limiter, the cache and the
//! active provider.

mod chunk;
mod responses;
mod search;

pub use chunk::{chunk, TimeChunk};
pub use search::{search, MatchGroup};

use crate::cache::{CacheStats, TranscriptCache};
use crate::config::Settings;
use crate::error::{ErrorKind, Result, TranscriptError};
use crate::provider::{create_provider, BatchResult, ItemError, TranscriptProvider};
use crate::rate_limit::RateLimiter;
use crate::transcript::TranscriptResult;
use crate::video_id::parse_video_id;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Default maximum number of videos per batch.
pub const DEFAULT_MAX_BATCH: usize = 10;

/// One slot of a batch: the raw input and its outcome.
#[derive(Debug, Clone)]
pub struct BatchEntry {
    pub input: String,
    pub outcome: BatchResult,
}

/// Entry point for every transcript query.
pub struct QueryEngine {
    provider: Arc<dyn TranscriptProvider>,
    cache: TranscriptCache,
    rate_limiter: RateLimiter,
    max_batch: usize,
}

impl QueryEngine {
    pub fn new(
        provider: Arc<dyn TranscriptProvider>,
        cache: TranscriptCache,
        rate_limiter: RateLimiter,
    ) -> Self {
        Self {
            provider,
            cache,
            rate_limiter,
            max_batch: DEFAULT_MAX_BATCH,
        }
    }

    /// Build the engine described by the settings, including its provider.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let provider = create_provider(settings)?;
        let cache = TranscriptCache::new(
            settings.cache.max_size,
            Duration::from_secs(settings.cache.ttl_seconds),
        );
        let rate_limiter = RateLimiter::new(settings.rate_limit.per_minute);

        info!(
            "Query engine ready (provider: {}, cache: {} entries, {} req/min)",
            provider.name(),
            settings.cache.max_size,
            settings.rate_limit.per_minute
        );

        Ok(Self::new(provider, cache, rate_limiter).with_max_batch(settings.query.max_batch))
    }

    pub fn with_max_batch(mut self, max_batch: usize) -> Self {
        self.max_batch = max_batch;
        self
    }

    pub fn max_batch(&self) -> usize {
        self.max_batch
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    /// Return the cached transcript, or fetch and cache it.
    ///
    /// Failures are never cached.
    #[instrument(skip(self))]
    pub async fn get_cached(&self, video_id: &str, language: &str) -> Result<TranscriptResult> {
        if let Some(hit) = self.cache.get(video_id, language) {
            debug!("Cache hit");
            return Ok(hit);
        }

        let result = self.provider.fetch_one(video_id, language).await?;
        self.cache.set(video_id, language, result.clone());
        Ok(result)
    }

    /// Fetch several videos with per-item error isolation.
    ///
    /// All cache misses go to the provider in a single `fetch_batch` call.
    /// The output has one entry per input, in input order.
    #[instrument(skip(self, inputs), fields(count = inputs.len()))]
    pub async fn batch(&self, inputs: &[String], language: &str) -> Result<Vec<BatchEntry>> {
        if inputs.len() > self.max_batch {
            return Err(TranscriptError::TooManyVideos {
                count: inputs.len(),
                max: self.max_batch,
            });
        }

        let mut slots: Vec<Option<BatchResult>> = Vec::with_capacity(inputs.len());
        let mut misses: Vec<(usize, String)> = Vec::new();

        for (slot, input) in inputs.iter().enumerate() {
            match parse_video_id(input) {
                None => slots.push(Some(Err(ItemError::new(
                    input.as_str(),
                    ErrorKind::InvalidIdentifier,
                    "Invalid URL or video ID",
                )))),
                Some(video_id) => match self.cache.get(&video_id, language) {
                    Some(hit) => slots.push(Some(Ok(hit))),
                    None => {
                        misses.push((slot, video_id));
                        slots.push(None);
                    }
                },
            }
        }

        if !misses.is_empty() {
            let ids: Vec<String> = misses.iter().map(|(_, id)| id.clone()).collect();
            debug!("Fetching {} uncached videos via {}", ids.len(), self.provider.name());

            let fetched = match self.provider.fetch_batch(&ids, language).await {
                Ok(results) => results,
                Err(e) => {
                    warn!("Batch fetch failed: {}", e);
                    ids.iter().map(|id| Err(ItemError::from_error(id.as_str(), &e))).collect()
                }
            };

            for ((slot, video_id), outcome) in misses.into_iter().zip(fetched) {
                if let Ok(result) = &outcome {
                    self.cache.set(&video_id, language, result.clone());
                }
                slots[slot] = Some(outcome);
            }
        }

        Ok(inputs
            .iter()
            .zip(slots)
            .map(|(input, slot)| BatchEntry {
                input: input.clone(),
                outcome: slot.unwrap_or_else(|| {
                    Err(ItemError::new(
                        input.as_str(),
                        ErrorKind::UpstreamTransport,
                        "missing from provider response",
                    ))
                }),
            })
            .collect())
    }

    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Release provider resources. Safe to call more than once.
    pub async fn close(&self) {
        debug!("Closing {} provider", self.provider.name());
        self.provider.close().await;
    }

    fn check_rate_limit(&self) -> Result<()> {
        self.rate_limiter.check()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::transcript::Segment;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Provider that counts calls and fails for IDs starting with "fail".
    #[derive(Default)]
    pub(crate) struct CountingProvider {
        pub one_calls: AtomicUsize,
        pub batch_calls: AtomicUsize,
        pub batch_sizes: parking_lot::Mutex<Vec<usize>>,
        pub closed: AtomicUsize,
        pub fail_whole_batch: bool,
    }

    pub(crate) fn sample_transcript(video_id: &str, language: &str) -> TranscriptResult {
        TranscriptResult::from_segments(
            video_id,
            language,
            false,
            vec![
                Segment::new("Hello world", 0.0, 2.5),
                Segment::new("this is a test", 2.5, 3.0),
                Segment::new("of the transcript", 5.5, 2.0),
                Segment::new("extraction system", 7.5, 2.5),
                Segment::new("goodbye world", 10.0, 2.0),
            ],
            "local",
        )
    }

    #[async_trait]
    impl TranscriptProvider for CountingProvider {
        fn name(&self) -> &'static str {
            "counting"
        }

        async fn fetch_one(&self, video_id: &str, language: &str) -> Result<TranscriptResult> {
            self.one_calls.fetch_add(1, Ordering::SeqCst);
            if video_id.starts_with("fail") {
                return Err(TranscriptError::TranscriptUnavailable {
                    video_id: video_id.to_string(),
                    reason: "captions disabled".to_string(),
                });
            }
            Ok(sample_transcript(video_id, language))
        }

        async fn fetch_batch(&self, video_ids: &[String], language: &str) -> Result<Vec<BatchResult>> {
            self.batch_calls.fetch_add(1, Ordering::SeqCst);
            self.batch_sizes.lock().push(video_ids.len());
            if self.fail_whole_batch {
                return Err(TranscriptError::Upstream("backend down".to_string()));
            }
            Ok(crate::provider::sequential_batch(self, video_ids, language).await)
        }

        async fn close(&self) {
            self.closed.fetch_add(1, Ordering::SeqCst);
        }
    }

    pub(crate) fn engine_with(provider: Arc<CountingProvider>, per_minute: u32) -> QueryEngine {
        QueryEngine::new(
            provider,
            TranscriptCache::new(100, Duration::from_secs(3600)),
            RateLimiter::new(per_minute),
        )
    }

    fn ids(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_get_cached_fetches_once() {
        let provider = Arc::new(CountingProvider::default());
        let engine = engine_with(provider.clone(), 30);

        let first = engine.get_cached("dQw4w9WgXcQ", "en").await.unwrap();
        let second = engine.get_cached("dQw4w9WgXcQ", "en").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(provider.one_calls.load(Ordering::SeqCst), 1);
        let stats = engine.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
    }

    #[tokio::test]
    async fn test_get_cached_language_is_part_of_key() {
        let provider = Arc::new(CountingProvider::default());
        let engine = engine_with(provider.clone(), 30);

        engine.get_cached("dQw4w9WgXcQ", "en").await.unwrap();
        engine.get_cached("dQw4w9WgXcQ", "de").await.unwrap();

        assert_eq!(provider.one_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_errors_are_not_cached() {
        let provider = Arc::new(CountingProvider::default());
        let engine = engine_with(provider.clone(), 30);

        assert!(engine.get_cached("failXXXXXXX", "en").await.is_err());
        assert!(engine.get_cached("failXXXXXXX", "en").await.is_err());

        assert_eq!(provider.one_calls.load(Ordering::SeqCst), 2);
        assert_eq!(engine.stats().size, 0);
    }

    #[tokio::test]
    async fn test_batch_preserves_order_and_isolates_failures() {
        let provider = Arc::new(CountingProvider::default());
        let engine = engine_with(provider.clone(), 30);

        let inputs = ids(&["dQw4w9WgXcQ", "not a video", "failXXXXXXX", "https://youtu.be/abcdefghijk"]);
        let entries = engine.batch(&inputs, "en").await.unwrap();

        assert_eq!(entries.len(), 4);
        for (entry, input) in entries.iter().zip(&inputs) {
            assert_eq!(&entry.input, input);
        }
        assert_eq!(entries[0].outcome.as_ref().unwrap().video_id, "dQw4w9WgXcQ");

        let invalid = entries[1].outcome.as_ref().unwrap_err();
        assert_eq!(invalid.kind, ErrorKind::InvalidIdentifier);
        assert_eq!(invalid.video_id, "not a video");

        let failed = entries[2].outcome.as_ref().unwrap_err();
        assert_eq!(failed.kind, ErrorKind::Unavailable);
        assert_eq!(failed.video_id, "failXXXXXXX");

        assert_eq!(entries[3].outcome.as_ref().unwrap().video_id, "abcdefghijk");

        // Invalid input never reaches the provider; misses go in one call.
        assert_eq!(provider.batch_calls.load(Ordering::SeqCst), 1);
        assert_eq!(*provider.batch_sizes.lock(), vec![3]);
    }

    #[tokio::test]
    async fn test_batch_uses_cache_for_known_videos() {
        let provider = Arc::new(CountingProvider::default());
        let engine = engine_with(provider.clone(), 30);

        engine.get_cached("dQw4w9WgXcQ", "en").await.unwrap();
        let entries = engine
            .batch(&ids(&["dQw4w9WgXcQ", "abcdefghijk"]), "en")
            .await
            .unwrap();

        assert!(entries.iter().all(|e| e.outcome.is_ok()));
        assert_eq!(*provider.batch_sizes.lock(), vec![1]);

        // The fetched video is now cached too.
        engine.batch(&ids(&["abcdefghijk"]), "en").await.unwrap();
        assert_eq!(provider.batch_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_batch_too_many_contacts_nothing() {
        let provider = Arc::new(CountingProvider::default());
        let engine = engine_with(provider.clone(), 30);

        let inputs: Vec<String> = (0..11).map(|i| format!("video{:06}", i)).collect();
        let err = engine.batch(&inputs, "en").await.unwrap_err();

        assert!(matches!(err, TranscriptError::TooManyVideos { count: 11, max: 10 }));
        assert_eq!(provider.batch_calls.load(Ordering::SeqCst), 0);
        assert_eq!(provider.one_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_batch_whole_call_failure_marks_every_miss() {
        let provider = Arc::new(CountingProvider {
            fail_whole_batch: true,
            ..Default::default()
        });
        let engine = engine_with(provider.clone(), 30);

        let entries = engine
            .batch(&ids(&["dQw4w9WgXcQ", "bad", "abcdefghijk"]), "en")
            .await
            .unwrap();

        assert_eq!(entries[0].outcome.as_ref().unwrap_err().kind, ErrorKind::UpstreamTransport);
        assert_eq!(entries[1].outcome.as_ref().unwrap_err().kind, ErrorKind::InvalidIdentifier);
        assert_eq!(entries[2].outcome.as_ref().unwrap_err().kind, ErrorKind::UpstreamTransport);
        assert_eq!(engine.stats().size, 0);
    }

    #[tokio::test]
    async fn test_batch_empty() {
        let provider = Arc::new(CountingProvider::default());
        let engine = engine_with(provider.clone(), 30);

        assert!(engine.batch(&[], "en").await.unwrap().is_empty());
        assert_eq!(provider.batch_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_custom_max_batch() {
        let provider = Arc::new(CountingProvider::default());
        let engine = engine_with(provider, 30).with_max_batch(2);

        let err = engine
            .batch(&ids(&["aaaaaaaaaaa", "bbbbbbbbbbb", "ccccccccccc"]), "en")
            .await
            .unwrap_err();
        assert!(matches!(err, TranscriptError::TooManyVideos { count: 3, max: 2 }));
    }

    #[tokio::test]
    async fn test_close_reaches_provider() {
        let provider = Arc::new(CountingProvider::default());
        let engine = engine_with(provider.clone(), 30);

        engine.close().await;
        engine.close().await;
        assert_eq!(provider.closed.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_from_settings_remote() {
        let mut settings = Settings::default();
        settings.provider.mode = crate::config::ProviderMode::Remote;
        settings.query.max_batch = 4;

        let engine = QueryEngine::from_settings(&settings).unwrap();
        assert_eq!(engine.provider_name(), "remote");
        assert_eq!(engine.max_batch(), 4);
        engine.close().await;
    }
}
