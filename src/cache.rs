//! In-memory transcript cache with a size bound and TTL.
//!
//! Entries are keyed by `(video_id, language)`. At capacity, expired entries
//! are purged first and the least-recently-used live entry is evicted after
//! that. Nothing is persisted.

use crate::transcript::TranscriptResult;
use lru::LruCache;
use parking_lot::Mutex;
use serde::Serialize;
use std::num::NonZeroUsize;
use std::time::{Duration, Instant};
use tracing::debug;

type CacheKey = (String, String);

struct CacheEntry {
    result: TranscriptResult,
    /// `None` when the TTL reaches past what `Instant` can represent.
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |at| at > now)
    }
}

struct Inner {
    entries: LruCache<CacheKey, CacheEntry>,
    hits: u64,
    misses: u64,
}

/// Snapshot of cache counters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheStats {
    pub size: usize,
    pub max_size: usize,
    pub hits: u64,
    pub misses: u64,
    /// Hit percentage rounded to one decimal.
    pub hit_rate: f64,
}

/// Bounded, time-expiring transcript cache.
pub struct TranscriptCache {
    inner: Mutex<Inner>,
    max_size: NonZeroUsize,
    ttl: Duration,
}

impl TranscriptCache {
    /// Create a cache. A `max_size` of zero is treated as one.
    pub fn new(max_size: usize, ttl: Duration) -> Self {
        let max_size = NonZeroUsize::new(max_size).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: Mutex::new(Inner {
                entries: LruCache::new(max_size),
                hits: 0,
                misses: 0,
            }),
            max_size,
            ttl,
        }
    }

    /// Look up a transcript. Expired entries count as misses.
    pub fn get(&self, video_id: &str, language: &str) -> Option<TranscriptResult> {
        self.get_at(video_id, language, Instant::now())
    }

    pub(crate) fn get_at(
        &self,
        video_id: &str,
        language: &str,
        now: Instant,
    ) -> Option<TranscriptResult> {
        let key = (video_id.to_string(), language.to_string());
        let mut inner = self.inner.lock();

        let live = match inner.entries.get(&key) {
            Some(entry) if entry.is_live(now) => Some(entry.result.clone()),
            Some(_) => {
                inner.entries.pop(&key);
                None
            }
            None => None,
        };

        if live.is_some() {
            inner.hits += 1;
        } else {
            inner.misses += 1;
        }
        live
    }

    /// Insert or overwrite a transcript, resetting its TTL.
    pub fn set(&self, video_id: &str, language: &str, result: TranscriptResult) {
        self.set_at(video_id, language, result, Instant::now());
    }

    pub(crate) fn set_at(
        &self,
        video_id: &str,
        language: &str,
        result: TranscriptResult,
        now: Instant,
    ) {
        let key = (video_id.to_string(), language.to_string());
        let mut inner = self.inner.lock();

        if !inner.entries.contains(&key) && inner.entries.len() >= self.max_size.get() {
            purge_expired(&mut inner.entries, now);
        }

        let entry = CacheEntry {
            result,
            expires_at: now.checked_add(self.ttl),
        };
        if let Some((evicted, _)) = inner.entries.push(key.clone(), entry) {
            if evicted != key {
                debug!(video_id = %evicted.0, language = %evicted.1, "Evicted cache entry");
            }
        }
    }

    /// Current counters. Expired entries are purged before counting.
    pub fn stats(&self) -> CacheStats {
        self.stats_at(Instant::now())
    }

    pub(crate) fn stats_at(&self, now: Instant) -> CacheStats {
        let mut inner = self.inner.lock();
        purge_expired(&mut inner.entries, now);

        let lookups = (inner.hits + inner.misses).max(1);
        let hit_rate = (inner.hits as f64 / lookups as f64 * 1000.0).round() / 10.0;

        CacheStats {
            size: inner.entries.len(),
            max_size: self.max_size.get(),
            hits: inner.hits,
            misses: inner.misses,
            hit_rate,
        }
    }
}

fn purge_expired(entries: &mut LruCache<CacheKey, CacheEntry>, now: Instant) {
    let expired: Vec<CacheKey> = entries
        .iter()
        .filter(|(_, entry)| !entry.is_live(now))
        .map(|(key, _)| key.clone())
        .collect();

    for key in expired {
        entries.pop(&key);
    }
}
