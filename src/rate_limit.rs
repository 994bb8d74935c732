//! Sliding-window rate limiting for inbound requests.

use crate::error::{Result, TranscriptError};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::time::{Duration, Instant};
use tracing::warn;

/// Length of the sliding window.
const WINDOW: Duration = Duration::from_secs(60);

/// Admits at most `limit_per_minute` requests in any trailing 60-second window.
pub struct RateLimiter {
    limit_per_minute: u32,
    window: Mutex<VecDeque<Instant>>,
}

impl RateLimiter {
    pub fn new(limit_per_minute: u32) -> Self {
        Self {
            limit_per_minute,
            window: Mutex::new(VecDeque::new()),
        }
    }

    /// Admit one unit of work, or fail with `RateLimitExceeded`.
    ///
    /// A rejected attempt is not recorded.
    pub fn check(&self) -> Result<()> {
        self.check_at(Instant::now())
    }

    pub(crate) fn check_at(&self, now: Instant) -> Result<()> {
        let mut window = self.window.lock();
        prune(&mut window, now);

        if window.len() >= self.limit_per_minute as usize {
            warn!(limit = self.limit_per_minute, "Rate limit exceeded");
            return Err(TranscriptError::RateLimitExceeded {
                limit: self.limit_per_minute,
            });
        }

        window.push_back(now);
        Ok(())
    }

    /// Number of admitted requests currently inside the window.
    pub fn in_window(&self) -> usize {
        let mut window = self.window.lock();
        prune(&mut window, Instant::now());
        window.len()
    }

    pub fn limit_per_minute(&self) -> u32 {
        self.limit_per_minute
    }
}

/// Timestamps are non-decreasing, so trimming from the front is enough.
fn prune(window: &mut VecDeque<Instant>, now: Instant) {
    while let Some(oldest) = window.front() {
        if now.saturating_duration_since(*oldest) > WINDOW {
            window.pop_front();
        } else {
            break;
        }
    }
}
