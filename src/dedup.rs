//! Webhook delivery deduplication cache
//!
//! Slack retries a delivery whenever the acknowledgment is slow or dropped,
//! so the same event can arrive more than once. The cache records seen
//! delivery keys with a TTL-based eviction strategy and a hard cap on
//! entries. Callers wrap it in a mutex so check-and-record is atomic under
//! concurrent redelivery.

use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Default retention window (30 minutes, beyond Slack's retry span)
const RETENTION_SECS: u64 = 1800;

/// Maximum cache entries
const MAX_ENTRIES: usize = 2000;

/// Delivery deduplication cache
#[derive(Debug)]
pub struct EventDedup {
    cache: HashMap<String, Instant>,
    ttl: Duration,
    max_entries: usize,
}

impl Default for EventDedup {
    fn default() -> Self {
        Self::with_ttl(Duration::from_secs(RETENTION_SECS))
    }
}

impl EventDedup {
    /// Create a cache with an explicit retention window.
    #[must_use]
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            cache: HashMap::new(),
            ttl,
            max_entries: MAX_ENTRIES,
        }
    }

    /// Check-and-record in one step.
    ///
    /// Returns `true` on first sight of the key within the retention window
    /// and records it. Returns `false` for a repeat. A key whose entry has
    /// expired counts as first sight again.
    pub fn should_process(&mut self, key: &str) -> bool {
        let now = Instant::now();

        // Evict expired entries when at capacity.
        if self.cache.len() >= self.max_entries {
            let ttl = self.ttl;
            self.cache.retain(|_, seen| now.duration_since(*seen) < ttl);
        }

        // Still full after the sweep: drop the oldest entry.
        if self.cache.len() >= self.max_entries {
            if let Some(oldest) = self
                .cache
                .iter()
                .min_by_key(|(_, seen)| *seen)
                .map(|(k, _)| k.clone())
            {
                self.cache.remove(&oldest);
            }
        }

        if let Some(seen) = self.cache.get(key) {
            if now.duration_since(*seen) < self.ttl {
                return false;
            }
        }

        self.cache.insert(key.to_string(), now);
        true
    }
}
