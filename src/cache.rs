//! Single-slot, in-memory cache for the last successful article batch.
//!
//! There is exactly one slot regardless of how many feed owners are
//! requested through it. A successful fetch replaces the whole entry; nothing
//! is ever partially updated.

use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;
use tokio::time::Instant;

use crate::types::ArticleBatch;

/// Default freshness window (30 minutes)
pub const DEFAULT_TTL: Duration = Duration::from_secs(30 * 60);

/// The cached batch and when it was stored.
#[derive(Debug, Clone)]
pub struct CachedResult {
    pub batch: Arc<ArticleBatch>,
    /// Monotonic store time; follows tokio's clock so tests can pause it
    pub fetched_at: Instant,
}

impl CachedResult {
    pub fn age(&self) -> Duration {
        self.fetched_at.elapsed()
    }
}

/// Holds at most one [`ArticleBatch`].
///
/// The lock is only held to clone or replace the entry, never across an
/// `.await`.
#[derive(Debug)]
pub struct ArticleCache {
    slot: RwLock<Option<CachedResult>>,
    ttl: Duration,
}

impl Default for ArticleCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl ArticleCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            slot: RwLock::new(None),
            ttl,
        }
    }

    /// The cached entry regardless of age.
    pub fn get(&self) -> Option<CachedResult> {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The cached batch if it is younger than the freshness window.
    pub fn get_fresh(&self) -> Option<Arc<ArticleBatch>> {
        self.get()
            .filter(|entry| entry.age() < self.ttl)
            .map(|entry| entry.batch)
    }

    /// Replaces the slot with `batch`, stamped with the current instant.
    pub fn store(&self, batch: ArticleBatch) -> Arc<ArticleBatch> {
        let batch = Arc::new(batch);
        let entry = CachedResult {
            batch: Arc::clone(&batch),
            fetched_at: Instant::now(),
        };
        *self.slot.write().unwrap_or_else(PoisonError::into_inner) = Some(entry);
        batch
    }

    /// Empties the slot so the next lookup misses.
    pub fn clear(&self) {
        *self.slot.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}
