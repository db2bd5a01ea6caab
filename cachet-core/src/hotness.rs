//! Recency markers backing the adaptive TTL strategies.
//!
//! A marker lives in the same cache store as the data, under `hot:<key>`,
//! and simply expires; nothing deletes it explicitly. Concurrent refreshes
//! are last-writer-wins on the expiry, which is fine for an advisory flag.

use std::sync::Arc;
use tracing::{trace, warn};

use crate::keys::{CacheKey, HOTNESS_NAMESPACE};
use crate::metrics;
use crate::store::CacheStore;

const MARKER: &[u8] = b"1";

#[derive(Clone)]
pub struct HotnessTracker {
    store: Arc<dyn CacheStore>,
    window_secs: u64,
}

impl HotnessTracker {
    pub fn new(store: Arc<dyn CacheStore>, window_secs: u64) -> Self {
        Self { store, window_secs }
    }

    /// Store key of the marker for `key`
    pub fn marker_key(key: &CacheKey) -> String {
        format!("{}:{}", HOTNESS_NAMESPACE, key)
    }

    /// Whether `key` was read within the hotness window. Unreachable store reads as cold.
    pub async fn is_hot(&self, key: &CacheKey) -> bool {
        match self.store.get(&Self::marker_key(key)).await {
            Ok(marker) => marker.is_some(),
            Err(e) => {
                warn!("Hotness lookup failed for {}: {}", key, e);
                metrics::record_store_degraded("hotness_get");
                false
            }
        }
    }

    /// Create or refresh the marker for another full window
    pub async fn mark(&self, key: &CacheKey) {
        trace!("Marking {} hot for {}s", key, self.window_secs);
        if let Err(e) = self
            .store
            .set_with_ttl(&Self::marker_key(key), MARKER.to_vec(), self.window_secs)
            .await
        {
            warn!("Hotness refresh failed for {}: {}", key, e);
            metrics::record_store_degraded("hotness_set");
        }
    }

    pub fn window_secs(&self) -> u64 {
        self.window_secs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::MemoryStore;
    use crate::keys::{KeyBuilder, Scalar};

    #[tokio::test]
    async fn test_mark_then_hot() {
        let store = Arc::new(MemoryStore::default());
        let tracker = HotnessTracker::new(store.clone(), 3600);
        let key = KeyBuilder::new()
            .build("photoDetail", &[Scalar::from(42)])
            .unwrap();

        assert!(!tracker.is_hot(&key).await);
        tracker.mark(&key).await;
        assert!(tracker.is_hot(&key).await);
        assert!(store.exists("hot:photoDetail:42"));
    }

    #[tokio::test]
    async fn test_marker_expires() {
        let store = Arc::new(MemoryStore::default());
        let tracker = HotnessTracker::new(store, 1);
        let key = KeyBuilder::new().build("trending", &[]).unwrap();

        tracker.mark(&key).await;
        assert!(tracker.is_hot(&key).await);

        tokio::time::sleep(std::time::Duration::from_millis(1100)).await;
        assert!(!tracker.is_hot(&key).await);
    }
}
