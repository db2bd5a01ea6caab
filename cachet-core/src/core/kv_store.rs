use super::error::{StoreError, StoreResult};
use super::pattern::GlobPattern;
use super::types::{StoreConfig, StoreStats, StoredValue};
use crate::store::CacheStore;
use async_trait::async_trait;
use parking_lot::RwLock;
use radix_trie::{Trie, TrieCommon};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// In-process cache store backed by a radix trie, with per-key TTL
#[derive(Clone)]
pub struct MemoryStore {
    data: Arc<RwLock<Trie<String, StoredValue>>>,
    stats: Arc<RwLock<StoreStats>>,
    config: StoreConfig,
}

impl MemoryStore {
    /// Create a new store with the given configuration
    pub fn new(config: StoreConfig) -> Self {
        info!(
            "Initializing cache store with max_memory={}MB, ttl_cleanup={}ms",
            config.max_memory_mb, config.ttl_cleanup_interval_ms
        );

        Self {
            data: Arc::new(RwLock::new(Trie::new())),
            stats: Arc::new(RwLock::new(StoreStats::default())),
            config,
        }
    }

    /// Start background TTL cleanup task
    pub fn start_ttl_cleanup(&self) -> tokio::task::JoinHandle<()> {
        let interval_ms = self.config.ttl_cleanup_interval_ms.max(1);
        info!("Starting TTL cleanup task (interval={}ms)", interval_ms);

        let store = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_millis(interval_ms));

            loop {
                interval.tick().await;
                store.cleanup_expired();
            }
        })
    }

    /// Check if a live key exists
    pub fn exists(&self, key: &str) -> bool {
        self.data
            .read()
            .get(key)
            .is_some_and(|value| !value.is_expired())
    }

    /// List live keys with an optional prefix
    pub fn scan(&self, prefix: Option<&str>, limit: usize) -> Vec<String> {
        let data = self.data.read();
        let live = |(k, v): (&String, &StoredValue)| (!v.is_expired()).then(|| k.clone());

        match prefix {
            Some(prefix) => data
                .get_raw_descendant(prefix)
                .map(|subtrie| {
                    subtrie
                        .iter()
                        .filter_map(live)
                        .filter(|k| k.starts_with(prefix))
                        .take(limit)
                        .collect()
                })
                .unwrap_or_default(),
            None => data.iter().filter_map(live).take(limit).collect(),
        }
    }

    /// Clean up expired keys, returning how many were dropped
    pub fn cleanup_expired(&self) -> usize {
        let mut data = self.data.write();
        let mut stats = self.stats.write();

        let expired: Vec<(String, usize)> = data
            .iter()
            .filter(|(_, v)| v.is_expired())
            .map(|(k, v)| (k.clone(), Self::estimate_entry_size(k, v)))
            .collect();

        let count = expired.len();
        if count > 0 {
            debug!("Cleaning up {} expired keys", count);
            for (key, size) in expired {
                data.remove(&key);
                stats.total_memory_bytes = stats.total_memory_bytes.saturating_sub(size);
            }
            stats.total_keys = stats.total_keys.saturating_sub(count);
        }

        count
    }

    /// Estimate memory size of an entry
    fn estimate_entry_size(key: &str, value: &StoredValue) -> usize {
        key.len() + value.data.len() + std::mem::size_of::<StoredValue>()
    }

    /// Remove keys under an already-held lock, counting only live ones
    fn remove_keys(
        data: &mut Trie<String, StoredValue>,
        stats: &mut StoreStats,
        keys: Vec<String>,
    ) -> usize {
        let mut removed_live = 0;
        for key in keys {
            if let Some(old) = data.remove(&key) {
                stats.total_keys = stats.total_keys.saturating_sub(1);
                stats.total_memory_bytes = stats
                    .total_memory_bytes
                    .saturating_sub(Self::estimate_entry_size(&key, &old));
                if !old.is_expired() {
                    removed_live += 1;
                }
            }
        }
        stats.dels += removed_live as u64;
        removed_live
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(StoreConfig::default())
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        let mut data = self.data.write();
        let mut stats = self.stats.write();
        stats.gets += 1;

        let expired = match data.get(key) {
            Some(value) if !value.is_expired() => {
                stats.hits += 1;
                return Ok(Some(value.data.clone()));
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            debug!("Key expired: {}", key);
            if let Some(old) = data.remove(key) {
                stats.total_keys = stats.total_keys.saturating_sub(1);
                stats.total_memory_bytes = stats
                    .total_memory_bytes
                    .saturating_sub(Self::estimate_entry_size(key, &old));
            }
        }
        stats.misses += 1;
        Ok(None)
    }

    async fn set_with_ttl(&self, key: &str, value: Vec<u8>, ttl_secs: u64) -> StoreResult<()> {
        debug!("SET key={}, size={}, ttl={}", key, value.len(), ttl_secs);

        let stored = StoredValue::new(value, ttl_secs);
        let entry_size = Self::estimate_entry_size(key, &stored);

        let mut data = self.data.write();
        let mut stats = self.stats.write();

        let replaced_size = data
            .get(key)
            .map(|old| Self::estimate_entry_size(key, old))
            .unwrap_or(0);

        let max_bytes = self.config.max_memory_mb.saturating_mul(1024 * 1024);
        let projected = stats.total_memory_bytes.saturating_sub(replaced_size) + entry_size;
        if projected > max_bytes {
            warn!(
                "Memory limit exceeded: {}/{}",
                stats.total_memory_bytes, max_bytes
            );
            return Err(StoreError::MemoryLimitExceeded);
        }

        let is_new = data.insert(key.to_string(), stored).is_none();
        stats.sets += 1;
        stats.total_memory_bytes = projected;
        if is_new {
            stats.total_keys += 1;
        }

        Ok(())
    }

    async fn delete(&self, key: &str) -> StoreResult<bool> {
        debug!("DELETE key={}", key);

        let mut data = self.data.write();
        let mut stats = self.stats.write();
        Ok(Self::remove_keys(&mut data, &mut stats, vec![key.to_string()]) == 1)
    }

    async fn delete_matching(&self, pattern: &str) -> StoreResult<usize> {
        let glob = GlobPattern::compile(pattern)?;
        let prefix = glob.literal_prefix();

        let mut data = self.data.write();
        let mut stats = self.stats.write();

        let candidates: Vec<String> = if prefix.is_empty() {
            data.keys().filter(|k| glob.matches(k)).cloned().collect()
        } else {
            data.get_raw_descendant(&prefix)
                .map(|subtrie| {
                    subtrie
                        .keys()
                        .filter(|k| glob.matches(k))
                        .cloned()
                        .collect()
                })
                .unwrap_or_default()
        };

        let removed = Self::remove_keys(&mut data, &mut stats, candidates);
        debug!("DELETE pattern={} removed={}", pattern, removed);
        Ok(removed)
    }

    async fn flush(&self) -> StoreResult<usize> {
        let mut data = self.data.write();
        let mut stats = self.stats.write();

        let live = data.values().filter(|v| !v.is_expired()).count();
        *data = Trie::new();
        stats.total_keys = 0;
        stats.total_memory_bytes = 0;

        info!("FLUSH removed {} keys", live);
        Ok(live)
    }

    async fn ttl(&self, key: &str) -> StoreResult<Option<u64>> {
        let data = self.data.read();
        Ok(data
            .get(key)
            .filter(|value| !value.is_expired())
            .map(StoredValue::remaining_ttl_secs))
    }

    async fn stats(&self) -> StoreResult<StoreStats> {
        Ok(self.stats.read().clone())
    }
}
