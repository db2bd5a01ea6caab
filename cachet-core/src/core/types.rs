use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Longest TTL a store entry can carry (ten years); larger requests are clamped
pub const MAX_TTL_SECS: u64 = 10 * 365 * 24 * 60 * 60;

/// Cache entry held by the store: encoded bytes plus an absolute expiry
#[derive(Debug, Clone)]
pub struct StoredValue {
    /// Encoded payload
    pub data: Vec<u8>,
    /// Instant after which the entry must be treated as absent
    pub expires_at: Instant,
    /// When the value was written
    pub created_at: Instant,
}

impl StoredValue {
    /// Create a new stored value that lives for `ttl_secs`, at most [`MAX_TTL_SECS`]
    pub fn new(data: Vec<u8>, ttl_secs: u64) -> Self {
        let now = Instant::now();
        let ttl = Duration::from_secs(ttl_secs.min(MAX_TTL_SECS));
        Self {
            data,
            expires_at: now.checked_add(ttl).unwrap_or(now + Duration::from_secs(86_400)),
            created_at: now,
        }
    }

    /// Check if the value has expired
    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }

    /// Get remaining TTL in whole seconds (0 once expired)
    pub fn remaining_ttl_secs(&self) -> u64 {
        self.expires_at
            .saturating_duration_since(Instant::now())
            .as_secs()
    }
}

/// Configuration for the in-process cache store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Maximum memory in MB
    pub max_memory_mb: usize,
    /// TTL cleanup interval in milliseconds
    pub ttl_cleanup_interval_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_memory_mb: 512,
            ttl_cleanup_interval_ms: 1000,
        }
    }
}

/// Store-level counters, the equivalent of a keyspace INFO section
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct StoreStats {
    /// Total number of live keys
    pub total_keys: usize,
    /// Estimated memory usage in bytes
    pub total_memory_bytes: usize,
    /// Number of GET operations
    pub gets: u64,
    /// Number of SET operations
    pub sets: u64,
    /// Number of keys deleted (explicit or pattern)
    pub dels: u64,
    /// Number of keyspace hits
    pub hits: u64,
    /// Number of keyspace misses
    pub misses: u64,
}

impl StoreStats {
    /// Calculate hit rate
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
