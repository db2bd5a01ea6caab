//! Cache Store contract consumed by the strategy engine.
//!
//! Single-key operations are atomic; nothing here coordinates across calls.
//! Implementations report outages as [`StoreError`] and the engine degrades
//! to the backing store instead of failing the request.

use async_trait::async_trait;

use crate::core::error::StoreResult;
use crate::core::types::StoreStats;

#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Read a live entry; expired entries read as absent
    async fn get(&self, key: &str) -> StoreResult<Option<Vec<u8>>>;

    /// Insert or overwrite an entry that expires after `ttl_secs`
    async fn set_with_ttl(&self, key: &str, value: Vec<u8>, ttl_secs: u64) -> StoreResult<()>;

    /// Remove a single key, returning whether a live entry was removed
    async fn delete(&self, key: &str) -> StoreResult<bool>;

    /// Remove every live key matching a glob pattern, returning the count
    async fn delete_matching(&self, pattern: &str) -> StoreResult<usize>;

    /// Remove everything, returning the number of live keys dropped
    async fn flush(&self) -> StoreResult<usize>;

    /// Remaining lifetime of a live key in whole seconds
    async fn ttl(&self, key: &str) -> StoreResult<Option<u64>>;

    /// Store-level hit/miss counters
    async fn stats(&self) -> StoreResult<StoreStats>;
}
