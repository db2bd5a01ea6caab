//! Caching strategies
//!
//! Each strategy wraps a `DataSource` operation with a different
//! consistency/latency tradeoff:
//! - Baseline: no caching at all (control group)
//! - Cache-Aside: read-through with a fixed TTL
//! - Smart-TTL: cache-aside whose TTL follows key hotness
//! - Write-Through: always call the source, then refresh the cache
//! - Write-Behind: park a placeholder, refresh the cache in the background
//! - Hybrid: Smart-TTL semantics as a single inline routine
//!
//! A failing cache store never fails an invocation: reads degrade to a
//! forced miss and writes are skipped.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

use crate::core::error::{CacheError, Result};
use crate::datasource::{DataSource, OperationKind};
use crate::hotness::HotnessTracker;
use crate::keys::{CacheKey, Scalar};
use crate::metrics;
use crate::serializer::{CachedEntry, Serializer};
use crate::stats::StatsCollector;
use crate::store::CacheStore;

pub mod baseline;
pub mod cache_aside;
pub mod hybrid;
pub mod smart_ttl;
pub mod write_behind;
pub mod write_through;

pub use baseline::Baseline;
pub use cache_aside::{CacheAside, FixedTtl, TtlPolicy};
pub use hybrid::Hybrid;
pub use smart_ttl::{AdaptiveTtl, SmartTtl};
pub use write_behind::WriteBehind;
pub use write_through::WriteThrough;

/// Strategy catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    Baseline,
    CacheAside,
    SmartTtl,
    WriteThrough,
    WriteBehind,
    Hybrid,
}

impl Strategy {
    pub const ALL: [Strategy; 6] = [
        Strategy::Baseline,
        Strategy::CacheAside,
        Strategy::SmartTtl,
        Strategy::WriteThrough,
        Strategy::WriteBehind,
        Strategy::Hybrid,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Baseline => "baseline",
            Strategy::CacheAside => "cache_aside",
            Strategy::SmartTtl => "smart_ttl",
            Strategy::WriteThrough => "write_through",
            Strategy::WriteBehind => "write_behind",
            Strategy::Hybrid => "hybrid",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Strategy::Baseline => "No caching, every call hits the backing store",
            Strategy::CacheAside => "Cache-aside with a fixed TTL",
            Strategy::SmartTtl => "Cache-aside with hotness-adaptive TTL",
            Strategy::WriteThrough => "Always call the backing store, refresh the cache synchronously",
            Strategy::WriteBehind => "Acknowledge immediately, refresh the cache asynchronously",
            Strategy::Hybrid => "Adaptive TTL with synchronous loading on miss",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self> {
        Strategy::ALL
            .into_iter()
            .find(|strategy| strategy.as_str() == s)
            .ok_or_else(|| CacheError::InvalidArgument(format!("unknown strategy: {}", s)))
    }
}

/// Write-behind acknowledgement returned before the source has been called
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WriteAck {
    pub status: &'static str,
    pub key: CacheKey,
}

impl WriteAck {
    pub fn cached(key: CacheKey) -> Self {
        Self {
            status: "cached",
            key,
        }
    }
}

/// Result of an invocation
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Authoritative value, from the cache or freshly loaded
    Value(Value),
    /// The backing store has nothing for these arguments; nothing was cached
    NotFound,
    /// A write-behind placeholder occupies the key; the value is still loading
    Pending { key: CacheKey },
    /// Write-behind accepted the call; poll the key for the result
    Accepted(WriteAck),
}

impl Outcome {
    pub fn value(&self) -> Option<&Value> {
        match self {
            Outcome::Value(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_value(self) -> Option<Value> {
        match self {
            Outcome::Value(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Outcome::Pending { .. })
    }

    fn from_loaded(loaded: Option<Value>) -> Self {
        loaded.map_or(Outcome::NotFound, Outcome::Value)
    }
}

/// TTLs, in seconds, applied by the strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TtlSettings {
    pub cache_aside_secs: u64,
    pub hot_secs: u64,
    pub cold_secs: u64,
    pub hotness_window_secs: u64,
    pub write_through_secs: u64,
    pub write_behind_secs: u64,
}

impl Default for TtlSettings {
    fn default() -> Self {
        Self {
            cache_aside_secs: 300,
            hot_secs: 600,
            cold_secs: 300,
            hotness_window_secs: 3600,
            write_through_secs: 600,
            write_behind_secs: 1800,
        }
    }
}

/// A single invocation of a wrapped operation
#[derive(Debug, Clone)]
pub struct OperationCall {
    pub operation_id: String,
    pub args: Vec<Scalar>,
    pub kind: OperationKind,
    pub key: CacheKey,
}

/// Result of consulting the cache store for a key
#[derive(Debug)]
pub(crate) enum Lookup {
    Hit(CachedEntry),
    Miss,
    /// Store unreachable; handled as a forced miss
    Degraded,
}

/// Shared collaborators handed to every strategy
#[derive(Clone)]
pub struct StrategyContext {
    pub store: Arc<dyn CacheStore>,
    pub source: Arc<dyn DataSource>,
    pub stats: Arc<StatsCollector>,
    pub hotness: HotnessTracker,
    pub serializer: Serializer,
    pub ttls: TtlSettings,
}

impl StrategyContext {
    pub fn new(
        store: Arc<dyn CacheStore>,
        source: Arc<dyn DataSource>,
        stats: Arc<StatsCollector>,
        ttls: TtlSettings,
    ) -> Self {
        Self {
            hotness: HotnessTracker::new(Arc::clone(&store), ttls.hotness_window_secs),
            store,
            source,
            stats,
            serializer: Serializer::new(),
            ttls,
        }
    }

    pub(crate) async fn lookup(&self, key: &CacheKey) -> Lookup {
        match self.store.get(key.as_str()).await {
            Ok(Some(bytes)) => match self.serializer.decode(&bytes) {
                Ok(entry) => Lookup::Hit(entry),
                Err(e) => {
                    warn!("Discarding undecodable cache entry {}: {}", key, e);
                    Lookup::Miss
                }
            },
            Ok(None) => Lookup::Miss,
            Err(e) => {
                warn!("Cache store read failed for {}, treating as miss: {}", key, e);
                metrics::record_store_degraded("get");
                Lookup::Degraded
            }
        }
    }

    /// Write a loaded value; returns whether the cache now holds it
    pub(crate) async fn store_value(&self, key: &CacheKey, value: &Value, ttl_secs: u64) -> bool {
        let bytes = match self.serializer.encode(value) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("Skipping cache write for {}: {}", key, e);
                return false;
            }
        };

        match self.store.set_with_ttl(key.as_str(), bytes, ttl_secs).await {
            Ok(()) => {
                self.stats.record_set();
                debug!("Cache set: {}, TTL: {}s", key, ttl_secs);
                true
            }
            Err(e) => {
                warn!("Cache store write failed for {}, skipping: {}", key, e);
                metrics::record_store_degraded("set");
                false
            }
        }
    }

    /// Drop a cached entry the source no longer backs. A failing store is
    /// logged and skipped.
    pub(crate) async fn evict(&self, key: &CacheKey) {
        match self.store.delete(key.as_str()).await {
            Ok(true) => {
                self.stats.record_deletes(1);
                debug!("Cache evict: {}", key);
            }
            Ok(false) => {}
            Err(e) => {
                warn!("Cache store delete failed for {}, skipping: {}", key, e);
                metrics::record_store_degraded("delete");
            }
        }
    }

    /// Call the wrapped DataSource operation
    pub(crate) async fn call_source(
        &self,
        strategy: Strategy,
        call: &OperationCall,
    ) -> Result<Option<Value>> {
        let start = Instant::now();
        let result = match call.kind {
            OperationKind::Read => self.source.fetch(&call.operation_id, &call.args).await,
            OperationKind::Write => self
                .source
                .mutate(&call.operation_id, &call.args)
                .await
                .map(Some),
        };
        metrics::record_datasource_call(
            strategy.as_str(),
            call.kind.as_str(),
            start.elapsed().as_secs_f64(),
        );

        result.map_err(CacheError::from)
    }

    /// Hit handling shared by the read-path strategies
    pub(crate) fn served_from_cache(
        &self,
        strategy: Strategy,
        key: &CacheKey,
        entry: CachedEntry,
    ) -> Outcome {
        self.stats.record_hit();
        metrics::record_invocation(strategy.as_str(), "hit");
        debug!("Cache hit: {}", key);
        match entry {
            CachedEntry::Ready(value) => Outcome::Value(value),
            CachedEntry::Pending => Outcome::Pending { key: key.clone() },
        }
    }

    /// Miss handling shared by the read-path strategies: load, then populate.
    /// `cacheable` is false when the store already failed on the lookup.
    pub(crate) async fn load_and_populate(
        &self,
        strategy: Strategy,
        call: &OperationCall,
        ttl_secs: u64,
        cacheable: bool,
    ) -> Result<Outcome> {
        self.stats.record_miss();
        debug!("Cache miss: {}", call.key);

        let loaded = match self.call_source(strategy, call).await {
            Ok(loaded) => loaded,
            Err(e) => {
                metrics::record_invocation(strategy.as_str(), "error");
                return Err(e);
            }
        };
        metrics::record_invocation(strategy.as_str(), "miss");

        match &loaded {
            Some(value) if cacheable => {
                self.store_value(&call.key, value, ttl_secs).await;
            }
            _ => {}
        }
        Ok(Outcome::from_loaded(loaded))
    }
}

/// A caching protocol wrapped around a DataSource operation
#[async_trait]
pub trait CachingStrategy: Send + Sync {
    fn strategy(&self) -> Strategy;

    /// Whether the strategy can wrap operations of this kind
    fn supports(&self, kind: OperationKind) -> bool {
        kind == OperationKind::Read
    }

    async fn execute(&self, ctx: &StrategyContext, call: OperationCall) -> Result<Outcome>;
}

/// One instance of every strategy, resolved by catalog entry
pub struct StrategySet {
    baseline: Baseline,
    cache_aside: CacheAside<FixedTtl>,
    smart_ttl: SmartTtl,
    write_through: WriteThrough,
    write_behind: WriteBehind,
    hybrid: Hybrid,
}

impl StrategySet {
    pub fn new() -> Self {
        Self {
            baseline: Baseline,
            cache_aside: CacheAside::fixed(),
            smart_ttl: SmartTtl::adaptive(),
            write_through: WriteThrough,
            write_behind: WriteBehind,
            hybrid: Hybrid,
        }
    }

    pub fn get(&self, strategy: Strategy) -> &dyn CachingStrategy {
        match strategy {
            Strategy::Baseline => &self.baseline,
            Strategy::CacheAside => &self.cache_aside,
            Strategy::SmartTtl => &self.smart_ttl,
            Strategy::WriteThrough => &self.write_through,
            Strategy::WriteBehind => &self.write_behind,
            Strategy::Hybrid => &self.hybrid,
        }
    }
}

impl Default for StrategySet {
    fn default() -> Self {
        Self::new()
    }
}
