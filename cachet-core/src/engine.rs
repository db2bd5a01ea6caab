//! Engine facade: one value per process, handed to every call site.
//!
//! `CacheEngine` owns the shared strategy context (store, source, stats,
//! hotness tracker) and dispatches invocations to the strategy named by the
//! caller. Invalidation and flush are operator calls; unlike invocations they
//! report a failing store to the caller.

use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::core::error::{CacheError, Result};
use crate::core::types::StoreStats;
use crate::datasource::{DataSource, OperationKind};
use crate::keys::{CacheKey, KeyBuilder, Scalar};
use crate::metrics;
use crate::serializer::CachedEntry;
use crate::stats::{StatsCollector, StatsSnapshot};
use crate::store::CacheStore;
use crate::strategy::{OperationCall, Outcome, Strategy, StrategyContext, StrategySet, TtlSettings};

pub struct CacheEngine {
    ctx: StrategyContext,
    keys: KeyBuilder,
    strategies: StrategySet,
    default_strategy: RwLock<Strategy>,
}

impl CacheEngine {
    /// Create an engine over a shared store and source
    pub fn new(store: Arc<dyn CacheStore>, source: Arc<dyn DataSource>, ttls: TtlSettings) -> Self {
        info!(
            "Cache engine ready (cache-aside {}s, hot {}s, cold {}s, window {}s)",
            ttls.cache_aside_secs, ttls.hot_secs, ttls.cold_secs, ttls.hotness_window_secs
        );
        Self {
            ctx: StrategyContext::new(store, source, Arc::new(StatsCollector::new()), ttls),
            keys: KeyBuilder::new(),
            strategies: StrategySet::new(),
            default_strategy: RwLock::new(Strategy::Hybrid),
        }
    }

    /// Create an engine from a validated configuration
    pub fn from_config(
        config: &EngineConfig,
        store: Arc<dyn CacheStore>,
        source: Arc<dyn DataSource>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(store, source, config.ttl_policy()).with_default_strategy(config.default_strategy()))
    }

    pub fn with_default_strategy(self, strategy: Strategy) -> Self {
        *self.default_strategy.write() = strategy;
        self
    }

    /// Run a read operation under `strategy`
    pub async fn invoke(
        &self,
        strategy: Strategy,
        operation_id: &str,
        args: &[Scalar],
    ) -> Result<Outcome> {
        self.execute(strategy, operation_id, OperationKind::Read, args)
            .await
    }

    /// Run a mutating operation under `strategy`
    pub async fn invoke_mutation(
        &self,
        strategy: Strategy,
        operation_id: &str,
        args: &[Scalar],
    ) -> Result<Outcome> {
        self.execute(strategy, operation_id, OperationKind::Write, args)
            .await
    }

    /// Run a read operation under the current default strategy
    pub async fn invoke_default(&self, operation_id: &str, args: &[Scalar]) -> Result<Outcome> {
        let strategy = self.current_strategy();
        self.invoke(strategy, operation_id, args).await
    }

    pub async fn execute(
        &self,
        strategy: Strategy,
        operation_id: &str,
        kind: OperationKind,
        args: &[Scalar],
    ) -> Result<Outcome> {
        let handler = self.strategies.get(strategy);
        if !handler.supports(kind) {
            return Err(CacheError::UnsupportedOperation {
                strategy: strategy.to_string(),
                kind: kind.to_string(),
            });
        }

        // Argument validation happens here, before any I/O
        let key = self.keys.build(operation_id, args)?;
        let call = OperationCall {
            operation_id: operation_id.to_string(),
            args: args.to_vec(),
            kind,
            key,
        };
        handler.execute(&self.ctx, call).await
    }

    pub fn key_for(&self, operation_id: &str, args: &[Scalar]) -> Result<CacheKey> {
        self.keys.build(operation_id, args)
    }

    /// Read what the cache holds for `key` without calling the source or
    /// touching the stats. Used to poll a write-behind acknowledgement.
    pub async fn peek(&self, key: &CacheKey) -> Result<Outcome> {
        let Some(bytes) = self.ctx.store.get(key.as_str()).await? else {
            return Ok(Outcome::NotFound);
        };
        Ok(match self.ctx.serializer.decode(&bytes)? {
            CachedEntry::Ready(value) => Outcome::Value(value),
            CachedEntry::Pending => Outcome::Pending { key: key.clone() },
        })
    }

    /// Delete every cached key matching a glob pattern
    pub async fn invalidate(&self, pattern: &str) -> Result<usize> {
        if pattern.is_empty() {
            return Err(CacheError::InvalidArgument(
                "invalidation pattern must not be empty".to_string(),
            ));
        }

        let removed = self.ctx.store.delete_matching(pattern).await?;
        self.ctx.stats.record_deletes(removed as u64);
        metrics::record_invalidated(removed);
        info!("Invalidated {} keys matching {}", removed, pattern);
        Ok(removed)
    }

    /// Empty the cache store. Stats are cumulative and left untouched.
    pub async fn flush(&self) -> Result<usize> {
        let removed = self.ctx.store.flush().await?;
        info!("Flushed {} keys", removed);
        Ok(removed)
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.ctx.stats.snapshot()
    }

    pub fn reset_stats(&self) {
        self.ctx.stats.reset();
        debug!("Stats reset");
    }

    /// Counters kept by the store itself
    pub async fn store_stats(&self) -> Result<StoreStats> {
        Ok(self.ctx.store.stats().await?)
    }

    /// Change the default strategy and flush, so entries written under the
    /// previous one are not served by the next.
    pub async fn switch_strategy(&self, strategy: Strategy) -> Result<usize> {
        let previous = std::mem::replace(&mut *self.default_strategy.write(), strategy);
        let removed = self.flush().await?;
        info!("Switched strategy {} -> {}", previous, strategy);
        Ok(removed)
    }

    pub fn current_strategy(&self) -> Strategy {
        *self.default_strategy.read()
    }

    pub fn ttl_settings(&self) -> TtlSettings {
        self.ctx.ttls
    }

    /// Flush the store before the engine goes away
    pub async fn shutdown(&self) -> Result<()> {
        let removed = self.flush().await?;
        info!("Cache engine shut down, {} keys flushed", removed);
        Ok(())
    }
}

/// An operation id bound to the strategy that wraps it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedOperation {
    pub operation_id: String,
    pub kind: OperationKind,
    pub strategy: Strategy,
}

impl CachedOperation {
    pub fn read(operation_id: impl Into<String>, strategy: Strategy) -> Self {
        Self {
            operation_id: operation_id.into(),
            kind: OperationKind::Read,
            strategy,
        }
    }

    pub fn mutation(operation_id: impl Into<String>, strategy: Strategy) -> Self {
        Self {
            operation_id: operation_id.into(),
            kind: OperationKind::Write,
            strategy,
        }
    }

    pub async fn invoke(&self, engine: &CacheEngine, args: &[Scalar]) -> Result<Outcome> {
        engine
            .execute(self.strategy, &self.operation_id, self.kind, args)
            .await
    }
}
