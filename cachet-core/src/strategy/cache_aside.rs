//! Cache-aside: look in the cache, fall back to the source, populate on miss.
//!
//! The TTL written on a miss comes from a [`TtlPolicy`], which is how the
//! adaptive Smart-TTL variant reuses this routine.

use async_trait::async_trait;

use super::{CachingStrategy, Lookup, OperationCall, Outcome, Strategy, StrategyContext};
use crate::core::error::Result;
use crate::keys::CacheKey;

/// Chooses the TTL for a key and reacts to hits
#[async_trait]
pub trait TtlPolicy: Send + Sync {
    /// Catalog entry the wrapping strategy reports as
    fn strategy(&self) -> Strategy;

    /// TTL to use if this lookup ends up populating the cache
    async fn ttl_for(&self, ctx: &StrategyContext, key: &CacheKey) -> u64;

    async fn on_hit(&self, _ctx: &StrategyContext, _key: &CacheKey) {}
}

/// Constant TTL (`cache_aside_secs`)
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedTtl;

#[async_trait]
impl TtlPolicy for FixedTtl {
    fn strategy(&self) -> Strategy {
        Strategy::CacheAside
    }

    async fn ttl_for(&self, ctx: &StrategyContext, _key: &CacheKey) -> u64 {
        ctx.ttls.cache_aside_secs
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CacheAside<P = FixedTtl> {
    policy: P,
}

impl CacheAside<FixedTtl> {
    pub fn fixed() -> Self {
        Self { policy: FixedTtl }
    }
}

impl<P: TtlPolicy> CacheAside<P> {
    pub fn with_policy(policy: P) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }
}

#[async_trait]
impl<P: TtlPolicy> CachingStrategy for CacheAside<P> {
    fn strategy(&self) -> Strategy {
        self.policy.strategy()
    }

    async fn execute(&self, ctx: &StrategyContext, call: OperationCall) -> Result<Outcome> {
        let strategy = self.strategy();
        let ttl = self.policy.ttl_for(ctx, &call.key).await;

        match ctx.lookup(&call.key).await {
            Lookup::Hit(entry) => {
                self.policy.on_hit(ctx, &call.key).await;
                Ok(ctx.served_from_cache(strategy, &call.key, entry))
            }
            Lookup::Miss => ctx.load_and_populate(strategy, &call, ttl, true).await,
            Lookup::Degraded => ctx.load_and_populate(strategy, &call, ttl, false).await,
        }
    }
}
