//! Smart-TTL: cache-aside with a TTL picked from key hotness.
//!
//! Keys read within the hotness window are stored for `hot_secs`, everything
//! else for `cold_secs`. Each hit refreshes the key's marker.

use async_trait::async_trait;

use super::Strategy;
use super::StrategyContext;
use super::cache_aside::{CacheAside, TtlPolicy};
use crate::keys::CacheKey;

#[derive(Debug, Clone, Copy, Default)]
pub struct AdaptiveTtl;

#[async_trait]
impl TtlPolicy for AdaptiveTtl {
    fn strategy(&self) -> Strategy {
        Strategy::SmartTtl
    }

    async fn ttl_for(&self, ctx: &StrategyContext, key: &CacheKey) -> u64 {
        if ctx.hotness.is_hot(key).await {
            ctx.ttls.hot_secs
        } else {
            ctx.ttls.cold_secs
        }
    }

    async fn on_hit(&self, ctx: &StrategyContext, key: &CacheKey) {
        ctx.hotness.mark(key).await;
    }
}

pub type SmartTtl = CacheAside<AdaptiveTtl>;

impl CacheAside<AdaptiveTtl> {
    pub fn adaptive() -> Self {
        Self::with_policy(AdaptiveTtl)
    }
}
