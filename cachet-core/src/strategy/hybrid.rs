//! Hybrid: adaptive TTL with synchronous loading on a miss.
//!
//! Behaves like Smart-TTL but is written as one routine: check hotness, pick
//! the TTL, look the key up, and either serve it (refreshing the marker) or
//! load and populate.

use async_trait::async_trait;

use super::{CachingStrategy, Lookup, OperationCall, Outcome, Strategy, StrategyContext};
use crate::core::error::Result;

#[derive(Debug, Clone, Copy, Default)]
pub struct Hybrid;

#[async_trait]
impl CachingStrategy for Hybrid {
    fn strategy(&self) -> Strategy {
        Strategy::Hybrid
    }

    async fn execute(&self, ctx: &StrategyContext, call: OperationCall) -> Result<Outcome> {
        let ttl = if ctx.hotness.is_hot(&call.key).await {
            ctx.ttls.hot_secs
        } else {
            ctx.ttls.cold_secs
        };

        match ctx.lookup(&call.key).await {
            Lookup::Hit(entry) => {
                ctx.hotness.mark(&call.key).await;
                Ok(ctx.served_from_cache(Strategy::Hybrid, &call.key, entry))
            }
            Lookup::Miss => {
                ctx.load_and_populate(Strategy::Hybrid, &call, ttl, true)
                    .await
            }
            Lookup::Degraded => {
                ctx.load_and_populate(Strategy::Hybrid, &call, ttl, false)
                    .await
            }
        }
    }
}
