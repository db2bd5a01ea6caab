//! Write-through: call the source unconditionally, then overwrite the cache.
//!
//! The cache is never consulted first, so the entry is fresh as soon as the
//! call returns; a not-found result evicts whatever was cached before.
//! Callers always pay the source latency.

use async_trait::async_trait;
use tracing::info;

use super::{CachingStrategy, OperationCall, Outcome, Strategy, StrategyContext};
use crate::core::error::Result;
use crate::datasource::OperationKind;
use crate::metrics;

#[derive(Debug, Clone, Copy, Default)]
pub struct WriteThrough;

#[async_trait]
impl CachingStrategy for WriteThrough {
    fn strategy(&self) -> Strategy {
        Strategy::WriteThrough
    }

    fn supports(&self, _kind: OperationKind) -> bool {
        true
    }

    async fn execute(&self, ctx: &StrategyContext, call: OperationCall) -> Result<Outcome> {
        let loaded = match ctx.call_source(Strategy::WriteThrough, &call).await {
            Ok(loaded) => loaded,
            Err(e) => {
                metrics::record_invocation(Strategy::WriteThrough.as_str(), "error");
                return Err(e);
            }
        };
        metrics::record_invocation(Strategy::WriteThrough.as_str(), "bypass");

        match &loaded {
            Some(value) => {
                if ctx
                    .store_value(&call.key, value, ctx.ttls.write_through_secs)
                    .await
                {
                    info!("Write-through cache set: {}", call.key);
                }
            }
            None => ctx.evict(&call.key).await,
        }

        Ok(loaded.map_or(Outcome::NotFound, Outcome::Value))
    }
}
