//! Write-behind: acknowledge immediately, load in a detached task.
//!
//! A pending placeholder is parked under the key before returning. The
//! background task overwrites it with the real result on success and removes
//! it when the source has nothing. On failure it logs and lets the placeholder
//! expire. Concurrent calls for one key each spawn their own task and the last
//! one to finish wins. The caller is never told about a background failure.

use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use super::{CachingStrategy, OperationCall, Outcome, Strategy, StrategyContext, WriteAck};
use crate::core::error::Result;
use crate::datasource::OperationKind;
use crate::metrics;

#[derive(Debug, Clone, Copy, Default)]
pub struct WriteBehind;

impl WriteBehind {
    async fn complete_in_background(ctx: StrategyContext, call: OperationCall) {
        match ctx.call_source(Strategy::WriteBehind, &call).await {
            Ok(Some(value)) => {
                if ctx
                    .store_value(&call.key, &value, ctx.ttls.write_behind_secs)
                    .await
                {
                    info!("Async update completed: {}", call.key);
                }
            }
            Ok(None) => {
                debug!("Async update for {} returned nothing", call.key);
                ctx.evict(&call.key).await;
            }
            Err(e) => {
                error!("Async update failed: {}, error: {}", call.key, e);
                metrics::record_write_behind_failure(&call.operation_id);
            }
        }
    }
}

#[async_trait]
impl CachingStrategy for WriteBehind {
    fn strategy(&self) -> Strategy {
        Strategy::WriteBehind
    }

    fn supports(&self, _kind: OperationKind) -> bool {
        true
    }

    async fn execute(&self, ctx: &StrategyContext, call: OperationCall) -> Result<Outcome> {
        let placeholder = ctx.serializer.encode_pending()?;
        let parked = ctx
            .store
            .set_with_ttl(call.key.as_str(), placeholder, ctx.ttls.write_behind_secs)
            .await;

        if let Err(e) = parked {
            // No placeholder means nothing to poll; answer synchronously instead
            warn!(
                "Cache store unavailable for write-behind {}, calling source directly: {}",
                call.key, e
            );
            metrics::record_store_degraded("set");
            let loaded = match ctx.call_source(Strategy::WriteBehind, &call).await {
                Ok(loaded) => loaded,
                Err(e) => {
                    metrics::record_invocation(Strategy::WriteBehind.as_str(), "error");
                    return Err(e);
                }
            };
            metrics::record_invocation(Strategy::WriteBehind.as_str(), "bypass");
            return Ok(loaded.map_or(Outcome::NotFound, Outcome::Value));
        }

        let ack = WriteAck::cached(call.key.clone());
        tokio::spawn(Self::complete_in_background(ctx.clone(), call));
        metrics::record_invocation(Strategy::WriteBehind.as_str(), "accepted");

        Ok(Outcome::Accepted(ack))
    }
}
