//! Baseline: pass every call straight to the source.
//!
//! Used as the control group when comparing strategies. The cache store is
//! never touched and nothing is counted in the hit/miss stats.

use async_trait::async_trait;

use super::{CachingStrategy, OperationCall, Outcome, Strategy, StrategyContext};
use crate::core::error::Result;
use crate::datasource::OperationKind;
use crate::metrics;

#[derive(Debug, Clone, Copy, Default)]
pub struct Baseline;

#[async_trait]
impl CachingStrategy for Baseline {
    fn strategy(&self) -> Strategy {
        Strategy::Baseline
    }

    fn supports(&self, _kind: OperationKind) -> bool {
        true
    }

    async fn execute(&self, ctx: &StrategyContext, call: OperationCall) -> Result<Outcome> {
        let loaded = match ctx.call_source(Strategy::Baseline, &call).await {
            Ok(loaded) => loaded,
            Err(e) => {
                metrics::record_invocation(Strategy::Baseline.as_str(), "error");
                return Err(e);
            }
        };
        metrics::record_invocation(Strategy::Baseline.as_str(), "bypass");

        Ok(loaded.map_or(Outcome::NotFound, Outcome::Value))
    }
}
