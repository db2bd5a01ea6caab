//! Backing store contract.
//!
//! The engine never retries; latency, durability and retry policy belong to
//! the implementation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::core::error::BackingStoreError;
use crate::keys::Scalar;

/// Which DataSource entry point a cached operation wraps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    /// `DataSource::fetch`
    Read,
    /// `DataSource::mutate`
    Write,
}

impl OperationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Read => "read",
            OperationKind::Write => "write",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[async_trait]
pub trait DataSource: Send + Sync {
    /// Look up a result; `Ok(None)` means the backing store has nothing for these arguments
    async fn fetch(
        &self,
        operation_id: &str,
        args: &[Scalar],
    ) -> Result<Option<Value>, BackingStoreError>;

    /// Apply a change and return the resulting value
    async fn mutate(&self, operation_id: &str, args: &[Scalar])
    -> Result<Value, BackingStoreError>;
}
