//! In-crate test doubles shared by the strategy unit tests.

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::core::error::{BackingStoreError, StoreError, StoreResult};
use crate::core::types::StoreStats;
use crate::datasource::DataSource;
use crate::keys::{KeyBuilder, Scalar};
use crate::stats::StatsCollector;
use crate::store::CacheStore;
use crate::strategy::{StrategyContext, TtlSettings};

/// DataSource answering from a fixed table and counting calls
#[derive(Default)]
pub struct CountingSource {
    pub rows: RwLock<HashMap<String, Value>>,
    pub fetches: AtomicUsize,
    pub mutations: AtomicUsize,
    pub delay: Option<Duration>,
    pub fail: bool,
}

impl CountingSource {
    pub fn with_row(operation_id: &str, args: &[Scalar], value: Value) -> Self {
        let source = Self::default();
        source.insert(operation_id, args, value);
        source
    }

    pub fn insert(&self, operation_id: &str, args: &[Scalar], value: Value) {
        let key = KeyBuilder::new().build(operation_id, args).unwrap();
        self.rows.write().insert(key.into_string(), value);
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn mutation_count(&self) -> usize {
        self.mutations.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DataSource for CountingSource {
    async fn fetch(
        &self,
        operation_id: &str,
        args: &[Scalar],
    ) -> Result<Option<Value>, BackingStoreError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail {
            return Err(BackingStoreError::new(operation_id, "database offline"));
        }
        let key = KeyBuilder::new().build(operation_id, args).unwrap();
        Ok(self.rows.read().get(key.as_str()).cloned())
    }

    async fn mutate(
        &self,
        operation_id: &str,
        args: &[Scalar],
    ) -> Result<Value, BackingStoreError> {
        self.mutations.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(BackingStoreError::new(operation_id, "database offline"));
        }
        Ok(serde_json::json!({ "op": operation_id, "args": args }))
    }
}

/// Cache store that is always down
pub struct DownStore;

#[async_trait]
impl CacheStore for DownStore {
    async fn get(&self, _key: &str) -> StoreResult<Option<Vec<u8>>> {
        Err(StoreError::Unavailable("connection refused".into()))
    }

    async fn set_with_ttl(&self, _key: &str, _value: Vec<u8>, _ttl: u64) -> StoreResult<()> {
        Err(StoreError::Unavailable("connection refused".into()))
    }

    async fn delete(&self, _key: &str) -> StoreResult<bool> {
        Err(StoreError::Unavailable("connection refused".into()))
    }

    async fn delete_matching(&self, _pattern: &str) -> StoreResult<usize> {
        Err(StoreError::Unavailable("connection refused".into()))
    }

    async fn flush(&self) -> StoreResult<usize> {
        Err(StoreError::Unavailable("connection refused".into()))
    }

    async fn ttl(&self, _key: &str) -> StoreResult<Option<u64>> {
        Err(StoreError::Unavailable("connection refused".into()))
    }

    async fn stats(&self) -> StoreResult<StoreStats> {
        Err(StoreError::Unavailable("connection refused".into()))
    }
}

pub fn context(store: Arc<dyn CacheStore>, source: Arc<dyn DataSource>) -> StrategyContext {
    StrategyContext::new(
        store,
        source,
        Arc::new(StatsCollector::new()),
        TtlSettings::default(),
    )
}
