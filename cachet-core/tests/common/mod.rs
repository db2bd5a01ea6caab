// Shared helpers for the cachet-core integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use cachet_core::core::error::StoreResult;
use cachet_core::{
    BackingStoreError, CacheEngine, CacheStore, DataSource, MemoryStore, Scalar, StoreError,
    StoreStats, TtlSettings,
};
use parking_lot::{Mutex, RwLock};
use serde_json::{Value, json};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// In-memory photo catalog that counts every call it receives
#[derive(Default)]
pub struct MockCatalog {
    rows: RwLock<HashMap<(String, String), Value>>,
    fetches: AtomicUsize,
    mutations: AtomicUsize,
    delay: Option<Duration>,
}

impl MockCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Default::default()
        }
    }

    pub fn remove(&self, operation_id: &str, args: &[Scalar]) {
        self.rows
            .write()
            .remove(&(operation_id.to_string(), Self::args_key(args)));
    }

    pub fn insert(&self, operation_id: &str, args: &[Scalar], value: Value) {
        self.rows
            .write()
            .insert((operation_id.to_string(), Self::args_key(args)), value);
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn mutation_count(&self) -> usize {
        self.mutations.load(Ordering::SeqCst)
    }

    fn args_key(args: &[Scalar]) -> String {
        serde_json::to_string(args).unwrap_or_default()
    }
}

#[async_trait]
impl DataSource for MockCatalog {
    async fn fetch(
        &self,
        operation_id: &str,
        args: &[Scalar],
    ) -> Result<Option<Value>, BackingStoreError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self
            .rows
            .read()
            .get(&(operation_id.to_string(), Self::args_key(args)))
            .cloned())
    }

    async fn mutate(
        &self,
        operation_id: &str,
        args: &[Scalar],
    ) -> Result<Value, BackingStoreError> {
        self.mutations.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let value = json!({ "op": operation_id, "args": args, "ok": true });
        self.rows
            .write()
            .insert((operation_id.to_string(), Self::args_key(args)), value.clone());
        Ok(value)
    }
}

pub fn photo(id: i64, title: &str) -> Value {
    json!({ "id": id, "title": title })
}

/// Engine over a fresh MemoryStore with default TTLs
pub fn engine(catalog: Arc<MockCatalog>) -> (CacheEngine, Arc<MemoryStore>) {
    engine_with_ttls(catalog, TtlSettings::default())
}

pub fn engine_with_ttls(
    catalog: Arc<MockCatalog>,
    ttls: TtlSettings,
) -> (CacheEngine, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::default());
    let engine = CacheEngine::new(store.clone() as Arc<dyn CacheStore>, catalog, ttls);
    (engine, store)
}

/// Cache store whose backend is unreachable
pub struct UnreachableStore;

#[async_trait]
impl CacheStore for UnreachableStore {
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

/// Source that answers each successive fetch with the next scripted (delay, value)
#[derive(Default)]
pub struct ScriptedSource {
    replies: Mutex<VecDeque<(Duration, Value)>>,
    fetches: AtomicUsize,
}

impl ScriptedSource {
    pub fn new(replies: Vec<(Duration, Value)>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            fetches: AtomicUsize::new(0),
        }
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DataSource for ScriptedSource {
    async fn fetch(
        &self,
        operation_id: &str,
        _args: &[Scalar],
    ) -> Result<Option<Value>, BackingStoreError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let reply = self.replies.lock().pop_front();
        match reply {
            Some((delay, value)) => {
                tokio::time::sleep(delay).await;
                Ok(Some(value))
            }
            None => Err(BackingStoreError::new(operation_id, "script exhausted")),
        }
    }

    async fn mutate(
        &self,
        operation_id: &str,
        _args: &[Scalar],
    ) -> Result<Value, BackingStoreError> {
        Err(BackingStoreError::new(operation_id, "read-only source"))
    }
}
