pub mod config;
pub mod core;
pub mod datasource;
pub mod engine;
pub mod hotness;
pub mod keys;
pub mod metrics;
pub mod serializer;
pub mod stats;
pub mod store;
pub mod strategy;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use config::{EngineConfig, LoggingConfig, StoreSection, StrategiesConfig};
pub use core::{
    BackingStoreError, CacheError, GlobPattern, MAX_TTL_SECS, MemoryStore, StoreConfig, StoreError,
    StoreStats,
};
pub use datasource::{DataSource, OperationKind};
pub use engine::{CacheEngine, CachedOperation};
pub use hotness::HotnessTracker;
pub use keys::{CacheKey, KeyBuilder, Scalar};
pub use serializer::{CachedEntry, Serializer};
pub use stats::{StatsCollector, StatsSnapshot};
pub use store::CacheStore;
pub use strategy::{CachingStrategy, Outcome, Strategy, TtlSettings, WriteAck};
