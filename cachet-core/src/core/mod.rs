pub mod error;
pub mod kv_store;
pub mod pattern;
pub mod types;

pub use error::{BackingStoreError, CacheError, StoreError};
pub use kv_store::MemoryStore;
pub use pattern::GlobPattern;
pub use types::{MAX_TTL_SECS, StoreConfig, StoreStats, StoredValue};
