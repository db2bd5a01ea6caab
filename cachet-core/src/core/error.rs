use thiserror::Error;

/// Failure reported by a `DataSource` implementation
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Backing store error in {operation}: {message}")]
pub struct BackingStoreError {
    pub operation: String,
    pub message: String,
}

impl BackingStoreError {
    pub fn new(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            message: message.into(),
        }
    }
}

/// Errors raised by a Cache Store backend
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Cache store unavailable: {0}")]
    Unavailable(String),

    #[error("Memory limit exceeded")]
    MemoryLimitExceeded,

    #[error("Key not found: {0}")]
    KeyNotFound(String),

    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),
}

/// Main error type for engine operations
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    BackingStore(#[from] BackingStoreError),

    #[error("Cache store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Strategy {strategy} does not support {kind} operations")]
    UnsupportedOperation { strategy: String, kind: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl CacheError {
    /// True when the error originated in the DataSource
    pub fn is_backing_store(&self) -> bool {
        matches!(self, Self::BackingStore(_))
    }
}

impl From<StoreError> for CacheError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::InvalidPattern(pattern) => {
                Self::InvalidArgument(format!("invalid pattern: {}", pattern))
            }
            other => Self::StoreUnavailable(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for CacheError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, CacheError>;

/// Result type alias for Cache Store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;
