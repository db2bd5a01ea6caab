//! Byte encoding of cached results.
//!
//! Every stored value is wrapped in a tagged envelope so that a write-behind
//! placeholder can never be confused with a loaded value, whatever the
//! loaded value looks like.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::error::Result;

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
enum Envelope<V> {
    Ready { value: V },
    Pending,
}

/// Decoded cache entry
#[derive(Debug, Clone, PartialEq)]
pub enum CachedEntry {
    /// Loaded, authoritative value
    Ready(Value),
    /// Write-behind placeholder; the real value is still loading
    Pending,
}

/// JSON envelope codec for cache entries
#[derive(Debug, Clone, Copy, Default)]
pub struct Serializer;

impl Serializer {
    pub fn new() -> Self {
        Self
    }

    pub fn encode(&self, value: &Value) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(&Envelope::Ready { value })?)
    }

    pub fn encode_pending(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(&Envelope::<()>::Pending)?)
    }

    pub fn decode(&self, bytes: &[u8]) -> Result<CachedEntry> {
        Ok(match serde_json::from_slice::<Envelope<Value>>(bytes)? {
            Envelope::Ready { value } => CachedEntry::Ready(value),
            Envelope::Pending => CachedEntry::Pending,
        })
    }
}
