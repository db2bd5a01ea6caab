use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::core::{MAX_TTL_SECS, StoreConfig};
use crate::core::error::{CacheError, Result};
use crate::strategy::{Strategy, TtlSettings};

/// Main engine configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub strategies: StrategiesConfig,
    pub store: StoreSection,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategiesConfig {
    pub cache_aside_ttl_secs: u64,
    pub smart_hot_ttl_secs: u64,
    pub smart_cold_ttl_secs: u64,
    pub hotness_window_secs: u64,
    pub write_through_ttl_secs: u64,
    pub write_behind_ttl_secs: u64,
    pub default_strategy: Strategy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSection {
    pub max_memory_mb: usize,
    pub ttl_cleanup_interval_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Default for StrategiesConfig {
    fn default() -> Self {
        let ttls = TtlSettings::default();
        Self {
            cache_aside_ttl_secs: ttls.cache_aside_secs,
            smart_hot_ttl_secs: ttls.hot_secs,
            smart_cold_ttl_secs: ttls.cold_secs,
            hotness_window_secs: ttls.hotness_window_secs,
            write_through_ttl_secs: ttls.write_through_secs,
            write_behind_ttl_secs: ttls.write_behind_secs,
            default_strategy: Strategy::Hybrid,
        }
    }
}

impl Default for StoreSection {
    fn default() -> Self {
        let store = StoreConfig::default();
        Self {
            max_memory_mb: store.max_memory_mb,
            ttl_cleanup_interval_ms: store.ttl_cleanup_interval_ms,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "json".to_string(),
        }
    }
}

impl LoggingConfig {
    pub fn is_json(&self) -> bool {
        self.format == "json"
    }
}

impl EngineConfig {
    /// Load configuration from YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| CacheError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_yaml(&content)
    }

    /// Parse and validate a YAML document
    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: EngineConfig =
            serde_yaml::from_str(content).map_err(|e| CacheError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let s = &self.strategies;
        let ttls = [
            ("cache_aside_ttl_secs", s.cache_aside_ttl_secs),
            ("smart_hot_ttl_secs", s.smart_hot_ttl_secs),
            ("smart_cold_ttl_secs", s.smart_cold_ttl_secs),
            ("hotness_window_secs", s.hotness_window_secs),
            ("write_through_ttl_secs", s.write_through_ttl_secs),
            ("write_behind_ttl_secs", s.write_behind_ttl_secs),
        ];
        if let Some((name, _)) = ttls.iter().find(|(_, secs)| *secs == 0) {
            return Err(CacheError::Config(format!("{} must be greater than 0", name)));
        }
        if let Some((name, secs)) = ttls.iter().find(|(_, secs)| *secs > MAX_TTL_SECS) {
            return Err(CacheError::Config(format!(
                "{} ({}) exceeds the maximum of {}",
                name, secs, MAX_TTL_SECS
            )));
        }

        if s.smart_hot_ttl_secs <= s.smart_cold_ttl_secs {
            return Err(CacheError::Config(format!(
                "smart_hot_ttl_secs ({}) must exceed smart_cold_ttl_secs ({})",
                s.smart_hot_ttl_secs, s.smart_cold_ttl_secs
            )));
        }

        if self.store.max_memory_mb == 0 {
            return Err(CacheError::Config(
                "max_memory_mb must be greater than 0".to_string(),
            ));
        }

        match self.logging.format.as_str() {
            "json" | "pretty" => Ok(()),
            other => Err(CacheError::Config(format!(
                "unknown logging format: {}",
                other
            ))),
        }
    }

    /// Convert to StoreConfig
    pub fn to_store_config(&self) -> StoreConfig {
        StoreConfig {
            max_memory_mb: self.store.max_memory_mb,
            ttl_cleanup_interval_ms: self.store.ttl_cleanup_interval_ms,
        }
    }

    /// TTLs handed to the strategies
    pub fn ttl_policy(&self) -> TtlSettings {
        let s = &self.strategies;
        TtlSettings {
            cache_aside_secs: s.cache_aside_ttl_secs,
            hot_secs: s.smart_hot_ttl_secs,
            cold_secs: s.smart_cold_ttl_secs,
            hotness_window_secs: s.hotness_window_secs,
            write_through_secs: s.write_through_ttl_secs,
            write_behind_secs: s.write_behind_ttl_secs,
        }
    }

    pub fn default_strategy(&self) -> Strategy {
        self.strategies.default_strategy
    }
}
