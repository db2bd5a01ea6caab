// Configuration Module Tests
// Tests for EngineConfig, loading, defaults, and conversions

use cachet_core::{CacheError, EngineConfig, Strategy};
use std::fs;

#[test]
fn test_config_default_values() {
    let config = EngineConfig::default();

    // Strategy defaults
    assert_eq!(config.strategies.cache_aside_ttl_secs, 300);
    assert_eq!(config.strategies.smart_hot_ttl_secs, 600);
    assert_eq!(config.strategies.smart_cold_ttl_secs, 300);
    assert_eq!(config.strategies.hotness_window_secs, 3600);
    assert_eq!(config.strategies.write_through_ttl_secs, 600);
    assert_eq!(config.strategies.write_behind_ttl_secs, 1800);
    assert_eq!(config.strategies.default_strategy, Strategy::Hybrid);

    // Store defaults
    assert_eq!(config.store.max_memory_mb, 512);
    assert_eq!(config.store.ttl_cleanup_interval_ms, 1000);

    // Logging defaults
    assert_eq!(config.logging.level, "info");
    assert_eq!(config.logging.format, "json");
}

#[test]
fn test_config_conversions() {
    let config = EngineConfig::default();

    let store_config = config.to_store_config();
    assert_eq!(store_config.max_memory_mb, 512);
    assert_eq!(store_config.ttl_cleanup_interval_ms, 1000);

    let ttls = config.ttl_policy();
    assert_eq!(ttls.cache_aside_secs, 300);
    assert_eq!(ttls.hot_secs, 600);
    assert_eq!(ttls.cold_secs, 300);
    assert_eq!(ttls.write_behind_secs, 1800);
}

#[test]
fn test_config_from_file() {
    let temp_config = r#"
strategies:
  cache_aside_ttl_secs: 120
  smart_hot_ttl_secs: 900
  smart_cold_ttl_secs: 60
  hotness_window_secs: 600
  write_through_ttl_secs: 300
  write_behind_ttl_secs: 900
  default_strategy: smart_ttl

store:
  max_memory_mb: 64
  ttl_cleanup_interval_ms: 250

logging:
  level: "debug"
  format: "pretty"
"#;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cachet.yml");
    fs::write(&path, temp_config).unwrap();

    let config = EngineConfig::from_file(&path).unwrap();

    assert_eq!(config.strategies.cache_aside_ttl_secs, 120);
    assert_eq!(config.strategies.default_strategy, Strategy::SmartTtl);
    assert_eq!(config.ttl_policy().hot_secs, 900);
    assert_eq!(config.ttl_policy().cold_secs, 60);
    assert_eq!(config.store.max_memory_mb, 64);
    assert_eq!(config.logging.level, "debug");
    assert!(!config.logging.is_json());
}

#[test]
fn test_config_from_file_rejects_invalid_values() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.yml");
    fs::write(
        &path,
        "strategies:\n  smart_hot_ttl_secs: 100\n  smart_cold_ttl_secs: 200\n",
    )
    .unwrap();

    let err = EngineConfig::from_file(&path).unwrap_err();
    assert!(matches!(err, CacheError::Config(_)));
}

#[test]
fn test_config_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let result = EngineConfig::from_file(dir.path().join("missing.yml"));
    assert!(matches!(result, Err(CacheError::Config(_))));
}

#[test]
fn test_config_malformed_yaml() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.yml");
    fs::write(&path, "strategies: [unclosed").unwrap();

    assert!(EngineConfig::from_file(&path).is_err());
}
