//! Integration tests for configuration loader
//!
//! Tests the end-to-end behavior of loading cache settings from files.

use std::path::PathBuf;
use std::time::Duration;

use cachegate_domain::{CacheError, LockStrategy};
use cachegate_infra::config;
use tempfile::TempDir;

/// Write `contents` to `name` inside a fresh temp dir
fn config_file(name: &str, contents: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join(name);
    std::fs::write(&path, contents).expect("Failed to write config file");
    (dir, path)
}

#[test]
fn test_load_settings_from_toml_file() {
    let (_dir, path) = config_file(
        "cachegate.toml",
        r#"
[cache]
default_expiration = 120
enable_serialization = false
key_prefix = "catalog"
enable_statistics = true
lock_strategy = "global"

[store]
max_capacity = 10000

[logging]
filter = "cachegate_core=debug,info"
json = true
"#,
    );

    let settings = config::load_from_file(Some(path)).expect("Failed to load TOML config");

    assert_eq!(settings.cache.default_expiration, Duration::from_secs(120));
    assert!(!settings.cache.enable_serialization);
    assert_eq!(settings.cache.key_prefix.as_deref(), Some("catalog"));
    assert!(settings.cache.enable_statistics);
    assert_eq!(settings.cache.lock_strategy, LockStrategy::Global);
    assert_eq!(settings.store.max_capacity, Some(10_000));
    assert_eq!(settings.logging.filter, "cachegate_core=debug,info");
    assert!(settings.logging.json);
}

#[test]
fn test_load_settings_from_json_file() {
    let (_dir, path) = config_file(
        "config.json",
        r#"{
            "cache": {
                "default_expiration": 45,
                "key_prefix": "sessions",
                "lock_strategy": "per_key"
            }
        }"#,
    );

    let settings = config::load_from_file(Some(path)).expect("Failed to load JSON config");

    assert_eq!(settings.cache.default_expiration, Duration::from_secs(45));
    assert_eq!(settings.cache.key_prefix.as_deref(), Some("sessions"));
    assert_eq!(settings.cache.lock_strategy, LockStrategy::PerKey);
    // Omitted fields keep their defaults
    assert!(settings.cache.enable_serialization);
    assert_eq!(settings.store.max_capacity, None);
    assert_eq!(settings.logging.filter, "info");
}

#[test]
fn test_empty_file_yields_defaults() {
    let (_dir, path) = config_file("cachegate.toml", "");

    let settings = config::load_from_file(Some(path)).expect("Empty TOML is valid");

    assert_eq!(settings, config::CacheSettings::default());
}

#[test]
fn test_load_settings_from_nonexistent_file() {
    let result = config::load_from_file(Some("/nonexistent/path/cachegate.toml".into()));

    match result {
        Err(CacheError::Config(msg)) => {
            assert!(msg.contains("not found"), "Error message should mention 'not found'");
        }
        other => panic!("Expected Config error, got {other:?}"),
    }
}

#[test]
fn test_load_settings_with_invalid_format() {
    let (_dir, path) = config_file("cachegate.json", r#"{ "cache": { "key_prefix": "#);

    match config::load_from_file(Some(path)) {
        Err(CacheError::Config(msg)) => {
            assert!(msg.contains("Invalid JSON"), "Error message should mention invalid JSON");
        }
        other => panic!("Expected Config error, got {other:?}"),
    }
}

/// A file that parses but holds invalid values is rejected
#[test]
fn test_load_settings_with_invalid_values() {
    let (_dir, path) = config_file("cachegate.toml", "[cache]\ndefault_expiration = 0\n");

    assert!(matches!(config::load_from_file(Some(path)), Err(CacheError::Config(_))));
}

/// `CACHEGATE_CONFIG` takes precedence over probing and the environment
#[test]
fn test_load_honours_explicit_config_path() {
    let (_dir, path) = config_file("custom-name.toml", "[cache]\nkey_prefix = \"explicit\"\n");

    std::env::set_var(config::loader::CONFIG_PATH_ENV, &path);
    let result = config::load();
    std::env::remove_var(config::loader::CONFIG_PATH_ENV);

    let settings = result.expect("Failed to load explicit config");
    assert_eq!(settings.cache.key_prefix.as_deref(), Some("explicit"));
}
