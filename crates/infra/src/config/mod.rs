//! Configuration loading and management
//!
//! A [`CacheSettings`] document bundles the coordinator's [`CacheOptions`]
//! with the settings of the in-process store and of logging. It can come
//! from environment variables or from a TOML/JSON file; see [`loader`].

pub mod loader;

use cachegate_domain::{CacheError, CacheOptions, Result};
use serde::{Deserialize, Serialize};

// Re-export commonly used items
pub use loader::{load, load_from_env, load_from_file, probe_config_paths};

/// Default `tracing` filter directive
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Complete configuration for one cache deployment
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    /// Coordinator behaviour
    pub cache: CacheOptions,

    /// In-process store sizing
    pub store: StoreConfig,

    /// Log output
    pub logging: LoggingConfig,
}

impl CacheSettings {
    /// Validate every section
    ///
    /// # Errors
    /// Returns `CacheError::Config` describing the first invalid setting.
    pub fn validate(&self) -> Result<()> {
        self.cache.validate()?;
        self.store.validate()
    }

    /// Log the effective configuration at startup
    pub fn log_config(&self) {
        tracing::info!(
            default_expiration_secs = self.cache.default_expiration.as_secs(),
            enable_serialization = self.cache.enable_serialization,
            key_prefix = ?self.cache.key_prefix,
            enable_statistics = self.cache.enable_statistics,
            lock_strategy = ?self.cache.lock_strategy,
            max_capacity = ?self.store.max_capacity,
            "Cache configuration loaded"
        );
    }
}

/// Settings for the in-process memory store
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Upper bound on stored entries; unbounded when absent
    pub max_capacity: Option<u64>,
}

impl StoreConfig {
    fn validate(&self) -> Result<()> {
        if self.max_capacity == Some(0) {
            return Err(CacheError::Config("max_capacity must be greater than zero".to_string()));
        }
        Ok(())
    }
}

/// Settings for the `tracing` subscriber
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `info` or `cachegate_core=debug,warn`
    pub filter: String,

    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { filter: DEFAULT_LOG_FILTER.to_string(), json: false }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use cachegate_domain::LockStrategy;

    use super::*;

    #[test]
    fn test_defaults() {
        let settings = CacheSettings::default();

        assert_eq!(settings.cache, CacheOptions::default());
        assert_eq!(settings.store.max_capacity, None);
        assert_eq!(settings.logging.filter, "info");
        assert!(!settings.logging.json);
        assert!(settings.validate().is_ok());
    }

    /// Sections and fields left out of a document keep their defaults
    #[test]
    fn test_partial_toml_document() {
        let settings: CacheSettings = toml::from_str(
            r#"
[cache]
key_prefix = "orders"
lock_strategy = "global"
"#,
        )
        .expect("valid toml");

        assert_eq!(settings.cache.key_prefix.as_deref(), Some("orders"));
        assert_eq!(settings.cache.lock_strategy, LockStrategy::Global);
        assert_eq!(settings.cache.default_expiration, Duration::from_secs(300));
        assert_eq!(settings.logging, LoggingConfig::default());
    }

    #[test]
    fn test_zero_capacity_is_rejected() {
        let settings =
            CacheSettings { store: StoreConfig { max_capacity: Some(0) }, ..Default::default() };

        assert!(matches!(settings.validate(), Err(CacheError::Config(_))));
    }

    #[test]
    fn test_invalid_cache_section_is_rejected() {
        let mut settings = CacheSettings::default();
        settings.cache.default_expiration = Duration::ZERO;

        assert!(matches!(settings.validate(), Err(CacheError::Config(_))));
    }
}
