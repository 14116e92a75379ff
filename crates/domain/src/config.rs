//! Cache configuration types and builder
//!
//! [`CacheOptions`] is constructed once per coordinator and never changes
//! afterwards. It can be deserialized from TOML or JSON, where
//! `default_expiration` is expressed in whole seconds.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_EXPIRATION, KEY_PREFIX_SEPARATOR};
use crate::errors::{CacheError, Result};

/// How the coordinator serializes factory runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LockStrategy {
    /// One lock per full key, created on demand and dropped when unused
    #[default]
    PerKey,
    /// A single lock shared by every key of the coordinator
    Global,
}

impl std::str::FromStr for LockStrategy {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "per_key" | "per-key" | "perkey" => Ok(Self::PerKey),
            "global" => Ok(Self::Global),
            other => Err(CacheError::Config(format!("Unknown lock strategy: {other}"))),
        }
    }
}

/// Configuration for a cache coordinator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheOptions {
    /// Expiration used when a caller omits one
    #[serde(with = "duration_secs")]
    pub default_expiration: Duration,

    /// Whether the store adapter encodes values before storing them
    pub enable_serialization: bool,

    /// Prepended to every key as `prefix:key` when present
    pub key_prefix: Option<String>,

    /// Whether the coordinator keeps hit/miss/factory counters
    pub enable_statistics: bool,

    /// Lock granularity for the single-flight section
    pub lock_strategy: LockStrategy,
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self {
            default_expiration: DEFAULT_EXPIRATION,
            enable_serialization: true,
            key_prefix: None,
            enable_statistics: false,
            lock_strategy: LockStrategy::PerKey,
        }
    }
}

impl CacheOptions {
    /// Create a new configuration builder
    pub fn builder() -> CacheOptionsBuilder {
        CacheOptionsBuilder::default()
    }

    /// Quick preset for a prefixed cache with otherwise default settings
    ///
    /// # Example
    /// ```
    /// use cachegate_domain::CacheOptions;
    ///
    /// let options = CacheOptions::with_prefix("myapp");
    /// assert_eq!(options.full_key("user:1"), "myapp:user:1");
    /// ```
    pub fn with_prefix<S: Into<String>>(prefix: S) -> Self {
        Self { key_prefix: Some(prefix.into()), ..Self::default() }
    }

    /// Check the invariants that cannot be expressed in the type
    ///
    /// # Errors
    /// Returns `CacheError::Config` if the default expiration is zero or the
    /// prefix is blank.
    pub fn validate(&self) -> Result<()> {
        if self.default_expiration.is_zero() {
            return Err(CacheError::Config("default_expiration must be non-zero".to_string()));
        }
        if let Some(prefix) = &self.key_prefix {
            if prefix.trim().is_empty() {
                return Err(CacheError::Config("key_prefix must not be blank".to_string()));
            }
        }
        Ok(())
    }

    /// Resolve the expiration for a write
    pub fn effective_expiration(&self, expiration: Option<Duration>) -> Duration {
        expiration.unwrap_or(self.default_expiration)
    }

    /// Build the key actually sent to the store
    ///
    /// Does not validate `key`; callers reject blank keys first.
    pub fn full_key(&self, key: &str) -> String {
        match &self.key_prefix {
            Some(prefix) => format!("{prefix}{KEY_PREFIX_SEPARATOR}{key}"),
            None => key.to_string(),
        }
    }
}

/// Builder for `CacheOptions` with fluent API
#[derive(Debug, Default)]
pub struct CacheOptionsBuilder {
    options: CacheOptions,
}

impl CacheOptionsBuilder {
    /// Create a new builder with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the default expiration
    pub fn default_expiration(mut self, duration: Duration) -> Self {
        self.options.default_expiration = duration;
        self
    }

    /// Enable or disable value serialization in the store adapter
    pub fn enable_serialization(mut self, enabled: bool) -> Self {
        self.options.enable_serialization = enabled;
        self
    }

    /// Set the key prefix
    pub fn key_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.options.key_prefix = Some(prefix.into());
        self
    }

    /// Enable or disable coordinator statistics
    pub fn enable_statistics(mut self, enabled: bool) -> Self {
        self.options.enable_statistics = enabled;
        self
    }

    /// Set the lock strategy
    pub fn lock_strategy(mut self, strategy: LockStrategy) -> Self {
        self.options.lock_strategy = strategy;
        self
    }

    /// Build the configuration without validation
    pub fn build(self) -> CacheOptions {
        self.options
    }

    /// Build and validate the configuration
    ///
    /// # Errors
    /// See [`CacheOptions::validate`].
    pub fn try_build(self) -> Result<CacheOptions> {
        self.options.validate()?;
        Ok(self.options)
    }
}

/// Serialize a `Duration` as whole seconds
pub mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    /// Serialize a Duration as seconds (u64)
    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    /// Deserialize seconds (u64) into a Duration
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for config.
    use super::*;

    /// Validates `CacheOptions::default` against the documented defaults.
    #[test]
    fn test_cache_options_default() {
        let options = CacheOptions::default();
        assert_eq!(options.default_expiration, Duration::from_secs(300));
        assert!(options.enable_serialization);
        assert!(options.key_prefix.is_none());
        assert!(!options.enable_statistics);
        assert_eq!(options.lock_strategy, LockStrategy::PerKey);
    }

    /// Validates prefixed and unprefixed full keys.
    #[test]
    fn test_full_key() {
        assert_eq!(CacheOptions::default().full_key("user:1"), "user:1");
        assert_eq!(CacheOptions::with_prefix("myapp").full_key("user:1"), "myapp:user:1");
    }

    /// Validates that an explicit expiration always wins over the default.
    #[test]
    fn test_effective_expiration() {
        let options =
            CacheOptions::builder().default_expiration(Duration::from_secs(60)).build();
        assert_eq!(options.effective_expiration(None), Duration::from_secs(60));
        assert_eq!(
            options.effective_expiration(Some(Duration::from_secs(5))),
            Duration::from_secs(5)
        );
    }

    #[test]
    fn test_builder() {
        let options = CacheOptions::builder()
            .default_expiration(Duration::from_secs(30))
            .enable_serialization(false)
            .key_prefix("svc")
            .enable_statistics(true)
            .lock_strategy(LockStrategy::Global)
            .build();

        assert_eq!(options.default_expiration, Duration::from_secs(30));
        assert!(!options.enable_serialization);
        assert_eq!(options.key_prefix.as_deref(), Some("svc"));
        assert!(options.enable_statistics);
        assert_eq!(options.lock_strategy, LockStrategy::Global);
    }

    #[test]
    fn test_validate_rejects_zero_expiration_and_blank_prefix() {
        let zero = CacheOptions::builder().default_expiration(Duration::ZERO).try_build();
        assert!(matches!(zero, Err(CacheError::Config(_))));

        let blank = CacheOptions::builder().key_prefix("  ").try_build();
        assert!(matches!(blank, Err(CacheError::Config(_))));

        assert!(CacheOptions::default().validate().is_ok());
    }

    #[test]
    fn test_lock_strategy_from_str() {
        assert_eq!("per-key".parse::<LockStrategy>().ok(), Some(LockStrategy::PerKey));
        assert_eq!("GLOBAL".parse::<LockStrategy>().ok(), Some(LockStrategy::Global));
        assert!("striped".parse::<LockStrategy>().is_err());
    }

    /// Partial documents fall back to defaults for missing fields.
    #[test]
    fn test_deserialize_partial_json() {
        let options: CacheOptions =
            serde_json::from_str(r#"{"default_expiration": 60, "key_prefix": "app"}"#)
                .expect("valid options json");

        assert_eq!(options.default_expiration, Duration::from_secs(60));
        assert_eq!(options.key_prefix.as_deref(), Some("app"));
        assert!(options.enable_serialization);
        assert_eq!(options.lock_strategy, LockStrategy::PerKey);
    }

    #[test]
    fn test_deserialize_toml_lock_strategy() {
        let options: CacheOptions =
            toml::from_str("lock_strategy = \"global\"\nenable_statistics = true\n")
                .expect("valid options toml");

        assert_eq!(options.lock_strategy, LockStrategy::Global);
        assert!(options.enable_statistics);
        assert_eq!(options.default_expiration, DEFAULT_EXPIRATION);
    }
}
