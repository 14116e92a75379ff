//! Process-wide construction of the cache stack
//!
//! [`CacheServices`] turns a [`CacheSettings`] document into a shared
//! coordinator over the configured store:
//!
//! ```text
//! enable_serialization = false:  CacheCoordinator -> MemoryStore<T>
//! enable_serialization = true:   CacheCoordinator -> SerializingStore<T, JsonCodec>
//!                                                      -> MemoryStore<String>
//! ```
//!
//! # Example
//!
//! ```no_run
//! use std::convert::Infallible;
//!
//! use cachegate_infra::config::CacheSettings;
//! use cachegate_infra::services::CacheServices;
//!
//! # async fn example() -> cachegate_domain::Result<()> {
//! let services = CacheServices::<String>::from_settings(&CacheSettings::default())?;
//! let cache = services.coordinator();
//!
//! let greeting = cache
//!     .get_or_populate("greeting", || async { Ok::<_, Infallible>("hello".to_string()) }, None)
//!     .await;
//! # let _ = greeting;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use cachegate_core::{CacheCoordinator, DynStore};
use cachegate_domain::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::{self, CacheSettings};
use crate::stores::{JsonCodec, MemoryStore, SerializingStore};

/// Coordinator over a store chosen at runtime
pub type SharedCache<T> = Arc<CacheCoordinator<T, DynStore<T>>>;

/// The cache stack for values of type `T`
pub struct CacheServices<T> {
    coordinator: SharedCache<T>,
    settings: CacheSettings,
}

impl<T> Clone for CacheServices<T> {
    fn clone(&self) -> Self {
        Self { coordinator: Arc::clone(&self.coordinator), settings: self.settings.clone() }
    }
}

impl<T> std::fmt::Debug for CacheServices<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheServices")
            .field("coordinator", &self.coordinator)
            .field("settings", &self.settings)
            .finish()
    }
}

impl<T> CacheServices<T>
where
    T: Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    /// Build the stack described by `settings`
    ///
    /// # Errors
    /// Returns `CacheError::Config` if the settings fail validation.
    pub fn from_settings(settings: &CacheSettings) -> Result<Self> {
        settings.validate()?;
        settings.log_config();

        let store = Self::build_store(settings);
        tracing::info!(store = store.name(), "Cache store selected");

        let coordinator = CacheCoordinator::try_new(store, settings.cache.clone())?;
        Ok(Self { coordinator: Arc::new(coordinator), settings: settings.clone() })
    }

    /// Load settings with [`config::load`] and build the stack
    ///
    /// # Errors
    /// Returns `CacheError::Config` if loading or validation fails.
    pub fn load() -> Result<Self> {
        Self::from_settings(&config::load()?)
    }

    fn build_store(settings: &CacheSettings) -> DynStore<T> {
        let capacity = settings.store.max_capacity;

        if settings.cache.enable_serialization {
            let text = match capacity {
                Some(max) => MemoryStore::<String>::with_capacity(max),
                None => MemoryStore::<String>::new(),
            };
            Arc::new(SerializingStore::<T, JsonCodec>::new(text, JsonCodec))
        } else {
            let typed = match capacity {
                Some(max) => MemoryStore::<T>::with_capacity(max),
                None => MemoryStore::<T>::new(),
            };
            Arc::new(typed)
        }
    }

    /// Shared handle to the coordinator
    pub fn coordinator(&self) -> SharedCache<T> {
        Arc::clone(&self.coordinator)
    }

    /// Settings the stack was built from
    pub const fn settings(&self) -> &CacheSettings {
        &self.settings
    }
}

#[cfg(test)]
mod tests {
    use cachegate_domain::{CacheError, CacheOptions};

    use super::*;

    #[test]
    fn test_serializing_store_selected_by_default() {
        let services = CacheServices::<u32>::from_settings(&CacheSettings::default())
            .expect("default settings are valid");

        assert_eq!(services.coordinator().store().name(), "serializing");
    }

    #[test]
    fn test_memory_store_selected_without_serialization() {
        let settings = CacheSettings {
            cache: CacheOptions::builder().enable_serialization(false).build(),
            ..Default::default()
        };

        let services = CacheServices::<u32>::from_settings(&settings).expect("valid settings");

        assert_eq!(services.coordinator().store().name(), "memory");
    }

    #[test]
    fn test_invalid_settings_are_rejected() {
        let settings = CacheSettings {
            cache: CacheOptions::builder().key_prefix("  ").build(),
            ..Default::default()
        };

        let result = CacheServices::<u32>::from_settings(&settings);
        assert!(matches!(result, Err(CacheError::Config(_))));
    }

    #[test]
    fn test_clones_share_one_coordinator() {
        let services = CacheServices::<u32>::from_settings(&CacheSettings::default())
            .expect("default settings are valid");
        let clone = services.clone();

        assert!(Arc::ptr_eq(&services.coordinator(), &clone.coordinator()));
    }
}
