//! # Cachegate Infrastructure
//!
//! Infrastructure implementations of the core `CacheStore` port, plus the
//! process-level glue around them.
//!
//! This crate contains:
//! - Store adapters (moka memory store, serializing decorator)
//! - Configuration loading (environment, TOML, JSON)
//! - Tracing subscriber setup
//! - Construction of the shared coordinator
//!
//! ## Architecture
//! - Implements traits defined in `cachegate-core`
//! - Depends on `cachegate-domain` and `cachegate-core`
//! - Contains all "impure" code (I/O, environment, global subscriber)

pub mod config;
pub mod observability;
pub mod services;
pub mod stores;

// Re-export commonly used items
pub use config::{CacheSettings, LoggingConfig, StoreConfig};
pub use observability::init_tracing;
pub use services::{CacheServices, SharedCache};
pub use stores::{JsonCodec, MemoryStore, SerializingStore};
