//! # Cachegate Domain
//!
//! Configuration, result and error types for cachegate.
//!
//! This crate contains:
//! - `CacheOptions` and its builder
//! - The three-way `CacheResult<T>` returned by lookups
//! - The error taxonomy (`CacheError`, `StoreError`, `CodecError`)
//! - Shared constants
//!
//! ## Architecture
//! - No dependencies on other cachegate crates
//! - No async runtime, no I/O

pub mod config;
pub mod constants;
pub mod errors;
pub mod types;

// Re-export commonly used items
pub use config::{duration_secs, CacheOptions, CacheOptionsBuilder, LockStrategy};
pub use constants::*;
pub use errors::*;
pub use types::*;
