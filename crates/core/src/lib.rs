//! # Cachegate Core
//!
//! The coordination layer of cachegate: a get-or-populate protocol that runs
//! at most one factory per key at a time, re-checks the store after waiting,
//! and treats the store as a soft dependency.
//!
//! Storage itself is behind the [`CacheStore`] port; adapters live in
//! `cachegate-infra`.
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::convert::Infallible;
//!
//! use cachegate_core::testing::MockStore;
//! use cachegate_core::CacheCoordinator;
//! use cachegate_domain::CacheOptions;
//!
//! let cache = CacheCoordinator::new(MockStore::<u64>::new(), CacheOptions::with_prefix("demo"));
//!
//! let first = cache.get_or_populate("answer", || async { Ok::<_, Infallible>(42) }, None).await;
//! let second = cache.get_or_populate("answer", || async { Ok::<_, Infallible>(0) }, None).await;
//!
//! assert_eq!(first.ok(), Some(42));
//! assert_eq!(second.ok(), Some(42));
//! ```

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

pub mod coordinator;
pub mod error;
pub mod ports;

// Testing utilities
// ---------------------------------------------------------------
#[cfg(any(feature = "test-utils", test))]
pub mod testing;

pub use coordinator::{CacheCoordinator, CoordinatorStats};
pub use error::PopulateError;
pub use ports::{CacheStore, DynStore, StoreResult, ValueCodec};
