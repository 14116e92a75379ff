//! Store adapters for the coordinator's `CacheStore` port
//!
//! - [`MemoryStore`]: in-process moka cache with per-entry expiration
//! - [`SerializingStore`]: encodes values through a `ValueCodec` (JSON by
//!   default) before handing them to a text store

pub mod memory;
pub mod serializing;

pub use memory::MemoryStore;
pub use serializing::{JsonCodec, SerializingStore};
