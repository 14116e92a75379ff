//! Error types used throughout cachegate
//!
//! The taxonomy has three families:
//! - [`CacheError::InvalidArgument`] for caller mistakes, raised before any
//!   store access.
//! - [`StoreError`] for anything the backing store reports. The coordinator
//!   never lets these reach a caller as a raised error.
//! - Factory failures, which belong to the caller and are carried by the
//!   core crate's `PopulateError<E>` unchanged.

use thiserror::Error;

use crate::constants::EMPTY_KEY_MESSAGE;

/// Failure converting a value to or from its stored encoding
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("Failed to encode value: {0}")]
    Encode(String),

    #[error("Failed to decode value: {0}")]
    Decode(String),
}

/// Failure reported by a store adapter
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The backend itself failed (I/O, capacity, connection, ...)
    #[error("Store '{store}' failed: {message}")]
    Backend { store: String, message: String },

    /// The stored payload could not be encoded or decoded
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// The store is not reachable at all
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Create a backend error for the named store
    pub fn backend<S: Into<String>, M: Into<String>>(store: S, message: M) -> Self {
        Self::Backend { store: store.into(), message: message.into() }
    }
}

/// Main error type for cachegate
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Operation cancelled")]
    Cancelled,
}

impl CacheError {
    /// The error raised for an empty or whitespace-only key
    pub fn empty_key() -> Self {
        Self::InvalidArgument(EMPTY_KEY_MESSAGE.to_string())
    }

    /// Whether this error came from the backing store
    pub const fn is_store_failure(&self) -> bool {
        matches!(self, Self::Store(_))
    }
}

/// Result type alias for cachegate operations
pub type Result<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_key_message_is_stable() {
        let err = CacheError::empty_key();
        assert!(err.to_string().contains("key cannot be null or empty"));
        assert!(!err.is_store_failure());
    }

    #[test]
    fn codec_errors_nest_into_cache_errors() {
        let err: CacheError = StoreError::from(CodecError::Decode("bad json".into())).into();
        assert!(err.is_store_failure());
        assert_eq!(err.to_string(), "Failed to decode value: bad json");
    }

    #[test]
    fn backend_error_names_the_store() {
        let err = StoreError::backend("memory", "disk full");
        assert_eq!(err.to_string(), "Store 'memory' failed: disk full");
    }
}
