//! Errors raised by `get_or_populate`

use cachegate_domain::CacheError;
use thiserror::Error;

/// Failure of a get-or-populate call
///
/// Generic over the factory's own error type `E`. Store failures never
/// appear here: the coordinator absorbs them and falls back to the factory.
#[derive(Debug, Error)]
pub enum PopulateError<E> {
    /// The key was empty or whitespace-only
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Cancellation fired while waiting for the populate lock
    #[error("Cancelled while waiting for the populate lock")]
    Cancelled,

    /// The factory failed; its error is passed through untouched
    #[error("{0}")]
    Factory(E),
}

impl<E> PopulateError<E> {
    pub const fn is_factory(&self) -> bool {
        matches!(self, Self::Factory(_))
    }

    /// The factory's error, if that is what failed
    pub fn into_factory_error(self) -> Option<E> {
        match self {
            Self::Factory(err) => Some(err),
            Self::InvalidArgument(_) | Self::Cancelled => None,
        }
    }

    /// Separate the cache's own failure from the factory's
    pub fn split(self) -> Result<CacheError, E> {
        match self {
            Self::InvalidArgument(message) => Ok(CacheError::InvalidArgument(message)),
            Self::Cancelled => Ok(CacheError::Cancelled),
            Self::Factory(err) => Err(err),
        }
    }

    /// Borrow the factory's error, if that is what failed
    pub const fn factory_error(&self) -> Option<&E> {
        match self {
            Self::Factory(err) => Some(err),
            Self::InvalidArgument(_) | Self::Cancelled => None,
        }
    }
}
