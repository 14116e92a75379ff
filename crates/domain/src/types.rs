//! Result shapes returned by the read-only lookup path

use serde::{Deserialize, Serialize};

/// Outcome of a non-raising cache lookup
///
/// Exactly one of three shapes. A miss carries no payload: there is no
/// meaningful value to hand out, and [`CacheResult::value_or_default`] exists
/// for callers that want the type's empty value anyway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "data", rename_all = "snake_case")]
pub enum CacheResult<T> {
    /// The store held a value for the key
    Hit(T),

    /// The store answered and held nothing
    Miss,

    /// The lookup failed; the message describes why
    Error(String),
}

impl<T> CacheResult<T> {
    /// Create a failed result
    pub fn error<S: Into<String>>(message: S) -> Self {
        Self::Error(message.into())
    }

    /// `true` for hits and misses
    pub const fn is_success(&self) -> bool {
        !matches!(self, Self::Error(_))
    }

    /// `true` only for hits
    pub const fn from_cache(&self) -> bool {
        matches!(self, Self::Hit(_))
    }

    pub const fn is_miss(&self) -> bool {
        matches!(self, Self::Miss)
    }

    /// The cached value, present only on a hit
    pub const fn value(&self) -> Option<&T> {
        match self {
            Self::Hit(value) => Some(value),
            Self::Miss | Self::Error(_) => None,
        }
    }

    /// Consume the result, keeping the value of a hit
    pub fn into_value(self) -> Option<T> {
        match self {
            Self::Hit(value) => Some(value),
            Self::Miss | Self::Error(_) => None,
        }
    }

    /// The failure message, present only on an error
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Error(message) => Some(message.as_str()),
            Self::Hit(_) | Self::Miss => None,
        }
    }

    /// Map the value of a hit
    pub fn map<U, F>(self, f: F) -> CacheResult<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Self::Hit(value) => CacheResult::Hit(f(value)),
            Self::Miss => CacheResult::Miss,
            Self::Error(message) => CacheResult::Error(message),
        }
    }
}

impl<T: Default> CacheResult<T> {
    /// The hit value, or `T::default()` for misses and errors
    pub fn value_or_default(self) -> T {
        self.into_value().unwrap_or_default()
    }
}

impl<T> From<Option<T>> for CacheResult<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Miss, Self::Hit)
    }
}
