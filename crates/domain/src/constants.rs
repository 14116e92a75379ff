//! Cache constants
//!
//! Centralized location for defaults shared by the domain, core and infra
//! crates.

use std::time::Duration;

/// Expiration applied when a caller does not pass one (5 minutes)
pub const DEFAULT_EXPIRATION: Duration = Duration::from_secs(300);
pub const DEFAULT_EXPIRATION_SECS: u64 = 300;

/// Separator placed between the configured prefix and the logical key
pub const KEY_PREFIX_SEPARATOR: char = ':';

/// Message used whenever a key is empty or whitespace-only
pub const EMPTY_KEY_MESSAGE: &str = "key cannot be null or empty";
