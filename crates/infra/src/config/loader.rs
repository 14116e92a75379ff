//! Configuration loader
//!
//! Loads [`CacheSettings`] from a config file or from environment variables.
//!
//! ## Loading Strategy
//! 1. If `CACHEGATE_CONFIG` names a file, load it
//! 2. Otherwise probe the standard locations for a config file
//! 3. If no file exists, read environment variables
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! Every variable is optional; unset variables keep their default.
//! - `CACHEGATE_DEFAULT_EXPIRATION_SECS`: Default expiration in seconds
//! - `CACHEGATE_ENABLE_SERIALIZATION`: Encode values before storing them
//! - `CACHEGATE_KEY_PREFIX`: Prefix prepended as `prefix:key`
//! - `CACHEGATE_ENABLE_STATISTICS`: Keep hit/miss counters
//! - `CACHEGATE_LOCK_STRATEGY`: `per_key` or `global`
//! - `CACHEGATE_MAX_CAPACITY`: Entry bound of the memory store
//! - `CACHEGATE_LOG_FILTER`: `tracing` filter directive
//! - `CACHEGATE_LOG_JSON`: Emit JSON log lines
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./cachegate.toml`, `./cachegate.json` (current working directory)
//! 2. `./config.toml`, `./config.json` (current working directory)
//! 3. The same names next to the executable

use std::path::{Path, PathBuf};
use std::time::Duration;

use cachegate_domain::{CacheError, LockStrategy, Result};

use super::CacheSettings;

/// Names an explicit config file, bypassing the probe
pub const CONFIG_PATH_ENV: &str = "CACHEGATE_CONFIG";

const CONFIG_FILE_NAMES: [&str; 4] =
    ["cachegate.toml", "cachegate.json", "config.toml", "config.json"];

/// Load configuration with automatic fallback strategy
///
/// An explicit `CACHEGATE_CONFIG` file wins, then the first probed file;
/// without any file, settings come from the environment.
///
/// # Errors
/// Returns `CacheError::Config` if:
/// - `CACHEGATE_CONFIG` names a missing file
/// - The selected file cannot be read or parsed
/// - An environment variable holds a malformed value
/// - The resulting settings fail validation
pub fn load() -> Result<CacheSettings> {
    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        return load_from_file(Some(PathBuf::from(path)));
    }

    match probe_config_paths() {
        Some(path) => load_from_file(Some(path)),
        None => {
            tracing::debug!("No config file found, reading environment");
            load_from_env()
        }
    }
}

/// Load configuration from environment variables
///
/// # Environment Variables
/// See module documentation for the complete list.
///
/// # Errors
/// Returns `CacheError::Config` if a variable has an invalid value or the
/// resulting settings fail validation.
pub fn load_from_env() -> Result<CacheSettings> {
    let settings = settings_from_lookup(|key| std::env::var(key).ok())?;
    tracing::info!("Configuration loaded from environment variables");
    Ok(settings)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes the standard locations for a config file.
/// The format is detected by file extension (`.json` or `.toml`).
///
/// # Errors
/// Returns `CacheError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid or unsupported
/// - The settings fail validation
pub fn load_from_file(path: Option<PathBuf>) -> Result<CacheSettings> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(CacheError::Config(format!("Config file not found: {}", p.display())));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            CacheError::Config("No config file found in any of the standard locations".to_string())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| CacheError::Config(format!("Failed to read config file: {e}")))?;

    let settings = parse_config(&contents, &config_path)?;
    settings.validate()?;
    Ok(settings)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
fn parse_config(contents: &str, path: &Path) -> Result<CacheSettings> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or_default();

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| CacheError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| CacheError::Config(format!("Invalid JSON format: {e}"))),
        other => Err(CacheError::Config(format!("Unsupported config format: '{other}'"))),
    }
}

/// Probe the standard locations for a configuration file
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut dirs = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        dirs.push(cwd);
    }
    if let Some(exe_dir) =
        std::env::current_exe().ok().and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        dirs.push(exe_dir);
    }

    probe_dirs(&dirs)
}

/// First existing config file name in `dirs`, in order
fn probe_dirs(dirs: &[PathBuf]) -> Option<PathBuf> {
    dirs.iter()
        .flat_map(|dir| CONFIG_FILE_NAMES.iter().map(move |name| dir.join(name)))
        .find(|path| path.is_file())
}

/// Build settings from a variable lookup, starting from defaults
fn settings_from_lookup<F>(lookup: F) -> Result<CacheSettings>
where
    F: Fn(&str) -> Option<String>,
{
    let mut settings = CacheSettings::default();

    if let Some(secs) = parse_var::<u64, _>(&lookup, "CACHEGATE_DEFAULT_EXPIRATION_SECS")? {
        settings.cache.default_expiration = Duration::from_secs(secs);
    }
    if let Some(enabled) = bool_var(&lookup, "CACHEGATE_ENABLE_SERIALIZATION")? {
        settings.cache.enable_serialization = enabled;
    }
    if let Some(prefix) = lookup("CACHEGATE_KEY_PREFIX") {
        settings.cache.key_prefix = Some(prefix);
    }
    if let Some(enabled) = bool_var(&lookup, "CACHEGATE_ENABLE_STATISTICS")? {
        settings.cache.enable_statistics = enabled;
    }
    if let Some(strategy) = parse_var::<LockStrategy, _>(&lookup, "CACHEGATE_LOCK_STRATEGY")? {
        settings.cache.lock_strategy = strategy;
    }
    if let Some(capacity) = parse_var::<u64, _>(&lookup, "CACHEGATE_MAX_CAPACITY")? {
        settings.store.max_capacity = Some(capacity);
    }
    if let Some(filter) = lookup("CACHEGATE_LOG_FILTER") {
        settings.logging.filter = filter;
    }
    if let Some(json) = bool_var(&lookup, "CACHEGATE_LOG_JSON")? {
        settings.logging.json = json;
    }

    settings.validate()?;
    Ok(settings)
}

/// Parse an optional variable with `FromStr`
fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| CacheError::Config(format!("Invalid value for {key}: {e}")))
        })
        .transpose()
}

/// Parse an optional boolean variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn bool_var<F>(lookup: &F, key: &str) -> Result<Option<bool>>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|raw| match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            other => Err(CacheError::Config(format!("Invalid boolean for {key}: '{other}'"))),
        })
        .transpose()
}
