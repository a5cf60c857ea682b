//! Environment variable parsing for boot configuration.
//!
//! Responsibilities:
//! - Read keyscope environment variables and apply them to a loader.
//! - Provide helpers for reading env vars with empty/whitespace filtering.
//!
//! Does NOT handle:
//! - Reading the locale variables (see `locale::Environment`).
//! - .env file loading (handled by BootConfigLoader::load_dotenv).
//!
//! Invariants:
//! - Values already set on the loader (builder/CLI) win over the environment.
//! - Environment overrides are applied before builder overrides.
//! - Empty or whitespace-only environment variables are treated as unset.
//! - Invalid numeric values return ConfigError::InvalidValue.

use std::path::PathBuf;
use std::time::Duration;

use super::builder::BootConfigLoader;
use super::error::ConfigError;
use crate::constants::{ENV_BOOT_PATH, ENV_DIAL_TIMEOUT, ENV_OVERRIDES, ENV_REQUEST_TIMEOUT};

/// Read an environment variable, returning None if unset, empty, or whitespace-only.
/// Returns the trimmed value (leading/trailing whitespace removed) if present.
pub fn env_var_or_none(key: &str) -> Option<String> {
    std::env::var(key).ok().and_then(|s| {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            None
        } else if trimmed.len() == s.len() {
            Some(s)
        } else {
            Some(trimmed.to_string())
        }
    })
}

fn env_secs(var: &str) -> Result<Option<Duration>, ConfigError> {
    env_var_or_none(var)
        .map(|raw| {
            raw.parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| ConfigError::InvalidValue {
                    var: var.to_string(),
                    message: "must be a number of seconds".to_string(),
                })
        })
        .transpose()
}

/// Apply environment variable configuration to the loader.
pub fn apply_env(loader: &mut BootConfigLoader) -> Result<(), ConfigError> {
    if loader.boot_path().is_none() {
        if let Some(path) = env_var_or_none(ENV_BOOT_PATH) {
            loader.set_boot_path(Some(PathBuf::from(path)));
        }
    }
    if let Some(overrides) = env_var_or_none(ENV_OVERRIDES) {
        loader.prepend_overrides(overrides);
    }
    if loader.request_timeout().is_none() {
        if let Some(timeout) = env_secs(ENV_REQUEST_TIMEOUT)? {
            loader.set_request_timeout(Some(timeout));
        }
    }
    if loader.dial_timeout().is_none() {
        if let Some(timeout) = env_secs(ENV_DIAL_TIMEOUT)? {
            loader.set_dial_timeout(Some(timeout));
        }
    }
    Ok(())
}
