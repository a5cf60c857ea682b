//! Boot configuration loader for files, override strings and environment variables.
//!
//! Responsibilities:
//! - Load the boot document from YAML and apply flat overrides.
//! - Provide a builder-pattern `BootConfigLoader`.
//! - Enforce `DOTENV_DISABLED` gate to prevent accidental dotenv loading in tests.
//!
//! Does NOT handle:
//! - Locale filtering or fetching secrets.
//!
//! Invariants / Assumptions:
//! - Builder values take precedence over environment variables.
//! - `load_dotenv()` must be called explicitly to enable `.env` file loading.

mod builder;
mod env;
mod error;

pub use builder::{BootConfigLoader, LoadedBoot};
pub use env::env_var_or_none;
pub use error::ConfigError;

#[cfg(test)]
mod tests;
