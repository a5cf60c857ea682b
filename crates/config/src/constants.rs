//! Centralized constants for the keyscope workspace.
//!
//! This module contains default values used across crates to avoid
//! magic number duplication and improve maintainability.

// =============================================================================
// Locale
// =============================================================================

/// Separator between the four components of a locale spec.
pub const LOCALE_SEPARATOR: &str = "::";

/// Locale spec that matches every environment.
pub const WILDCARD_LOCALE: &str = "*::*::*::*";

/// Wildcard marker for a single locale component.
pub const WILDCARD: &str = "*";

/// Environment variables read by the locale matcher, in component order.
pub const ENV_REALM: &str = "REALM";
pub const ENV_REGION: &str = "REGION";
pub const ENV_AZ: &str = "AZ";
pub const ENV_DOMAIN: &str = "DOMAIN";

// =============================================================================
// Retrieval Timeouts
// =============================================================================

/// Default per-request timeout for remote secret fetches, in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 3;

/// Default connect (dial) timeout for KV clients, in seconds.
pub const DEFAULT_DIAL_TIMEOUT_SECS: u64 = 5;

/// Maximum allowed request or dial timeout in seconds.
pub const MAX_TIMEOUT_SECS: u64 = 60;

// =============================================================================
// Loader
// =============================================================================

/// Boot file used when neither the builder nor the environment names one.
pub const DEFAULT_BOOT_FILE: &str = "boot.yaml";

pub const ENV_BOOT_PATH: &str = "KEYSCOPE_BOOT_PATH";
pub const ENV_OVERRIDES: &str = "KEYSCOPE_OVERRIDES";
pub const ENV_REQUEST_TIMEOUT: &str = "KEYSCOPE_REQUEST_TIMEOUT";
pub const ENV_DIAL_TIMEOUT: &str = "KEYSCOPE_DIAL_TIMEOUT";
pub const ENV_DOTENV_DISABLED: &str = "DOTENV_DISABLED";
