//! Boot configuration loader builder implementation.
//!
//! Responsibilities:
//! - Provide a builder-pattern `BootConfigLoader` for layered boot configuration.
//! - Merge flat overrides (environment, then builder) onto the boot document.
//! - Build the typed `BootConfig` and `RetrieveSettings`.
//!
//! Does NOT handle:
//! - Direct environment variable parsing logic (delegated to env.rs).
//! - Locale filtering (see `selection`).
//!
//! Invariants / Assumptions:
//! - Builder methods take precedence over environment variables.
//! - Overrides are merged after the document is parsed and before it is
//!   deserialized, so override strings can fill any field of the schema.
//! - `load_dotenv()` must be called explicitly to enable `.env` file loading.
//! - The `DOTENV_DISABLED` variable is checked before `dotenvy::dotenv()` is called.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::debug;

use super::env::apply_env;
use super::error::ConfigError;
use crate::constants::{
    DEFAULT_BOOT_FILE, DEFAULT_DIAL_TIMEOUT_SECS, DEFAULT_REQUEST_TIMEOUT_SECS,
    ENV_DOTENV_DISABLED, MAX_TIMEOUT_SECS,
};
use crate::merge::merge;
use crate::overrides::{expand_dotted, parse_flat_overrides};
use crate::types::{BootConfig, CertBlockEntry, CredFragment, RetrieveSettings};
use crate::value::Value;

/// Result of a successful load.
#[derive(Debug, Clone)]
pub struct LoadedBoot {
    /// Typed boot document, overrides applied.
    pub boot: BootConfig,
    pub settings: RetrieveSettings,
}

/// Loader that builds the boot configuration from a file, overrides and env vars.
#[derive(Debug, Default)]
pub struct BootConfigLoader {
    boot_path: Option<PathBuf>,
    boot_text: Option<String>,
    overrides: Vec<String>,
    request_timeout: Option<Duration>,
    dial_timeout: Option<Duration>,
}

impl BootConfigLoader {
    /// Create a new configuration loader.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if dotenv loading is disabled via environment variable.
    fn dotenv_disabled() -> bool {
        matches!(
            std::env::var(ENV_DOTENV_DISABLED).ok().as_deref(),
            Some("true") | Some("1")
        )
    }

    /// Load environment variables from .env file if present.
    ///
    /// If `DOTENV_DISABLED` environment variable is set to "true" or "1",
    /// the .env file will not be loaded (useful for testing).
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The `.env` file exists but has invalid syntax (`ConfigError::DotenvParse`)
    /// - The `.env` file exists but cannot be read due to I/O errors (`ConfigError::DotenvIo`)
    ///
    /// Missing `.env` files are silently ignored (returns `Ok(self)`).
    pub fn load_dotenv(self) -> Result<Self, ConfigError> {
        if Self::dotenv_disabled() {
            return Ok(self);
        }

        match dotenvy::dotenv() {
            Ok(_) => Ok(self),
            Err(e) if Self::is_not_found(&e) => Ok(self),
            Err(dotenvy::Error::LineParse(_, idx)) => {
                Err(ConfigError::DotenvParse { error_index: idx })
            }
            Err(dotenvy::Error::Io(io_err)) => Err(ConfigError::DotenvIo {
                kind: io_err.kind(),
            }),
            Err(_) => Err(ConfigError::DotenvUnknown),
        }
    }

    /// Check if a dotenv error indicates the file was not found.
    fn is_not_found(err: &dotenvy::Error) -> bool {
        matches!(
            err,
            dotenvy::Error::Io(io_err) if io_err.kind() == std::io::ErrorKind::NotFound
        )
    }

    /// Read configuration from environment variables.
    pub fn from_env(mut self) -> Result<Self, ConfigError> {
        apply_env(&mut self)?;
        Ok(self)
    }

    /// Read the boot document from this file.
    pub fn with_boot_path(mut self, path: PathBuf) -> Self {
        self.boot_path = Some(path);
        self
    }

    /// Use this text as the boot document instead of reading a file.
    pub fn with_boot_text(mut self, text: impl Into<String>) -> Self {
        self.boot_text = Some(text.into());
        self
    }

    /// Add a flat override string (`key=value,slice[0]=value`).
    ///
    /// Later calls win over earlier ones.
    pub fn with_overrides(mut self, overrides: impl Into<String>) -> Self {
        self.overrides.push(overrides.into());
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn with_dial_timeout(mut self, timeout: Duration) -> Self {
        self.dial_timeout = Some(timeout);
        self
    }

    pub fn boot_path(&self) -> Option<&Path> {
        self.boot_path.as_deref()
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout
    }

    pub fn dial_timeout(&self) -> Option<Duration> {
        self.dial_timeout
    }

    pub(crate) fn set_boot_path(&mut self, path: Option<PathBuf>) {
        self.boot_path = path;
    }

    pub(crate) fn prepend_overrides(&mut self, overrides: String) {
        self.overrides.insert(0, overrides);
    }

    pub(crate) fn set_request_timeout(&mut self, timeout: Option<Duration>) {
        self.request_timeout = timeout;
    }

    pub(crate) fn set_dial_timeout(&mut self, timeout: Option<Duration>) {
        self.dial_timeout = timeout;
    }

    /// Build the boot configuration.
    ///
    /// # Errors
    ///
    /// Any error here is a configuration error and should abort startup.
    pub fn build(self) -> Result<LoadedBoot, ConfigError> {
        let settings = RetrieveSettings {
            request_timeout: validate_timeout(
                "request",
                self.request_timeout
                    .unwrap_or(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS)),
            )?,
            dial_timeout: validate_timeout(
                "dial",
                self.dial_timeout
                    .unwrap_or(Duration::from_secs(DEFAULT_DIAL_TIMEOUT_SECS)),
            )?,
        };

        let (source_name, text) = self.read_document()?;
        let mut document = match Value::from_yaml_str(&text) {
            Ok(value) if value.is_null() => Value::mapping(),
            Ok(value) => value,
            Err(e) => return Err(ConfigError::parse(source_name, &e)),
        };

        for overrides in &self.overrides {
            let tree = expand_dotted(&parse_flat_overrides(overrides)?)?;
            merge(&mut document, Some(&tree));
        }

        let boot: BootConfig = match document.clone().deserialize_into() {
            Ok(boot) => boot,
            Err(_) => {
                let field = locate_schema_error(&document);
                return Err(ConfigError::schema(source_name, field));
            }
        };
        boot.validate()?;

        debug!(
            cred = boot.cred.len(),
            overrides = self.overrides.len(),
            "Boot configuration loaded"
        );

        Ok(LoadedBoot { boot, settings })
    }

    fn read_document(&self) -> Result<(String, String), ConfigError> {
        if let Some(text) = &self.boot_text {
            return Ok(("<inline>".to_string(), text.clone()));
        }

        let (path, explicit) = match &self.boot_path {
            Some(path) => (path.clone(), true),
            None => (PathBuf::from(DEFAULT_BOOT_FILE), false),
        };
        match std::fs::read_to_string(&path) {
            Ok(text) => Ok((path.display().to_string(), text)),
            Err(e) if !explicit && e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No boot file found, using an empty document");
                Ok((path.display().to_string(), String::new()))
            }
            Err(e) => Err(ConfigError::BootFileRead {
                path,
                kind: e.kind(),
            }),
        }
    }
}

/// Find the first fragment field the boot schema rejects, as a path like
/// `cred[1].provider` or `cert.etcd[0].basicAuth`.
fn locate_schema_error(document: &Value) -> Option<String> {
    if let Some(cred) = document.get("cred").filter(|cred| !cred.is_null()) {
        if let Some(path) = locate_in_list::<CredFragment>("cred", cred) {
            return Some(path);
        }
    }
    let cert = document.get("cert").filter(|cert| !cert.is_null())?;
    if cert.as_mapping().is_none() {
        return Some("cert".to_string());
    }
    for block in ["local", "etcd", "consul", "remoteFileStore"] {
        if let Some(entries) = cert.get(block).filter(|entries| !entries.is_null()) {
            let prefix = format!("cert.{block}");
            if let Some(path) = locate_in_list::<CertBlockEntry>(&prefix, entries) {
                return Some(path);
            }
        }
    }
    None
}

fn locate_in_list<T: DeserializeOwned>(prefix: &str, list: &Value) -> Option<String> {
    let Some(items) = list.as_sequence() else {
        return Some(prefix.to_string());
    };
    for (index, item) in items.iter().enumerate() {
        if item.clone().deserialize_into::<T>().is_ok() {
            continue;
        }
        let Some(fields) = item.as_mapping() else {
            return Some(format!("{prefix}[{index}]"));
        };
        // Every fragment field is optional, so a lone field that fails is the culprit.
        let culprit = fields.iter().find(|(key, value)| {
            let single = BTreeMap::from([((*key).clone(), (*value).clone())]);
            Value::Mapping(single).deserialize_into::<T>().is_err()
        });
        return Some(match culprit {
            Some((key, _)) => format!("{prefix}[{index}].{key}"),
            None => format!("{prefix}[{index}]"),
        });
    }
    None
}

fn validate_timeout(which: &str, timeout: Duration) -> Result<Duration, ConfigError> {
    if timeout.is_zero() {
        return Err(ConfigError::InvalidTimeout {
            message: format!("{which} timeout must be greater than zero"),
        });
    }
    if timeout > Duration::from_secs(MAX_TIMEOUT_SECS) {
        return Err(ConfigError::InvalidTimeout {
            message: format!(
                "{which} timeout must be at most {MAX_TIMEOUT_SECS}s (got {}s)",
                timeout.as_secs()
            ),
        });
    }
    Ok(timeout)
}
