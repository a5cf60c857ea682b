//! Error types for boot configuration loading.
//!
//! Responsibilities:
//! - Define error variants for all boot configuration loading failures.
//! - Convert lower-level errors (override syntax, fragment validation).
//!
//! Does NOT handle:
//! - Retrieval failures (those are soft and live in the client crate).
//!
//! Invariants:
//! - Every variant here is fatal for startup; callers abort on them.
//! - Messages never include raw document, override or `.env` values, only
//!   locations, keys and variable names, to prevent secret leakage.

use std::io::ErrorKind;
use std::path::PathBuf;
use thiserror::Error;

use crate::overrides::OverrideError;
use crate::types::{FragmentProblem, ProviderKind};

/// Errors that can occur during boot configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read boot file at {path}: {kind}")]
    BootFileRead { path: PathBuf, kind: ErrorKind },

    /// `field` is a document path such as `cred[0].provider`; the offending
    /// value is never included.
    #[error(
        "Failed to parse boot document {source_name}{}{}",
        location_suffix(.line, .column),
        field_suffix(.field)
    )]
    BootFileParse {
        source_name: String,
        line: Option<usize>,
        column: Option<usize>,
        field: Option<String>,
    },

    #[error("Invalid override string: {0}")]
    Override(#[from] OverrideError),

    #[error("Invalid value for {var}: {message}")]
    InvalidValue { var: String, message: String },

    #[error("invalid timeout: {message}")]
    InvalidTimeout { message: String },

    #[error("Fragment '{fragment}' does not name a provider")]
    MissingProvider { fragment: String },

    #[error("Fragment '{fragment}' uses provider {provider} but has no endpoint")]
    MissingEndpoint {
        fragment: String,
        provider: ProviderKind,
    },

    /// Failed to parse the `.env` file due to invalid syntax.
    ///
    /// SAFETY: This error only includes the byte index of the parse failure,
    /// NOT the offending line content, to prevent leaking secrets.
    #[error(
        "Failed to parse .env file at position {error_index}. Hint: set DOTENV_DISABLED=1 to skip .env loading"
    )]
    DotenvParse { error_index: usize },

    /// Failed to read the `.env` file due to an I/O error.
    #[error("Failed to read .env file: {kind}")]
    DotenvIo { kind: ErrorKind },

    /// Unknown dotenv error (future variants from dotenvy crate).
    #[error("Failed to load .env file. Hint: set DOTENV_DISABLED=1 to skip .env loading")]
    DotenvUnknown,
}

impl ConfigError {
    pub(crate) fn parse(source_name: impl Into<String>, err: &serde_yaml::Error) -> Self {
        let location = err.location();
        ConfigError::BootFileParse {
            source_name: source_name.into(),
            line: location.as_ref().map(|l| l.line()),
            column: location.as_ref().map(|l| l.column()),
            field: None,
        }
    }

    /// A document that is valid YAML but does not fit the boot schema.
    pub(crate) fn schema(source_name: impl Into<String>, field: Option<String>) -> Self {
        ConfigError::BootFileParse {
            source_name: source_name.into(),
            line: None,
            column: None,
            field,
        }
    }
}

impl From<FragmentProblem> for ConfigError {
    fn from(problem: FragmentProblem) -> Self {
        match problem {
            FragmentProblem::MissingProvider { fragment } => {
                ConfigError::MissingProvider { fragment }
            }
            FragmentProblem::MissingEndpoint { fragment, provider } => {
                ConfigError::MissingEndpoint { fragment, provider }
            }
        }
    }
}

fn location_suffix(line: &Option<usize>, column: &Option<usize>) -> String {
    match (*line, *column) {
        (Some(line), Some(column)) => format!(" at line {line}, column {column}"),
        (Some(line), None) => format!(" at line {line}"),
        _ => String::new(),
    }
}

fn field_suffix(field: &Option<String>) -> String {
    field
        .as_ref()
        .map(|field| format!(" (field {field})"))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_reports_location_without_content() {
        let err = serde_yaml::from_str::<serde_yaml::Value>("a: [secret-value")
            .expect_err("unterminated flow sequence");
        let config_err = ConfigError::parse("boot.yaml", &err);
        let message = config_err.to_string();
        assert!(message.contains("boot.yaml"));
        assert!(message.contains("line"));
        assert!(!message.contains("secret-value"));
    }

    #[test]
    fn test_fragment_problem_conversion() {
        let err: ConfigError = FragmentProblem::MissingEndpoint {
            fragment: "db".to_string(),
            provider: ProviderKind::Etcd,
        }
        .into();
        assert_eq!(
            err.to_string(),
            "Fragment 'db' uses provider etcd but has no endpoint"
        );
    }

    #[test]
    fn test_schema_error_names_field_only() {
        let err = ConfigError::schema("<inline>", Some("cred[0].provider".to_string()));
        assert_eq!(
            err.to_string(),
            "Failed to parse boot document <inline> (field cred[0].provider)"
        );
        let err = ConfigError::schema("<inline>", None);
        assert_eq!(err.to_string(), "Failed to parse boot document <inline>");
    }
}
