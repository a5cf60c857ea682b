//! Tests for dotenv loading behavior.
//!
//! Responsibilities:
//! - Test that missing `.env` files are silently ignored.
//! - Test that invalid `.env` files return errors without leaking secrets.
//! - Test that `DOTENV_DISABLED=1`/`true` skips dotenv loading.
//!
//! Invariants / Assumptions:
//! - Tests must serialize mutations to process-global state (cwd/env).
//! - Error messages must never contain secret values from `.env` files.

use std::fs;
use std::path::PathBuf;

use serial_test::serial;
use tempfile::TempDir;

use crate::constants::ENV_DOTENV_DISABLED;
use crate::loader::builder::BootConfigLoader;
use crate::loader::error::ConfigError;

/// RAII guard for temporarily changing the current working directory.
struct CwdGuard {
    original_dir: PathBuf,
}

impl CwdGuard {
    fn new(temp_dir: &TempDir) -> Self {
        let original_dir = std::env::current_dir().expect("Failed to get current directory");
        std::env::set_current_dir(temp_dir.path()).expect("Failed to set current directory");
        Self { original_dir }
    }
}

impl Drop for CwdGuard {
    fn drop(&mut self) {
        let _ = std::env::set_current_dir(&self.original_dir);
    }
}

#[test]
#[serial]
fn test_missing_dotenv_is_ok() {
    let temp_dir = TempDir::new().unwrap();
    let _cwd_guard = CwdGuard::new(&temp_dir);

    temp_env::with_var_unset(ENV_DOTENV_DISABLED, || {
        let result = BootConfigLoader::new().load_dotenv();
        assert!(result.is_ok(), "Missing .env file should be silently ignored");
    });
}

#[test]
#[serial]
fn test_valid_dotenv_sets_variables() {
    let temp_dir = TempDir::new().unwrap();
    let _cwd_guard = CwdGuard::new(&temp_dir);
    fs::write(
        temp_dir.path().join(".env"),
        "KEYSCOPE_DOTENV_TEST_VALUE=from-dotenv\n",
    )
    .unwrap();

    temp_env::with_vars(
        [
            (ENV_DOTENV_DISABLED, None::<&str>),
            ("KEYSCOPE_DOTENV_TEST_VALUE", None),
        ],
        || {
            let result = BootConfigLoader::new().load_dotenv();
            assert!(result.is_ok(), "Valid .env file should load successfully");
            assert_eq!(
                std::env::var("KEYSCOPE_DOTENV_TEST_VALUE").as_deref(),
                Ok("from-dotenv")
            );
        },
    );
}

#[test]
#[serial]
fn test_invalid_dotenv_returns_parse_error_without_secrets() {
    let temp_dir = TempDir::new().unwrap();
    let _cwd_guard = CwdGuard::new(&temp_dir);
    let secret_value = "supersecret_token_12345";
    fs::write(
        temp_dir.path().join(".env"),
        format!("KEYSCOPE_DOTENV_SECRET={secret_value}\nINVALID_LINE_WITHOUT_EQUALS"),
    )
    .unwrap();

    temp_env::with_vars(
        [
            (ENV_DOTENV_DISABLED, None::<&str>),
            ("KEYSCOPE_DOTENV_SECRET", None),
        ],
        || match BootConfigLoader::new().load_dotenv() {
            Err(e @ ConfigError::DotenvParse { .. }) => {
                assert!(!e.to_string().contains(secret_value));
            }
            Err(other) => panic!("expected DotenvParse, got {other}"),
            Ok(_) => panic!("expected DotenvParse, got Ok"),
        },
    );
}

#[test]
#[serial]
fn test_dotenv_disabled_skips_loading() {
    let temp_dir = TempDir::new().unwrap();
    let _cwd_guard = CwdGuard::new(&temp_dir);
    fs::write(temp_dir.path().join(".env"), "INVALID_LINE_WITHOUT_EQUALS").unwrap();

    for flag in ["1", "true"] {
        temp_env::with_var(ENV_DOTENV_DISABLED, Some(flag), || {
            assert!(BootConfigLoader::new().load_dotenv().is_ok());
        });
    }
}
