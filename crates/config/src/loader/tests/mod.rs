//! Tests for the boot configuration loader.
//!
//! Responsibilities:
//! - Test builder methods, override merging and validation.
//! - Test environment variable handling and precedence.
//! - Test `.env` loading.
//!
//! Invariants:
//! - Tests that touch process-global state (env vars, cwd) are `#[serial]`.
//! - Temporary directories are cleaned up automatically via `tempfile`.

pub mod dotenv_tests;
pub mod env_tests;
