//! CLI exit codes for scripting and automation.
//!
//! Responsibilities:
//! - Define the exit codes scripts can rely on.
//! - Map errors surfacing from a command to an exit code.
//!
//! Does NOT handle:
//! - Error message formatting (handled by anyhow Display).
//!
//! Invariants:
//! - A configuration error is the only fatal class and always exits with 2.
//! - Exit code 130 is reserved for SIGINT (Unix standard: 128 + SIGINT).

use keyscope_config::{ConfigError, OverrideError};

use crate::cancellation::{Cancelled, SIGINT_EXIT_CODE};

/// Structured exit codes for keyscope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    /// Command completed. Absent secrets are not failures.
    Success = 0,

    /// Unhandled or generic failure.
    GeneralError = 1,

    /// Boot document, override string or loader setting is invalid.
    ConfigError = 2,

    /// Interrupted - SIGINT/Ctrl+C (Unix standard: 128 + 2).
    Interrupted = SIGINT_EXIT_CODE,
}

impl ExitCode {
    /// Convert the exit code to an i32 for use with std::process::exit().
    pub const fn as_i32(self) -> i32 {
        self as u8 as i32
    }
}

/// Extension trait for anyhow::Error to extract exit codes.
pub trait ExitCodeExt {
    fn exit_code(&self) -> ExitCode;
}

impl ExitCodeExt for anyhow::Error {
    fn exit_code(&self) -> ExitCode {
        for cause in self.chain() {
            if cause.is::<Cancelled>() {
                return ExitCode::Interrupted;
            }
            if cause.is::<ConfigError>() || cause.is::<OverrideError>() {
                return ExitCode::ConfigError;
            }
        }
        ExitCode::GeneralError
    }
}
