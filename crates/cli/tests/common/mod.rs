//! Shared test utilities for keyscope integration tests.
//!
//! Responsibilities:
//! - Provide a hermetic CLI command factory that prevents dotenv loading.
//! - Clear locale and loader variables inherited from the host.
//!
//! Invariants / Assumptions:
//! - All integration tests using this helper will be hermetic by default.

use std::path::Path;

use assert_cmd::Command;

const HOST_VARS: &[&str] = &[
    "REALM",
    "REGION",
    "AZ",
    "DOMAIN",
    "KEYSCOPE_BOOT_PATH",
    "KEYSCOPE_OVERRIDES",
    "KEYSCOPE_REQUEST_TIMEOUT",
    "KEYSCOPE_DIAL_TIMEOUT",
    "KEYSCOPE_LOG_JSON",
    "RUST_LOG",
];

/// Returns a hermetic `keyscope` command running in `dir`.
pub fn keyscope_cmd(dir: &Path) -> Command {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("keyscope");

    // Hermeticity: prevent loading local .env
    cmd.env("DOTENV_DISABLED", "1");
    for var in HOST_VARS {
        cmd.env_remove(var);
    }
    cmd.current_dir(dir);
    cmd
}

/// Write `boot.yaml` into `dir`.
#[allow(dead_code)]
pub fn write_boot(dir: &Path, yaml: &str) {
    std::fs::write(dir.join("boot.yaml"), yaml).expect("Failed to write boot.yaml");
}

/// Parse the command's stdout as JSON.
#[allow(dead_code)]
pub fn stdout_json(output: &std::process::Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).expect("stdout should be JSON")
}
