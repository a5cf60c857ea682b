//! Environment variable precedence tests.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use serial_test::serial;
use tempfile::TempDir;

use crate::constants::{ENV_BOOT_PATH, ENV_DIAL_TIMEOUT, ENV_OVERRIDES, ENV_REQUEST_TIMEOUT};
use crate::loader::builder::BootConfigLoader;
use crate::loader::error::ConfigError;

const ALL_VARS: [&str; 4] = [
    ENV_BOOT_PATH,
    ENV_OVERRIDES,
    ENV_REQUEST_TIMEOUT,
    ENV_DIAL_TIMEOUT,
];

fn write_boot(dir: &TempDir, name: &str, endpoint: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(
        &path,
        format!("cred:\n  - name: kv\n    provider: consul\n    endpoint: {endpoint}\n"),
    )
    .unwrap();
    path
}

#[test]
#[serial]
fn test_boot_path_from_env() {
    let dir = TempDir::new().unwrap();
    let path = write_boot(&dir, "env.yaml", "env-host:8500");

    temp_env::with_vars_unset(ALL_VARS, || {
        temp_env::with_var(ENV_BOOT_PATH, Some(path.to_str().unwrap()), || {
            let loaded = BootConfigLoader::new()
                .from_env()
                .unwrap()
                .build()
                .unwrap();
            assert_eq!(
                loaded.boot.cred[0].connection.endpoint.as_deref(),
                Some("env-host:8500")
            );
        });
    });
}

#[test]
#[serial]
fn test_builder_boot_path_wins_over_env() {
    let dir = TempDir::new().unwrap();
    let env_path = write_boot(&dir, "env.yaml", "env-host:8500");
    let cli_path = write_boot(&dir, "cli.yaml", "cli-host:8500");

    temp_env::with_vars_unset(ALL_VARS, || {
        temp_env::with_var(ENV_BOOT_PATH, Some(env_path.to_str().unwrap()), || {
            let loaded = BootConfigLoader::new()
                .with_boot_path(cli_path.clone())
                .from_env()
                .unwrap()
                .build()
                .unwrap();
            assert_eq!(
                loaded.boot.cred[0].connection.endpoint.as_deref(),
                Some("cli-host:8500")
            );
        });
    });
}

#[test]
#[serial]
fn test_env_overrides_apply_before_builder_overrides() {
    let dir = TempDir::new().unwrap();
    let path = write_boot(&dir, "boot.yaml", "file-host:8500");

    temp_env::with_vars_unset(ALL_VARS, || {
        temp_env::with_var(
            ENV_OVERRIDES,
            Some("cred[0].endpoint=env-host:8500,cred[0].datacenter=dc-env"),
            || {
                let loaded = BootConfigLoader::new()
                    .with_boot_path(path.clone())
                    .with_overrides("cred[0].endpoint=cli-host:8500")
                    .from_env()
                    .unwrap()
                    .build()
                    .unwrap();
                let connection = &loaded.boot.cred[0].connection;
                assert_eq!(connection.endpoint.as_deref(), Some("cli-host:8500"));
                assert_eq!(connection.datacenter.as_deref(), Some("dc-env"));
            },
        );
    });
}

#[test]
#[serial]
fn test_timeouts_from_env() {
    temp_env::with_vars_unset(ALL_VARS, || {
        temp_env::with_vars(
            [
                (ENV_REQUEST_TIMEOUT, Some("7")),
                (ENV_DIAL_TIMEOUT, Some("9")),
            ],
            || {
                let loaded = BootConfigLoader::new()
                    .with_boot_text("")
                    .from_env()
                    .unwrap()
                    .build()
                    .unwrap();
                assert_eq!(loaded.settings.request_timeout, Duration::from_secs(7));
                assert_eq!(loaded.settings.dial_timeout, Duration::from_secs(9));

                let loaded = BootConfigLoader::new()
                    .with_boot_text("")
                    .with_request_timeout(Duration::from_secs(2))
                    .from_env()
                    .unwrap()
                    .build()
                    .unwrap();
                assert_eq!(loaded.settings.request_timeout, Duration::from_secs(2));
            },
        );
    });
}

#[test]
#[serial]
fn test_invalid_timeout_env_is_rejected() {
    temp_env::with_vars_unset(ALL_VARS, || {
        temp_env::with_var(ENV_DIAL_TIMEOUT, Some("five"), || {
            let result = BootConfigLoader::new().from_env();
            assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
        });
    });
}

#[test]
#[serial]
fn test_whitespace_env_is_ignored() {
    temp_env::with_vars_unset(ALL_VARS, || {
        temp_env::with_vars(
            [(ENV_OVERRIDES, Some("   ")), (ENV_REQUEST_TIMEOUT, Some(" "))],
            || {
                let loaded = BootConfigLoader::new()
                    .with_boot_text("")
                    .from_env()
                    .unwrap()
                    .build();
                assert!(loaded.is_ok());
            },
        );
    });
}
