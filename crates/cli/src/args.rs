//! CLI argument definitions and parsing.
//!
//! Responsibilities:
//! - Define the CLI structure using clap derive macros.
//! - Turn global options into a configured `BootConfigLoader`.
//!
//! Non-responsibilities:
//! - Does not execute commands (see `commands`).

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use keyscope_config::{BootConfigLoader, ConfigError};

#[derive(Parser, Debug)]
#[command(name = "keyscope")]
#[command(about = "Select locale-scoped boot configuration and fetch its secrets", long_about = None)]
#[command(version)]
#[command(
    after_help = "Examples:\n  keyscope bootstrap\n  keyscope --boot conf/boot.yaml --set cred[0].endpoint=etcd:2379 bootstrap\n  keyscope render\n  keyscope locale --spec 'prod::*::*::*'\n"
)]
pub struct Cli {
    /// Path to the boot document (default: ./boot.yaml).
    ///
    /// Can also be set via KEYSCOPE_BOOT_PATH.
    #[arg(long, global = true, value_name = "FILE")]
    pub boot: Option<PathBuf>,

    /// Flat overrides merged into the boot document (`a.b=v,list[0]=v`).
    ///
    /// May be repeated; later values win. KEYSCOPE_OVERRIDES is applied first.
    #[arg(long = "set", global = true, value_name = "OVERRIDES")]
    pub overrides: Vec<String>,

    /// Per-request timeout in seconds.
    #[arg(long, global = true, value_name = "SECS")]
    pub request_timeout: Option<u64>,

    /// Connection timeout for KV stores in seconds.
    #[arg(long, global = true, value_name = "SECS")]
    pub dial_timeout: Option<u64>,

    /// Stop starting new fetches after this many seconds.
    #[arg(long, global = true, value_name = "SECS")]
    pub deadline: Option<u64>,

    /// Emit logs as JSON lines on stderr.
    #[arg(long, global = true, env = "KEYSCOPE_LOG_JSON")]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch every selected entry and print which keys are present
    Bootstrap {
        /// Pretty-print the JSON output.
        #[arg(long)]
        pretty: bool,
    },

    /// Print the merged boot document as YAML (credentials redacted)
    Render {
        /// Only include fragments selected for the current environment.
        #[arg(long)]
        selected: bool,
    },

    /// Check a locale spec against REALM, REGION, AZ and DOMAIN
    Locale {
        /// Locale spec in `realm::region::az::domain` form.
        #[arg(long)]
        spec: String,
    },
}

impl Cli {
    /// Loader configured from flags, then from the environment.
    pub fn loader(&self) -> Result<BootConfigLoader, ConfigError> {
        let mut loader = BootConfigLoader::new();

        // Blank paths fall back to KEYSCOPE_BOOT_PATH or the default.
        if let Some(path) = self.boot.as_ref().filter(|p| !p.as_os_str().is_empty()) {
            loader = loader.with_boot_path(path.clone());
        }
        for overrides in &self.overrides {
            loader = loader.with_overrides(overrides.clone());
        }
        if let Some(secs) = self.request_timeout {
            loader = loader.with_request_timeout(Duration::from_secs(secs));
        }
        if let Some(secs) = self.dial_timeout {
            loader = loader.with_dial_timeout(Duration::from_secs(secs));
        }

        loader.from_env()
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.deadline.map(Duration::from_secs)
    }
}
