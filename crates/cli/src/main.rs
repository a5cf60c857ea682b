//! keyscope - select locale-scoped boot configuration and fetch its secrets.
//!
//! Responsibilities:
//! - Parse command-line arguments and environment variables.
//! - Install logging and the Ctrl+C handler.
//! - Convert the command outcome into a process exit code in one place.
//!
//! Does NOT handle:
//! - Fragment selection or retrieval (see `crates/config` and `crates/client`).
//!
//! Invariants:
//! - `load_dotenv()` is called BEFORE CLI parsing so `.env` can provide clap defaults.
//! - Logs go to stderr; stdout carries only command output.

mod args;
mod cancellation;
mod commands;
mod dispatch;
mod error;

use args::Cli;
use cancellation::{cancel_on_ctrl_c, print_cancelled_message};
use clap::Parser;
use dispatch::run_command;
use error::{ExitCode, ExitCodeExt};
use keyscope_client::CancellationToken;
use keyscope_config::BootConfigLoader;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[tokio::main]
async fn main() {
    // Load .env file BEFORE CLI parsing so clap env defaults can read .env values
    if let Err(e) = BootConfigLoader::new().load_dotenv() {
        eprintln!("Failed to load environment: {}", e);
        std::process::exit(ExitCode::ConfigError.as_i32());
    }

    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let cancel = CancellationToken::new();
    cancel_on_ctrl_c(cancel.clone());

    let exit_code = match run_command(cli, &cancel).await {
        Ok(()) => ExitCode::Success,
        Err(e) => {
            let code = e.exit_code();
            if code == ExitCode::Interrupted {
                print_cancelled_message();
            } else {
                eprintln!("{:#}", e);
            }
            code
        }
    };

    std::process::exit(exit_code.as_i32());
}

/// Filter used when RUST_LOG is unset.
const DEFAULT_LOG_FILTER: &str = "warn";

fn init_tracing(json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry.with(fmt::layer().with_writer(std::io::stderr)).init();
    }
}
