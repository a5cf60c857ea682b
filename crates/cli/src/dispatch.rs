//! Command dispatch logic.
//!
//! Responsibilities:
//! - Route parsed CLI arguments to the matching command handler.
//! - Load the boot document for commands that need it.
//!
//! Does NOT handle:
//! - CLI structure definitions (see `args` module).
//! - Mapping errors to exit codes (see `error` module).

use anyhow::Result;
use keyscope_client::CancellationToken;

use crate::args::{Cli, Commands};
use crate::commands;

pub(crate) async fn run_command(cli: Cli, cancel: &CancellationToken) -> Result<()> {
    match &cli.command {
        Commands::Bootstrap { pretty } => {
            let loaded = commands::load_boot(&cli)?;
            commands::bootstrap::run(loaded, cli.deadline(), *pretty, cancel).await
        }
        Commands::Render { selected } => {
            let loaded = commands::load_boot(&cli)?;
            commands::render::run(loaded, *selected)
        }
        Commands::Locale { spec } => commands::locale::run(spec),
    }
}
