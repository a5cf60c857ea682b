//! CLI command implementations.

pub mod bootstrap;
pub mod locale;
pub mod render;

use anyhow::{Context, Result};
use keyscope_config::LoadedBoot;

use crate::args::Cli;

/// Load the boot document from flags and environment.
///
/// Errors keep their `ConfigError` source so the exit code can be derived.
pub fn load_boot(cli: &Cli) -> Result<LoadedBoot> {
    let loaded = cli
        .loader()
        .and_then(|loader| loader.build())
        .context("Failed to load boot configuration")?;
    Ok(loaded)
}
