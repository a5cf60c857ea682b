//! Bootstrap command implementation.

use std::time::Duration;

use anyhow::{Context, Result};
use keyscope_client::{CancellationToken, EntryRegistry, RetrieveContext};
use keyscope_config::{Environment, LoadedBoot};
use tracing::info;

use crate::cancellation::Cancelled;

pub async fn run(
    loaded: LoadedBoot,
    deadline: Option<Duration>,
    pretty: bool,
    cancel: &CancellationToken,
) -> Result<()> {
    let env = Environment::from_process();
    let mut registry = EntryRegistry::from_boot(&loaded.boot, &env, &loaded.settings)
        .context("Failed to register entries")?;

    let mut ctx = RetrieveContext::new().with_cancellation(cancel.clone());
    if let Some(deadline) = deadline {
        ctx = ctx.with_timeout(deadline);
    }

    info!(entries = registry.len(), "Bootstrapping entries...");
    registry.bootstrap_all(&ctx).await;

    if cancel.is_cancelled() {
        return Err(Cancelled.into());
    }

    let safe = registry.marshal_safe();
    let output = if pretty {
        serde_json::to_string_pretty(&safe)?
    } else {
        serde_json::to_string(&safe)?
    };
    println!("{}", output);

    Ok(())
}
