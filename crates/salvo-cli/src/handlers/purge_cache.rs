//! Purge-cache command handler.

use anyhow::Result;

use crate::bootstrap::CliContext;
use crate::error::CliError;

pub async fn execute(ctx: &CliContext) -> Result<()> {
    let removed = ctx.engine.purge_cache().await.map_err(CliError::from)?;
    match removed {
        0 => println!("Cache already empty"),
        1 => println!("Removed 1 cached countdown"),
        n => println!("Removed {n} cached countdowns"),
    }
    Ok(())
}
