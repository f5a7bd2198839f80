//! Warm command handler: pre-build the numeral library.

use anyhow::Result;

use crate::bootstrap::CliContext;
use crate::error::CliError;

pub async fn execute(ctx: &CliContext) -> Result<()> {
    ctx.library.ensure_ready().await.map_err(CliError::from)?;
    println!(
        "Numeral library ready: {} clips in {}",
        ctx.library.len().await,
        ctx.library.dir().display()
    );
    Ok(())
}
