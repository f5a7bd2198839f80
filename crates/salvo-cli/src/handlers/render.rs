//! Render command handler: build or reuse the countdown and print its path.

use anyhow::Result;

use crate::bootstrap::CliContext;
use crate::commands::PlanArgs;
use crate::error::CliError;
use crate::handlers::roster::plan_from;

pub async fn execute(ctx: &CliContext, args: &PlanArgs) -> Result<()> {
    let request = plan_from(args)?;
    let artifact = ctx
        .engine
        .synthesize_countdown(&request)
        .await
        .map_err(CliError::from)?;

    println!("{}", artifact.clip.path().display());
    Ok(())
}
