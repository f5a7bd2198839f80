//! Command handlers.
//!
//! Handlers follow one pattern:
//! - Signature: `pub async fn execute(ctx: &CliContext, ...) -> Result<()>`
//! - Thin wrappers that:
//!   1. Load CLI-specific input (roster files)
//!   2. Call the library, engine or session controller
//!   3. Format output for the terminal
//!
//! Handlers should not contain timing or synthesis logic.

pub mod launch;
pub mod paths;
pub mod preview;
pub mod purge_cache;
pub mod render;
pub mod roster;
pub mod warm;
