#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

//! Command-line adapter for salvo: roster management, countdown preview,
//! rendering and local playback.

// Used by the binary only
use dotenvy as _;
use tracing_subscriber as _;

pub mod bootstrap;
pub mod commands;
pub mod error;
pub mod handlers;
pub mod parser;
pub mod roster_commands;

// Re-export primary types for convenient access
pub use bootstrap::{CliConfig, CliContext, bootstrap};
pub use commands::{Commands, PlanArgs};
pub use error::CliError;
pub use parser::Cli;
pub use roster_commands::RosterCommand;
