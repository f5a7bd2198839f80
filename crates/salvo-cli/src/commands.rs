//! Main commands enum and primary subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::roster_commands::RosterCommand;

/// Available salvo commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Show resolved paths and effective settings
    Paths,

    /// Pre-build the numeral library
    Warm,

    /// Print the attack plan, fingerprint and intro without synthesizing
    Preview(PlanArgs),

    /// Build (or reuse) the countdown recording and print its path
    Render(PlanArgs),

    /// Play the countdown on the local output device (Ctrl-C stops it)
    Launch(PlanArgs),

    /// Delete every cached countdown recording
    PurgeCache,

    /// Manage the players in a roster file
    Roster {
        /// Roster JSON file (created on first registration)
        #[arg(short, long, env = "SALVO_ROSTER")]
        file: PathBuf,

        #[command(subcommand)]
        command: RosterCommand,
    },
}

/// Which roster to plan from.
#[derive(Args, Debug, Clone)]
pub struct PlanArgs {
    /// Roster JSON file
    #[arg(short, long, env = "SALVO_ROSTER")]
    pub roster: PathBuf,

    /// Only plan for this attack group
    #[arg(short, long)]
    pub group: Option<u32>,
}
