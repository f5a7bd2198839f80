//! Roster subcommands.

use clap::Subcommand;

/// Operations on a roster file.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum RosterCommand {
    /// Register a player
    Register {
        /// Player name (unique, case-insensitive)
        name: String,
        /// Seconds the player needs to reach the target
        seconds: u32,
        /// Attack group (defaults to 1)
        #[arg(short, long)]
        group: Option<u32>,
    },

    /// Change a player's travel time and optionally their group
    Update {
        name: String,
        seconds: u32,
        #[arg(short, long)]
        group: Option<u32>,
    },

    /// Remove a player
    Remove { name: String },

    /// Remove every player
    Clear,

    /// Remove every player of one attack group
    ClearGroup { group: u32 },

    /// List players grouped by attack group
    List,
}
