//! Roster command handler and roster file persistence.

use std::path::Path;

use anyhow::Result;
use chrono::Local;
use salvo_core::{CountdownRequest, Player, Roster};

use crate::commands::PlanArgs;
use crate::error::CliError;
use crate::roster_commands::RosterCommand;

/// Load a roster file; a missing file is an empty roster.
pub fn load(path: &Path) -> Result<Roster, CliError> {
    match std::fs::read_to_string(path) {
        Ok(contents) => Ok(serde_json::from_str(&contents)
            .map_err(|e| CliError::Arguments(format!("{}: {e}", path.display())))?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Roster::new()),
        Err(e) => Err(e.into()),
    }
}

/// Write the roster as pretty JSON, replacing the file atomically.
pub fn save(path: &Path, roster: &Roster) -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(roster)?;
    let staged = path.with_extension("json.tmp");
    std::fs::write(&staged, json)?;
    std::fs::rename(&staged, path)?;
    Ok(())
}

/// Load the roster named by `args` and plan its countdown.
pub fn plan_from(args: &PlanArgs) -> Result<CountdownRequest, CliError> {
    if !args.roster.is_file() {
        return Err(CliError::Arguments(format!(
            "roster file {} not found",
            args.roster.display()
        )));
    }
    Ok(load(&args.roster)?.plan(args.group)?)
}

pub fn execute(file: &Path, command: RosterCommand) -> Result<()> {
    let mut roster = load(file)?;

    let changed = match command {
        RosterCommand::Register {
            name,
            seconds,
            group,
        } => {
            let player = roster.register(&name, seconds, group).map_err(CliError::from)?;
            println!(
                "Registered {} ({}s, group {})",
                player.name, player.time_to_destination, player.attack_group
            );
            true
        }
        RosterCommand::Update {
            name,
            seconds,
            group,
        } => {
            let player = roster.update(&name, seconds, group).map_err(CliError::from)?;
            println!(
                "Updated {} ({}s, group {})",
                player.name, player.time_to_destination, player.attack_group
            );
            true
        }
        RosterCommand::Remove { name } => {
            let player = roster.remove(&name).map_err(CliError::from)?;
            println!("Removed {}", player.name);
            true
        }
        RosterCommand::Clear => {
            println!("Removed {} players", roster.clear());
            true
        }
        RosterCommand::ClearGroup { group } => {
            let removed = roster.clear_group(group).map_err(CliError::from)?;
            println!("Removed {} players from group {group}", removed.len());
            true
        }
        RosterCommand::List => {
            print!("{}", format_roster(&roster));
            false
        }
    };

    if changed {
        save(file, &roster)?;
    }
    Ok(())
}

/// Players listed under their attack group.
pub fn format_roster(roster: &Roster) -> String {
    if roster.is_empty() {
        return "No players registered\n".to_string();
    }

    let mut out = String::new();
    for group in roster.groups() {
        let mut players: Vec<&Player> = roster.players_in_group(group).collect();
        players.sort_by(|a, b| b.time_to_destination.cmp(&a.time_to_destination));

        out.push_str(&format!("Group {group}\n"));
        for p in players {
            out.push_str(&format!(
                "  {:<20} {:>5}s  registered {}\n",
                p.name,
                p.time_to_destination,
                p.registered_at.with_timezone(&Local).format("%Y-%m-%d %H:%M")
            ));
        }
    }
    out
}
