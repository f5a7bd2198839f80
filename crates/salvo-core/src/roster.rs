//! Player roster and attack timing.
//!
//! Players register the number of seconds they need to reach the target and
//! an attack group. [`Roster::plan`] turns a selection of players into a
//! [`CountdownRequest`]: the slowest player starts immediately and everyone
//! else waits `total - time_to_destination` seconds, so all arrive together.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::domain::{CountdownRequest, ParticipantTiming};

/// Group assigned when none is given at registration.
pub const DEFAULT_ATTACK_GROUP: u32 = 1;

/// A registered player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub name: String,
    /// Seconds needed to reach the target (≥ 1).
    pub time_to_destination: u32,
    /// Attack group (≥ 1).
    pub attack_group: u32,
    pub registered_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Roster operation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RosterError {
    #[error("Player {0} is already registered")]
    AlreadyRegistered(String),

    #[error("Player {0} not found")]
    PlayerNotFound(String),

    #[error("Time to destination must be at least 1 second, got {0}")]
    InvalidTime(u32),

    #[error("Attack group must be at least 1, got {0}")]
    InvalidGroup(u32),

    #[error("Player name cannot be empty")]
    EmptyName,

    #[error("No players registered")]
    NoPlayers,

    #[error("No players found in attack group {0}")]
    EmptyGroup(u32),
}

/// Ordered set of registered players.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Roster {
    players: Vec<Player>,
}

impl Roster {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            players: Vec::new(),
        }
    }

    /// Register a new player. Names are unique, case-insensitively.
    pub fn register(
        &mut self,
        name: &str,
        time_to_destination: u32,
        group: Option<u32>,
    ) -> Result<&Player, RosterError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(RosterError::EmptyName);
        }
        let group = group.unwrap_or(DEFAULT_ATTACK_GROUP);
        validate_times(time_to_destination, group)?;
        if self.position(name).is_some() {
            return Err(RosterError::AlreadyRegistered(name.to_string()));
        }

        debug!(name, time_to_destination, group, "Registering player");
        self.players.push(Player {
            name: name.to_string(),
            time_to_destination,
            attack_group: group,
            registered_at: Utc::now(),
            updated_at: None,
        });
        Ok(&self.players[self.players.len() - 1])
    }

    /// Change a player's travel time, and their group when `group` is given.
    pub fn update(
        &mut self,
        name: &str,
        time_to_destination: u32,
        group: Option<u32>,
    ) -> Result<&Player, RosterError> {
        let idx = self
            .position(name)
            .ok_or_else(|| RosterError::PlayerNotFound(name.to_string()))?;
        let player = &mut self.players[idx];
        validate_times(time_to_destination, group.unwrap_or(player.attack_group))?;

        player.time_to_destination = time_to_destination;
        if let Some(group) = group {
            player.attack_group = group;
        }
        player.updated_at = Some(Utc::now());
        Ok(player)
    }

    /// Remove a player by name.
    pub fn remove(&mut self, name: &str) -> Result<Player, RosterError> {
        let idx = self
            .position(name)
            .ok_or_else(|| RosterError::PlayerNotFound(name.to_string()))?;
        Ok(self.players.remove(idx))
    }

    /// Remove everyone; returns how many players were removed.
    pub fn clear(&mut self) -> usize {
        let count = self.players.len();
        self.players.clear();
        count
    }

    /// Remove every player of `group`; an empty group is an error.
    pub fn clear_group(&mut self, group: u32) -> Result<Vec<Player>, RosterError> {
        let (removed, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.players)
            .into_iter()
            .partition(|p| p.attack_group == group);
        self.players = kept;
        if removed.is_empty() {
            return Err(RosterError::EmptyGroup(group));
        }
        Ok(removed)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Player> {
        self.position(name).map(|idx| &self.players[idx])
    }

    #[must_use]
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn players_in_group(&self, group: u32) -> impl Iterator<Item = &Player> {
        self.players.iter().filter(move |p| p.attack_group == group)
    }

    /// Distinct attack groups, ascending.
    #[must_use]
    pub fn groups(&self) -> Vec<u32> {
        let mut groups: Vec<u32> = self.players.iter().map(|p| p.attack_group).collect();
        groups.sort_unstable();
        groups.dedup();
        groups
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.players.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Compute start offsets for everyone, or for one attack group.
    ///
    /// Participants are ordered by start offset, ties broken by name, and
    /// numbered from 1.
    pub fn plan(&self, group: Option<u32>) -> Result<CountdownRequest, RosterError> {
        let selected: Vec<&Player> = match group {
            Some(g) => self.players_in_group(g).collect(),
            None => self.players.iter().collect(),
        };
        if selected.is_empty() {
            return Err(group.map_or(RosterError::NoPlayers, RosterError::EmptyGroup));
        }

        let total = selected
            .iter()
            .map(|p| p.time_to_destination)
            .max()
            .unwrap_or(0);

        let mut participants: Vec<ParticipantTiming> = selected
            .into_iter()
            .map(|p| ParticipantTiming {
                name: p.name.clone(),
                attack_group: p.attack_group,
                attack_order: 0,
                time_to_destination: p.time_to_destination,
                attack_start_time: total - p.time_to_destination,
            })
            .collect();
        participants.sort_by(|a, b| {
            a.attack_start_time
                .cmp(&b.attack_start_time)
                .then_with(|| a.name.cmp(&b.name))
        });
        for (order, p) in (1..).zip(participants.iter_mut()) {
            p.attack_order = order;
        }

        let request = CountdownRequest::new(participants, total);
        Ok(match group {
            Some(g) => request.with_group_filter(g),
            None => request,
        })
    }

    fn position(&self, name: &str) -> Option<usize> {
        let name = name.trim();
        self.players
            .iter()
            .position(|p| p.name.eq_ignore_ascii_case(name))
    }
}

fn validate_times(time_to_destination: u32, group: u32) -> Result<(), RosterError> {
    if time_to_destination == 0 {
        return Err(RosterError::InvalidTime(time_to_destination));
    }
    if group == 0 {
        return Err(RosterError::InvalidGroup(group));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster() -> Roster {
        let mut roster = Roster::new();
        roster.register("Alice", 30, None).unwrap();
        roster.register("Bob", 12, Some(2)).unwrap();
        roster.register("Cara", 27, None).unwrap();
        roster
    }

    #[test]
    fn register_rejects_duplicates_case_insensitively() {
        let mut roster = roster();
        assert_eq!(
            roster.register("alice", 10, None).unwrap_err(),
            RosterError::AlreadyRegistered("alice".to_string())
        );
        assert_eq!(roster.len(), 3);
    }

    #[test]
    fn register_validates_input() {
        let mut roster = Roster::new();
        assert_eq!(roster.register("  ", 5, None).unwrap_err(), RosterError::EmptyName);
        assert_eq!(roster.register("A", 0, None).unwrap_err(), RosterError::InvalidTime(0));
        assert_eq!(roster.register("A", 5, Some(0)).unwrap_err(), RosterError::InvalidGroup(0));
        assert!(roster.is_empty());
    }

    #[test]
    fn update_keeps_group_when_omitted() {
        let mut roster = roster();
        let bob = roster.update("Bob", 15, None).unwrap();
        assert_eq!(bob.time_to_destination, 15);
        assert_eq!(bob.attack_group, 2);
        assert!(bob.updated_at.is_some());

        let bob = roster.update("bob", 15, Some(3)).unwrap();
        assert_eq!(bob.attack_group, 3);

        assert_eq!(
            roster.update("Zed", 5, None).unwrap_err(),
            RosterError::PlayerNotFound("Zed".to_string())
        );
    }

    #[test]
    fn clear_group_removes_only_that_group() {
        let mut roster = roster();
        let removed = roster.clear_group(1).unwrap();
        assert_eq!(removed.len(), 2);
        assert_eq!(roster.groups(), vec![2]);
        assert_eq!(roster.clear_group(1).unwrap_err(), RosterError::EmptyGroup(1));
        assert_eq!(roster.clear(), 1);
    }

    #[test]
    fn plan_staggers_starts_to_arrive_together() {
        let request = roster().plan(None).unwrap();
        assert_eq!(request.total_duration, 30);
        assert_eq!(request.group_filter, None);

        let summary: Vec<(&str, u32, u32)> = request
            .participants
            .iter()
            .map(|p| (p.name.as_str(), p.attack_order, p.attack_start_time))
            .collect();
        assert_eq!(summary, vec![("Alice", 1, 0), ("Cara", 2, 3), ("Bob", 3, 18)]);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn plan_for_group_uses_group_total() {
        let request = roster().plan(Some(2)).unwrap();
        assert_eq!(request.total_duration, 12);
        assert_eq!(request.group_filter, Some(2));
        assert_eq!(request.participants.len(), 1);
        assert_eq!(request.participants[0].attack_start_time, 0);
    }

    #[test]
    fn plan_rejects_empty_selection() {
        assert_eq!(Roster::new().plan(None).unwrap_err(), RosterError::NoPlayers);
        assert_eq!(roster().plan(Some(9)).unwrap_err(), RosterError::EmptyGroup(9));
    }

    #[test]
    fn roster_round_trips_through_json() {
        let roster = roster();
        let json = serde_json::to_string(&roster).unwrap();
        assert!(json.contains("timeToDestination"));
        let back: Roster = serde_json::from_str(&json).unwrap();
        assert_eq!(back, roster);
    }
}
