//! Countdown request types.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One participant's slot in a countdown, as computed by the timing planner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantTiming {
    /// Display name, spoken in the intro.
    pub name: String,
    /// Attack group the participant belongs to (1-based).
    pub attack_group: u32,
    /// Position in the start order (1-based).
    pub attack_order: u32,
    /// Seconds the participant needs to reach the target.
    pub time_to_destination: u32,
    /// Seconds after "go" at which the participant starts.
    pub attack_start_time: u32,
}

/// Everything the engine needs to narrate one countdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountdownRequest {
    /// Participants in planner order.
    pub participants: Vec<ParticipantTiming>,
    /// Seconds from "go" until every participant arrives.
    pub total_duration: u32,
    /// Group the plan was restricted to, if any.
    pub group_filter: Option<u32>,
}

/// Reasons a countdown request is rejected before any synthesis work.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    /// Nothing to narrate.
    #[error("Countdown has no participants")]
    NoParticipants,

    /// A countdown must last at least one second.
    #[error("Total duration must be at least 1 second")]
    ZeroDuration,

    /// A start offset falls outside the countdown.
    #[error("{name} starts at second {offset}, past the total duration of {total}s")]
    OffsetOutOfRange { name: String, offset: u32, total: u32 },
}

impl CountdownRequest {
    /// Create a request without a group filter.
    #[must_use]
    pub const fn new(participants: Vec<ParticipantTiming>, total_duration: u32) -> Self {
        Self {
            participants,
            total_duration,
            group_filter: None,
        }
    }

    /// Restrict the request to one attack group (informational only).
    #[must_use]
    pub const fn with_group_filter(mut self, group: u32) -> Self {
        self.group_filter = Some(group);
        self
    }

    /// Check the request is narratable.
    pub fn validate(&self) -> Result<(), RequestError> {
        if self.participants.is_empty() {
            return Err(RequestError::NoParticipants);
        }
        if self.total_duration == 0 {
            return Err(RequestError::ZeroDuration);
        }
        if let Some(p) = self
            .participants
            .iter()
            .find(|p| p.attack_start_time > self.total_duration)
        {
            return Err(RequestError::OffsetOutOfRange {
                name: p.name.clone(),
                offset: p.attack_start_time,
                total: self.total_duration,
            });
        }
        Ok(())
    }

    /// Latest start offset across participants (0 for an empty request).
    #[must_use]
    pub fn max_offset(&self) -> u32 {
        self.participants
            .iter()
            .map(|p| p.attack_start_time)
            .max()
            .unwrap_or(0)
    }

    /// Participant who starts first: the first one at offset 0, otherwise
    /// the first one listed.
    #[must_use]
    pub fn first_starter(&self) -> Option<&ParticipantTiming> {
        self.participants
            .iter()
            .find(|p| p.attack_start_time == 0)
            .or_else(|| self.participants.first())
    }
}

/// Identifier of an output channel (a voice channel, or a local device).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelId(String);

impl ChannelId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ChannelId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}
