//! Core domain types.
//!
//! These types represent the pure domain model, independent of any
//! infrastructure concerns (audio devices, subprocesses, filesystem layout).
//!
//! # Structure
//!
//! - `countdown` - Participant timings and the countdown request handed to the engine
//! - `audio` - Audio clip handles, formats, voice parameters and finished artifacts

mod audio;
mod countdown;

pub use audio::{AudioClip, AudioFormat, CountdownArtifact, VoiceParams};
pub use countdown::{ChannelId, CountdownRequest, ParticipantTiming, RequestError};
