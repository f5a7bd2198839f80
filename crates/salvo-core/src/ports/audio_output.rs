//! Audio output port: the connection a countdown is played through.
//!
//! Connection management (joining/leaving a voice channel, opening a
//! device) belongs to the adapter. The session controller only needs to
//! know whether a channel is connected, start a clip, and halt it.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{AudioClip, ChannelId};

/// Errors returned by an audio output.
#[derive(Debug, Error)]
pub enum OutputError {
    /// No connection is open for the channel.
    #[error("No output connection for channel {0}")]
    NotConnected(ChannelId),

    /// The connection exists but playback could not start.
    #[error("Playback failed: {0}")]
    Playback(String),
}

/// Destination a countdown artifact is played to.
#[async_trait]
pub trait AudioOutputPort: Send + Sync {
    /// Whether the channel currently has an open connection.
    fn is_connected(&self, channel: &ChannelId) -> bool;

    /// Start playing `clip` on `channel`, replacing anything already playing.
    ///
    /// Returns once playback has started, not when it finishes.
    async fn play(&self, channel: &ChannelId, clip: &AudioClip) -> Result<(), OutputError>;

    /// Halt playback on `channel`. A no-op when nothing is playing.
    async fn halt(&self, channel: &ChannelId);
}
