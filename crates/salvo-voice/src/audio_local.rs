//! Local speaker output: [`AudioOutputPort`] over the default output device.
//!
//! A "channel" here is a named local connection. [`LocalAudioOutput::connect`]
//! opens the device on a fresh audio thread; [`LocalAudioOutput::disconnect`]
//! closes it. Sessions should be released when a channel disconnects.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use salvo_core::{AudioClip, AudioOutputPort, ChannelId, OutputError};
use tracing::info;

use crate::audio_thread::AudioThreadHandle;

/// Plays countdowns through the local default output device.
#[derive(Default)]
pub struct LocalAudioOutput {
    channels: Mutex<HashMap<ChannelId, AudioThreadHandle>>,
}

impl LocalAudioOutput {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the output device for `channel`. Connecting twice is a no-op.
    pub fn connect(&self, channel: &ChannelId) -> Result<(), OutputError> {
        let mut channels = self.channels();
        if channels.contains_key(channel) {
            return Ok(());
        }
        let handle = AudioThreadHandle::spawn(channel.as_str())?;
        channels.insert(channel.clone(), handle);
        info!(%channel, "Audio output connected");
        Ok(())
    }

    /// Close the device for `channel`. Returns whether it was connected.
    pub fn disconnect(&self, channel: &ChannelId) -> bool {
        let handle = self.channels().remove(channel);
        let was_connected = handle.is_some();
        // Joins the audio thread outside the map lock.
        drop(handle);
        if was_connected {
            info!(%channel, "Audio output disconnected");
        }
        was_connected
    }

    /// Whether `channel` is still producing sound.
    pub fn is_playing(&self, channel: &ChannelId) -> bool {
        self.channels()
            .get(channel)
            .is_some_and(AudioThreadHandle::is_playing)
    }

    fn channels(&self) -> MutexGuard<'_, HashMap<ChannelId, AudioThreadHandle>> {
        self.channels.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl AudioOutputPort for LocalAudioOutput {
    fn is_connected(&self, channel: &ChannelId) -> bool {
        self.channels().contains_key(channel)
    }

    async fn play(&self, channel: &ChannelId, clip: &AudioClip) -> Result<(), OutputError> {
        let channels = self.channels();
        let handle = channels
            .get(channel)
            .ok_or_else(|| OutputError::NotConnected(channel.clone()))?;
        handle.play(clip.path().to_path_buf())
    }

    async fn halt(&self, channel: &ChannelId) {
        if let Some(handle) = self.channels().get(channel) {
            handle.halt();
        }
    }
}
