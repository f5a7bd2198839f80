//! Clip playback via `rodio`.
//!
//! [`ClipPlayback`] owns a `rodio::OutputStream`, which is `!Send` on some
//! platforms. It is only ever created and used on an audio thread; see
//! [`crate::audio_thread`].

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};
use salvo_core::OutputError;

/// Plays one WAV file at a time on the default output device.
pub struct ClipPlayback {
    /// rodio output stream (must be kept alive).
    _stream: OutputStream,

    /// Handle used to create sinks.
    stream_handle: OutputStreamHandle,

    /// Current playback sink (if any).
    sink: Option<Sink>,
}

impl ClipPlayback {
    /// Open the default output device.
    pub fn new() -> Result<Self, OutputError> {
        let (stream, stream_handle) =
            OutputStream::try_default().map_err(|e| OutputError::Playback(e.to_string()))?;

        tracing::info!("Audio playback initialized on default output device");

        Ok(Self {
            _stream: stream,
            stream_handle,
            sink: None,
        })
    }

    /// Start playing the WAV file at `path`, replacing anything already playing.
    pub fn play(&mut self, path: &Path) -> Result<(), OutputError> {
        self.stop();

        let file = File::open(path)
            .map_err(|e| OutputError::Playback(format!("{}: {e}", path.display())))?;
        let source = Decoder::new(BufReader::new(file))
            .map_err(|e| OutputError::Playback(format!("{}: {e}", path.display())))?;
        let sink =
            Sink::try_new(&self.stream_handle).map_err(|e| OutputError::Playback(e.to_string()))?;
        sink.append(source);
        self.sink = Some(sink);

        tracing::debug!(path = %path.display(), "Clip playback started");
        Ok(())
    }

    /// Stop any active playback immediately.
    pub fn stop(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
            tracing::debug!("Clip playback stopped");
        }
    }

    /// Check whether audio is currently playing.
    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.sink.as_ref().is_some_and(|sink| !sink.empty())
    }
}

impl Drop for ClipPlayback {
    fn drop(&mut self) {
        self.stop();
    }
}
