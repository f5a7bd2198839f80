//! Synthesis backend port: text-to-speech and audio processing.
//!
//! The engine never implements speech synthesis or audio codecs itself.
//! It drives a backend through four intent-level operations, each of which
//! writes exactly one output file chosen by the caller.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{AudioClip, AudioFormat, VoiceParams};

/// Errors raised by a synthesis backend.
///
/// The engine treats every variant the same way: the build aborts and
/// nothing is cached.
#[derive(Debug, Error)]
pub enum SynthesisError {
    /// The backend program could not be started (missing binary, permissions).
    #[error("Synthesis backend unavailable: {0}")]
    Unavailable(String),

    /// The backend ran but reported failure.
    #[error("{program} failed ({status}): {stderr}")]
    CommandFailed {
        program: String,
        status: String,
        stderr: String,
    },

    /// The backend reported success but the expected file is missing.
    #[error("Backend produced no output at {0}")]
    MissingOutput(PathBuf),

    /// A clip could not be brought to the required sample layout.
    #[error("Format mismatch for {path}: expected {expected}, got {actual}")]
    FormatMismatch {
        path: PathBuf,
        expected: AudioFormat,
        actual: AudioFormat,
    },

    /// The audio header of a clip could not be read.
    #[error("Cannot read audio header of {path}: {reason}")]
    Probe { path: PathBuf, reason: String },

    /// Filesystem error around the backend call.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Text-to-speech and audio-processing capability.
///
/// Implementations must be `Send + Sync` so the engine can share one
/// backend between concurrent builds behind an `Arc`.
#[async_trait]
pub trait SynthesisBackend: Send + Sync {
    /// File extension of the raw clips written by [`synthesize_text`](Self::synthesize_text).
    fn raw_extension(&self) -> &'static str {
        "wav"
    }

    /// Speak `text` with `voice` into a raw clip at `output`.
    async fn synthesize_text(
        &self,
        text: &str,
        voice: &VoiceParams,
        output: &Path,
    ) -> Result<AudioClip, SynthesisError>;

    /// Re-encode `clip` to `format` at `output`.
    ///
    /// With `clamp`, the result is padded with silence or truncated to
    /// exactly that duration.
    async fn normalize(
        &self,
        clip: &AudioClip,
        format: AudioFormat,
        clamp: Option<Duration>,
        output: &Path,
    ) -> Result<AudioClip, SynthesisError>;

    /// Join `clips` in order into a single clip at `output`.
    async fn concatenate(
        &self,
        clips: &[AudioClip],
        output: &Path,
    ) -> Result<AudioClip, SynthesisError>;

    /// Read the sample layout of `clip`.
    async fn probe(&self, clip: &AudioClip) -> Result<AudioFormat, SynthesisError>;
}
