//! Audio handles and synthesis parameters.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::fingerprint::Fingerprint;

/// Sample layout every clip is normalized to before concatenation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioFormat {
    /// Samples per second.
    pub sample_rate: u32,
    /// Interleaved channel count.
    pub channels: u16,
}

impl AudioFormat {
    #[must_use]
    pub const fn new(sample_rate: u32, channels: u16) -> Self {
        Self {
            sample_rate,
            channels,
        }
    }
}

impl fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} Hz / {} ch", self.sample_rate, self.channels)
    }
}

/// Voice identity and speaking rate passed to the synthesis backend.
///
/// Both values feed the countdown fingerprint, so changing either one
/// invalidates every cached artifact.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceParams {
    /// Backend-specific voice name (e.g. `"Samantha"`).
    pub voice: String,
    /// Speaking rate in words per minute.
    pub rate: u32,
}

impl VoiceParams {
    pub fn new(voice: impl Into<String>, rate: u32) -> Self {
        Self {
            voice: voice.into(),
            rate,
        }
    }
}

/// Opaque reference to an audio file on disk.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AudioClip {
    path: PathBuf,
}

impl AudioClip {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the backing file is still present.
    #[must_use]
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }
}

/// A finished countdown recording, shared read-only by sessions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountdownArtifact {
    /// Cache identity of the timing configuration.
    pub fingerprint: Fingerprint,
    /// The concatenated recording.
    pub clip: AudioClip,
}
