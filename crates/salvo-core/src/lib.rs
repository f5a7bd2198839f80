//! Core domain for salvo: countdown requests, fingerprints, the roster
//! timing planner, settings, path resolution and the ports that the voice
//! crate implements or consumes.
//!
//! Nothing in here touches audio or spawns processes. Adapters live in
//! `salvo-voice` (engine, sessions, backends) and `salvo-cli`.

#![deny(unused_crate_dependencies)]

pub mod domain;
pub mod fingerprint;
pub mod paths;
pub mod ports;
pub mod roster;
pub mod settings;

// Re-export commonly used types for convenience
pub use domain::{
    AudioClip, AudioFormat, ChannelId, CountdownArtifact, CountdownRequest, ParticipantTiming,
    RequestError, VoiceParams,
};
pub use fingerprint::{ALGORITHM_VERSION, Fingerprint, InvalidFingerprint};
pub use ports::{AudioOutputPort, OutputError, SynthesisBackend, SynthesisError};
pub use roster::{DEFAULT_ATTACK_GROUP, Player, Roster, RosterError};
pub use settings::{
    DEFAULT_CHANNELS, DEFAULT_EXPIRY_BUFFER_SECS, DEFAULT_LIBRARY_SIZE, DEFAULT_SAMPLE_RATE,
    DEFAULT_SPEAKING_RATE, DEFAULT_VOICE, Settings, SettingsError, SettingsUpdate, SpeechEngine, validate_settings,
};

// Re-export path utilities
pub use paths::{
    DATA_DIR_ENV, DataRootSource, DirectoryCreationStrategy, PathError, ResolvedPaths, cache_dir,
    data_root, ensure_directory, library_dir, resolve_data_root, verify_writable,
};

// Dev-dependencies used only by integration tests
#[cfg(test)]
use serde_json as _;
#[cfg(test)]
use tempfile as _;
