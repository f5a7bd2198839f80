//! Settings domain types and validation.
//!
//! This module contains the synthesis and session settings used across the
//! application. These are pure domain types with no infrastructure
//! dependencies; loading them from disk or flags is the adapter's job.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::domain::{AudioFormat, VoiceParams};

/// Default synthesis voice.
pub const DEFAULT_VOICE: &str = "Samantha";

/// Default speaking rate (words per minute).
pub const DEFAULT_SPEAKING_RATE: u32 = 170;

/// Default sample rate of every clip and artifact.
pub const DEFAULT_SAMPLE_RATE: u32 = 48_000;

/// Default channel count of every clip and artifact.
pub const DEFAULT_CHANNELS: u16 = 2;

/// Default number of pre-built numeral clips.
pub const DEFAULT_LIBRARY_SIZE: u32 = 200;

/// Seconds a session stays armed past the countdown's total duration.
pub const DEFAULT_EXPIRY_BUFFER_SECS: u64 = 5;

const SUPPORTED_SAMPLE_RATES: [u32; 6] = [8_000, 16_000, 22_050, 24_000, 44_100, 48_000];

/// Local text-to-speech program driven by the command backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SpeechEngine {
    /// macOS `say`.
    #[default]
    Say,
    /// `espeak-ng` (Linux, Windows).
    EspeakNg,
}

impl SpeechEngine {
    /// Program name invoked for this engine.
    #[must_use]
    pub const fn program(self) -> &'static str {
        match self {
            Self::Say => "say",
            Self::EspeakNg => "espeak-ng",
        }
    }
}

impl std::str::FromStr for SpeechEngine {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "say" => Ok(Self::Say),
            "espeak-ng" | "espeak" => Ok(Self::EspeakNg),
            other => Err(SettingsError::UnknownEngine(other.to_string())),
        }
    }
}

/// Application settings structure.
///
/// All fields are optional to support partial updates and graceful defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Root directory for the numeral library and artifact cache.
    pub data_dir: Option<PathBuf>,

    /// Voice name passed to the speech engine.
    pub voice: Option<String>,

    /// Speaking rate in words per minute.
    pub speaking_rate: Option<u32>,

    /// Sample rate of normalized clips.
    pub sample_rate: Option<u32>,

    /// Channel count of normalized clips (1 or 2).
    pub channels: Option<u16>,

    /// Numerals `1..=library_size` are pre-built.
    pub library_size: Option<u32>,

    /// Extra seconds a session stays armed after the countdown ends.
    pub expiry_buffer_secs: Option<u64>,

    /// Which speech program to run.
    pub speech_engine: Option<SpeechEngine>,

    /// Path or name of the ffmpeg binary.
    pub ffmpeg_path: Option<PathBuf>,
}

impl Settings {
    /// Create settings with sensible defaults.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self {
            data_dir: None,
            voice: Some(DEFAULT_VOICE.to_string()),
            speaking_rate: Some(DEFAULT_SPEAKING_RATE),
            sample_rate: Some(DEFAULT_SAMPLE_RATE),
            channels: Some(DEFAULT_CHANNELS),
            library_size: Some(DEFAULT_LIBRARY_SIZE),
            expiry_buffer_secs: Some(DEFAULT_EXPIRY_BUFFER_SECS),
            speech_engine: Some(SpeechEngine::Say),
            ffmpeg_path: Some(PathBuf::from("ffmpeg")),
        }
    }

    /// Voice parameters (with default fallback).
    #[must_use]
    pub fn voice_params(&self) -> VoiceParams {
        VoiceParams::new(
            self.voice.as_deref().unwrap_or(DEFAULT_VOICE),
            self.speaking_rate.unwrap_or(DEFAULT_SPEAKING_RATE),
        )
    }

    /// Target clip format (with default fallback).
    #[must_use]
    pub fn audio_format(&self) -> AudioFormat {
        AudioFormat::new(
            self.sample_rate.unwrap_or(DEFAULT_SAMPLE_RATE),
            self.channels.unwrap_or(DEFAULT_CHANNELS),
        )
    }

    /// Get the effective library size (with default fallback).
    #[must_use]
    pub fn effective_library_size(&self) -> u32 {
        self.library_size.unwrap_or(DEFAULT_LIBRARY_SIZE)
    }

    /// Get the effective expiry buffer (with default fallback).
    #[must_use]
    pub fn effective_expiry_buffer_secs(&self) -> u64 {
        self.expiry_buffer_secs
            .unwrap_or(DEFAULT_EXPIRY_BUFFER_SECS)
    }

    /// Get the effective speech engine (with default fallback).
    #[must_use]
    pub fn effective_speech_engine(&self) -> SpeechEngine {
        self.speech_engine.unwrap_or_default()
    }

    /// Get the effective ffmpeg binary (with default fallback).
    #[must_use]
    pub fn effective_ffmpeg_path(&self) -> PathBuf {
        self.ffmpeg_path
            .clone()
            .unwrap_or_else(|| PathBuf::from("ffmpeg"))
    }

    /// Merge another settings into this one, only updating fields that are Some.
    pub fn merge(&mut self, other: &SettingsUpdate) {
        if let Some(ref dir) = other.data_dir {
            self.data_dir.clone_from(dir);
        }
        if let Some(ref voice) = other.voice {
            self.voice.clone_from(voice);
        }
        if let Some(rate) = other.speaking_rate {
            self.speaking_rate = rate;
        }
        if let Some(rate) = other.sample_rate {
            self.sample_rate = rate;
        }
        if let Some(channels) = other.channels {
            self.channels = channels;
        }
        if let Some(size) = other.library_size {
            self.library_size = size;
        }
        if let Some(buffer) = other.expiry_buffer_secs {
            self.expiry_buffer_secs = buffer;
        }
        if let Some(engine) = other.speech_engine {
            self.speech_engine = engine;
        }
        if let Some(ref path) = other.ffmpeg_path {
            self.ffmpeg_path.clone_from(path);
        }
    }
}

/// Partial settings update.
///
/// Each field is `Option<Option<T>>`:
/// - `None` = don't change this field
/// - `Some(None)` = set field to None/null
/// - `Some(Some(value))` = set field to value
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettingsUpdate {
    pub data_dir: Option<Option<PathBuf>>,
    pub voice: Option<Option<String>>,
    pub speaking_rate: Option<Option<u32>>,
    pub sample_rate: Option<Option<u32>>,
    pub channels: Option<Option<u16>>,
    pub library_size: Option<Option<u32>>,
    pub expiry_buffer_secs: Option<Option<u64>>,
    pub speech_engine: Option<Option<SpeechEngine>>,
    pub ffmpeg_path: Option<Option<PathBuf>>,
}

/// Settings validation error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SettingsError {
    #[error("Speaking rate must be between 80 and 400 words per minute, got {0}")]
    InvalidSpeakingRate(u32),

    #[error("Unsupported sample rate {0} Hz")]
    InvalidSampleRate(u32),

    #[error("Channel count must be 1 or 2, got {0}")]
    InvalidChannels(u16),

    #[error("Library size must be between 1 and 1000, got {0}")]
    InvalidLibrarySize(u32),

    #[error("Voice name cannot be empty")]
    EmptyVoice,

    #[error("{0} path cannot be empty")]
    EmptyPath(&'static str),

    #[error("Unknown speech engine: {0} (expected \"say\" or \"espeak-ng\")")]
    UnknownEngine(String),
}

/// Validate settings values.
pub fn validate_settings(settings: &Settings) -> Result<(), SettingsError> {
    if let Some(rate) = settings.speaking_rate {
        if !(80..=400).contains(&rate) {
            return Err(SettingsError::InvalidSpeakingRate(rate));
        }
    }

    if let Some(rate) = settings.sample_rate {
        if !SUPPORTED_SAMPLE_RATES.contains(&rate) {
            return Err(SettingsError::InvalidSampleRate(rate));
        }
    }

    if let Some(channels) = settings.channels {
        if !(1..=2).contains(&channels) {
            return Err(SettingsError::InvalidChannels(channels));
        }
    }

    if let Some(size) = settings.library_size {
        if !(1..=1000).contains(&size) {
            return Err(SettingsError::InvalidLibrarySize(size));
        }
    }

    if settings.voice.as_ref().is_some_and(|v| v.trim().is_empty()) {
        return Err(SettingsError::EmptyVoice);
    }

    if settings
        .data_dir
        .as_ref()
        .is_some_and(|p| p.as_os_str().is_empty())
    {
        return Err(SettingsError::EmptyPath("Data directory"));
    }

    if settings
        .ffmpeg_path
        .as_ref()
        .is_some_and(|p| p.as_os_str().is_empty())
    {
        return Err(SettingsError::EmptyPath("ffmpeg"));
    }

    Ok(())
}
