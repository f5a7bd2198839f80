//! Shared fakes for the salvo-voice integration tests.
//!
//! `FakeBackend` writes small placeholder files instead of audio so the
//! engine's on-disk checks behave as they would with a real backend, and
//! records every call for ordering and counting assertions.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use salvo_core::{
    AudioClip, AudioFormat, CountdownRequest, ParticipantTiming, SynthesisBackend,
    SynthesisError, VoiceParams,
};
use salvo_voice::{CountdownEngine, SpeechLibrary};

pub const FORMAT: AudioFormat = AudioFormat::new(48_000, 2);
pub const ODD_FORMAT: AudioFormat = AudioFormat::new(22_050, 1);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Speak(String),
    Normalize {
        input: PathBuf,
        output: PathBuf,
        clamp: Option<Duration>,
    },
    Concat(Vec<PathBuf>),
    Probe(PathBuf),
}

#[derive(Default)]
pub struct FakeBackend {
    calls: Mutex<Vec<Call>>,
    fail_on_text: Mutex<Option<String>>,
    odd_format_file: Mutex<Option<String>>,
    delay: Mutex<Option<Duration>>,
}

impl FakeBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn spoken(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Speak(text) => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn concats(&self) -> Vec<Vec<PathBuf>> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Concat(paths) => Some(paths),
                _ => None,
            })
            .collect()
    }

    /// Make `synthesize_text` fail for exactly this text.
    pub fn fail_on(&self, text: Option<&str>) {
        *self.fail_on_text.lock().unwrap() = text.map(str::to_string);
    }

    /// Report [`ODD_FORMAT`] for files with this name (until re-encoded).
    pub fn odd_format_for(&self, file_name: &str) {
        *self.odd_format_file.lock().unwrap() = Some(file_name.to_string());
    }

    /// Sleep this long inside every `synthesize_text`.
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl SynthesisBackend for FakeBackend {
    fn raw_extension(&self) -> &'static str {
        "aiff"
    }

    async fn synthesize_text(
        &self,
        text: &str,
        _voice: &VoiceParams,
        output: &Path,
    ) -> Result<AudioClip, SynthesisError> {
        self.record(Call::Speak(text.to_string()));
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_on_text.lock().unwrap().as_deref() == Some(text) {
            return Err(SynthesisError::CommandFailed {
                program: "fake-say".to_string(),
                status: "exit status: 1".to_string(),
                stderr: format!("cannot speak {text:?}"),
            });
        }
        std::fs::write(output, text)?;
        Ok(AudioClip::new(output))
    }

    async fn normalize(
        &self,
        clip: &AudioClip,
        _format: AudioFormat,
        clamp: Option<Duration>,
        output: &Path,
    ) -> Result<AudioClip, SynthesisError> {
        self.record(Call::Normalize {
            input: clip.path().to_path_buf(),
            output: output.to_path_buf(),
            clamp,
        });
        std::fs::copy(clip.path(), output)?;
        Ok(AudioClip::new(output))
    }

    async fn concatenate(
        &self,
        clips: &[AudioClip],
        output: &Path,
    ) -> Result<AudioClip, SynthesisError> {
        let paths: Vec<PathBuf> = clips.iter().map(|c| c.path().to_path_buf()).collect();
        self.record(Call::Concat(paths.clone()));
        let listing: Vec<String> = paths.iter().map(|p| p.display().to_string()).collect();
        std::fs::write(output, listing.join("\n"))?;
        Ok(AudioClip::new(output))
    }

    async fn probe(&self, clip: &AudioClip) -> Result<AudioFormat, SynthesisError> {
        self.record(Call::Probe(clip.path().to_path_buf()));
        let odd = self.odd_format_file.lock().unwrap().clone();
        let name = clip.path().file_name().and_then(|n| n.to_str()).unwrap_or_default();
        Ok(match odd {
            Some(odd) if name == odd => ODD_FORMAT,
            _ => FORMAT,
        })
    }
}

pub struct Harness {
    pub backend: Arc<FakeBackend>,
    pub library: Arc<SpeechLibrary>,
    pub engine: Arc<CountdownEngine>,
    pub root: PathBuf,
}

impl Harness {
    pub fn new(root: &Path, library_size: u32) -> Self {
        let backend = FakeBackend::new();
        let library = Arc::new(SpeechLibrary::new(
            root.join("library"),
            library_size,
            FORMAT,
            VoiceParams::new("Samantha", 170),
            backend.clone(),
        ));
        let engine = Arc::new(CountdownEngine::new(
            backend.clone(),
            Arc::clone(&library),
            root.join("cache"),
        ));
        Self {
            backend,
            library,
            engine,
            root: root.to_path_buf(),
        }
    }

    pub fn library_dir(&self) -> PathBuf {
        self.root.join("library")
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.root.join("cache")
    }
}

pub fn participant(name: &str, offset: u32, total: u32) -> ParticipantTiming {
    ParticipantTiming {
        name: name.to_string(),
        attack_group: 1,
        attack_order: 1,
        time_to_destination: total - offset,
        attack_start_time: offset,
    }
}

/// A at 0, B and C at 3, five seconds in total.
pub fn scenario_abc() -> CountdownRequest {
    CountdownRequest::new(
        vec![participant("A", 0, 5), participant("B", 3, 5), participant("C", 3, 5)],
        5,
    )
}

/// Entries of `dir` whose names start with `prefix`.
pub fn entries_with_prefix(dir: &Path, prefix: &str) -> Vec<PathBuf> {
    match std::fs::read_dir(dir) {
        Ok(entries) => entries
            .filter_map(Result::ok)
            .map(|e| e.path())
            .filter(|p| {
                p.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with(prefix))
            })
            .collect(),
        Err(_) => Vec::new(),
    }
}
