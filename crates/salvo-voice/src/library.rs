//! Speech unit library: one pre-built, exactly one second long clip per numeral.
//!
//! Clips live at `<library_dir>/<n>.wav` for `n` in `1..=size` and share the
//! engine's target format, so any run of them can be concatenated without
//! re-encoding. Files already on disk are adopted as-is, which makes warm-up
//! idempotent across restarts.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use salvo_core::{
    AudioClip, AudioFormat, DirectoryCreationStrategy, SynthesisBackend, VoiceParams,
    ensure_directory,
};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

use crate::error::CountdownError;

/// Length every numeral clip is clamped to.
pub const NUMERAL_DURATION: Duration = Duration::from_secs(1);

/// Text spoken for a numeral.
pub(crate) fn numeral_phrase(numeral: u32) -> String {
    format!("{numeral}.")
}

/// Durable store of numeral clips.
pub struct SpeechLibrary {
    dir: PathBuf,
    size: u32,
    format: AudioFormat,
    voice: VoiceParams,
    backend: Arc<dyn SynthesisBackend>,
    clips: RwLock<BTreeMap<u32, AudioClip>>,
    ready: AtomicBool,
    warmup: Mutex<()>,
}

impl SpeechLibrary {
    pub fn new(
        dir: impl Into<PathBuf>,
        size: u32,
        format: AudioFormat,
        voice: VoiceParams,
        backend: Arc<dyn SynthesisBackend>,
    ) -> Self {
        Self {
            dir: dir.into(),
            size,
            format,
            voice,
            backend,
            clips: RwLock::new(BTreeMap::new()),
            ready: AtomicBool::new(false),
            warmup: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Sample layout shared by every clip.
    #[must_use]
    pub const fn format(&self) -> AudioFormat {
        self.format
    }

    #[must_use]
    pub const fn voice(&self) -> &VoiceParams {
        &self.voice
    }

    /// Highest numeral kept in the library.
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// Make sure every numeral `1..=size` has a clip on disk.
    ///
    /// Concurrent callers wait for a single warm-up. If any numeral fails the
    /// whole call fails and the library stays not-ready; clips written before
    /// the failure are kept and adopted on the next attempt.
    pub async fn ensure_ready(&self) -> Result<(), CountdownError> {
        if self.is_ready() {
            return Ok(());
        }

        let _guard = self.warmup.lock().await;
        if self.is_ready() {
            return Ok(());
        }

        ensure_directory(&self.dir, DirectoryCreationStrategy::AutoCreate)?;
        let scratch = tempfile::Builder::new()
            .prefix(".warm-")
            .tempdir_in(&self.dir)?;

        let mut adopted = 0u32;
        let mut generated = 0u32;
        for numeral in 1..=self.size {
            if self.clips.read().await.contains_key(&numeral) {
                continue;
            }

            let target = self.clip_path(numeral);
            let clip = if target.is_file() {
                adopted += 1;
                AudioClip::new(target)
            } else {
                let clip = self.generate(numeral, scratch.path(), &target).await?;
                generated += 1;
                clip
            };
            self.clips.write().await.insert(numeral, clip);
        }

        self.ready.store(true, Ordering::Release);
        info!(
            dir = %self.dir.display(),
            size = self.size,
            adopted,
            generated,
            "Speech library ready"
        );
        Ok(())
    }

    /// Clip for `numeral`, if the library has one and it is still on disk.
    pub async fn get(&self, numeral: u32) -> Option<AudioClip> {
        self.clips
            .read()
            .await
            .get(&numeral)
            .filter(|clip| clip.exists())
            .cloned()
    }

    /// Number of clips currently known.
    pub async fn len(&self) -> usize {
        self.clips.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.clips.read().await.is_empty()
    }

    fn clip_path(&self, numeral: u32) -> PathBuf {
        self.dir.join(format!("{numeral}.wav"))
    }

    /// Synthesize one numeral into scratch, then move the finished clip into place.
    async fn generate(
        &self,
        numeral: u32,
        scratch: &Path,
        target: &Path,
    ) -> Result<AudioClip, CountdownError> {
        debug!(numeral, "Generating numeral clip");
        let raw_path = scratch.join(format!("{numeral}-raw.{}", self.backend.raw_extension()));
        let raw = self
            .backend
            .synthesize_text(&numeral_phrase(numeral), &self.voice, &raw_path)
            .await?;

        let staged = scratch.join(format!("{numeral}.wav"));
        let clip = self
            .backend
            .normalize(&raw, self.format, Some(NUMERAL_DURATION), &staged)
            .await?;
        let _ = tokio::fs::remove_file(raw.path()).await;

        tokio::fs::rename(clip.path(), target).await?;
        Ok(AudioClip::new(target))
    }
}
