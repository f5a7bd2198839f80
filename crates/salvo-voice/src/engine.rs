//! Countdown audio engine: turns a timing plan into one cached recording.
//!
//! ```text
//!   validate → library warm-up → fingerprint ─┬─ hit  → artifact
//!                                             └─ miss → intro → ticks 1..=max → outro
//!                                                       → format check → concatenate
//!                                                       → cache/<fingerprint>.wav
//! ```
//!
//! Builds run inside a private `.build-*` scratch directory under the cache
//! directory. The scratch directory is removed when the build ends, whether
//! it succeeded or not, so the only files that survive are the artifact and
//! the library.
//!
//! At most one build runs per fingerprint. Callers that ask for a fingerprint
//! already being built subscribe to that build and receive its result,
//! including its error.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use salvo_core::{
    AudioClip, CountdownArtifact, CountdownRequest, DirectoryCreationStrategy, Fingerprint,
    SynthesisBackend, SynthesisError, ensure_directory,
};
use tokio::sync::{Mutex, watch};
use tracing::{debug, info, warn};

use crate::error::CountdownError;
use crate::library::{NUMERAL_DURATION, SpeechLibrary, numeral_phrase};

/// Closing line of every countdown.
pub const OUTRO_PHRASE: &str = "Sequence complete.";

/// Outcome of one build attempt, `None` while it is still running.
type BuildOutcome = Option<Result<CountdownArtifact, Arc<CountdownError>>>;

enum Slot {
    Ready(CountdownArtifact),
    Building(watch::Receiver<BuildOutcome>),
}

enum Claim {
    Ready(CountdownArtifact),
    Join(watch::Receiver<BuildOutcome>),
    Build(watch::Sender<BuildOutcome>),
}

// ── Narration ──────────────────────────────────────────────────────

/// Build the spoken intro for `request`.
///
/// Names the first starter, then every participant's start in ascending
/// time order (request order on ties), then the ready call.
#[must_use]
pub fn intro_phrase(request: &CountdownRequest) -> String {
    let Some(first) = request.first_starter() else {
        return String::new();
    };

    let mut ordered: Vec<_> = request.participants.iter().collect();
    ordered.sort_by_key(|p| p.attack_start_time);

    let mut script = format!("Synchronized attack sequence. {} starts first. ", first.name);
    for p in ordered {
        if p.attack_start_time == 0 {
            script.push_str(&format!("{} starts immediately. ", p.name));
        } else {
            script.push_str(&format!("{} starts at second {}. ", p.name, p.attack_start_time));
        }
    }
    script.push_str(&format!("{} ready. Three. Two. One. Go.", first.name));
    script
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Segment {
    Intro,
    Tick(u32),
    Outro,
}

impl Segment {
    const fn clamp(self) -> Option<Duration> {
        match self {
            Self::Tick(_) => Some(NUMERAL_DURATION),
            Self::Intro | Self::Outro => None,
        }
    }
}

impl std::fmt::Display for Segment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Intro => f.write_str("intro"),
            Self::Tick(n) => write!(f, "tick-{n}"),
            Self::Outro => f.write_str("outro"),
        }
    }
}

// ── Engine ─────────────────────────────────────────────────────────

/// Builds and caches countdown artifacts.
pub struct CountdownEngine {
    backend: Arc<dyn SynthesisBackend>,
    library: Arc<SpeechLibrary>,
    cache_dir: PathBuf,
    artifacts: Mutex<HashMap<Fingerprint, Slot>>,
}

impl CountdownEngine {
    pub fn new(
        backend: Arc<dyn SynthesisBackend>,
        library: Arc<SpeechLibrary>,
        cache_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            backend,
            library,
            cache_dir: cache_dir.into(),
            artifacts: Mutex::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    #[must_use]
    pub fn library(&self) -> &Arc<SpeechLibrary> {
        &self.library
    }

    /// Fingerprint `request` would be cached under with this engine's voice.
    #[must_use]
    pub fn fingerprint(&self, request: &CountdownRequest) -> Fingerprint {
        Fingerprint::compute(request, self.library.voice())
    }

    /// Path the artifact for `fingerprint` is stored at.
    #[must_use]
    pub fn artifact_path(&self, fingerprint: &Fingerprint) -> PathBuf {
        self.cache_dir.join(fingerprint.artifact_file_name())
    }

    /// Return the narrated countdown for `request`, building it on a miss.
    ///
    /// Callers arriving while the same fingerprint is being built wait for
    /// that build and share its outcome, success or failure. A failed build
    /// caches nothing, so the next call starts a fresh attempt.
    pub async fn synthesize_countdown(
        &self,
        request: &CountdownRequest,
    ) -> Result<CountdownArtifact, CountdownError> {
        request.validate()?;
        self.library.ensure_ready().await?;

        let fingerprint = self.fingerprint(request);
        loop {
            match self.claim(&fingerprint).await {
                Claim::Ready(artifact) => {
                    debug!(fingerprint = %fingerprint.short(), "Countdown cache hit");
                    return Ok(artifact);
                }
                Claim::Join(mut rx) => {
                    debug!(fingerprint = %fingerprint.short(), "Joining countdown build in flight");
                    // A closed channel with no outcome means the builder was
                    // cancelled; claim again.
                    if let Ok(outcome) = rx.wait_for(Option::is_some).await {
                        match &*outcome {
                            Some(Ok(artifact)) => return Ok(artifact.clone()),
                            Some(Err(err)) => {
                                return Err(CountdownError::BuildFailed(Arc::clone(err)));
                            }
                            None => {}
                        }
                    }
                }
                Claim::Build(tx) => {
                    let result = self.adopt_or_build(request, &fingerprint).await;
                    return self.publish(&fingerprint, &tx, result).await;
                }
            }
        }
    }

    /// Fingerprints of artifacts currently held in memory, sorted.
    pub async fn cached_fingerprints(&self) -> Vec<Fingerprint> {
        let artifacts = self.artifacts.lock().await;
        let mut fingerprints: Vec<Fingerprint> = artifacts
            .iter()
            .filter(|(_, slot)| matches!(slot, Slot::Ready(a) if a.clip.exists()))
            .map(|(fp, _)| fp.clone())
            .collect();
        fingerprints.sort();
        fingerprints
    }

    /// Delete every artifact file and forget them. Returns how many files were removed.
    ///
    /// Builds in flight are left alone and still publish their result.
    /// Library clips are never touched.
    pub async fn purge_cache(&self) -> Result<usize, CountdownError> {
        let mut artifacts = self.artifacts.lock().await;
        artifacts.retain(|_, slot| matches!(slot, Slot::Building(_)));

        let mut removed = 0;
        let mut entries = match tokio::fs::read_dir(&self.cache_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let is_artifact = path.extension().is_some_and(|ext| ext == "wav")
                && path
                    .file_stem()
                    .and_then(|stem| stem.to_str())
                    .and_then(Fingerprint::parse)
                    .is_some_and(|fp| !artifacts.contains_key(&fp));
            if is_artifact && entry.file_type().await?.is_file() {
                tokio::fs::remove_file(&path).await?;
                removed += 1;
            }
        }

        info!(removed, cache_dir = %self.cache_dir.display(), "Countdown cache purged");
        Ok(removed)
    }

    // ── Single-flight bookkeeping ──────────────────────────────────

    /// Decide whether this caller reuses, joins or runs the build for `fingerprint`.
    async fn claim(&self, fingerprint: &Fingerprint) -> Claim {
        let mut artifacts = self.artifacts.lock().await;
        match artifacts.get(fingerprint) {
            Some(Slot::Ready(artifact)) if artifact.clip.exists() => {
                return Claim::Ready(artifact.clone());
            }
            Some(Slot::Ready(_)) => {
                warn!(fingerprint = %fingerprint.short(), "Cached countdown missing on disk, rebuilding");
            }
            Some(Slot::Building(rx)) if rx.has_changed().is_ok() => {
                return Claim::Join(rx.clone());
            }
            Some(Slot::Building(_)) | None => {}
        }

        let (tx, rx) = watch::channel(None);
        artifacts.insert(fingerprint.clone(), Slot::Building(rx));
        Claim::Build(tx)
    }

    /// Record the outcome of a build and hand it to every joined caller.
    async fn publish(
        &self,
        fingerprint: &Fingerprint,
        tx: &watch::Sender<BuildOutcome>,
        result: Result<CountdownArtifact, CountdownError>,
    ) -> Result<CountdownArtifact, CountdownError> {
        let mut artifacts = self.artifacts.lock().await;
        match result {
            Ok(artifact) => {
                artifacts.insert(fingerprint.clone(), Slot::Ready(artifact.clone()));
                tx.send_replace(Some(Ok(artifact.clone())));
                Ok(artifact)
            }
            Err(err) => {
                warn!(fingerprint = %fingerprint.short(), error = %err, "Countdown build failed");
                artifacts.remove(fingerprint);
                let err = Arc::new(err);
                tx.send_replace(Some(Err(Arc::clone(&err))));
                Err(CountdownError::BuildFailed(err))
            }
        }
    }

    async fn adopt_or_build(
        &self,
        request: &CountdownRequest,
        fingerprint: &Fingerprint,
    ) -> Result<CountdownArtifact, CountdownError> {
        let target = self.artifact_path(fingerprint);
        if target.is_file() {
            info!(fingerprint = %fingerprint.short(), "Adopting countdown already on disk");
            return Ok(CountdownArtifact {
                fingerprint: fingerprint.clone(),
                clip: AudioClip::new(target),
            });
        }

        let clip = self.build(request, fingerprint, &target).await?;
        Ok(CountdownArtifact {
            fingerprint: fingerprint.clone(),
            clip,
        })
    }

    async fn build(
        &self,
        request: &CountdownRequest,
        fingerprint: &Fingerprint,
        target: &Path,
    ) -> Result<AudioClip, CountdownError> {
        let max_offset = request.max_offset();
        info!(
            fingerprint = %fingerprint.short(),
            participants = request.participants.len(),
            max_offset,
            "Building countdown"
        );

        ensure_directory(&self.cache_dir, DirectoryCreationStrategy::AutoCreate)?;
        let scratch = tempfile::Builder::new()
            .prefix(".build-")
            .tempdir_in(&self.cache_dir)?;
        let scratch_dir = scratch.path();

        let mut segments: Vec<(Segment, AudioClip)> = Vec::with_capacity(max_offset as usize + 2);

        let intro = self
            .speak(&intro_phrase(request), Segment::Intro, scratch_dir)
            .await?;
        segments.push((Segment::Intro, intro));

        for numeral in 1..=max_offset {
            let clip = match self.library.get(numeral).await {
                Some(clip) => clip,
                None => {
                    warn!(numeral, "Numeral missing from library, synthesizing fallback");
                    self.speak(&numeral_phrase(numeral), Segment::Tick(numeral), scratch_dir)
                        .await?
                }
            };
            segments.push((Segment::Tick(numeral), clip));
        }

        let outro = self.speak(OUTRO_PHRASE, Segment::Outro, scratch_dir).await?;
        segments.push((Segment::Outro, outro));

        let clips = self.conform(segments, scratch_dir).await?;

        let staged = scratch_dir.join(fingerprint.artifact_file_name());
        let joined = self.backend.concatenate(&clips, &staged).await?;
        if !joined.exists() {
            return Err(SynthesisError::MissingOutput(joined.path().to_path_buf()).into());
        }

        tokio::fs::rename(joined.path(), target).await?;
        drop(scratch);

        info!(fingerprint = %fingerprint.short(), path = %target.display(), "Countdown cached");
        Ok(AudioClip::new(target))
    }

    /// Synthesize `text` and normalize it to the library format inside scratch.
    async fn speak(
        &self,
        text: &str,
        segment: Segment,
        scratch: &Path,
    ) -> Result<AudioClip, CountdownError> {
        let raw_path = scratch.join(format!("{segment}-raw.{}", self.backend.raw_extension()));
        let raw = self
            .backend
            .synthesize_text(text, self.library.voice(), &raw_path)
            .await?;

        let out = scratch.join(format!("{segment}.wav"));
        let clip = self
            .backend
            .normalize(&raw, self.library.format(), segment.clamp(), &out)
            .await?;
        let _ = tokio::fs::remove_file(raw.path()).await;
        Ok(clip)
    }

    /// Re-encode any segment whose sample layout differs from the library's.
    async fn conform(
        &self,
        segments: Vec<(Segment, AudioClip)>,
        scratch: &Path,
    ) -> Result<Vec<AudioClip>, CountdownError> {
        let expected = self.library.format();
        let mut clips = Vec::with_capacity(segments.len());

        for (segment, clip) in segments {
            let actual = self.backend.probe(&clip).await?;
            if actual == expected {
                clips.push(clip);
                continue;
            }

            debug!(%segment, %actual, %expected, "Re-encoding segment");
            let out = scratch.join(format!("{segment}-conformed.wav"));
            let conformed = self
                .backend
                .normalize(&clip, expected, segment.clamp(), &out)
                .await?;

            let after = self.backend.probe(&conformed).await?;
            if after != expected {
                return Err(SynthesisError::FormatMismatch {
                    path: conformed.path().to_path_buf(),
                    expected,
                    actual: after,
                }
                .into());
            }
            clips.push(conformed);
        }

        Ok(clips)
    }
}
