//! Subprocess backend: a local speech program plus ffmpeg.
//!
//! Every operation writes exactly the output path it is given. Programs are
//! spawned directly (no shell), so text and paths need no quoting.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use salvo_core::{
    AudioClip, AudioFormat, Settings, SpeechEngine, SynthesisBackend, SynthesisError, VoiceParams,
};
use tokio::process::Command;
use tracing::{debug, trace};

/// [`SynthesisBackend`] driving `say`/`espeak-ng` and `ffmpeg`.
#[derive(Debug, Clone)]
pub struct CommandBackend {
    engine: SpeechEngine,
    ffmpeg: PathBuf,
}

impl CommandBackend {
    pub fn new(engine: SpeechEngine, ffmpeg: impl Into<PathBuf>) -> Self {
        Self {
            engine,
            ffmpeg: ffmpeg.into(),
        }
    }

    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            settings.effective_speech_engine(),
            settings.effective_ffmpeg_path(),
        )
    }

    #[must_use]
    pub const fn engine(&self) -> SpeechEngine {
        self.engine
    }

    fn speech_args(&self, text: &str, voice: &VoiceParams, output: &Path) -> Vec<OsString> {
        let (out_flag, rate_flag) = match self.engine {
            SpeechEngine::Say => ("-o", "-r"),
            SpeechEngine::EspeakNg => ("-w", "-s"),
        };
        vec![
            out_flag.into(),
            output.into(),
            "-v".into(),
            voice.voice.clone().into(),
            rate_flag.into(),
            voice.rate.to_string().into(),
            text.into(),
        ]
    }
}

#[async_trait]
impl SynthesisBackend for CommandBackend {
    fn raw_extension(&self) -> &'static str {
        match self.engine {
            SpeechEngine::Say => "aiff",
            SpeechEngine::EspeakNg => "wav",
        }
    }

    async fn synthesize_text(
        &self,
        text: &str,
        voice: &VoiceParams,
        output: &Path,
    ) -> Result<AudioClip, SynthesisError> {
        debug!(
            engine = self.engine.program(),
            voice = %voice.voice,
            rate = voice.rate,
            "Synthesizing text"
        );
        run(
            Path::new(self.engine.program()),
            self.speech_args(text, voice, output),
        )
        .await?;
        produced(output)
    }

    async fn normalize(
        &self,
        clip: &AudioClip,
        format: AudioFormat,
        clamp: Option<Duration>,
        output: &Path,
    ) -> Result<AudioClip, SynthesisError> {
        run(&self.ffmpeg, normalize_args(clip.path(), format, clamp, output)).await?;
        produced(output)
    }

    async fn concatenate(
        &self,
        clips: &[AudioClip],
        output: &Path,
    ) -> Result<AudioClip, SynthesisError> {
        if clips.is_empty() {
            return Err(SynthesisError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "nothing to concatenate",
            )));
        }

        let list = output.with_extension("concat.txt");
        tokio::fs::write(&list, concat_list(clips)).await?;

        let args: Vec<OsString> = vec![
            "-y".into(),
            "-loglevel".into(),
            "error".into(),
            "-f".into(),
            "concat".into(),
            "-safe".into(),
            "0".into(),
            "-i".into(),
            list.clone().into(),
            "-c:a".into(),
            "pcm_s16le".into(),
            output.into(),
        ];
        let result = run(&self.ffmpeg, args).await;
        let _ = tokio::fs::remove_file(&list).await;
        result?;
        produced(output)
    }

    async fn probe(&self, clip: &AudioClip) -> Result<AudioFormat, SynthesisError> {
        let path = clip.path().to_path_buf();
        let probe_path = path.clone();
        let spec = tokio::task::spawn_blocking(move || {
            hound::WavReader::open(&probe_path).map(|reader| reader.spec())
        })
        .await
        .map_err(|e| SynthesisError::Probe {
            path: path.clone(),
            reason: e.to_string(),
        })?
        .map_err(|e| SynthesisError::Probe {
            path: path.clone(),
            reason: e.to_string(),
        })?;

        Ok(AudioFormat::new(spec.sample_rate, spec.channels))
    }
}

// ── Helpers ────────────────────────────────────────────────────────

/// Run `program` to completion, turning spawn failures and non-zero exits into errors.
async fn run(program: &Path, args: Vec<OsString>) -> Result<(), SynthesisError> {
    let name = program.display().to_string();
    trace!(program = %name, ?args, "Spawning");

    let output = Command::new(program)
        .args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound | std::io::ErrorKind::PermissionDenied => {
                SynthesisError::Unavailable(format!("{name}: {e}"))
            }
            _ => SynthesisError::Io(e),
        })?;

    if !output.status.success() {
        return Err(SynthesisError::CommandFailed {
            program: name,
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(())
}

fn produced(output: &Path) -> Result<AudioClip, SynthesisError> {
    if output.is_file() {
        Ok(AudioClip::new(output))
    } else {
        Err(SynthesisError::MissingOutput(output.to_path_buf()))
    }
}

fn normalize_args(
    input: &Path,
    format: AudioFormat,
    clamp: Option<Duration>,
    output: &Path,
) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec![
        "-y".into(),
        "-loglevel".into(),
        "error".into(),
        "-i".into(),
        input.into(),
    ];
    if let Some(duration) = clamp {
        let secs = duration.as_secs_f64();
        args.push("-af".into());
        args.push(format!("apad=pad_dur={secs},atrim=0:{secs}").into());
    }
    args.extend([
        "-ar".into(),
        format.sample_rate.to_string().into(),
        "-ac".into(),
        format.channels.to_string().into(),
        "-c:a".into(),
        "pcm_s16le".into(),
        output.into(),
    ]);
    args
}

/// ffmpeg concat demuxer list; single quotes inside paths become `'\''`.
fn concat_list(clips: &[AudioClip]) -> String {
    clips
        .iter()
        .map(|clip| {
            let path = clip.path().to_string_lossy().replace('\'', r"'\''");
            format!("file '{path}'\n")
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn as_strings(args: &[OsString]) -> Vec<String> {
        args.iter().map(|a| a.to_string_lossy().into_owned()).collect()
    }

    #[test]
    fn say_and_espeak_use_their_own_flags() {
        let voice = VoiceParams::new("Samantha", 170);
        let out = Path::new("/tmp/out.aiff");

        let say = CommandBackend::new(SpeechEngine::Say, "ffmpeg");
        assert_eq!(
            as_strings(&say.speech_args("3.", &voice, out)),
            ["-o", "/tmp/out.aiff", "-v", "Samantha", "-r", "170", "3."]
        );
        assert_eq!(say.raw_extension(), "aiff");

        let espeak = CommandBackend::new(SpeechEngine::EspeakNg, "ffmpeg");
        assert_eq!(
            as_strings(&espeak.speech_args("3.", &voice, out)),
            ["-w", "/tmp/out.aiff", "-v", "Samantha", "-s", "170", "3."]
        );
        assert_eq!(espeak.raw_extension(), "wav");
    }

    #[test]
    fn clamped_normalize_pads_then_trims() {
        let args = as_strings(&normalize_args(
            Path::new("in.aiff"),
            AudioFormat::new(48_000, 2),
            Some(Duration::from_secs(1)),
            Path::new("out.wav"),
        ));
        let af = args.iter().position(|a| a == "-af").unwrap();
        assert_eq!(args[af + 1], "apad=pad_dur=1,atrim=0:1");
        assert!(args.windows(2).any(|w| w == ["-ar", "48000"]));
        assert!(args.windows(2).any(|w| w == ["-ac", "2"]));
        assert_eq!(args.last().map(String::as_str), Some("out.wav"));
    }

    #[test]
    fn unclamped_normalize_has_no_filter() {
        let args = as_strings(&normalize_args(
            Path::new("in.aiff"),
            AudioFormat::new(22_050, 1),
            None,
            Path::new("out.wav"),
        ));
        assert!(!args.iter().any(|a| a == "-af"));
    }

    #[test]
    fn concat_list_escapes_single_quotes() {
        let clips = [AudioClip::new("/a/intro.wav"), AudioClip::new("/b/it's.wav")];
        assert_eq!(
            concat_list(&clips),
            "file '/a/intro.wav'\nfile '/b/it'\\''s.wav'\n"
        );
    }

    #[tokio::test]
    async fn missing_program_is_unavailable() {
        let err = run(Path::new("salvo-no-such-program"), vec![]).await.unwrap_err();
        assert!(matches!(err, SynthesisError::Unavailable(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn probe_reads_wav_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.wav");
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 16_000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        for _ in 0..160 {
            writer.write_sample(0i16).unwrap();
        }
        writer.finalize().unwrap();

        let backend = CommandBackend::new(SpeechEngine::EspeakNg, "ffmpeg");
        let format = backend.probe(&AudioClip::new(&path)).await.unwrap();
        assert_eq!(format, AudioFormat::new(16_000, 1));

        let bogus = dir.path().join("bogus.wav");
        std::fs::write(&bogus, b"not audio").unwrap();
        assert!(matches!(
            backend.probe(&AudioClip::new(&bogus)).await,
            Err(SynthesisError::Probe { .. })
        ));
    }
}
