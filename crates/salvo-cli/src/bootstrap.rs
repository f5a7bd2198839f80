//! CLI bootstrap - the composition root.
//!
//! This module is the only place where infrastructure is wired together:
//! - Settings (file, then flag/env overrides, then validation)
//! - Path resolution
//! - The command synthesis backend, numeral library and countdown engine
//!
//! Command handlers receive the composed context and delegate work to it.

use std::path::Path;
use std::sync::Arc;

use salvo_core::{
    ResolvedPaths, Settings, SettingsUpdate, SynthesisBackend, validate_settings,
};
use salvo_voice::{CommandBackend, CountdownEngine, SpeechLibrary};
use tracing::debug;

use crate::error::CliError;

/// Bootstrap configuration for the CLI.
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Effective settings after file and overrides.
    pub settings: Settings,
    /// Resolved data, library and cache directories.
    pub paths: ResolvedPaths,
}

impl CliConfig {
    /// Defaults, optionally overlaid with a JSON settings file, then `overrides`.
    pub fn load(settings_file: Option<&Path>, overrides: &SettingsUpdate) -> Result<Self, CliError> {
        let mut settings = Settings::with_defaults();
        if let Some(file) = settings_file {
            let contents = std::fs::read_to_string(file)
                .map_err(|e| CliError::Config(format!("{}: {e}", file.display())))?;
            let from_file: Settings = serde_json::from_str(&contents)
                .map_err(|e| CliError::Config(format!("{}: {e}", file.display())))?;
            settings = overlay(settings, from_file);
        }
        settings.merge(overrides);
        validate_settings(&settings)?;

        let paths = ResolvedPaths::resolve_with_data_dir(settings.data_dir.as_deref())?;
        Ok(Self { settings, paths })
    }
}

/// Fields set in `file` replace the defaults; unset ones keep them.
fn overlay(defaults: Settings, file: Settings) -> Settings {
    Settings {
        data_dir: file.data_dir.or(defaults.data_dir),
        voice: file.voice.or(defaults.voice),
        speaking_rate: file.speaking_rate.or(defaults.speaking_rate),
        sample_rate: file.sample_rate.or(defaults.sample_rate),
        channels: file.channels.or(defaults.channels),
        library_size: file.library_size.or(defaults.library_size),
        expiry_buffer_secs: file.expiry_buffer_secs.or(defaults.expiry_buffer_secs),
        speech_engine: file.speech_engine.or(defaults.speech_engine),
        ffmpeg_path: file.ffmpeg_path.or(defaults.ffmpeg_path),
    }
}

/// Fully composed context for CLI commands.
pub struct CliContext {
    pub config: CliConfig,
    pub backend: Arc<dyn SynthesisBackend>,
    pub library: Arc<SpeechLibrary>,
    pub engine: Arc<CountdownEngine>,
}

impl CliContext {
    pub const fn settings(&self) -> &Settings {
        &self.config.settings
    }

    pub const fn paths(&self) -> &ResolvedPaths {
        &self.config.paths
    }
}

/// Wire the backend, library and engine. Creates no files.
pub fn bootstrap(config: CliConfig) -> CliContext {
    let settings = &config.settings;
    let backend: Arc<dyn SynthesisBackend> = Arc::new(CommandBackend::from_settings(settings));
    debug!(
        engine = settings.effective_speech_engine().program(),
        ffmpeg = %settings.effective_ffmpeg_path().display(),
        "Synthesis backend configured"
    );

    let library = Arc::new(SpeechLibrary::new(
        config.paths.library_dir.clone(),
        settings.effective_library_size(),
        settings.audio_format(),
        settings.voice_params(),
        Arc::clone(&backend),
    ));
    let engine = Arc::new(CountdownEngine::new(
        Arc::clone(&backend),
        Arc::clone(&library),
        config.paths.cache_dir.clone(),
    ));

    CliContext {
        config,
        backend,
        library,
        engine,
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use salvo_core::SpeechEngine;
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn file_values_override_defaults_and_flags_override_file() {
        let tmp = tempdir().unwrap();
        let file = tmp.path().join("settings.json");
        std::fs::write(
            &file,
            r#"{ "voice": "Alex", "speech_engine": "espeak-ng", "data_dir": "/srv/salvo" }"#,
        )
        .unwrap();

        let overrides = SettingsUpdate {
            voice: Some(Some("Daniel".to_string())),
            ..SettingsUpdate::default()
        };
        let config = CliConfig::load(Some(&file), &overrides).unwrap();

        assert_eq!(config.settings.voice.as_deref(), Some("Daniel"));
        assert_eq!(config.settings.speech_engine, Some(SpeechEngine::EspeakNg));
        assert_eq!(config.settings.speaking_rate, Some(170));
        assert_eq!(config.paths.cache_dir, PathBuf::from("/srv/salvo/cache"));
    }

    #[test]
    fn invalid_settings_are_a_config_error() {
        let overrides = SettingsUpdate {
            speaking_rate: Some(Some(5)),
            data_dir: Some(Some(PathBuf::from("/srv/salvo"))),
            ..SettingsUpdate::default()
        };
        let err = CliConfig::load(None, &overrides).unwrap_err();
        assert_eq!(err.exit_code(), 78);
    }

    #[test]
    fn unreadable_settings_file_is_reported() {
        let err = CliConfig::load(Some(Path::new("/nonexistent/salvo.json")), &SettingsUpdate::default())
            .unwrap_err();
        assert!(matches!(err, CliError::Config(msg) if msg.contains("salvo.json")));
    }

    #[test]
    fn bootstrap_wires_library_into_data_dir() {
        let tmp = tempdir().unwrap();
        let overrides = SettingsUpdate {
            data_dir: Some(Some(tmp.path().to_path_buf())),
            library_size: Some(Some(12)),
            ..SettingsUpdate::default()
        };
        let ctx = bootstrap(CliConfig::load(None, &overrides).unwrap());

        assert_eq!(ctx.library.dir(), tmp.path().join("library"));
        assert_eq!(ctx.library.size(), 12);
        assert_eq!(ctx.engine.cache_dir(), tmp.path().join("cache"));
        assert!(!tmp.path().join("library").exists());
    }
}
