//! Main CLI parser and top-level argument handling.

use std::path::PathBuf;

use clap::Parser;
use salvo_core::{SettingsUpdate, SpeechEngine};

use crate::commands::Commands;

/// Voice-narrated countdowns that get a group to arrive together.
#[derive(Parser)]
#[command(name = "salvo")]
#[command(about = "Plan and narrate synchronized group countdowns")]
#[command(version)]
pub struct Cli {
    /// JSON settings file to load before applying flags
    #[arg(long, global = true, env = "SALVO_SETTINGS")]
    pub settings: Option<PathBuf>,

    /// Override the data directory (library and cache) for this invocation
    #[arg(long = "data-dir", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Voice passed to the speech engine
    #[arg(long, global = true, env = "SALVO_VOICE")]
    pub voice: Option<String>,

    /// Speaking rate in words per minute
    #[arg(long, global = true, env = "SALVO_RATE")]
    pub rate: Option<u32>,

    /// Speech program: "say" or "espeak-ng"
    #[arg(long, global = true, env = "SALVO_ENGINE")]
    pub engine: Option<SpeechEngine>,

    /// Path to the ffmpeg binary
    #[arg(long, global = true, env = "SALVO_FFMPEG")]
    pub ffmpeg: Option<PathBuf>,

    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Settings overrides given on the command line or through the environment.
    #[must_use]
    pub fn settings_update(&self) -> SettingsUpdate {
        SettingsUpdate {
            data_dir: self.data_dir.clone().map(Some),
            voice: self.voice.clone().map(Some),
            speaking_rate: self.rate.map(Some),
            speech_engine: self.engine.map(Some),
            ffmpeg_path: self.ffmpeg.clone().map(Some),
            ..SettingsUpdate::default()
        }
    }
}
