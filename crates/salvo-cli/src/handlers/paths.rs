//! Paths command handler.
//!
//! Displays resolved paths and the effective synthesis settings in
//! `key = value` format.

use anyhow::Result;

use crate::bootstrap::CliContext;

pub fn execute(ctx: &CliContext) -> Result<()> {
    let settings = ctx.settings();
    println!("{}", ctx.paths());
    println!("voice = {}", settings.voice_params().voice);
    println!("speaking_rate = {}", settings.voice_params().rate);
    println!("audio_format = {}", settings.audio_format());
    println!("library_size = {}", settings.effective_library_size());
    println!("speech_engine = {}", settings.effective_speech_engine().program());
    println!("ffmpeg = {}", settings.effective_ffmpeg_path().display());
    Ok(())
}
