//! Dedicated audio thread per connected channel.
//!
//! `rodio::OutputStream` is `!Send` on some platforms. Rather than using
//! `unsafe impl Send/Sync`, each [`ClipPlayback`] is confined to one OS thread
//! and driven through commands sent over a channel. [`AudioThreadHandle`] is
//! the `Send + Sync` proxy the output adapter holds.

use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;

use salvo_core::OutputError;

use crate::playback::ClipPlayback;

// ── Commands ───────────────────────────────────────────────────────

enum AudioCommand {
    /// Start playing a file, replacing current playback.
    Play {
        path: PathBuf,
        reply: mpsc::Sender<Result<(), OutputError>>,
    },

    /// Stop any active playback (fire-and-forget).
    Halt,

    /// Query whether audio is currently playing.
    IsPlaying { reply: mpsc::Sender<bool> },

    /// Shut down the audio thread, releasing the device.
    Shutdown,
}

// ── Handle (Send + Sync proxy) ─────────────────────────────────────

/// `Send + Sync` handle to one audio thread.
///
/// Request-reply methods block the caller until the audio thread responds;
/// that is only local channel I/O plus opening a file.
pub struct AudioThreadHandle {
    cmd_tx: mpsc::Sender<AudioCommand>,
    thread: Option<thread::JoinHandle<()>>,
}

impl AudioThreadHandle {
    /// Spawn the audio thread, open the output device on it and return the handle.
    pub fn spawn(name: &str) -> Result<Self, OutputError> {
        let (cmd_tx, cmd_rx) = mpsc::channel::<AudioCommand>();
        let (init_tx, init_rx) = mpsc::channel::<Result<(), OutputError>>();

        let thread = thread::Builder::new()
            .name(format!("salvo-audio-{name}"))
            .spawn(move || Self::run(&cmd_rx, &init_tx))
            .map_err(|e| OutputError::Playback(format!("failed to spawn audio thread: {e}")))?;

        init_rx.recv().map_err(|_| thread_died())??;

        Ok(Self {
            cmd_tx,
            thread: Some(thread),
        })
    }

    pub fn play(&self, path: PathBuf) -> Result<(), OutputError> {
        let (reply, rx) = mpsc::channel();
        self.cmd_tx
            .send(AudioCommand::Play { path, reply })
            .map_err(|_| thread_died())?;
        rx.recv().map_err(|_| thread_died())?
    }

    pub fn halt(&self) {
        let _ = self.cmd_tx.send(AudioCommand::Halt);
    }

    pub fn is_playing(&self) -> bool {
        let (reply, rx) = mpsc::channel();
        if self.cmd_tx.send(AudioCommand::IsPlaying { reply }).is_err() {
            return false;
        }
        rx.recv().unwrap_or(false)
    }

    // ── Audio thread event loop ────────────────────────────────────

    fn run(cmd_rx: &mpsc::Receiver<AudioCommand>, init_tx: &mpsc::Sender<Result<(), OutputError>>) {
        let mut playback = match ClipPlayback::new() {
            Ok(p) => p,
            Err(e) => {
                let _ = init_tx.send(Err(e));
                return;
            }
        };
        if init_tx.send(Ok(())).is_err() {
            return;
        }

        while let Ok(cmd) = cmd_rx.recv() {
            match cmd {
                AudioCommand::Play { path, reply } => {
                    let _ = reply.send(playback.play(&path));
                }
                AudioCommand::Halt => playback.stop(),
                AudioCommand::IsPlaying { reply } => {
                    let _ = reply.send(playback.is_playing());
                }
                AudioCommand::Shutdown => break,
            }
        }

        // `playback` is dropped here, on the audio thread.
        tracing::debug!("Audio thread shutting down");
    }
}

impl Drop for AudioThreadHandle {
    fn drop(&mut self) {
        let _ = self.cmd_tx.send(AudioCommand::Shutdown);
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }
}

fn thread_died() -> OutputError {
    OutputError::Playback("audio thread stopped".to_string())
}
