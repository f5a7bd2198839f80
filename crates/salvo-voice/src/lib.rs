//! Countdown narration for salvo.
//!
//! - [`SpeechLibrary`]: durable one-second numeral clips
//! - [`CountdownEngine`]: builds and caches one recording per fingerprint
//! - [`CountdownSessions`]: per-channel Idle/Armed state with auto-expiry
//! - [`backend::CommandBackend`] and [`LocalAudioOutput`]: the local adapters

#![deny(unused_crate_dependencies)]

mod audio_thread;

pub mod audio_local;
pub mod backend;
pub mod engine;
pub mod error;
pub mod library;
pub mod playback;
pub mod session;

// Re-export key types for convenience
pub use audio_local::LocalAudioOutput;
pub use backend::CommandBackend;
pub use engine::{CountdownEngine, OUTRO_PHRASE, intro_phrase};
pub use error::{CountdownError, ErrorKind};
pub use library::{NUMERAL_DURATION, SpeechLibrary};
pub use session::{CountdownEvent, CountdownSessions, SessionStatus, StopOutcome};

// Dev-dependencies used only by integration tests
#[cfg(test)]
use mockall as _;
#[cfg(test)]
use tokio_test as _;
