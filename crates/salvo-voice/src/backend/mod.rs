//! Concrete synthesis backends.
//!
//! The engine and library only see [`SynthesisBackend`](salvo_core::SynthesisBackend)
//! trait objects, so backends can be swapped without touching either.
//!
//! | Module      | Speech             | Processing       | Probe   |
//! |-------------|--------------------|------------------|---------|
//! | [`command`] | `say` / `espeak-ng`| `ffmpeg`         | `hound` |

pub mod command;

pub use command::CommandBackend;
