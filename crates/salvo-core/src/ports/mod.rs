//! Port definitions (trait abstractions) for external systems.
//!
//! Ports define the interfaces that the countdown engine and session
//! controller expect from infrastructure. They contain no implementation
//! details and use only domain types.
//!
//! # Design Rules
//!
//! - No subprocess, codec or audio-device types in any signature
//! - Every backend call is awaitable and returns a typed error
//! - Failures never leave partially written state behind the port

pub mod audio_output;
pub mod synthesis;

pub use audio_output::{AudioOutputPort, OutputError};
pub use synthesis::{SynthesisBackend, SynthesisError};
