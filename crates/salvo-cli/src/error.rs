//! CLI-specific error types and exit codes.

use salvo_core::{PathError, RosterError, SettingsError};
use salvo_voice::{CountdownError, ErrorKind};
use thiserror::Error;

/// CLI-specific error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Countdown could not be built or played.
    #[error("{0}")]
    Countdown(String),

    /// Invalid roster or timing input.
    #[error("Invalid input: {0}")]
    Arguments(String),

    /// No output device, or a countdown is already running.
    #[error("{0}")]
    Unavailable(String),

    /// IO error (file not found, permission denied, etc.).
    #[error("IO error: {0}")]
    Io(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl CliError {
    /// Map error to an exit code (see sysexits.h).
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Countdown(_) => 1,
            Self::Arguments(_) => 2,   // EX_USAGE
            Self::Unavailable(_) => 69, // EX_UNAVAILABLE
            Self::Io(_) => 74,         // EX_IOERR
            Self::Config(_) => 78,     // EX_CONFIG
        }
    }
}

impl From<CountdownError> for CliError {
    fn from(err: CountdownError) -> Self {
        let msg = err.to_string();
        match err.kind() {
            ErrorKind::InvalidRequest => Self::Arguments(msg),
            ErrorKind::Precondition | ErrorKind::Conflict | ErrorKind::Output => {
                Self::Unavailable(msg)
            }
            ErrorKind::Synthesis => Self::Countdown(msg),
            ErrorKind::Storage => Self::Io(msg),
        }
    }
}

impl From<RosterError> for CliError {
    fn from(err: RosterError) -> Self {
        Self::Arguments(err.to_string())
    }
}

impl From<SettingsError> for CliError {
    fn from(err: SettingsError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<PathError> for CliError {
    fn from(err: PathError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        Self::Config(err.to_string())
    }
}
