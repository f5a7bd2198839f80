//! Countdown error types.

use std::sync::Arc;

use salvo_core::{ChannelId, OutputError, PathError, RequestError, SynthesisError};

/// Errors returned by the library, the engine and the session controller.
#[derive(Debug, thiserror::Error)]
pub enum CountdownError {
    /// Timing input was rejected before any synthesis work.
    #[error("Invalid countdown request: {0}")]
    InvalidRequest(#[from] RequestError),

    /// The channel has no active output connection.
    #[error("Channel {0} is not connected to an audio output")]
    NotConnected(ChannelId),

    /// A countdown is already armed on the channel.
    #[error("A countdown is already running on channel {0}")]
    AlreadyArmed(ChannelId),

    /// The synthesis backend failed; nothing was cached.
    #[error("Synthesis failed: {0}")]
    Synthesis(#[from] SynthesisError),

    /// Playback could not be started.
    #[error("Audio output failed: {0}")]
    Output(#[from] OutputError),

    /// Library or cache directory could not be prepared.
    #[error(transparent)]
    Path(#[from] PathError),

    /// IO error (scratch directories, cache files).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A countdown build failed; every caller that joined it gets this.
    #[error(transparent)]
    BuildFailed(Arc<CountdownError>),
}

/// Coarse classification of a [`CountdownError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidRequest,
    Precondition,
    Conflict,
    Synthesis,
    Output,
    Storage,
}

impl CountdownError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::BuildFailed(inner) => inner.kind(),
            Self::InvalidRequest(_) => ErrorKind::InvalidRequest,
            Self::NotConnected(_) => ErrorKind::Precondition,
            Self::AlreadyArmed(_) => ErrorKind::Conflict,
            Self::Synthesis(_) => ErrorKind::Synthesis,
            Self::Output(_) => ErrorKind::Output,
            Self::Path(_) | Self::Io(_) => ErrorKind::Storage,
        }
    }

    /// The underlying error, looking through shared build failures.
    #[must_use]
    pub fn root_cause(&self) -> &Self {
        match self {
            Self::BuildFailed(inner) => inner.root_cause(),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use salvo_core::SynthesisError;

    use super::*;

    #[test]
    fn shared_build_failure_keeps_kind_and_message() {
        let inner = CountdownError::from(SynthesisError::MissingOutput("out.wav".into()));
        let message = inner.to_string();
        let shared = CountdownError::BuildFailed(Arc::new(inner));

        assert_eq!(shared.kind(), ErrorKind::Synthesis);
        assert_eq!(shared.to_string(), message);
        assert!(matches!(shared.root_cause(), CountdownError::Synthesis(_)));
    }
}
