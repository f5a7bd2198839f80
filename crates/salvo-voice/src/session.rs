//! Countdown sessions: one small state machine per output channel.
//!
//! ```text
//!   Idle ──start──▶ Starting ──built + playing──▶ Armed ──stop / expiry / release──▶ Idle
//!                      │                            │
//!                      └──build or play fails──▶ Idle └──start──▶ Conflict (countdown keeps running)
//! ```
//!
//! Status is published through a `watch` channel per channel, so queries
//! answer immediately even while a build holds the channel.
//!
//! Arming schedules an expiry task for `total_duration + buffer`. The task
//! re-enters the controller with the generation it was armed under, so a
//! timer left over from an earlier countdown can never disarm a newer one.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use salvo_core::{AudioOutputPort, ChannelId, CountdownArtifact, CountdownRequest, Fingerprint};
use tokio::sync::{Mutex, mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::engine::CountdownEngine;
use crate::error::CountdownError;

// ── Public types ───────────────────────────────────────────────────

/// Whether a channel has a countdown running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionStatus {
    #[default]
    Idle,
    /// `start` is building or fetching the countdown.
    Starting,
    Armed,
}

/// Result of [`CountdownSessions::stop`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    /// A running countdown was halted.
    Stopped,
    /// The channel was idle.
    NothingToStop,
}

/// Session transitions, for the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CountdownEvent {
    /// Playback started and the expiry timer is running.
    Armed {
        channel: ChannelId,
        fingerprint: Fingerprint,
        expires_in: Duration,
    },
    /// Stopped by a caller or because the connection was released.
    Stopped { channel: ChannelId },
    /// The expiry timer fired.
    Expired { channel: ChannelId },
}

// ── Per-channel state ──────────────────────────────────────────────

#[derive(Default)]
struct ChannelState {
    generation: u64,
    timer: Option<JoinHandle<()>>,
    released: bool,
}

/// One channel: the lock serializing its transitions plus its readable status.
struct Channel {
    status: watch::Sender<SessionStatus>,
    state: Mutex<ChannelState>,
}

impl Channel {
    fn new() -> Self {
        Self {
            status: watch::channel(SessionStatus::Idle).0,
            state: Mutex::new(ChannelState::default()),
        }
    }

    fn status(&self) -> SessionStatus {
        *self.status.borrow()
    }

    fn set(&self, status: SessionStatus) {
        self.status.send_replace(status);
    }

    /// Cancel the timer and return to Idle. Caller holds `state`.
    fn disarm(&self, state: &mut ChannelState) {
        if let Some(timer) = state.timer.take() {
            timer.abort();
        }
        self.set(SessionStatus::Idle);
    }
}

type SharedChannel = Arc<Channel>;

// ── Controller ─────────────────────────────────────────────────────

/// Session controller shared by every channel.
pub struct CountdownSessions {
    this: Weak<Self>,
    engine: Arc<CountdownEngine>,
    output: Arc<dyn AudioOutputPort>,
    expiry_buffer: Duration,
    channels: std::sync::Mutex<HashMap<ChannelId, SharedChannel>>,
    generation: AtomicU64,
    events: mpsc::UnboundedSender<CountdownEvent>,
}

impl CountdownSessions {
    /// Create the controller and the receiver for its events.
    pub fn new(
        engine: Arc<CountdownEngine>,
        output: Arc<dyn AudioOutputPort>,
        expiry_buffer: Duration,
    ) -> (Arc<Self>, mpsc::UnboundedReceiver<CountdownEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        let sessions = Arc::new_cyclic(|this| Self {
            this: this.clone(),
            engine,
            output,
            expiry_buffer,
            channels: std::sync::Mutex::new(HashMap::new()),
            generation: AtomicU64::new(0),
            events,
        });
        (sessions, rx)
    }

    /// Build (or fetch) the countdown for `request` and play it on `channel`.
    ///
    /// Per-channel calls are serialized: a second `start` waits for the first
    /// and then fails with [`CountdownError::AlreadyArmed`]. While the build
    /// runs the channel reports [`SessionStatus::Starting`].
    pub async fn start(
        &self,
        channel: &ChannelId,
        request: &CountdownRequest,
    ) -> Result<CountdownArtifact, CountdownError> {
        if !self.output.is_connected(channel) {
            return Err(CountdownError::NotConnected(channel.clone()));
        }
        request.validate()?;

        let shared = self.channel(channel);
        let mut state = shared.state.lock().await;
        if state.released {
            return Err(CountdownError::NotConnected(channel.clone()));
        }
        if shared.status() == SessionStatus::Armed {
            return Err(CountdownError::AlreadyArmed(channel.clone()));
        }

        shared.set(SessionStatus::Starting);
        let artifact = match self.build_and_play(channel, request).await {
            Ok(artifact) => artifact,
            Err(err) => {
                shared.set(SessionStatus::Idle);
                return Err(err);
            }
        };

        let generation = self.generation.fetch_add(1, Ordering::Relaxed) + 1;
        let expires_in =
            Duration::from_secs(u64::from(request.total_duration)) + self.expiry_buffer;

        state.generation = generation;
        state.timer = Some(self.schedule_expiry(channel.clone(), generation, expires_in));
        shared.set(SessionStatus::Armed);

        info!(
            %channel,
            fingerprint = %artifact.fingerprint.short(),
            expires_in_secs = expires_in.as_secs(),
            "Countdown armed"
        );
        self.emit(CountdownEvent::Armed {
            channel: channel.clone(),
            fingerprint: artifact.fingerprint.clone(),
            expires_in,
        });
        Ok(artifact)
    }

    /// Halt the countdown on `channel`, if any.
    ///
    /// Waits for a `start` in progress on the channel and stops what it armed.
    pub async fn stop(&self, channel: &ChannelId) -> StopOutcome {
        let Some(shared) = self.existing(channel) else {
            return StopOutcome::NothingToStop;
        };
        let mut state = shared.state.lock().await;
        if shared.status() != SessionStatus::Armed {
            return StopOutcome::NothingToStop;
        }

        shared.disarm(&mut state);
        self.output.halt(channel).await;

        info!(%channel, "Countdown stopped");
        self.emit(CountdownEvent::Stopped {
            channel: channel.clone(),
        });
        StopOutcome::Stopped
    }

    /// Current status of `channel`. Never waits on a build in progress.
    pub fn status(&self, channel: &ChannelId) -> SessionStatus {
        self.existing(channel)
            .map_or(SessionStatus::Idle, |shared| shared.status())
    }

    pub fn is_active(&self, channel: &ChannelId) -> bool {
        self.status(channel) == SessionStatus::Armed
    }

    /// Forget `channel` after its output connection went away.
    ///
    /// A running countdown is cancelled. Returns whether one was.
    pub async fn release(&self, channel: &ChannelId) -> bool {
        let Some(shared) = self.lock_channels().remove(channel) else {
            return false;
        };
        let mut state = shared.state.lock().await;
        state.released = true;
        if shared.status() != SessionStatus::Armed {
            return false;
        }

        shared.disarm(&mut state);
        self.output.halt(channel).await;

        info!(%channel, "Countdown cancelled on release");
        self.emit(CountdownEvent::Stopped {
            channel: channel.clone(),
        });
        true
    }

    // ── Internal helpers ───────────────────────────────────────────

    async fn build_and_play(
        &self,
        channel: &ChannelId,
        request: &CountdownRequest,
    ) -> Result<CountdownArtifact, CountdownError> {
        let artifact = self.engine.synthesize_countdown(request).await?;
        self.output.play(channel, &artifact.clip).await?;
        Ok(artifact)
    }

    fn lock_channels(&self) -> MutexGuard<'_, HashMap<ChannelId, SharedChannel>> {
        self.channels.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn channel(&self, channel: &ChannelId) -> SharedChannel {
        let mut channels = self.lock_channels();
        Arc::clone(
            channels
                .entry(channel.clone())
                .or_insert_with(|| Arc::new(Channel::new())),
        )
    }

    fn existing(&self, channel: &ChannelId) -> Option<SharedChannel> {
        self.lock_channels().get(channel).cloned()
    }

    fn schedule_expiry(
        &self,
        channel: ChannelId,
        generation: u64,
        after: Duration,
    ) -> JoinHandle<()> {
        let this = self.this.clone();
        tokio::spawn(async move {
            tokio::time::sleep(after).await;
            if let Some(sessions) = this.upgrade() {
                sessions.expire(&channel, generation).await;
            }
        })
    }

    async fn expire(&self, channel: &ChannelId, generation: u64) {
        let Some(shared) = self.existing(channel) else {
            return;
        };
        let mut state = shared.state.lock().await;
        if shared.status() != SessionStatus::Armed || state.generation != generation {
            debug!(%channel, generation, "Ignoring stale expiry");
            return;
        }

        // Dropping the handle of the task we are running in only detaches it.
        state.timer = None;
        shared.disarm(&mut state);

        info!(%channel, "Countdown expired");
        self.emit(CountdownEvent::Expired {
            channel: channel.clone(),
        });
    }

    fn emit(&self, event: CountdownEvent) {
        let _ = self.events.send(event);
    }
}

impl Drop for CountdownSessions {
    fn drop(&mut self) {
        for shared in self.lock_channels().values() {
            if let Ok(mut state) = shared.state.try_lock() {
                if let Some(timer) = state.timer.take() {
                    timer.abort();
                }
            }
        }
    }
}
