//! Launch command handler: play the countdown locally through a session.
//!
//! The local output device is "connected" as a single channel for the
//! duration of the command. Expiry only disarms the session; the command
//! keeps the device open until the recording has finished playing. Ctrl-C
//! stops the countdown at any point.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use salvo_core::ChannelId;
use salvo_voice::{CountdownEvent, CountdownSessions, LocalAudioOutput, StopOutcome};
use tracing::debug;

use crate::bootstrap::CliContext;
use crate::commands::PlanArgs;
use crate::error::CliError;
use crate::handlers::roster::plan_from;

const LOCAL_CHANNEL: &str = "local";

/// How often playback is checked after the session expired.
const DRAIN_POLL: Duration = Duration::from_millis(200);

pub async fn execute(ctx: &CliContext, args: &PlanArgs) -> Result<()> {
    let request = plan_from(args)?;
    let channel = ChannelId::from(LOCAL_CHANNEL);

    let output = Arc::new(LocalAudioOutput::new());
    output.connect(&channel).map_err(|e| CliError::Unavailable(e.to_string()))?;

    let buffer = Duration::from_secs(ctx.settings().effective_expiry_buffer_secs());
    let (sessions, mut events) =
        CountdownSessions::new(Arc::clone(&ctx.engine), output.clone(), buffer);

    let result = run(&sessions, &output, &mut events, &channel, &request).await;

    sessions.release(&channel).await;
    output.disconnect(&channel);
    result
}

async fn run(
    sessions: &CountdownSessions,
    output: &LocalAudioOutput,
    events: &mut tokio::sync::mpsc::UnboundedReceiver<CountdownEvent>,
    channel: &ChannelId,
    request: &salvo_core::CountdownRequest,
) -> Result<()> {
    println!("Preparing countdown for {} players...", request.participants.len());
    let artifact = sessions
        .start(channel, request)
        .await
        .map_err(CliError::from)?;
    println!(
        "Playing {} ({}s). Press Ctrl-C to stop.",
        artifact.fingerprint.short(),
        request.total_duration
    );

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Some(CountdownEvent::Expired { .. }) | None => break,
                Some(CountdownEvent::Stopped { .. }) => return Ok(()),
                Some(other) => debug!(?other, "Session event"),
            },
            signal = tokio::signal::ctrl_c() => {
                signal?;
                if sessions.stop(channel).await == StopOutcome::Stopped {
                    println!("Countdown stopped");
                }
                return Ok(());
            }
        }
    }

    // The recording can outlast the timer; let it finish.
    tokio::select! {
        () = wait_for_playback(|| output.is_playing(channel), DRAIN_POLL) => {
            println!("Countdown complete");
        }
        signal = tokio::signal::ctrl_c() => {
            signal?;
            println!("Countdown stopped");
        }
    }
    Ok(())
}

/// Resolve once `is_playing` reports false, checking every `poll`.
async fn wait_for_playback(is_playing: impl Fn() -> bool, poll: Duration) {
    while is_playing() {
        tokio::time::sleep(poll).await;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[tokio::test]
    async fn waits_until_playback_finishes() {
        let checks = AtomicUsize::new(0);
        let still_playing = || checks.fetch_add(1, Ordering::SeqCst) < 3;

        wait_for_playback(still_playing, Duration::from_millis(1)).await;
        assert_eq!(checks.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn returns_at_once_when_nothing_is_playing() {
        let checks = AtomicUsize::new(0);
        let result = tokio::time::timeout(
            Duration::from_secs(1),
            wait_for_playback(
                || {
                    checks.fetch_add(1, Ordering::SeqCst);
                    false
                },
                Duration::from_secs(60),
            ),
        )
        .await;

        tokio_test::assert_ok!(result);
        assert_eq!(checks.load(Ordering::SeqCst), 1);
    }
}
