//! Scripted stand-in for the registration/session UI: runs one short
//! session against the configured board (synthetic by default), then prints
//! the Peak Alpha Frequency of the recording.
//!
//! Usage: `neuroback [session-config.json]`
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::{Duration, Instant};
use anyhow::{bail, Context, Result};
use neuroback::{ChannelSelector, SessionCommand, SessionConfig, SessionEvent};
const STREAM_SECONDS: u64 = 3;
fn main() -> Result<()> {
    env_logger::init();
    let config = match std::env::args().nth(1) {
        Some(path) => {
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config {path}"))?;
            serde_json::from_str::<SessionConfig>(&text)
                .with_context(|| format!("invalid session config in {path}"))?
        }
        None => SessionConfig::default(),
    };
    log::info!(
        "session `{}` -> {}",
        config.label,
        config.recording_path.display()
    );
    let (events_tx, events_rx) = mpsc::channel();
    let (commands, worker) = neuroback::spawn(config, events_tx);
    let send = |command: SessionCommand| {
        commands
            .send(command)
            .map_err(|_| anyhow::anyhow!("session worker exited early"))
    };
    send(SessionCommand::Connect)?;
    send(SessionCommand::Start)?;
    std::thread::sleep(Duration::from_secs(STREAM_SECONDS));
    send(SessionCommand::Stop)?;
    send(SessionCommand::Analyze(ChannelSelector::RestEeg))?;
    let deadline = Instant::now() + Duration::from_secs(30);
    let mut outcome = None;
    while Instant::now() < deadline {
        match events_rx.recv_timeout(Duration::from_millis(200)) {
            Ok(SessionEvent::AnalysisReady(result)) => {
                outcome = Some(result);
                break;
            }
            Ok(SessionEvent::StateChanged(state)) => log::info!("state: {state:?}"),
            Ok(SessionEvent::WindowUpdated(frame)) => {
                log::debug!("window: {} samples", frame.len())
            }
            Ok(SessionEvent::Error(message)) => bail!("session failed: {message}"),
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => bail!("session worker exited early"),
        }
    }
    drop(commands);
    worker.join().ok();
    let result = outcome.context("no analysis result before the deadline")?;
    println!(
        "PAF: {:.2} Hz (band {:.0}-{:.0} Hz, channel {})",
        result.peak_hz, result.band_hz.0, result.band_hz.1, result.channel
    );
    Ok(())
}
