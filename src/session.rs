use std::sync::mpsc::{self, Sender, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use crate::analysis::{AnalysisConfig, ChannelSelector, PafAnalyzer, SpectralResult};
use crate::buffer::{StreamBuffer, WindowFrame};
use crate::config::{BoardKind, SessionConfig};
use crate::cyton::CytonBoard;
use crate::error::SessionError;
use crate::recorder::SessionRecorder;
use crate::source::SampleSource;
use crate::synthetic::SyntheticBoard;
// Device-internal ring buffer hint, in samples (reference value).
const STREAM_BUFFER_HINT: usize = 900_000;
/// Session lifecycle. `Failed` is terminal: a device or sink error mid-stream
/// requires a fresh `connect`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Connected,
    Streaming,
    Stopped,
    Failed,
}
/// Typed notifications for whatever presentation layer is attached.
#[derive(Clone, Debug)]
pub enum SessionEvent {
    StateChanged(SessionState),
    /// Fresh display window, republished once per poll tick.
    WindowUpdated(WindowFrame),
    AnalysisReady(SpectralResult),
    Error(String),
}
/// Commands accepted by the session worker thread.
#[derive(Clone, Debug)]
pub enum SessionCommand {
    Connect,
    Start,
    Stop,
    Analyze(ChannelSelector),
}
/// Owns the state machine and wires source, buffer and recorder together.
///
/// Single-threaded by construction: one controller lives on one thread (the
/// worker spawned by [`spawn`], or a test), so buffer and recorder are never
/// touched concurrently and a tick can never overlap itself.
pub struct SessionController {
    config: SessionConfig,
    events: Sender<SessionEvent>,
    state: SessionState,
    source: Option<Box<dyn SampleSource + Send>>,
    buffer: Option<StreamBuffer>,
    recorder: Option<SessionRecorder>,
    has_recording: bool,
}
impl SessionController {
    pub fn new(config: SessionConfig, events: Sender<SessionEvent>) -> Self {
        Self {
            config,
            events,
            state: SessionState::Idle,
            source: None,
            buffer: None,
            recorder: None,
            has_recording: false,
        }
    }
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }
    pub fn state(&self) -> SessionState {
        self.state
    }
    /// Most recent display window, if a stream has produced one.
    pub fn window(&self) -> Option<WindowFrame> {
        self.buffer
            .as_ref()
            .map(|buffer| buffer.window(self.config.window_seconds))
    }
    fn set_state(&mut self, state: SessionState) {
        if self.state != state {
            log::debug!("session `{}`: {:?} -> {state:?}", self.config.label, self.state);
            self.state = state;
            self.events.send(SessionEvent::StateChanged(state)).ok();
        }
    }
    fn fail(&mut self, error: SessionError) -> SessionError {
        self.events.send(SessionEvent::Error(error.to_string())).ok();
        self.set_state(SessionState::Failed);
        self.source = None;
        self.recorder = None;
        error
    }
    /// Opens the configured board. Valid from `Idle`, `Stopped` or `Failed`;
    /// a connection error leaves the session in `Idle`, retryable.
    pub fn connect(&mut self) -> Result<(), SessionError> {
        match self.state {
            SessionState::Idle | SessionState::Stopped | SessionState::Failed => {}
            state => {
                return Err(SessionError::InvalidState {
                    operation: "connect",
                    state,
                })
            }
        }
        let device = &self.config.device;
        let source: Box<dyn SampleSource + Send> = match &device.board {
            BoardKind::Synthetic => Box::new(SyntheticBoard::open(
                device,
                self.config.channel_map.clone(),
            )?),
            BoardKind::Cyton { port } => Box::new(CytonBoard::open(device, port)?),
        };
        self.connect_with(source)
    }
    /// Connects an already-open source; the seam tests use to inject
    /// deterministic boards.
    pub fn connect_with(
        &mut self,
        source: Box<dyn SampleSource + Send>,
    ) -> Result<(), SessionError> {
        match self.state {
            SessionState::Idle | SessionState::Stopped | SessionState::Failed => {}
            state => {
                return Err(SessionError::InvalidState {
                    operation: "connect",
                    state,
                })
            }
        }
        self.source = Some(source);
        self.set_state(SessionState::Connected);
        Ok(())
    }
    /// Starts the device stream, the recording sink and a fresh history
    /// buffer. Only valid from `Connected`; no implicit auto-connect.
    pub fn start(&mut self) -> Result<(), SessionError> {
        if self.state != SessionState::Connected {
            return Err(SessionError::InvalidState {
                operation: "start",
                state: self.state,
            });
        }
        let recorder = SessionRecorder::open(&self.config.recording_path)?;
        let Some(source) = self.source.as_mut() else {
            return Err(SessionError::InvalidState {
                operation: "start",
                state: self.state,
            });
        };
        let (rate, channels) = (source.sample_rate_hz(), source.num_channels());
        if let Err(error) = source.start(STREAM_BUFFER_HINT) {
            return Err(self.fail(error));
        }
        self.buffer = Some(StreamBuffer::new(channels, rate));
        self.recorder = Some(recorder);
        self.set_state(SessionState::Streaming);
        Ok(())
    }
    /// One poll tick: pull whatever accumulated, persist it, extend the
    /// history, republish the display window. The durable append runs first,
    /// so a write failure aborts the tick with file and buffer still in
    /// agreement; any failure here is terminal for the session.
    pub fn tick(&mut self) -> Result<(), SessionError> {
        if self.state != SessionState::Streaming {
            return Err(SessionError::InvalidState {
                operation: "tick",
                state: self.state,
            });
        }
        let Some(source) = self.source.as_mut() else {
            return Err(SessionError::InvalidState {
                operation: "tick",
                state: self.state,
            });
        };
        let block = match source.pull() {
            Ok(block) => block,
            Err(error) => return Err(self.fail(error)),
        };
        if let Err(error) = self.ingest(block) {
            return Err(self.fail(error));
        }
        Ok(())
    }
    fn ingest(&mut self, block: crate::source::SampleBlock) -> Result<(), SessionError> {
        block.validate()?;
        let (Some(buffer), Some(recorder)) = (self.buffer.as_mut(), self.recorder.as_mut()) else {
            return Err(SessionError::InvalidState {
                operation: "tick",
                state: self.state,
            });
        };
        recorder.append(buffer.next_index(), &block)?;
        buffer.append(&block)?;
        let frame = buffer.window(self.config.window_seconds);
        self.events.send(SessionEvent::WindowUpdated(frame)).ok();
        Ok(())
    }
    /// Stops the stream, drains the device's final block into the recording
    /// and releases the board. The recording stays on disk for `analyze`.
    pub fn stop(&mut self) -> Result<(), SessionError> {
        if self.state != SessionState::Streaming {
            return Err(SessionError::InvalidState {
                operation: "stop",
                state: self.state,
            });
        }
        let Some(source) = self.source.as_mut() else {
            return Err(SessionError::InvalidState {
                operation: "stop",
                state: self.state,
            });
        };
        let final_block = match source.stop() {
            Ok(block) => block,
            Err(error) => return Err(self.fail(error)),
        };
        if let Err(error) = self.ingest(final_block) {
            return Err(self.fail(error));
        }
        self.source = None;
        self.recorder = None;
        self.has_recording = true;
        self.set_state(SessionState::Stopped);
        Ok(())
    }
    /// Computes the PAF of the recording produced by the last stop. May be
    /// repeated; the result is derived, not persisted.
    pub fn analyze(&mut self, selector: ChannelSelector) -> Result<SpectralResult, SessionError> {
        if self.state != SessionState::Stopped || !self.has_recording {
            return Err(SessionError::InvalidState {
                operation: "analyze",
                state: self.state,
            });
        }
        let analyzer = PafAnalyzer::new(
            AnalysisConfig {
                sample_rate_hz: self.config.device.sample_rate_hz,
                ..AnalysisConfig::default()
            },
            self.config.channel_map.clone(),
        );
        let result = analyzer.analyze(&self.config.recording_path, selector)?;
        self.events.send(SessionEvent::AnalysisReady(result)).ok();
        Ok(result)
    }
}
/// Runs a controller on a dedicated worker thread, driving the poll tick at
/// the configured cadence.
///
/// Scheduling: deadlines advance by one interval per tick; a tick that
/// overruns just delays the next one (no skips, no backlog), and because a
/// single thread owns the controller, at most one tick is ever in flight.
/// Stopping the session cancels future ticks; an in-flight tick finishes.
/// The worker exits when the command sender is dropped.
pub fn spawn(
    config: SessionConfig,
    events: Sender<SessionEvent>,
) -> (Sender<SessionCommand>, JoinHandle<()>) {
    let (tx_cmd, rx_cmd) = mpsc::channel::<SessionCommand>();
    let handle = thread::spawn(move || {
        let interval = Duration::from_millis(config.poll_interval_ms.max(1));
        let mut controller = SessionController::new(config, events.clone());
        let mut next_tick = Instant::now();
        loop {
            // Drain a bounded burst of commands per iteration.
            for _ in 0..16 {
                match rx_cmd.try_recv() {
                    Ok(command) => {
                        if let SessionCommand::Start = command {
                            next_tick = Instant::now() + interval;
                        }
                        dispatch(&mut controller, command, &events);
                    }
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => return,
                }
            }
            if controller.state() == SessionState::Streaming {
                let now = Instant::now();
                if now >= next_tick {
                    let _ = controller.tick();
                    next_tick += interval;
                    if next_tick < Instant::now() {
                        // Overrun: push the deadline out, never queue ticks.
                        next_tick = Instant::now();
                    }
                } else {
                    thread::sleep((next_tick - now).min(Duration::from_millis(5)));
                }
            } else {
                // Nothing scheduled; block briefly on the command queue.
                match rx_cmd.recv_timeout(Duration::from_millis(20)) {
                    Ok(command) => {
                        if let SessionCommand::Start = command {
                            next_tick = Instant::now() + interval;
                        }
                        dispatch(&mut controller, command, &events);
                    }
                    Err(mpsc::RecvTimeoutError::Timeout) => {}
                    Err(mpsc::RecvTimeoutError::Disconnected) => return,
                }
            }
        }
    });
    (tx_cmd, handle)
}
fn dispatch(
    controller: &mut SessionController,
    command: SessionCommand,
    events: &Sender<SessionEvent>,
) {
    let outcome = match command {
        SessionCommand::Connect => controller.connect(),
        SessionCommand::Start => controller.start(),
        SessionCommand::Stop => controller.stop(),
        SessionCommand::Analyze(selector) => controller.analyze(selector).map(|_| ()),
    };
    if let Err(error) = outcome {
        events.send(SessionEvent::Error(error.to_string())).ok();
    }
}
