use thiserror::Error;
use crate::session::SessionState;
/// Errors surfaced by the session controller and its collaborators.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to open board: {0}")]
    Connection(String),
    #[error("device stream failure: {0}")]
    Stream(String),
    #[error("failed to append to recording: {0}")]
    DurableWrite(#[source] std::io::Error),
    #[error("operation `{operation}` is not valid in state {state:?}")]
    InvalidState {
        operation: &'static str,
        state: SessionState,
    },
    #[error(transparent)]
    Analysis(#[from] AnalysisError),
}
/// Errors raised when a recorded session cannot be analyzed.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("failed to read recording: {0}")]
    Read(#[source] std::io::Error),
    #[error("recording is empty")]
    Empty,
    #[error("malformed recording at line {line}: {reason}")]
    Malformed { line: usize, reason: String },
    #[error("recording has {got} samples but one analysis segment needs {needed}")]
    TooShort { needed: usize, got: usize },
    #[error("channel {channel} out of range for a {available}-channel recording")]
    ChannelOutOfRange { channel: usize, available: usize },
    #[error("no channel satisfies the selector")]
    NoSuchChannel,
    #[error("invalid analysis band [{low}, {high}] Hz at {fs} Hz sampling")]
    InvalidBand { low: f64, high: f64, fs: f64 },
}
