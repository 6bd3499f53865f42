//! Acquisition, recording and spectral-analysis core for an EEG
//! neurofeedback session: stream multi-channel samples from a board, keep a
//! full session history plus a bounded display window, append every block to
//! a tab-separated recording, and compute the Peak Alpha Frequency of a
//! recorded session on demand.
pub mod analysis;
pub mod buffer;
pub mod config;
pub mod cyton;
pub mod dsp;
pub mod error;
pub mod recorder;
pub mod session;
pub mod source;
pub mod synthetic;
pub use analysis::{AnalysisConfig, ChannelSelector, PafAnalyzer, SpectralResult};
pub use buffer::{StreamBuffer, WindowFrame};
pub use config::{BoardKind, ChannelMap, ChannelRole, DeviceConfig, SessionConfig};
pub use cyton::CytonBoard;
pub use error::{AnalysisError, SessionError};
pub use recorder::SessionRecorder;
pub use session::{spawn, SessionCommand, SessionController, SessionEvent, SessionState};
pub use source::{ManualSource, SampleBlock, SampleSource};
pub use synthetic::SyntheticBoard;
