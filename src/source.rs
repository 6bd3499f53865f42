use std::collections::VecDeque;
use crate::error::SessionError;
/// One rectangular block of multi-channel samples pulled from a board.
///
/// Shape is channels x count; `count` varies per poll and may be zero.
#[derive(Clone, Debug)]
pub struct SampleBlock {
    pub channels: Vec<Vec<f64>>,
}
impl SampleBlock {
    pub fn empty(num_channels: usize) -> Self {
        Self {
            channels: vec![Vec::new(); num_channels],
        }
    }
    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }
    /// Samples per channel. Zero for an empty block.
    pub fn count(&self) -> usize {
        self.channels.first().map(|c| c.len()).unwrap_or(0)
    }
    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }
    /// All channels must carry the same number of samples.
    pub fn validate(&self) -> Result<(), SessionError> {
        let count = self.count();
        if self.channels.iter().any(|c| c.len() != count) {
            return Err(SessionError::Stream(
                "non-rectangular sample block from source".into(),
            ));
        }
        Ok(())
    }
}
/// A board-like producer of sample blocks.
///
/// `pull` drains whatever accumulated since the previous call and never
/// blocks; once drained, samples are gone, so callers must buffer or persist
/// the returned block immediately. `stop` halts the stream and returns the
/// final drain.
pub trait SampleSource {
    fn sample_rate_hz(&self) -> f64;
    fn num_channels(&self) -> usize;
    /// Start the continuous stream. `buffer_size_hint` sizes any
    /// device-internal ring buffer, in samples.
    fn start(&mut self, buffer_size_hint: usize) -> Result<(), SessionError>;
    fn pull(&mut self) -> Result<SampleBlock, SessionError>;
    fn stop(&mut self) -> Result<SampleBlock, SessionError>;
}
/// In-memory source for tests and deterministic playback.
pub struct ManualSource {
    sample_rate_hz: f64,
    num_channels: usize,
    queue: VecDeque<SampleBlock>,
}
impl ManualSource {
    pub fn new(
        sample_rate_hz: f64,
        num_channels: usize,
        blocks: impl IntoIterator<Item = SampleBlock>,
    ) -> Self {
        Self {
            sample_rate_hz,
            num_channels,
            queue: blocks.into_iter().collect(),
        }
    }
}
impl SampleSource for ManualSource {
    fn sample_rate_hz(&self) -> f64 {
        self.sample_rate_hz
    }
    fn num_channels(&self) -> usize {
        self.num_channels
    }
    fn start(&mut self, _buffer_size_hint: usize) -> Result<(), SessionError> {
        Ok(())
    }
    fn pull(&mut self) -> Result<SampleBlock, SessionError> {
        Ok(self
            .queue
            .pop_front()
            .unwrap_or_else(|| SampleBlock::empty(self.num_channels)))
    }
    fn stop(&mut self) -> Result<SampleBlock, SessionError> {
        let mut drained = SampleBlock::empty(self.num_channels);
        while let Some(block) = self.queue.pop_front() {
            for (dst, src) in drained.channels.iter_mut().zip(&block.channels) {
                dst.extend_from_slice(src);
            }
        }
        Ok(drained)
    }
}
