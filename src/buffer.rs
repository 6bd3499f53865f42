use crate::error::SessionError;
use crate::source::SampleBlock;
/// Display-ready slice of the most recent samples.
///
/// All traces share one time axis in seconds (`sample index / rate`).
#[derive(Clone, Debug, PartialEq)]
pub struct WindowFrame {
    pub time_s: Vec<f64>,
    /// channels x samples, device channel order.
    pub traces: Vec<Vec<f64>>,
}
impl WindowFrame {
    pub fn len(&self) -> usize {
        self.time_s.len()
    }
    pub fn is_empty(&self) -> bool {
        self.time_s.is_empty()
    }
}
/// Full-history store for one streaming session.
///
/// Unlike a ring buffer, history only ever grows: every appended sample keeps
/// its global index for the lifetime of the session, and the display window
/// is a view over the tail, not a separate store. Memory is bounded only by
/// session duration, which is acceptable at the minutes-long reference scale.
pub struct StreamBuffer {
    per_channel: Vec<Vec<f64>>,
    sample_rate_hz: f64,
}
impl StreamBuffer {
    pub fn new(num_channels: usize, sample_rate_hz: f64) -> Self {
        Self {
            per_channel: vec![Vec::new(); num_channels],
            sample_rate_hz,
        }
    }
    pub fn sample_rate_hz(&self) -> f64 {
        self.sample_rate_hz
    }
    pub fn num_channels(&self) -> usize {
        self.per_channel.len()
    }
    /// Samples appended so far; also the index the next sample will get.
    pub fn next_index(&self) -> u64 {
        self.per_channel.first().map(|c| c.len() as u64).unwrap_or(0)
    }
    pub fn len(&self) -> usize {
        self.per_channel.first().map(|c| c.len()).unwrap_or(0)
    }
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
    /// Extends every channel by the block's samples. An empty block is a
    /// no-op; a block with the wrong channel count is rejected.
    pub fn append(&mut self, block: &SampleBlock) -> Result<(), SessionError> {
        block.validate()?;
        if block.is_empty() {
            return Ok(());
        }
        if block.num_channels() != self.per_channel.len() {
            return Err(SessionError::Stream(format!(
                "channel count mismatch: buffer has {}, block has {}",
                self.per_channel.len(),
                block.num_channels()
            )));
        }
        for (history, new_samples) in self.per_channel.iter_mut().zip(&block.channels) {
            history.extend_from_slice(new_samples);
        }
        Ok(())
    }
    /// Last `floor(seconds * rate)` samples of every channel, or the whole
    /// history while it is still shorter than that.
    pub fn window(&self, seconds: f64) -> WindowFrame {
        let plot_length = (seconds * self.sample_rate_hz).floor() as usize;
        let len = self.len();
        let take = plot_length.min(len);
        let start = len - take;
        let time_s = (start..len)
            .map(|i| i as f64 / self.sample_rate_hz)
            .collect();
        let traces = self
            .per_channel
            .iter()
            .map(|history| history[start..].to_vec())
            .collect();
        WindowFrame { time_s, traces }
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    fn block(values: Vec<Vec<f64>>) -> SampleBlock {
        SampleBlock { channels: values }
    }
    #[test]
    fn history_length_is_the_sum_of_block_counts() {
        let mut buffer = StreamBuffer::new(2, 250.0);
        for count in [3usize, 0, 7, 5] {
            let values: Vec<f64> = (0..count).map(|i| i as f64).collect();
            buffer
                .append(&block(vec![values.clone(), values]))
                .unwrap();
        }
        assert_eq!(buffer.len(), 15);
        assert_eq!(buffer.next_index(), 15);
    }
    #[test]
    fn empty_block_changes_nothing() {
        let mut buffer = StreamBuffer::new(3, 250.0);
        buffer
            .append(&block(vec![vec![1.0], vec![2.0], vec![3.0]]))
            .unwrap();
        let before = buffer.window(1.0);
        buffer.append(&SampleBlock::empty(3)).unwrap();
        assert_eq!(buffer.len(), 1);
        assert_eq!(buffer.window(1.0), before);
    }
    #[test]
    fn channel_mismatch_is_rejected() {
        let mut buffer = StreamBuffer::new(2, 250.0);
        assert!(buffer.append(&block(vec![vec![1.0]])).is_err());
        assert_eq!(buffer.len(), 0);
    }
    #[test]
    fn window_is_bounded_by_history() {
        let mut buffer = StreamBuffer::new(1, 100.0);
        buffer
            .append(&block(vec![(0..30).map(|i| i as f64).collect()]))
            .unwrap();
        // More than history: whole history comes back.
        assert_eq!(buffer.window(1.0).len(), 30);
        // Less than history: floor(0.1 * 100) = 10 samples.
        assert_eq!(buffer.window(0.1).len(), 10);
        assert_eq!(buffer.window(0.0).len(), 0);
    }
    #[test]
    fn window_keeps_global_time_axis() {
        let mut buffer = StreamBuffer::new(1, 100.0);
        buffer
            .append(&block(vec![(1..=10).map(|i| i as f64).collect()]))
            .unwrap();
        buffer
            .append(&block(vec![(11..=20).map(|i| i as f64).collect()]))
            .unwrap();
        buffer
            .append(&block(vec![(21..=30).map(|i| i as f64).collect()]))
            .unwrap();
        let frame = buffer.window(0.1);
        let expected: Vec<f64> = (21..=30).map(|i| i as f64).collect();
        assert_eq!(frame.traces[0], expected);
        // Last 10 of 30 samples start at index 20 -> t = 0.20 s at 100 Hz.
        for (i, t) in frame.time_s.iter().enumerate() {
            assert!((t - (20 + i) as f64 / 100.0).abs() < 1e-12);
        }
    }
}
