use std::f64::consts::TAU;
use std::time::Instant;
use rand::{rngs::StdRng, Rng, SeedableRng};
use crate::config::{ChannelMap, ChannelRole, DeviceConfig};
use crate::error::SessionError;
use crate::source::{SampleBlock, SampleSource};
/// Software board: paces itself against the wall clock so `pull` returns
/// exactly the samples that "arrived" since the previous call, like a real
/// dongle ring buffer would.
///
/// EEG channels carry a 10 Hz alpha tone plus noise, everything else noise
/// only, in microvolt-ish amplitudes.
pub struct SyntheticBoard {
    sample_rate_hz: f64,
    channel_map: ChannelMap,
    num_channels: usize,
    rng: StdRng,
    started: Option<Instant>,
    emitted: u64,
}
const ALPHA_HZ: f64 = 10.0;
const ALPHA_AMPLITUDE_UV: f64 = 20.0;
const NOISE_AMPLITUDE_UV: f64 = 2.0;
impl SyntheticBoard {
    pub fn open(config: &DeviceConfig, channel_map: ChannelMap) -> Result<Self, SessionError> {
        if config.sample_rate_hz <= 0.0 {
            return Err(SessionError::Connection(format!(
                "invalid sample rate {}",
                config.sample_rate_hz
            )));
        }
        Ok(Self {
            sample_rate_hz: config.sample_rate_hz,
            channel_map,
            num_channels: config.num_channels,
            rng: StdRng::from_entropy(),
            started: None,
            emitted: 0,
        })
    }
    /// Deterministic variant for tests.
    pub fn with_seed(
        config: &DeviceConfig,
        channel_map: ChannelMap,
        seed: u64,
    ) -> Result<Self, SessionError> {
        let mut board = Self::open(config, channel_map)?;
        board.rng = StdRng::seed_from_u64(seed);
        Ok(board)
    }
    fn synthesize(&mut self, count: usize) -> SampleBlock {
        let mut block = SampleBlock::empty(self.num_channels);
        for i in 0..count {
            let t = (self.emitted + i as u64) as f64 / self.sample_rate_hz;
            for (channel, samples) in block.channels.iter_mut().enumerate() {
                let noise = (self.rng.gen::<f64>() - 0.5) * 2.0 * NOISE_AMPLITUDE_UV;
                let value = match self.channel_map.role_of(channel) {
                    ChannelRole::Eeg => ALPHA_AMPLITUDE_UV * (TAU * ALPHA_HZ * t).sin() + noise,
                    _ => noise,
                };
                samples.push(value);
            }
        }
        self.emitted += count as u64;
        block
    }
    fn pending(&self) -> usize {
        match self.started {
            Some(started) => {
                let target = (started.elapsed().as_secs_f64() * self.sample_rate_hz) as u64;
                target.saturating_sub(self.emitted) as usize
            }
            None => 0,
        }
    }
}
impl SampleSource for SyntheticBoard {
    fn sample_rate_hz(&self) -> f64 {
        self.sample_rate_hz
    }
    fn num_channels(&self) -> usize {
        self.num_channels
    }
    fn start(&mut self, _buffer_size_hint: usize) -> Result<(), SessionError> {
        if self.started.is_none() {
            self.started = Some(Instant::now());
            self.emitted = 0;
        }
        Ok(())
    }
    fn pull(&mut self) -> Result<SampleBlock, SessionError> {
        let count = self.pending();
        Ok(self.synthesize(count))
    }
    fn stop(&mut self) -> Result<SampleBlock, SessionError> {
        let count = self.pending();
        let block = self.synthesize(count);
        self.started = None;
        Ok(block)
    }
}
