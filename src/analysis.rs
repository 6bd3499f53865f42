use std::fs;
use std::path::Path;
use ndarray::Array2;
use crate::config::ChannelMap;
use crate::dsp::{butter_bandpass, sosfiltfilt, welch, WelchConfig};
use crate::error::AnalysisError;
/// Which recording channel to analyze. Indices are device channel order,
/// i.e. recording columns after the reserved index column.
#[derive(Clone, Copy, Debug)]
pub enum ChannelSelector {
    /// The montage's resting-state channel (first EEG entry).
    RestEeg,
    Index(usize),
}
/// Derived spectral biomarker; recomputed per request, never persisted.
#[derive(Clone, Copy, Debug)]
pub struct SpectralResult {
    pub peak_hz: f64,
    pub band_hz: (f64, f64),
    pub channel: usize,
}
/// Analysis parameters. Defaults mirror the clinical reference setup.
#[derive(Clone, Copy, Debug)]
pub struct AnalysisConfig {
    pub band_hz: (f64, f64),
    pub filter_order: usize,
    pub sample_rate_hz: f64,
}
impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            band_hz: (8.0, 12.0),
            filter_order: 32,
            sample_rate_hz: 250.0,
        }
    }
}
/// Offline Peak Alpha Frequency estimator.
///
/// Loads a recorded session, band-passes the selected channel with a
/// zero-phase Butterworth cascade and reports the frequency of maximum Welch
/// PSD. Zero-phase application matters here: PAF is a frequency-location
/// estimate, and one-directional filtering would smear segment edges into
/// the spectrum.
pub struct PafAnalyzer {
    config: AnalysisConfig,
    channel_map: ChannelMap,
}
impl PafAnalyzer {
    pub fn new(config: AnalysisConfig, channel_map: ChannelMap) -> Self {
        Self {
            config,
            channel_map,
        }
    }
    pub fn analyze(
        &self,
        recording: &Path,
        selector: ChannelSelector,
    ) -> Result<SpectralResult, AnalysisError> {
        let table = load_recording(recording)?;
        let available = table.ncols() - 1;
        let channel = match selector {
            ChannelSelector::RestEeg => self
                .channel_map
                .rest_channel()
                .ok_or(AnalysisError::NoSuchChannel)?,
            ChannelSelector::Index(index) => index,
        };
        if channel >= available {
            return Err(AnalysisError::ChannelOutOfRange { channel, available });
        }
        // Column 0 is the reserved sample index.
        let samples = table.column(channel + 1).to_vec();
        let fs = self.config.sample_rate_hz;
        let welch_config = WelchConfig::for_sample_rate(fs);
        if samples.len() < welch_config.nperseg {
            return Err(AnalysisError::TooShort {
                needed: welch_config.nperseg,
                got: samples.len(),
            });
        }
        let (low, high) = self.config.band_hz;
        let sos = butter_bandpass(self.config.filter_order, low, high, fs)?;
        let filtered = sosfiltfilt(&sos, &samples);
        let spectrum = welch(&filtered, fs, welch_config)?;
        let peak_hz = spectrum.peak_frequency_hz().ok_or(AnalysisError::Empty)?;
        log::debug!(
            "PAF {peak_hz:.2} Hz from {} samples on channel {channel}",
            samples.len()
        );
        Ok(SpectralResult {
            peak_hz,
            band_hz: self.config.band_hz,
            channel,
        })
    }
}
/// Parses the tab-separated recording into a samples x columns table.
fn load_recording(path: &Path) -> Result<Array2<f64>, AnalysisError> {
    let text = fs::read_to_string(path).map_err(AnalysisError::Read)?;
    let mut values: Vec<f64> = Vec::new();
    let mut ncols = 0usize;
    let mut nrows = 0usize;
    for (line_idx, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let row_start = values.len();
        for field in line.split_whitespace() {
            let value: f64 = field.parse().map_err(|_| AnalysisError::Malformed {
                line: line_idx + 1,
                reason: format!("non-numeric field `{field}`"),
            })?;
            values.push(value);
        }
        let width = values.len() - row_start;
        if nrows == 0 {
            if width < 2 {
                return Err(AnalysisError::Malformed {
                    line: line_idx + 1,
                    reason: "need an index column plus at least one channel".into(),
                });
            }
            ncols = width;
        } else if width != ncols {
            return Err(AnalysisError::Malformed {
                line: line_idx + 1,
                reason: format!("expected {ncols} columns, found {width}"),
            });
        }
        nrows += 1;
    }
    if nrows == 0 {
        return Err(AnalysisError::Empty);
    }
    Array2::from_shape_vec((nrows, ncols), values).map_err(|e| AnalysisError::Malformed {
        line: 0,
        reason: e.to_string(),
    })
}
