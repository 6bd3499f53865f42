use rustfft::{num_complex::Complex64, FftPlanner};
use crate::error::AnalysisError;
/// Segmenting parameters for Welch's method.
#[derive(Clone, Copy, Debug)]
pub struct WelchConfig {
    pub nperseg: usize,
    pub noverlap: usize,
}
impl WelchConfig {
    /// Reference configuration: segments of `0.75 * fs` samples with 50%
    /// overlap.
    pub fn for_sample_rate(fs: f64) -> Self {
        let nperseg = ((0.75 * fs) as usize).max(2);
        Self {
            nperseg,
            noverlap: nperseg / 2,
        }
    }
}
/// One-sided power spectral density estimate.
#[derive(Clone, Debug)]
pub struct PowerSpectrum {
    pub frequencies_hz: Vec<f64>,
    pub power: Vec<f64>,
}
impl PowerSpectrum {
    /// Frequency bin carrying maximum power, across the whole spectrum.
    pub fn peak_frequency_hz(&self) -> Option<f64> {
        self.power
            .iter()
            .enumerate()
            .max_by(|(_, x), (_, y)| x.partial_cmp(y).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(i, _)| self.frequencies_hz[i])
    }
}
/// Welch PSD estimate: Hann-windowed, mean-removed, 50%-overlapping
/// segments, periodograms averaged, density scaling.
pub fn welch(x: &[f64], fs: f64, config: WelchConfig) -> Result<PowerSpectrum, AnalysisError> {
    let nperseg = config.nperseg;
    let step = nperseg.saturating_sub(config.noverlap).max(1);
    if x.len() < nperseg {
        return Err(AnalysisError::TooShort {
            needed: nperseg,
            got: x.len(),
        });
    }
    let window = hann_periodic(nperseg);
    let window_norm: f64 = window.iter().map(|w| w * w).sum();
    let scale = 1.0 / (fs * window_norm);
    let mut planner = FftPlanner::<f64>::new();
    let fft = planner.plan_fft_forward(nperseg);
    let num_bins = nperseg / 2 + 1;
    let mut averaged = vec![0.0; num_bins];
    let mut segments = 0usize;
    let mut buffer = vec![Complex64::new(0.0, 0.0); nperseg];
    let mut start = 0;
    while start + nperseg <= x.len() {
        let segment = &x[start..start + nperseg];
        let mean = segment.iter().sum::<f64>() / nperseg as f64;
        for ((slot, &value), w) in buffer.iter_mut().zip(segment).zip(&window) {
            *slot = Complex64::new((value - mean) * w, 0.0);
        }
        fft.process(&mut buffer);
        for (bin, value) in averaged.iter_mut().zip(buffer.iter().take(num_bins)) {
            *bin += value.norm_sqr() * scale;
        }
        segments += 1;
        start += step;
    }
    // One-sided: double everything except DC and (for even lengths) Nyquist.
    let last_doubled = if nperseg % 2 == 0 {
        num_bins - 1
    } else {
        num_bins
    };
    for bin in averaged.iter_mut().take(last_doubled).skip(1) {
        *bin *= 2.0;
    }
    for bin in averaged.iter_mut() {
        *bin /= segments as f64;
    }
    let frequencies_hz = (0..num_bins)
        .map(|k| k as f64 * fs / nperseg as f64)
        .collect();
    Ok(PowerSpectrum {
        frequencies_hz,
        power: averaged,
    })
}
fn hann_periodic(n: usize) -> Vec<f64> {
    use std::f64::consts::TAU;
    (0..n)
        .map(|i| 0.5 - 0.5 * (TAU * i as f64 / n as f64).cos())
        .collect()
}
#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::TAU;
    #[test]
    fn too_short_input_is_rejected() {
        let config = WelchConfig::for_sample_rate(250.0);
        assert_eq!(config.nperseg, 187);
        assert_eq!(config.noverlap, 93);
        let err = welch(&[0.0; 100], 250.0, config).unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::TooShort {
                needed: 187,
                got: 100
            }
        ));
    }
    #[test]
    fn peak_lands_on_the_tone_bin() {
        let fs = 250.0;
        let config = WelchConfig::for_sample_rate(fs);
        // Put the tone exactly on a bin: k * fs / nperseg for k = 7.
        let tone_hz = 7.0 * fs / config.nperseg as f64;
        let x: Vec<f64> = (0..1000)
            .map(|i| (TAU * tone_hz * i as f64 / fs).sin())
            .collect();
        let spectrum = welch(&x, fs, config).unwrap();
        let peak = spectrum.peak_frequency_hz().unwrap();
        assert!((peak - tone_hz).abs() < 1e-9, "peak at {peak}");
    }
    #[test]
    fn density_integrates_to_signal_power() {
        // White-ish deterministic signal; total integrated density should be
        // close to its variance (Parseval, within windowing bias).
        let fs = 100.0;
        let x: Vec<f64> = (0..4000)
            .map(|i| ((i as f64 * 12.9898).sin() * 43758.5453).fract() - 0.5)
            .collect();
        let variance = {
            let mean = x.iter().sum::<f64>() / x.len() as f64;
            x.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / x.len() as f64
        };
        let config = WelchConfig::for_sample_rate(fs);
        let spectrum = welch(&x, fs, config).unwrap();
        let df = fs / config.nperseg as f64;
        let integrated: f64 = spectrum.power.iter().sum::<f64>() * df;
        assert!(
            (integrated - variance).abs() / variance < 0.2,
            "integrated {integrated}, variance {variance}"
        );
    }
    #[test]
    fn single_segment_input_works() {
        let fs = 250.0;
        let config = WelchConfig::for_sample_rate(fs);
        let x: Vec<f64> = (0..config.nperseg)
            .map(|i| (TAU * 10.0 * i as f64 / fs).sin())
            .collect();
        let spectrum = welch(&x, fs, config).unwrap();
        assert_eq!(spectrum.power.len(), config.nperseg / 2 + 1);
        let peak = spectrum.peak_frequency_hz().unwrap();
        // 10 Hz falls between bins at this resolution; nearest bins are
        // 9.36 and 10.70 Hz.
        assert!((peak - 10.0).abs() < fs / config.nperseg as f64, "peak {peak}");
    }
}
