use std::f64::consts::PI;
use rustfft::num_complex::Complex64;
use crate::error::AnalysisError;
/// One second-order filter section, coefficients normalized so `a[0] == 1`.
#[derive(Clone, Copy, Debug)]
pub struct Sos {
    pub b: [f64; 3],
    pub a: [f64; 3],
}
/// Designs a Butterworth band-pass as cascaded second-order sections.
///
/// `order` is the analog prototype order (the band-pass ends up with
/// `2 * order` poles, i.e. `order` sections). Design route: prototype poles
/// on the unit circle, low-pass-to-band-pass transform with pre-warped edge
/// frequencies, bilinear transform, then conjugate pole pairs become
/// sections. All band-pass zeros land on z = +/-1, so every section keeps the
/// numerator shape `g * (1, 0, -1)` with the overall gain spread evenly.
pub fn butter_bandpass(
    order: usize,
    low_hz: f64,
    high_hz: f64,
    fs: f64,
) -> Result<Vec<Sos>, AnalysisError> {
    if order == 0 || !(0.0 < low_hz && low_hz < high_hz && high_hz < fs / 2.0) {
        return Err(AnalysisError::InvalidBand {
            low: low_hz,
            high: high_hz,
            fs,
        });
    }
    let fs2 = 2.0 * fs;
    // Pre-warp so the bilinear transform lands the edges exactly.
    let warped_low = fs2 * (PI * low_hz / fs).tan();
    let warped_high = fs2 * (PI * high_hz / fs).tan();
    let bw = warped_high - warped_low;
    let w0_sq = warped_low * warped_high;
    // Low-pass prototype poles, transformed to the band-pass plane.
    let mut analog_poles = Vec::with_capacity(2 * order);
    for k in 0..order {
        let theta = PI * (2 * k + order + 1) as f64 / (2 * order) as f64;
        let prototype = Complex64::new(theta.cos(), theta.sin());
        let s = prototype * (bw / 2.0);
        let detune = (s * s - w0_sq).sqrt();
        analog_poles.push(s + detune);
        analog_poles.push(s - detune);
    }
    // Bilinear transform of poles; zeros (order at s=0 plus the degree
    // difference) become `order` at z=+1 and `order` at z=-1.
    let mut denominator = Complex64::new(1.0, 0.0);
    let digital_poles: Vec<Complex64> = analog_poles
        .iter()
        .map(|&p| {
            denominator *= Complex64::new(fs2, 0.0) - p;
            (Complex64::new(fs2, 0.0) + p) / (Complex64::new(fs2, 0.0) - p)
        })
        .collect();
    // k_lp2bp = bw^order; numerator of the bilinear gain is (fs2 - 0)^order.
    let gain = bw.powi(order as i32) * fs2.powi(order as i32) / denominator.re;
    // Pair conjugates into sections. Real poles (possible for wide bands)
    // come in an even count by symmetry and pair with each other.
    let tol = 1e-10;
    let mut sections = Vec::with_capacity(order);
    let mut real_poles: Vec<f64> = Vec::new();
    for pole in &digital_poles {
        if pole.im > tol {
            sections.push(Sos {
                b: [1.0, 0.0, -1.0],
                a: [1.0, -2.0 * pole.re, pole.norm_sqr()],
            });
        } else if pole.im.abs() <= tol {
            real_poles.push(pole.re);
        }
    }
    real_poles.sort_by(|x, y| x.partial_cmp(y).unwrap_or(std::cmp::Ordering::Equal));
    for pair in real_poles.chunks(2) {
        if let [r1, r2] = pair {
            sections.push(Sos {
                b: [1.0, 0.0, -1.0],
                a: [1.0, -(r1 + r2), r1 * r2],
            });
        }
    }
    debug_assert_eq!(sections.len(), order);
    let section_gain = gain.abs().powf(1.0 / order as f64);
    for section in &mut sections {
        for coeff in &mut section.b {
            *coeff *= section_gain;
        }
    }
    if gain < 0.0 {
        for coeff in &mut sections[0].b {
            *coeff = -*coeff;
        }
    }
    Ok(sections)
}
/// Runs the cascade over `x` (transposed direct form II), mutating the
/// per-section state in `z`.
pub fn sosfilt(sos: &[Sos], x: &[f64], z: &mut [[f64; 2]]) -> Vec<f64> {
    debug_assert_eq!(sos.len(), z.len());
    let mut out = Vec::with_capacity(x.len());
    for &sample in x {
        let mut value = sample;
        for (section, state) in sos.iter().zip(z.iter_mut()) {
            let y = section.b[0] * value + state[0];
            state[0] = section.b[1] * value - section.a[1] * y + state[1];
            state[1] = section.b[2] * value - section.a[2] * y;
            value = y;
        }
        out.push(value);
    }
    out
}
/// Steady-state section states for a unit step, so filtering can start
/// without a switch-on transient. Scaled by the first input sample before
/// use.
fn sosfilt_zi(sos: &[Sos]) -> Vec<[f64; 2]> {
    let mut zi = Vec::with_capacity(sos.len());
    let mut scale = 1.0;
    for section in sos {
        let [b0, b1, b2] = section.b;
        let [_, a1, a2] = section.a;
        let dc = 1.0 + a1 + a2;
        let yss = if dc.abs() > f64::EPSILON {
            (b0 + b1 + b2) / dc
        } else {
            0.0
        };
        let z1 = b2 - a2 * yss;
        let z0 = b1 - a1 * yss + z1;
        zi.push([scale * z0, scale * z1]);
        scale *= yss;
    }
    zi
}
/// Zero-phase (forward-backward) application of the cascade.
///
/// Odd extension at both ends hides the filter's edge transients; the pad
/// length follows the 3 * (2 * sections + 1) convention, capped at
/// `len - 1` so short-but-valid inputs stay filterable.
pub fn sosfiltfilt(sos: &[Sos], x: &[f64]) -> Vec<f64> {
    let n = x.len();
    if n < 2 {
        return x.to_vec();
    }
    let padlen = (3 * (2 * sos.len() + 1)).min(n - 1);
    let mut ext = Vec::with_capacity(n + 2 * padlen);
    for i in (1..=padlen).rev() {
        ext.push(2.0 * x[0] - x[i]);
    }
    ext.extend_from_slice(x);
    for i in (n - padlen - 1..n - 1).rev() {
        ext.push(2.0 * x[n - 1] - x[i]);
    }
    let zi = sosfilt_zi(sos);
    let scaled = |x0: f64| -> Vec<[f64; 2]> { zi.iter().map(|z| [z[0] * x0, z[1] * x0]).collect() };
    let mut state = scaled(ext[0]);
    let mut forward = sosfilt(sos, &ext, &mut state);
    forward.reverse();
    let mut state = scaled(forward[0]);
    let mut backward = sosfilt(sos, &forward, &mut state);
    backward.reverse();
    backward[padlen..padlen + n].to_vec()
}
#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::TAU;
    fn tone(freq_hz: f64, fs: f64, n: usize) -> Vec<f64> {
        (0..n).map(|i| (TAU * freq_hz * i as f64 / fs).sin()).collect()
    }
    fn rms(x: &[f64]) -> f64 {
        (x.iter().map(|v| v * v).sum::<f64>() / x.len() as f64).sqrt()
    }
    #[test]
    fn rejects_degenerate_bands() {
        assert!(butter_bandpass(4, 12.0, 8.0, 250.0).is_err());
        assert!(butter_bandpass(4, 8.0, 200.0, 250.0).is_err());
        assert!(butter_bandpass(0, 8.0, 12.0, 250.0).is_err());
        assert!(butter_bandpass(4, 0.0, 12.0, 250.0).is_err());
    }
    #[test]
    fn design_yields_one_section_per_prototype_pole() {
        let sos = butter_bandpass(32, 8.0, 12.0, 250.0).unwrap();
        assert_eq!(sos.len(), 32);
        // Every pole must sit inside the unit circle.
        for section in &sos {
            assert!(section.a[2] < 1.0, "|p|^2 = {}", section.a[2]);
        }
    }
    #[test]
    fn passband_tone_survives_stopband_tone_dies() {
        let fs = 250.0;
        let sos = butter_bandpass(8, 8.0, 12.0, fs).unwrap();
        let in_band = sosfiltfilt(&sos, &tone(10.0, fs, 2000));
        let out_of_band = sosfiltfilt(&sos, &tone(50.0, fs, 2000));
        // Judge by the central portion, away from any residual edge effects.
        let center = 500..1500;
        let in_rms = rms(&in_band[center.clone()]);
        let out_rms = rms(&out_of_band[center]);
        let input_rms = rms(&tone(10.0, fs, 2000)[500..1500]);
        assert!(in_rms > 0.8 * input_rms, "in-band rms {in_rms}");
        assert!(out_rms < 0.01 * input_rms, "out-of-band rms {out_rms}");
    }
    #[test]
    fn bandpass_kills_dc() {
        let sos = butter_bandpass(4, 8.0, 12.0, 250.0).unwrap();
        let constant = vec![5.0; 1000];
        let filtered = sosfiltfilt(&sos, &constant);
        assert!(rms(&filtered) < 1e-6);
    }
    #[test]
    fn filtfilt_preserves_length() {
        let sos = butter_bandpass(32, 8.0, 12.0, 250.0).unwrap();
        // Shorter than the nominal pad: cap must kick in, not panic.
        let short = tone(10.0, 250.0, 187);
        assert_eq!(sosfiltfilt(&sos, &short).len(), 187);
    }
    #[test]
    fn sosfilt_matches_direct_biquad_recurrence() {
        let sos = [Sos {
            b: [0.2, 0.1, -0.2],
            a: [1.0, -0.5, 0.25],
        }];
        let x = [1.0, 0.0, 0.0, 0.0];
        let mut z = vec![[0.0; 2]];
        let y = sosfilt(&sos, &x, &mut z);
        // Hand-unrolled impulse response of the same biquad.
        let mut expected = Vec::new();
        let (mut z0, mut z1) = (0.0, 0.0);
        for &input in &x {
            let out: f64 = 0.2 * input + z0;
            z0 = 0.1 * input + 0.5 * out + z1;
            z1 = -0.2 * input - 0.25 * out;
            expected.push(out);
        }
        for (a, b) in y.iter().zip(&expected) {
            assert!((a - b).abs() < 1e-12);
        }
    }
}
