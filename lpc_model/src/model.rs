use find_peaks::PeakFinder;
use num_complex::Complex;

use crate::filter::LinearFilter;
use crate::response::{eval_poly, log_magnitude_response, magnitude_response, TransferFunction};

/// How far (in dB) an envelope peak must rise above its surroundings to count as a formant
pub const FORMANT_MIN_PROMINENCE_DB: f64 = 1.0;

/// An all-pole (autoregressive) model `gain / A(z)` with
/// `A(z) = 1 + a_1 z^-1 + ... + a_P z^-P`.
///
/// The coefficient vector always has `order + 1` entries and its first entry is exactly 1.
#[derive(Debug, Clone, PartialEq)]
pub struct ArModel {
    coefficients: Vec<f64>,
    gain: f64,
}

impl ArModel {
    /// Create a model from the predictor coefficients `[a_1, ..., a_P]`; `a_0 = 1` is prepended.
    pub fn new(predictor: &[f64], gain: f64) -> Self {
        let mut coefficients = Vec::with_capacity(predictor.len() + 1);
        coefficients.push(1.0);
        coefficients.extend_from_slice(predictor);
        Self { coefficients, gain }
    }

    #[inline]
    pub(crate) fn from_coefficients(coefficients: Vec<f64>, gain: f64) -> Self {
        debug_assert!(coefficients.first() == Some(&1.0));
        Self { coefficients, gain }
    }

    #[inline]
    pub fn order(&self) -> usize {
        self.coefficients.len() - 1
    }

    /// `[1, a_1, ..., a_P]`
    #[inline]
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    #[inline]
    pub fn gain(&self) -> f64 {
        self.gain
    }

    /// The FIR filter `A(z)` that whitens a signal with this envelope
    #[inline]
    pub fn inverse_filter(&self) -> LinearFilter {
        LinearFilter::fir(self.coefficients.clone())
    }

    /// The all-pole filter `1 / A(z)` that imposes this envelope on an excitation
    #[inline]
    pub fn synthesis_filter(&self) -> LinearFilter {
        let mut b = vec![0.0; self.coefficients.len()];
        b[0] = 1.0;
        LinearFilter::from_normalized(b, self.coefficients.clone())
    }

    /// Recovers the reflection coefficients `k_1..k_P` with the step-down recursion.
    /// Returns `None` if some `|k_m| = 1`, where the recursion cannot continue.
    pub fn reflection_coefficients(&self) -> Option<Vec<f64>> {
        let order = self.order();
        let mut a = self.coefficients[1..].to_vec();
        let mut k = vec![0_f64; order];
        for m in (1..=order).rev() {
            let k_m = a[m - 1];
            k[m - 1] = k_m;
            if m == 1 {
                break;
            }
            let denom = 1.0 - k_m * k_m;
            if denom == 0.0 || !denom.is_finite() {
                return None;
            }
            a = (0..m - 1).map(|j| (a[j] - k_m * a[m - 2 - j]) / denom).collect();
        }
        Some(k)
    }

    /// True when every pole of `1 / A(z)` lies strictly inside the unit circle
    pub fn is_stable(&self) -> bool {
        self.reflection_coefficients()
            .map_or(false, |k| k.iter().all(|k| k.abs() < 1.0))
    }

    /// Magnitude of `gain / A(e^jw)` at `points + 1` evenly spaced frequencies from 0 to nyquist
    pub fn envelope(&self, points: usize) -> Vec<f64> {
        magnitude_response(self, points).into_iter().map(|(_, mag)| mag).collect()
    }

    /// Frequencies in Hz of the peaks of the spectral envelope, lowest first.
    /// Peaks less than [`FORMANT_MIN_PROMINENCE_DB`] above their surroundings are ripple and skipped.
    /// # Arguments
    /// * `sample_rate` - The rate the modelled signal was sampled at
    /// * `points` - The number of frequency bins the envelope is evaluated on
    pub fn formants(&self, sample_rate: f64, points: usize) -> Vec<f64> {
        let log_envelope = log_magnitude_response(self, points)
            .into_iter()
            .map(|(_, db)| db)
            .collect::<Vec<f64>>();
        if log_envelope.iter().any(|v| !v.is_finite()) {
            return Vec::new();
        }
        let bin_hz = sample_rate / 2.0 / (log_envelope.len() - 1) as f64;

        let mut peaks = PeakFinder::new(&log_envelope)
            .with_min_prominence(FORMANT_MIN_PROMINENCE_DB)
            .find_peaks();
        peaks.sort_by_key(|p| p.middle_position());
        peaks.into_iter().map(|p| p.middle_position() as f64 * bin_hz).collect()
    }
}

impl TransferFunction for ArModel {
    fn get_value(&self, z: Complex<f64>) -> Complex<f64> {
        Complex::new(self.gain, 0.0) / eval_poly(&self.coefficients, z.inv())
    }
}
