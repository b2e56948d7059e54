use std::f64::consts::PI;
use num_complex::Complex;

use crate::error::{LpcError, Result};
use crate::filter::{LTISystem, LinearFilter};
use crate::response::TransferFunction;

/// Represents a filter with 2 conjugate poles on the Z-plane with a gain amount.
/// This results in frequencies closer to the argument of the poles being amplified,
/// which makes it the usual building block for a single formant.
#[derive(Debug, Clone)]
pub struct ConjPoleResonator {
    /// The real part of the pole location doubled
    re_2: f64,
    /// The magnitude of the pole location squared
    mag_sq: f64,
    /// The gain on the resonance
    gain: f64,

    /// The magnitude of the pole location
    mag: f64,
    /// The angle of the pole location
    arg: f64,
}

impl ConjPoleResonator {
    /// Create a new [`ConjPoleResonator`] given a complex number in polar form.
    /// The poles will be at the location of the complex number and its conjugate.
    /// # Arguments
    /// * `mag` - The magnitude of the complex number (must be in range [0, 1))
    /// * `arg` - The argument of the commplex number (must be in range [0, π])
    /// * `gain` - The gain of the filter
    #[inline]
    pub fn new_polar(mag: f64, arg: f64, gain: f64) -> Self {
        debug_assert!(mag < 1.0 && mag >= 0.0);
        debug_assert!(arg >= 0.0 && arg <= PI);
        Self {
            re_2: mag * arg.cos() * 2.0,
            mag_sq: mag * mag,
            gain,
            arg,
            mag,
        }
    }

    /// Create a resonator for a formant given its centre frequency and bandwidth in Hz.
    /// The pole radius is `exp(-π * bandwidth / sample_rate)`.
    pub fn from_formant(freq: f64, bandwidth: f64, sample_rate: f64, gain: f64) -> Result<Self> {
        if sample_rate.is_nan() || sample_rate <= 0.0 {
            return Err(LpcError::InvalidFilter("sample rate must be positive"));
        }
        if freq.is_nan() || freq < 0.0 || freq > sample_rate / 2.0 {
            return Err(LpcError::InvalidFilter("frequency exceeds the nyquist limit"));
        }
        if bandwidth.is_nan() || bandwidth <= 0.0 {
            return Err(LpcError::InvalidFilter("bandwidth must be positive"));
        }
        let mag = (-PI * bandwidth / sample_rate).exp();
        let arg = 2.0 * PI * freq / sample_rate;
        Ok(Self::new_polar(mag, arg, gain))
    }

    /// Process a single data point given the required values from the difference equation
    /// and returns `y[n]`. Prefer [`Self::process_buf`] for better cache performance.
    /// # Arguments
    /// * `x` - value of `x[n]`
    /// * `y_1` - value of `y[n-1]`
    /// * `y_2` - value of `y[n-2]`
    #[inline]
    pub fn process_single(&self, x: f64, y_1: f64, y_2: f64) -> f64 {
        x * self.gain + self.re_2 * y_1 - self.mag_sq * y_2
    }

    /// Filters `x` into `buf` starting from rest
    #[inline]
    pub fn process_buf(&self, x: &[f64], buf: &mut [f64]) {
        debug_assert!(x.len() == buf.len());
        let (mut y_1, mut y_2) = (0_f64, 0_f64);
        for i in 0..buf.len() {
            buf[i] = self.process_single(x[i], y_1, y_2);
            y_2 = y_1;
            y_1 = buf[i];
        }
    }

    /// The resonator as a general [`LinearFilter`]
    #[inline]
    pub fn as_filter(&self) -> LinearFilter {
        LinearFilter::from_normalized(vec![self.gain, 0.0, 0.0], vec![1.0, -self.re_2, self.mag_sq])
    }

    /// Returns the locations of the two poles in the filter
    /// The first returned pole will have a positive imaginary component.
    #[inline]
    pub fn get_pole_locs(&self) -> (Complex<f64>, Complex<f64>) {
        (Complex::from_polar(self.mag, self.arg), Complex::from_polar(self.mag, -self.arg))
    }
}

impl TransferFunction for ConjPoleResonator {
    fn get_value(&self, z: Complex<f64>) -> Complex<f64> {
        let poles = self.get_pole_locs();
        (z * z / ((z - poles.0) * (z - poles.1))).scale(self.gain)
    }
}

impl LTISystem for ConjPoleResonator {
    fn process(&self, samples: &[f64]) -> Vec<f64> {
        let mut buf = vec![0.0; samples.len()];
        self.process_buf(samples, &mut buf[..]);
        buf
    }
}
