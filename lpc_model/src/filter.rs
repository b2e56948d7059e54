use num_complex::Complex;

use crate::error::{LpcError, Result};
use crate::response::{eval_poly, TransferFunction};

/// Trait for systems that map a whole input signal to an output signal of the same length,
/// starting from rest
pub trait LTISystem {
    fn process(&self, samples: &[f64]) -> Vec<f64>;
}

/// A rational filter `B(z) / A(z)` with `A(z)` normalized so that `a[0] = 1`, i.e.
///
/// `y[n] = b[0] x[n] + ... + b[M] x[n-M] - a[1] y[n-1] - ... - a[N] y[n-N]`
///
/// Numerator and denominator are zero padded to the same length internally.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearFilter {
    b: Vec<f64>,
    a: Vec<f64>,
}

/// The delay line of a [`LinearFilter`] (direct form II transposed).
/// Keeping it between calls lets a signal be filtered in blocks.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterState {
    z: Vec<f64>,
}

impl FilterState {
    #[inline]
    pub fn reset(&mut self) {
        for v in &mut self.z {
            *v = 0.0;
        }
    }
}

impl LinearFilter {
    /// Create a new filter from numerator and denominator coefficients in powers of `z^-1`.
    /// # Arguments
    /// * `b` - The numerator (feed forward) coefficients, may be empty for a filter that outputs silence
    /// * `a` - The denominator (feedback) coefficients, `a[0]` must be finite and non-zero
    pub fn new(mut b: Vec<f64>, mut a: Vec<f64>) -> Result<Self> {
        let a_0 = *a.first().ok_or(LpcError::InvalidFilter("denominator is empty"))?;
        if a_0 == 0.0 || !a_0.is_finite() {
            return Err(LpcError::InvalidFilter("leading denominator coefficient must be finite and non-zero"));
        }
        if b.is_empty() {
            b.push(0.0);
        }
        if a_0 != 1.0 {
            for v in b.iter_mut().chain(a.iter_mut()) {
                *v /= a_0;
            }
        }
        let len = b.len().max(a.len());
        b.resize(len, 0.0);
        a.resize(len, 0.0);
        Ok(Self { b, a })
    }

    /// Builds a filter from coefficients that already have `a[0] = 1` and equal lengths
    #[inline]
    pub(crate) fn from_normalized(b: Vec<f64>, a: Vec<f64>) -> Self {
        debug_assert!(a.first() == Some(&1.0) && a.len() == b.len());
        Self { b, a }
    }

    /// An FIR filter, `A(z) = 1`
    #[inline]
    pub fn fir(b: Vec<f64>) -> Self {
        let len = b.len().max(1);
        let mut b = b;
        b.resize(len, 0.0);
        let mut a = vec![0.0; len];
        a[0] = 1.0;
        Self { b, a }
    }

    /// An all-pole filter, `B(z) = 1`
    #[inline]
    pub fn all_pole(a: Vec<f64>) -> Result<Self> {
        Self::new(vec![1.0], a)
    }

    /// Numerator coefficients (padded to the filter length)
    #[inline]
    pub fn numerator(&self) -> &[f64] {
        &self.b
    }

    /// Denominator coefficients (normalized, padded to the filter length)
    #[inline]
    pub fn denominator(&self) -> &[f64] {
        &self.a
    }

    /// The number of delay elements in the filter
    #[inline]
    pub fn order(&self) -> usize {
        self.b.len() - 1
    }

    /// A zeroed delay line sized for this filter
    #[inline]
    pub fn new_state(&self) -> FilterState {
        FilterState {
            z: vec![0.0; self.order()],
        }
    }

    /// Filters `x` into `buf`, continuing from (and updating) `state`.
    /// Filtering a signal in consecutive blocks with the same state gives the same result
    /// as filtering it in one call.
    pub fn process_buf(&self, state: &mut FilterState, x: &[f64], buf: &mut [f64]) {
        debug_assert!(x.len() == buf.len());
        debug_assert!(state.z.len() == self.order());
        let order = self.order();
        for (x_n, y_n) in x.iter().zip(buf.iter_mut()) {
            let y = self.b[0] * x_n + state.z.first().copied().unwrap_or(0.0);
            for i in 1..order {
                state.z[i - 1] = self.b[i] * x_n + state.z[i] - self.a[i] * y;
            }
            if order > 0 {
                state.z[order - 1] = self.b[order] * x_n - self.a[order] * y;
            }
            *y_n = y;
        }
    }
}

impl LTISystem for LinearFilter {
    fn process(&self, samples: &[f64]) -> Vec<f64> {
        let mut state = self.new_state();
        let mut buf = vec![0.0; samples.len()];
        self.process_buf(&mut state, samples, &mut buf[..]);
        buf
    }
}

impl TransferFunction for LinearFilter {
    fn get_value(&self, z: Complex<f64>) -> Complex<f64> {
        let w = z.inv();
        eval_poly(&self.b, w) / eval_poly(&self.a, w)
    }
}
