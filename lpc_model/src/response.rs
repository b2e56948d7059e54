use num_complex::Complex;
use std::f64::consts::PI;

/// Trait for objects that can be evaluated as a transfer function on the Z plane
pub trait TransferFunction {
    /// Takes a complex value on the Z plane and returns the output of the transfer function at that point
    /// # Arguments
    /// * `z` - A complex value in the Z plane
    fn get_value(&self, z: Complex<f64>) -> Complex<f64>;
}

/// Samples the magnitude of the transfer function along the upper half of the unit circle.
/// Returns `points + 1` pairs of (frequency as a fraction of nyquist, magnitude).
pub fn magnitude_response(t_fn: &dyn TransferFunction, points: usize) -> Vec<(f64, f64)> {
    let points = points.max(1);
    let mut path = Vec::with_capacity(points + 1);
    for i in 0..=points {
        let arg = i as f64 / points as f64 * PI;
        let z = Complex::<f64>::from_polar(1_f64, arg);
        path.push((i as f64 / points as f64, t_fn.get_value(z).norm()));
    }
    path
}

/// Same as [`magnitude_response`] but in decibels, floored at `-160` dB so silent bins stay finite
pub fn log_magnitude_response(t_fn: &dyn TransferFunction, points: usize) -> Vec<(f64, f64)> {
    magnitude_response(t_fn, points)
        .into_iter()
        .map(|(f, mag)| (f, (20.0 * mag.log10()).max(-160.0)))
        .collect()
}

/// Evaluates `c_0 + c_1 w + c_2 w^2 + ...` with Horner's rule
#[inline]
pub(crate) fn eval_poly(coefficients: &[f64], w: Complex<f64>) -> Complex<f64> {
    coefficients
        .iter()
        .rev()
        .fold(Complex::new(0.0, 0.0), |acc, c| acc * w + *c)
}
