use std::{fmt, str::FromStr};
use nalgebra::{DMatrix, DVector};
use wav_util::Waveform;

use crate::error::{LpcError, Result};
use crate::model::ArModel;
use crate::window::Window;

/// How the predictor coefficients are solved for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Method {
    /// Autocorrelation normal equations solved with the Levinson-Durbin recursion.
    /// Yields a minimum-phase model for any signal with a positive definite autocorrelation.
    #[default]
    Autocorrelation,
    /// Least squares over the samples that have a full history (covariance method).
    /// Fits short signals better but carries no stability guarantee.
    Covariance,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Autocorrelation => f.write_str("autocorrelation"),
            Self::Covariance => f.write_str("covariance"),
        }
    }
}

impl FromStr for Method {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "autocorrelation" | "levinson" => Ok(Self::Autocorrelation),
            "covariance" | "least-squares" => Ok(Self::Covariance),
            other => Err(format!("unknown method '{other}', expected autocorrelation or covariance")),
        }
    }
}

/// Fits order-`order` autoregressive models to signals
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LpcAnalyzer {
    order: usize,
    method: Method,
    window: Window,
}

impl LpcAnalyzer {
    /// An analyzer using the autocorrelation method on the unwindowed signal
    #[inline]
    pub fn new(order: usize) -> Self {
        Self {
            order,
            method: Method::default(),
            window: Window::default(),
        }
    }

    #[inline]
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    #[inline]
    pub fn with_window(mut self, window: Window) -> Self {
        self.window = window;
        self
    }

    #[inline]
    pub fn order(&self) -> usize {
        self.order
    }

    #[inline]
    pub fn method(&self) -> Method {
        self.method
    }

    #[inline]
    pub fn window(&self) -> Window {
        self.window
    }

    /// Fits the model to `samples`.
    /// Fails with [`LpcError::InsufficientData`] unless `samples.len() > order`.
    pub fn analyze(&self, samples: &[f64]) -> Result<ArModel> {
        if samples.len() <= self.order {
            return Err(LpcError::InsufficientData {
                len: samples.len(),
                order: self.order,
            });
        }
        let mut buf = samples.to_vec();
        self.window.window_fn()(&mut buf[..]);

        let model = match self.method {
            Method::Autocorrelation => {
                let r = autocorrelation(&buf, self.order);
                if r[0] == 0.0 {
                    tracing::warn!(len = buf.len(), "analyzing a zero-energy signal, model is flat with zero gain");
                }
                let (coefficients, error, _) = levinson_durbin(&r, self.order);
                ArModel::from_coefficients(coefficients, error.max(0.0).sqrt())
            }
            Method::Covariance => covariance_model(&buf, self.order)?,
        };
        tracing::debug!(
            order = self.order,
            method = %self.method,
            window = %self.window,
            gain = model.gain(),
            coefficients = ?model.coefficients(),
            "fitted ar model"
        );
        Ok(model)
    }
}

/// Fits an order-`order` model to the waveform with the autocorrelation method.
/// Fails with [`LpcError::InsufficientData`] unless `waveform.len() > order`.
pub fn analyze(waveform: &Waveform, order: usize) -> Result<ArModel> {
    LpcAnalyzer::new(order).analyze(waveform.samples())
}

/// Unnormalized autocorrelation `r[k] = sum_n x[n] x[n+k]` for `k = 0..=max_lag`.
/// Lags at or beyond the signal length are 0.
pub fn autocorrelation(signal: &[f64], max_lag: usize) -> Vec<f64> {
    let mut r = Vec::with_capacity(max_lag + 1);
    for lag in 0..=max_lag {
        if lag >= signal.len() {
            r.push(0.0);
            continue;
        }
        r.push(
            signal[..signal.len() - lag]
                .iter()
                .zip(&signal[lag..])
                .map(|(a, b)| a * b)
                .sum(),
        );
    }
    r
}

/// Solves the autocorrelation normal equations with the Levinson-Durbin recursion.
///
/// Returns `(coefficients, error, reflection)` where `coefficients = [1, a_1, ..., a_order]`
/// follows the `A(z) = 1 + a_1 z^-1 + ...` convention, `error` is the final prediction error
/// energy and `reflection` holds `k_1..k_order`. The recursion stops early, leaving the
/// remaining coefficients at 0, once the prediction error is no longer positive; a zero-energy
/// signal therefore gives `[1, 0, ..., 0]` with zero error.
///
/// # Panics
///
/// Panics if `r` has fewer than `order + 1` lags.
pub fn levinson_durbin(r: &[f64], order: usize) -> (Vec<f64>, f64, Vec<f64>) {
    assert!(r.len() > order, "autocorrelation must have at least order + 1 lags");
    let mut a = vec![0_f64; order + 1];
    a[0] = 1.0;
    let mut reflection = vec![0_f64; order];
    let mut error = r[0];

    for m in 1..=order {
        if error <= 0.0 || !error.is_finite() {
            break;
        }
        let lambda: f64 = (0..m).map(|j| a[j] * r[m - j]).sum();
        let k = -lambda / error;
        reflection[m - 1] = k;

        let prev = a.clone();
        for j in 1..m {
            a[j] = prev[j] + k * prev[m - j];
        }
        a[m] = k;
        error *= 1.0 - k * k;
    }
    (a, error, reflection)
}

/// Covariance method: minimizes `sum_{n=order}^{N-1} e[n]^2` directly
fn covariance_model(signal: &[f64], order: usize) -> Result<ArModel> {
    let residual_energy = |a: &[f64]| -> f64 {
        (order..signal.len())
            .map(|n| {
                let e: f64 = a.iter().enumerate().map(|(k, a_k)| a_k * signal[n - k]).sum();
                e * e
            })
            .sum()
    };
    if order == 0 {
        return Ok(ArModel::from_coefficients(vec![1.0], residual_energy(&[1.0]).sqrt()));
    }

    // phi[i][j] = sum_n x[n-1-i] x[n-1-j], psi[i] = sum_n x[n] x[n-1-i]
    let phi = DMatrix::from_fn(order, order, |i, j| {
        (order..signal.len()).map(|n| signal[n - 1 - i] * signal[n - 1 - j]).sum::<f64>()
    });
    let psi = DVector::from_fn(order, |i, _| {
        (order..signal.len()).map(|n| signal[n] * signal[n - 1 - i]).sum::<f64>()
    });
    let predictor = phi
        .lu()
        .solve(&psi)
        .ok_or(LpcError::Singular { order })?;
    if predictor.iter().any(|v| !v.is_finite()) {
        return Err(LpcError::Singular { order });
    }

    // x[n] ~ sum p_i x[n-1-i]  =>  a_{i+1} = -p_i
    let mut coefficients = Vec::with_capacity(order + 1);
    coefficients.push(1.0);
    coefficients.extend(predictor.iter().map(|p| -p));
    let gain = residual_energy(&coefficients).sqrt();
    Ok(ArModel::from_coefficients(coefficients, gain))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::LTISystem;
    use rand::{rngs::StdRng, Rng, SeedableRng};
    use std::f64::consts::PI;

    fn noise(len: usize, seed: u64) -> Vec<f64> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..len).map(|_| rng.gen_range(-1.0..1.0)).collect()
    }

    fn sine(freq: f64, sample_rate: f64, len: usize) -> Vec<f64> {
        (0..len).map(|n| (2.0 * PI * freq * n as f64 / sample_rate).sin()).collect()
    }

    /// white noise driven through a known all-pole filter
    fn ar_process(coefficients: &[f64], len: usize, seed: u64) -> Vec<f64> {
        ArModel::new(&coefficients[1..], 1.0).synthesis_filter().process(&noise(len, seed))
    }

    #[test]
    fn test_autocorrelation() {
        let r = autocorrelation(&[1.0, 2.0, 3.0], 4);
        assert_eq!(r, vec![14.0, 8.0, 3.0, 0.0, 0.0]);
        assert_eq!(autocorrelation(&[], 2), vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_levinson_durbin_first_order() {
        let (a, error, k) = levinson_durbin(&[1.0, 0.5], 1);
        assert_eq!(a.len(), 2);
        assert!((a[1] + 0.5).abs() < 1e-12);
        assert!((error - 0.75).abs() < 1e-12);
        assert!((k[0] + 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_levinson_durbin_satisfies_yule_walker() {
        let r = autocorrelation(&noise(500, 11), 4);
        let (a, error, _) = levinson_durbin(&r, 4);
        for i in 1..=4 {
            let lhs: f64 = (0..=4).map(|j| a[j] * r[(i as i64 - j as i64).unsigned_abs() as usize]).sum();
            assert!(lhs.abs() < 1e-9 * r[0], "equation {i} off by {lhs}");
        }
        let e: f64 = (0..=4).map(|j| a[j] * r[j]).sum();
        assert!((e - error).abs() < 1e-9 * r[0]);
    }

    #[test]
    fn test_prediction_error_decreases_with_order() {
        let r = autocorrelation(&ar_process(&[1.0, -1.3, 0.6], 4000, 5), 8);
        let mut prev = r[0];
        for order in 1..=8 {
            let (_, error, _) = levinson_durbin(&r, order);
            assert!(error <= prev + 1e-9, "error grew at order {order}");
            prev = error;
        }
    }

    #[test]
    fn test_reflection_matches_step_down() {
        let r = autocorrelation(&ar_process(&[1.0, -1.3, 0.6], 4000, 9), 6);
        let (a, error, k) = levinson_durbin(&r, 6);
        let model = ArModel::from_coefficients(a, error.sqrt());
        let step_down = model.reflection_coefficients().unwrap();
        for (x, y) in k.iter().zip(step_down.iter()) {
            assert!((x - y).abs() < 1e-9);
        }
    }

    #[test]
    fn test_coefficient_count_and_leading_one() {
        let signal = noise(200, 1);
        for order in [0, 1, 2, 5, 10, 20, 199] {
            let model = LpcAnalyzer::new(order).analyze(&signal).unwrap();
            assert_eq!(model.coefficients().len(), order + 1);
            assert_eq!(model.coefficients()[0], 1.0);
        }
    }

    #[test]
    fn test_insufficient_data() {
        let wave = Waveform::new(vec![0.1, 0.2, 0.3], 8000);
        assert_eq!(analyze(&wave, 3), Err(LpcError::InsufficientData { len: 3, order: 3 }));
        assert_eq!(analyze(&wave, 10), Err(LpcError::InsufficientData { len: 3, order: 10 }));
        assert!(matches!(
            LpcAnalyzer::new(0).analyze(&[]),
            Err(LpcError::InsufficientData { len: 0, order: 0 })
        ));
        assert!(analyze(&wave, 2).is_ok());
    }

    #[test]
    fn test_zero_signal_gives_flat_model() {
        let wave = Waveform::new(vec![0.0; 100], 8000);
        let model = analyze(&wave, 10).unwrap();
        assert_eq!(model.coefficients()[0], 1.0);
        assert!(model.coefficients()[1..].iter().all(|a| *a == 0.0));
        assert_eq!(model.gain(), 0.0);
    }

    #[test]
    fn test_recovers_known_ar_process() {
        let truth = [1.0, -1.3, 0.6];
        let wave = Waveform::new(ar_process(&truth, 20_000, 21), 8000);
        let model = analyze(&wave, 2).unwrap();
        for (est, t) in model.coefficients().iter().zip(truth.iter()) {
            assert!((est - t).abs() < 0.05, "estimated {est}, expected {t}");
        }
        assert!(model.is_stable());
    }

    #[test]
    fn test_autocorrelation_method_is_stable_on_sines() {
        let signal = sine(440.0, 8000.0, 2000)
            .iter()
            .zip(noise(2000, 4))
            .map(|(s, n)| s + 0.01 * n)
            .collect::<Vec<f64>>();
        let model = LpcAnalyzer::new(10).analyze(&signal).unwrap();
        assert!(model.is_stable());
        assert!(model.gain() > 0.0);
    }

    #[test]
    fn test_covariance_matches_autocorrelation_on_long_signals() {
        let signal = ar_process(&[1.0, -1.3, 0.6], 20_000, 8);
        let auto = LpcAnalyzer::new(2).analyze(&signal).unwrap();
        let cov = LpcAnalyzer::new(2)
            .with_method(Method::Covariance)
            .analyze(&signal)
            .unwrap();
        for (a, c) in auto.coefficients().iter().zip(cov.coefficients()) {
            assert!((a - c).abs() < 0.01);
        }
        assert_eq!(cov.coefficients()[0], 1.0);
    }

    #[test]
    fn test_covariance_is_exact_for_noiseless_recursion() {
        // x[n] = 1.5 x[n-1] - 0.7 x[n-2] exactly, started from an impulse
        let mut signal = vec![1.0, 1.5];
        for n in 2..40 {
            let next = 1.5 * signal[n - 1] - 0.7 * signal[n - 2];
            signal.push(next);
        }
        let model = LpcAnalyzer::new(2)
            .with_method(Method::Covariance)
            .analyze(&signal)
            .unwrap();
        assert!((model.coefficients()[1] + 1.5).abs() < 1e-8);
        assert!((model.coefficients()[2] - 0.7).abs() < 1e-8);
        assert!(model.gain() < 1e-6);
    }

    #[test]
    fn test_covariance_singular_on_silence() {
        let err = LpcAnalyzer::new(4)
            .with_method(Method::Covariance)
            .analyze(&[0.0; 50])
            .unwrap_err();
        assert_eq!(err, LpcError::Singular { order: 4 });
    }

    #[test]
    fn test_window_changes_fit() {
        let signal = ar_process(&[1.0, -1.3, 0.6], 2000, 2);
        let plain = LpcAnalyzer::new(4).analyze(&signal).unwrap();
        let windowed = LpcAnalyzer::new(4)
            .with_window(Window::Hamming)
            .analyze(&signal)
            .unwrap();
        assert_ne!(plain, windowed);
        assert!(windowed.is_stable());
    }

    #[test]
    fn test_parse_method() {
        assert_eq!("covariance".parse::<Method>().unwrap(), Method::Covariance);
        assert_eq!(Method::Autocorrelation.to_string().parse::<Method>().unwrap(), Method::Autocorrelation);
        assert!("burg".parse::<Method>().is_err());
    }
}
