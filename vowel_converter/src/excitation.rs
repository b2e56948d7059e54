//! Synthetic excitation signals. The default conversion derives its excitation from the source
//! vowel instead; these exist for experiments with artificial sources.
use rand::Rng;
use statrs::distribution::Normal;

use crate::error::{ConvertError, Result};

/// `length` independent standard normal samples
pub fn white_noise<R: Rng>(length: usize, rng: &mut R) -> Result<Vec<f64>> {
    let normal = Normal::new(0.0, 1.0).map_err(|e| ConvertError::InvalidConfig(e.to_string()))?;
    Ok((0..length).map(|_| rng.sample(&normal)).collect())
}

/// Unit impulses every `period` samples starting at index 0, a crude glottal source.
/// A period of 0 is treated as 1.
pub fn pulse_train(length: usize, period: usize) -> Vec<f64> {
    let period = period.max(1);
    let mut out = vec![0_f64; length];
    for i in (0..length).step_by(period) {
        out[i] = 1.0;
    }
    out
}
