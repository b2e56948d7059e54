use lpc_model::{ConjPoleResonator, LTISystem};
use wav_util::Waveform;

use crate::config::DEFAULT_PEAK;
use crate::converter::normalize;
use crate::error::{ConvertError, Result};
use crate::excitation::pulse_train;

/// Builds an artificial vowel by passing a pulse train at `pitch_hz` through a cascade of
/// two-pole resonators, one per formant. The result is scaled to a peak of 0.9.
/// # Arguments
/// * `formants` - `(centre frequency, bandwidth)` pairs in Hz
/// * `pitch_hz` - The fundamental frequency of the pulse train
/// * `sample_rate` - The rate of the generated signal
/// * `length` - The number of samples to generate
pub fn synthetic_vowel(formants: &[(f64, f64)], pitch_hz: f64, sample_rate: u32, length: usize) -> Result<Waveform> {
    if !pitch_hz.is_finite() || pitch_hz <= 0.0 {
        return Err(ConvertError::InvalidConfig(format!("pitch must be positive, got {pitch_hz}")));
    }
    let period = (sample_rate as f64 / pitch_hz).round() as usize;
    let mut signal = pulse_train(length, period);
    for &(freq, bandwidth) in formants {
        let resonator = ConjPoleResonator::from_formant(freq, bandwidth, sample_rate as f64, 1.0)?;
        signal = resonator.process(&signal);
    }
    Ok(Waveform::new(normalize(signal, DEFAULT_PEAK)?, sample_rate))
}
