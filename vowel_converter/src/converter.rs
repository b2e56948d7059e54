use lpc_model::{ArModel, LTISystem};
use wav_util::{scale_to_peak, Waveform};

use crate::config::ConverterConfig;
use crate::error::{ConvertError, Result};

/// Everything produced while converting one vowel into another
#[derive(Debug, Clone)]
pub struct Conversion {
    /// The converted vowel, normalized to the configured peak
    pub waveform: Waveform,
    /// The source vowel with its own envelope removed
    pub excitation: Vec<f64>,
    pub source_model: ArModel,
    pub target_model: ArModel,
}

/// Converts source vowels so they take on the spectral envelope of target vowels
#[derive(Debug, Clone)]
pub struct VowelConverter {
    config: ConverterConfig,
}

impl VowelConverter {
    pub fn new(config: ConverterConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    #[inline]
    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    /// Fits the configured AR model to a waveform
    #[inline]
    pub fn analyze(&self, waveform: &Waveform) -> Result<ArModel> {
        Ok(self.config.analyzer().analyze(waveform.samples())?)
    }

    /// Converts `source` to have the formants of `target`, see [`Self::transform_detailed`]
    #[inline]
    pub fn transform(&self, source: &Waveform, target: &Waveform) -> Result<Waveform> {
        Ok(self.transform_detailed(source, target)?.waveform)
    }

    /// Converts `source` to have the formants of `target`:
    /// 1. fit models `A_src` and `A_tgt` of the same order to both vowels
    /// 2. inverse filter the source with `A_src` to get its excitation
    /// 3. filter the excitation with `1 / A_tgt`
    /// 4. scale the result to the configured peak
    ///
    /// The output has the same length as `source` and the configured sample rate.
    pub fn transform_detailed(&self, source: &Waveform, target: &Waveform) -> Result<Conversion> {
        for (role, wave) in [("source", source), ("target", target)] {
            if wave.sample_rate() != self.config.sample_rate {
                tracing::debug!(
                    role,
                    rate = wave.sample_rate(),
                    expected = self.config.sample_rate,
                    "converting a waveform recorded at a different rate"
                );
            }
        }
        let target_model = self.analyze(target)?;
        let source_model = self.analyze(source)?;
        if !target_model.is_stable() {
            tracing::warn!(coefficients = ?target_model.coefficients(), "target model is not minimum phase");
        }

        let excitation = source_model.inverse_filter().process(source.samples());
        let colored = target_model.synthesis_filter().process(&excitation);
        let samples = normalize(colored, self.config.peak)?;
        tracing::debug!(
            samples = samples.len(),
            source_gain = source_model.gain(),
            target_gain = target_model.gain(),
            "converted vowel"
        );

        Ok(Conversion {
            waveform: Waveform::new(samples, self.config.sample_rate),
            excitation,
            source_model,
            target_model,
        })
    }
}

/// Converts `source` to have the formants of `target` using order-`order` models and the
/// default configuration otherwise (8 kHz output, peak 0.9).
pub fn transform(source: &Waveform, target: &Waveform, order: usize) -> Result<Waveform> {
    VowelConverter::new(ConverterConfig::with_order(order))?.transform(source, target)
}

/// Colors an arbitrary excitation (for example [`crate::excitation::white_noise`]) with the
/// envelope of `model` and scales the result to `peak`.
pub fn synthesize(excitation: &[f64], model: &ArModel, sample_rate: u32, peak: f64) -> Result<Waveform> {
    let colored = model.synthesis_filter().process(excitation);
    Ok(Waveform::new(normalize(colored, peak)?, sample_rate))
}

/// Scales so the largest absolute sample equals `peak`
pub(crate) fn normalize(mut samples: Vec<f64>, peak: f64) -> Result<Vec<f64>> {
    if samples.iter().any(|v| !v.is_finite()) {
        return Err(ConvertError::NonFinite);
    }
    scale_to_peak(&mut samples, peak).ok_or(ConvertError::DegenerateSignal)?;
    Ok(samples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::excitation::white_noise;
    use crate::synth::synthetic_vowel;
    use lpc_model::{LpcError, Method};
    use rand::{rngs::StdRng, SeedableRng};
    use std::f64::consts::PI;

    const RATE: u32 = 8000;

    /// a few harmonics of `f0` with a little noise so the autocorrelation is well conditioned
    fn sine_vowel(f0: f64, len: usize, seed: u64) -> Waveform {
        let noise = white_noise(len, &mut StdRng::seed_from_u64(seed)).unwrap();
        let samples = (0..len)
            .map(|n| {
                let t = n as f64 / RATE as f64;
                0.6 * (2.0 * PI * f0 * t).sin()
                    + 0.3 * (2.0 * PI * 2.0 * f0 * t).sin()
                    + 0.1 * (2.0 * PI * 3.0 * f0 * t).sin()
                    + 0.01 * noise[n]
            })
            .collect();
        Waveform::new(samples, RATE)
    }

    fn assert_peak(wave: &Waveform, peak: f64) {
        assert_eq!(wave.peak(), peak);
    }

    #[test]
    fn test_sine_source_to_sine_target() {
        let source = sine_vowel(220.0, 16_000, 1);
        let target = sine_vowel(330.0, 16_000, 2);
        let out = transform(&source, &target, 10).unwrap();
        assert_eq!(out.len(), 16_000);
        assert_eq!(out.sample_rate(), RATE);
        assert!(out.samples().iter().all(|v| v.is_finite()));
        assert_peak(&out, 0.9);
    }

    #[test]
    fn test_identity_conversion_reproduces_source() {
        let source = sine_vowel(180.0, 4000, 3);
        let out = transform(&source, &source, 10).unwrap();
        let scale = 0.9 / source.peak();
        for (o, s) in out.samples().iter().zip(source.samples()) {
            assert!((o - s * scale).abs() < 1e-9);
        }
    }

    #[test]
    fn test_identity_conversion_keeps_envelope() {
        let source = synthetic_vowel(&[(700.0, 80.0), (1200.0, 90.0), (2600.0, 120.0)], 120.0, RATE, 8000).unwrap();
        let converter = VowelConverter::new(ConverterConfig::default()).unwrap();
        let conversion = converter.transform_detailed(&source, &source).unwrap();
        let out_model = converter.analyze(&conversion.waveform).unwrap();
        for (a, b) in out_model.coefficients().iter().zip(conversion.source_model.coefficients()) {
            assert!((a - b).abs() < 1e-6);
        }
    }

    #[test]
    fn test_output_takes_target_formants() {
        let source = synthetic_vowel(&[(300.0, 60.0), (2300.0, 100.0)], 110.0, RATE, 16_000).unwrap();
        let target = synthetic_vowel(&[(750.0, 60.0), (1200.0, 80.0)], 140.0, RATE, 16_000).unwrap();
        let converter = VowelConverter::new(ConverterConfig::default()).unwrap();
        let conversion = converter.transform_detailed(&source, &target).unwrap();

        let out_model = converter.analyze(&conversion.waveform).unwrap();
        let target_env = conversion.target_model.envelope(256);
        let source_env = conversion.source_model.envelope(256);
        let out_env = out_model.envelope(256);
        // compare log envelope shapes with the gain factored out
        let distance = |a: &[f64], b: &[f64]| -> f64 {
            let diffs = a.iter().zip(b).map(|(x, y)| (x.ln() - y.ln())).collect::<Vec<f64>>();
            let mean = diffs.iter().sum::<f64>() / diffs.len() as f64;
            diffs.iter().map(|d| (d - mean).powi(2)).sum::<f64>() / diffs.len() as f64
        };
        assert!(distance(&out_env, &target_env) < distance(&out_env, &source_env));
    }

    #[test]
    fn test_output_length_and_rate_follow_config() {
        let config = ConverterConfig {
            sample_rate: 16_000,
            order: 8,
            peak: 0.5,
            ..ConverterConfig::default()
        };
        let converter = VowelConverter::new(config).unwrap();
        let source = sine_vowel(200.0, 3000, 4);
        let target = sine_vowel(260.0, 5000, 5);
        let out = converter.transform(&source, &target).unwrap();
        assert_eq!(out.len(), 3000);
        assert_eq!(out.sample_rate(), 16_000);
        assert_peak(&out, 0.5);
    }

    #[test]
    fn test_silent_source_is_degenerate() {
        let source = Waveform::new(vec![0.0; 1000], RATE);
        let target = sine_vowel(300.0, 1000, 6);
        assert_eq!(transform(&source, &target, 10).unwrap_err(), ConvertError::DegenerateSignal);
    }

    #[test]
    fn test_short_signals_are_rejected() {
        let short = Waveform::new(vec![0.1; 10], RATE);
        let long = sine_vowel(300.0, 1000, 7);
        assert_eq!(
            transform(&short, &long, 10).unwrap_err(),
            ConvertError::Lpc(LpcError::InsufficientData { len: 10, order: 10 })
        );
        assert_eq!(
            transform(&long, &short, 12).unwrap_err(),
            ConvertError::Lpc(LpcError::InsufficientData { len: 10, order: 12 })
        );
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = ConverterConfig {
            peak: 0.0,
            ..ConverterConfig::default()
        };
        assert!(matches!(VowelConverter::new(config), Err(ConvertError::InvalidConfig(_))));
    }

    #[test]
    fn test_unstable_model_fails_explicitly() {
        // pole at z = 1.5
        let model = ArModel::new(&[-1.5], 1.0);
        let mut excitation = vec![0.0; 4000];
        excitation[0] = 1.0;
        assert_eq!(synthesize(&excitation, &model, RATE, 0.9).unwrap_err(), ConvertError::NonFinite);
    }

    #[test]
    fn test_peak_is_exact_for_noise_pairs() {
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let source = Waveform::new(white_noise(800, &mut rng).unwrap(), RATE);
            let target = Waveform::new(white_noise(800, &mut rng).unwrap(), RATE);
            assert_peak(&transform(&source, &target, 10).unwrap(), 0.9);
        }
    }

    #[test]
    fn test_unstable_target_fails_conversion() {
        // x[n] = 2 * 1.05 cos(0.3) x[n-1] - 1.05^2 x[n-2]: poles at radius 1.05
        let target = (0..200)
            .map(|n| 1.05_f64.powi(n) * (0.3 * n as f64).cos())
            .collect::<Vec<f64>>();
        let target = Waveform::new(target, RATE);
        let source = Waveform::new(white_noise(20_000, &mut StdRng::seed_from_u64(12)).unwrap(), RATE);
        let converter = VowelConverter::new(ConverterConfig {
            order: 2,
            method: Method::Covariance,
            ..ConverterConfig::default()
        })
        .unwrap();

        assert!(!converter.analyze(&target).unwrap().is_stable());
        assert_eq!(converter.transform(&source, &target).unwrap_err(), ConvertError::NonFinite);
    }

    #[test]
    fn test_synthesize_noise_with_target_envelope() {
        let target = synthetic_vowel(&[(800.0, 70.0), (1300.0, 90.0)], 150.0, RATE, 8000).unwrap();
        let model = lpc_model::analyze(&target, 10).unwrap();
        let noise = white_noise(8000, &mut StdRng::seed_from_u64(9)).unwrap();
        let out = synthesize(&noise, &model, RATE, 0.9).unwrap();
        assert_eq!(out.len(), 8000);
        assert_peak(&out, 0.9);
    }
}
