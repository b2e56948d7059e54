//! Mono waveform storage and WAV file helpers.
//! [`Waveform`] is the value passed between every stage of the vowel transformer.
use std::path::{Path, PathBuf};
use statrs::statistics::*;
use thiserror::Error;

/// Result type alias for WAV operations
pub type Result<T> = std::result::Result<T, WavError>;

/// Errors raised while reading or writing WAV files
#[derive(Debug, Error)]
pub enum WavError {
    /// The file could not be opened or its header is not a WAV header
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: hound::Error,
    },

    /// The file opened but its sample data could not be decoded
    #[error("failed to decode samples in {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: hound::Error,
    },

    /// The output file could not be created
    #[error("failed to create {path}: {source}")]
    Create {
        path: PathBuf,
        #[source]
        source: hound::Error,
    },

    /// Writing samples to the output file failed
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: hound::Error,
    },
}

/// A mono signal with the rate it was sampled at.
/// Samples are never modified after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Waveform {
    samples: Vec<f64>,
    sample_rate: u32,
}

impl Waveform {
    #[inline]
    pub fn new(samples: Vec<f64>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    #[inline]
    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    #[inline]
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Length of the signal in seconds (0 when the sample rate is 0)
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// The largest absolute sample value, 0 for an empty signal
    pub fn peak(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        self.samples.as_slice().abs_max()
    }

    #[inline]
    pub fn into_samples(self) -> Vec<f64> {
        self.samples
    }
}

/// Read a wav file into a mono [`Waveform`], keeping only the first channel.
/// Integer PCM is scaled into `[-1, 1)`. A warning is logged when the file's rate differs
/// from `expected_rate`; the samples are not resampled and the waveform keeps the file's rate.
/// # Arguments
/// * `path` - The file to read
/// * `expected_rate` - The rate the caller intends to process the samples at
pub fn read_wave<P: AsRef<Path>>(path: P, expected_rate: u32) -> Result<Waveform> {
    let path = path.as_ref();
    let mut reader = hound::WavReader::open(path).map_err(|source| WavError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let spec = reader.spec();
    if spec.sample_rate != expected_rate {
        tracing::warn!(
            path = %path.display(),
            file_rate = spec.sample_rate,
            expected_rate,
            "file sample rate differs from expected rate, samples are used as-is"
        );
    }

    let interleaved = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .map(|v| v.map(f64::from))
            .collect::<std::result::Result<Vec<f64>, hound::Error>>(),
        hound::SampleFormat::Int => {
            let full_scale = (1_u64 << u32::from(spec.bits_per_sample).saturating_sub(1)) as f64;
            reader
                .samples::<i32>()
                .map(|v| v.map(|s| s as f64 / full_scale))
                .collect::<std::result::Result<Vec<f64>, hound::Error>>()
        }
    }
    .map_err(|source| WavError::Decode {
        path: path.to_path_buf(),
        source,
    })?;

    let samples = first_channel(&interleaved, spec.channels as usize);
    tracing::debug!(
        path = %path.display(),
        channels = spec.channels,
        sample_rate = spec.sample_rate,
        samples = samples.len(),
        "loaded wav file"
    );
    Ok(Waveform::new(samples, spec.sample_rate))
}

/// Write a waveform to a mono 32 bit float wav file at the waveform's sample rate.
/// If the signal would clip it is attenuated on the way out (see [`scale_audio`]).
pub fn write_wave<P: AsRef<Path>>(waveform: &Waveform, path: P) -> Result<()> {
    let path = path.as_ref();
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: waveform.sample_rate(),
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut audio = waveform.samples().to_vec();
    scale_audio(&mut audio);

    let mut writer = hound::WavWriter::create(path, spec).map_err(|source| WavError::Create {
        path: path.to_path_buf(),
        source,
    })?;
    let write_err = |source: hound::Error| WavError::Write {
        path: path.to_path_buf(),
        source,
    };
    for s in &audio {
        writer.write_sample(*s as f32).map_err(write_err)?;
    }
    writer.finalize().map_err(write_err)?;
    tracing::debug!(path = %path.display(), samples = audio.len(), "wrote wav file");
    Ok(())
}

/// Normalizes the signal if the maximum amplitude is greater than 1.0 (uses the absolute value of the amplitude)
pub fn scale_audio(audio: &mut [f64]) {
    if audio.is_empty() {
        return;
    }
    let max = (&*audio).abs_max();
    if max <= 1.0 || !max.is_finite() {
        return;
    }
    for v in audio.iter_mut() {
        *v /= max;
    }
}

/// Scales the signal so its largest absolute sample equals `peak`.
/// Returns the factor that was applied, or `None` (leaving the signal untouched)
/// when the signal is empty, silent, or contains non-finite values.
pub fn scale_to_peak(audio: &mut [f64], peak: f64) -> Option<f64> {
    if audio.is_empty() {
        return None;
    }
    let max = (&*audio).abs_max();
    if !max.is_finite() || max == 0.0 {
        return None;
    }
    // dividing first makes the largest sample exactly +-1 before it is scaled
    for v in audio.iter_mut() {
        *v = *v / max * peak;
    }
    Some(peak / max)
}

/// Picks every `channels`-th sample starting at index 0 out of an interleaved buffer
#[inline]
fn first_channel(interleaved: &[f64], channels: usize) -> Vec<f64> {
    interleaved.iter().step_by(channels.max(1)).copied().collect()
}
