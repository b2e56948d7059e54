//! The loader → analyzer → converter → sink flow, independent of where signals come from.
use std::path::{Path, PathBuf};
use thiserror::Error;
use wav_util::{read_wave, write_wave, Waveform};

use crate::converter::{Conversion, VowelConverter};
use crate::error::ConvertError;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Anything a vowel can be loaded or captured from
pub trait SignalSource {
    fn acquire(&mut self) -> Result<Waveform, BoxError>;
}

/// Anything a converted vowel can be rendered to
pub trait SignalSink {
    fn render(&mut self, waveform: &Waveform) -> Result<(), BoxError>;
}

/// An already loaded waveform acts as a source of itself
impl SignalSource for Waveform {
    fn acquire(&mut self) -> Result<Waveform, BoxError> {
        Ok(self.clone())
    }
}

/// Loads a vowel from a wav file
#[derive(Debug, Clone)]
pub struct WavSource {
    path: PathBuf,
    expected_rate: u32,
}

impl WavSource {
    pub fn new<P: AsRef<Path>>(path: P, expected_rate: u32) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            expected_rate,
        }
    }
}

impl SignalSource for WavSource {
    fn acquire(&mut self) -> Result<Waveform, BoxError> {
        Ok(read_wave(&self.path, self.expected_rate)?)
    }
}

/// Saves converted vowels to a wav file
#[derive(Debug, Clone)]
pub struct WavSink {
    path: PathBuf,
}

impl WavSink {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl SignalSink for WavSink {
    fn render(&mut self, waveform: &Waveform) -> Result<(), BoxError> {
        write_wave(waveform, &self.path)?;
        tracing::info!(path = %self.path.display(), "saved converted vowel");
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("failed to acquire source vowel: {0}")]
    Source(#[source] BoxError),

    #[error("failed to acquire target vowel: {0}")]
    Target(#[source] BoxError),

    #[error("conversion failed: {0}")]
    Convert(#[from] ConvertError),

    #[error("failed to render converted vowel: {0}")]
    Sink(#[source] BoxError),
}

/// Acquires the source then the target vowel, converts, and renders the result.
/// Stops at the first failing stage. Returns the conversion with both fitted models.
pub fn run_pipeline(
    source: &mut dyn SignalSource,
    target: &mut dyn SignalSource,
    converter: &VowelConverter,
    sink: &mut dyn SignalSink,
) -> Result<Conversion, PipelineError> {
    let source = source.acquire().map_err(PipelineError::Source)?;
    tracing::info!(samples = source.len(), rate = source.sample_rate(), "acquired source vowel");
    let target = target.acquire().map_err(PipelineError::Target)?;
    tracing::info!(samples = target.len(), rate = target.sample_rate(), "acquired target vowel");

    let conversion = converter.transform_detailed(&source, &target)?;
    sink.render(&conversion.waveform).map_err(PipelineError::Sink)?;
    Ok(conversion)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConverterConfig;
    use crate::synth::synthetic_vowel;

    #[derive(Default)]
    struct MemorySink {
        rendered: Vec<Waveform>,
    }

    impl SignalSink for MemorySink {
        fn render(&mut self, waveform: &Waveform) -> Result<(), BoxError> {
            self.rendered.push(waveform.clone());
            Ok(())
        }
    }

    struct FailingSink;

    impl SignalSink for FailingSink {
        fn render(&mut self, _waveform: &Waveform) -> Result<(), BoxError> {
            Err("speaker unplugged".into())
        }
    }

    fn converter() -> VowelConverter {
        VowelConverter::new(ConverterConfig::default()).unwrap()
    }

    #[test]
    fn test_in_memory_pipeline() {
        let source = synthetic_vowel(&[(300.0, 60.0), (2300.0, 100.0)], 110.0, 8000, 6000).unwrap();
        let target = synthetic_vowel(&[(750.0, 60.0), (1200.0, 80.0)], 140.0, 8000, 4000).unwrap();
        let mut sink = MemorySink::default();

        let conversion = run_pipeline(&mut source.clone(), &mut target.clone(), &converter(), &mut sink).unwrap();
        assert_eq!(conversion.waveform.len(), 6000);
        assert_eq!(conversion.source_model, converter().analyze(&source).unwrap());
        assert_eq!(conversion.target_model, converter().analyze(&target).unwrap());
        assert_eq!(sink.rendered, vec![conversion.waveform]);
    }

    #[test]
    fn test_file_pipeline() {
        let dir = tempfile::tempdir().unwrap();
        let target_path = dir.path().join("a.wav");
        let out_path = dir.path().join("out.wav");
        let target = synthetic_vowel(&[(750.0, 60.0), (1200.0, 80.0)], 140.0, 8000, 4000).unwrap();
        write_wave(&target, &target_path).unwrap();

        let mut source = synthetic_vowel(&[(300.0, 60.0), (2300.0, 100.0)], 110.0, 8000, 5000).unwrap();
        let out = run_pipeline(
            &mut source,
            &mut WavSource::new(&target_path, 8000),
            &converter(),
            &mut WavSink::new(&out_path),
        )
        .unwrap()
        .waveform;

        let saved = read_wave(&out_path, 8000).unwrap();
        assert_eq!(saved.len(), out.len());
        for (s, o) in saved.samples().iter().zip(out.samples()) {
            assert!((s - o).abs() < 1e-6);
        }
    }

    #[test]
    fn test_missing_target_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut source = synthetic_vowel(&[(300.0, 60.0)], 110.0, 8000, 2000).unwrap();
        let mut sink = MemorySink::default();
        let err = run_pipeline(
            &mut source,
            &mut WavSource::new(dir.path().join("missing.wav"), 8000),
            &converter(),
            &mut sink,
        )
        .unwrap_err();
        assert!(matches!(err, PipelineError::Target(_)));
        assert!(sink.rendered.is_empty());
    }

    #[test]
    fn test_conversion_and_sink_errors() {
        let mut silent = Waveform::new(vec![0.0; 2000], 8000);
        let mut target = synthetic_vowel(&[(750.0, 60.0)], 140.0, 8000, 2000).unwrap();
        let err = run_pipeline(&mut silent, &mut target, &converter(), &mut MemorySink::default()).unwrap_err();
        assert!(matches!(err, PipelineError::Convert(ConvertError::DegenerateSignal)));

        let mut source = synthetic_vowel(&[(300.0, 60.0)], 110.0, 8000, 2000).unwrap();
        let err = run_pipeline(&mut source, &mut target, &converter(), &mut FailingSink).unwrap_err();
        assert!(matches!(err, PipelineError::Sink(_)));
        assert!(err.to_string().contains("speaker unplugged"));
    }
}
