//! This library contains the vowel conversion pipeline.
//! [`VowelConverter`] whitens a source vowel with its own AR model and re-colors the excitation
//! with the AR model of a target vowel, see [`converter`]. [`pipeline::run_pipeline`] wires
//! signal sources and sinks around it so the conversion can run without audio devices.

pub mod config;
pub mod converter;
pub mod error;
pub mod excitation;
pub mod pipeline;
pub mod synth;

pub use config::ConverterConfig;
pub use converter::{synthesize, transform, Conversion, VowelConverter};
pub use error::{ConvertError, Result};
pub use pipeline::{run_pipeline, BoxError, PipelineError, SignalSink, SignalSource, WavSink, WavSource};
pub use wav_util::Waveform;
