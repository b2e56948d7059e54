//! Recording from the default input device

use std::sync::mpsc;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use vowel_converter::{BoxError, SignalSource};
use wav_util::Waveform;

use crate::config::{first_channel, frames_for, pick_config};
use crate::error::{DeviceError, Result};

/// Records `floor(duration_secs * sample_rate)` mono samples from the default microphone.
///
/// Blocks until the recording is complete. Multi-channel devices contribute their first channel.
///
/// # Errors
///
/// Returns error if the duration is invalid, no input device exists, the device cannot run
/// at `sample_rate`, or the stream fails
pub fn record(duration_secs: f64, sample_rate: u32) -> Result<Waveform> {
    let frames = frames_for(duration_secs, sample_rate)?;
    if frames == 0 {
        return Ok(Waveform::new(Vec::new(), sample_rate));
    }

    let host = cpal::default_host();
    let device = host.default_input_device().ok_or(DeviceError::NoInputDevice)?;
    let ranges = device
        .supported_input_configs()
        .map_err(|e| DeviceError::UnsupportedConfig(e.to_string()))?;
    let config = pick_config(ranges, sample_rate)?;
    let channels = config.channels as usize;

    tracing::debug!(
        device = device.name().unwrap_or_default(),
        sample_rate,
        channels,
        frames,
        "recording started"
    );

    let (tx, rx) = mpsc::channel::<Result<Vec<f64>>>();
    let err_tx = tx.clone();
    let mut captured = Vec::with_capacity(frames);
    let mut done = false;

    let stream = device
        .build_input_stream(
            &config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                if done {
                    return;
                }
                let remaining = frames - captured.len();
                captured.extend(first_channel(data, channels).take(remaining).map(f64::from));
                if captured.len() == frames {
                    done = true;
                    let _ = tx.send(Ok(std::mem::take(&mut captured)));
                }
            },
            move |err| {
                tracing::error!(error = %err, "audio capture error");
                let _ = err_tx.send(Err(DeviceError::Stream(err.to_string())));
            },
            None,
        )
        .map_err(|e| DeviceError::Stream(e.to_string()))?;

    stream.play().map_err(|e| DeviceError::Stream(e.to_string()))?;
    let samples = rx
        .recv()
        .map_err(|_| DeviceError::Stream("input stream closed before recording finished".to_string()))??;
    drop(stream);

    tracing::debug!(samples = samples.len(), "recording complete");
    Ok(Waveform::new(samples, sample_rate))
}

/// The default microphone as a vowel source
#[derive(Debug, Clone, Copy)]
pub struct Microphone {
    pub duration_secs: f64,
    pub sample_rate: u32,
}

impl Microphone {
    pub fn new(duration_secs: f64, sample_rate: u32) -> Self {
        Self {
            duration_secs,
            sample_rate,
        }
    }
}

impl SignalSource for Microphone {
    fn acquire(&mut self) -> std::result::Result<Waveform, BoxError> {
        Ok(record(self.duration_secs, self.sample_rate)?)
    }
}
