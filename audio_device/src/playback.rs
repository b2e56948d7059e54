//! Playback to the default output device

use std::sync::mpsc;
use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use vowel_converter::{BoxError, SignalSink};
use wav_util::Waveform;

use crate::config::pick_config;
use crate::error::{DeviceError, Result};

/// Lets the device drain its last buffer before the stream is dropped
const DRAIN_DELAY: Duration = Duration::from_millis(100);

/// Plays `waveform` on the default speaker at `sample_rate` and blocks until it has finished.
///
/// Every output channel receives the same sample. An empty waveform returns immediately.
///
/// # Errors
///
/// Returns error if no output device exists, the device cannot run at `sample_rate`, or the
/// stream fails
pub fn play(waveform: &Waveform, sample_rate: u32) -> Result<()> {
    if waveform.is_empty() {
        return Ok(());
    }

    let host = cpal::default_host();
    let device = host.default_output_device().ok_or(DeviceError::NoOutputDevice)?;
    let ranges = device
        .supported_output_configs()
        .map_err(|e| DeviceError::UnsupportedConfig(e.to_string()))?;
    let config = pick_config(ranges, sample_rate)?;
    let channels = config.channels as usize;

    tracing::debug!(
        device = device.name().unwrap_or_default(),
        sample_rate,
        channels,
        samples = waveform.len(),
        "playback started"
    );

    let samples = waveform.samples().iter().map(|&v| v as f32).collect::<Vec<f32>>();
    let (tx, rx) = mpsc::channel::<Result<()>>();
    let err_tx = tx.clone();
    let mut position = 0;
    let mut finished = false;

    let stream = device
        .build_output_stream(
            &config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                for frame in data.chunks_mut(channels) {
                    let sample = samples.get(position).copied().unwrap_or(0.0);
                    frame.fill(sample);
                    position += 1;
                }
                if position >= samples.len() && !finished {
                    finished = true;
                    let _ = tx.send(Ok(()));
                }
            },
            move |err| {
                tracing::error!(error = %err, "audio playback error");
                let _ = err_tx.send(Err(DeviceError::Stream(err.to_string())));
            },
            None,
        )
        .map_err(|e| DeviceError::Stream(e.to_string()))?;

    stream.play().map_err(|e| DeviceError::Stream(e.to_string()))?;
    rx.recv()
        .map_err(|_| DeviceError::Stream("output stream closed before playback finished".to_string()))??;
    std::thread::sleep(DRAIN_DELAY);
    drop(stream);

    tracing::debug!("playback complete");
    Ok(())
}

/// The default speaker as a sink, playing each waveform at its own sample rate
#[derive(Debug, Clone, Copy, Default)]
pub struct Speaker;

impl SignalSink for Speaker {
    fn render(&mut self, waveform: &Waveform) -> std::result::Result<(), BoxError> {
        Ok(play(waveform, waveform.sample_rate())?)
    }
}
