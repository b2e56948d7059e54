use cpal::{SampleFormat, SampleRate, StreamConfig, SupportedStreamConfigRange};

use crate::error::{DeviceError, Result};

/// Picks the f32 configuration with the fewest channels that can run at `sample_rate`
pub(crate) fn pick_config<I>(ranges: I, sample_rate: u32) -> Result<StreamConfig>
where
    I: IntoIterator<Item = SupportedStreamConfigRange>,
{
    let rate = SampleRate(sample_rate);
    ranges
        .into_iter()
        .filter(|c| {
            c.sample_format() == SampleFormat::F32
                && c.channels() > 0
                && c.min_sample_rate() <= rate
                && c.max_sample_rate() >= rate
        })
        .min_by_key(|c| c.channels())
        .map(|c| c.with_sample_rate(rate).config())
        .ok_or_else(|| DeviceError::UnsupportedConfig(format!("no f32 stream supports {sample_rate} Hz")))
}

/// Keeps the first sample of every interleaved frame
#[inline]
pub(crate) fn first_channel(interleaved: &[f32], channels: usize) -> impl Iterator<Item = f32> + '_ {
    interleaved.iter().step_by(channels.max(1)).copied()
}

/// `floor(duration_secs * sample_rate)`, rejecting negative and non-finite durations
pub(crate) fn frames_for(duration_secs: f64, sample_rate: u32) -> Result<usize> {
    if !duration_secs.is_finite() || duration_secs < 0.0 {
        return Err(DeviceError::InvalidDuration(duration_secs));
    }
    Ok((duration_secs * sample_rate as f64).floor() as usize)
}
