use lpc_model::{LpcAnalyzer, Method, Window};

use crate::error::{ConvertError, Result};

/// Rate the microphone is recorded at and the converted vowel is played back at
pub const DEFAULT_SAMPLE_RATE: u32 = 8000;
/// An order 10 model captures the first few formants of a vowel at 8 kHz
pub const DEFAULT_ORDER: usize = 10;
/// Peak amplitude of converted signals, leaves headroom below full scale
pub const DEFAULT_PEAK: f64 = 0.9;

/// The parameters of a conversion, passed explicitly into every operation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConverterConfig {
    pub sample_rate: u32,
    pub order: usize,
    pub peak: f64,
    pub method: Method,
    pub window: Window,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            order: DEFAULT_ORDER,
            peak: DEFAULT_PEAK,
            method: Method::default(),
            window: Window::default(),
        }
    }
}

impl ConverterConfig {
    /// The default configuration with a different model order
    #[inline]
    pub fn with_order(order: usize) -> Self {
        Self {
            order,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.sample_rate == 0 {
            return Err(ConvertError::InvalidConfig("sample rate must be positive".into()));
        }
        if !self.peak.is_finite() || self.peak <= 0.0 {
            return Err(ConvertError::InvalidConfig(format!(
                "peak amplitude must be a positive number, got {}",
                self.peak
            )));
        }
        Ok(())
    }

    /// The analyzer both vowels are modelled with
    #[inline]
    pub fn analyzer(&self) -> LpcAnalyzer {
        LpcAnalyzer::new(self.order)
            .with_method(self.method)
            .with_window(self.window)
    }
}
