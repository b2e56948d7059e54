use std::{f64::consts::PI, fmt, str::FromStr};

/// Tapers a buffer in place
pub type RealWindowFn = fn(&mut [f64]);

/// A taper that can be applied to an analysis frame
pub trait WindowFunction {
    /// Multiplies `buffer` by the window, sized to the buffer length
    fn real_window(buffer: &mut [f64]);
}

/// 4-term Blackman-Harris, periodic form
pub struct BlackmanHarris;

impl WindowFunction for BlackmanHarris {
    fn real_window(buffer: &mut [f64]) {
        const A: [f64; 4] = [0.35875, 0.48829, 0.14128, 0.01168];
        let step = 2.0 * PI / buffer.len() as f64;
        for (i, v) in buffer.iter_mut().enumerate() {
            let x = i as f64 * step;
            *v *= A[0] - A[1] * x.cos() + A[2] * (2.0 * x).cos() - A[3] * (3.0 * x).cos();
        }
    }
}

/// Symmetric Hamming window, zero-phase at the frame centre
pub struct Hamming;

impl WindowFunction for Hamming {
    fn real_window(buffer: &mut [f64]) {
        if buffer.len() < 2 {
            return;
        }
        let step = 2.0 * PI / (buffer.len() - 1) as f64;
        for (i, v) in buffer.iter_mut().enumerate() {
            *v *= 0.54 - 0.46 * (i as f64 * step).cos();
        }
    }
}

/// Leaves the buffer untouched
pub struct Rectangular;

impl WindowFunction for Rectangular {
    fn real_window(_buffer: &mut [f64]) {}
}

/// Selects the taper applied to a signal before it is analyzed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Window {
    /// No taper, the whole signal is weighted equally
    #[default]
    Rectangular,
    Hamming,
    BlackmanHarris,
}

impl Window {
    #[inline]
    pub fn window_fn(self) -> RealWindowFn {
        match self {
            Self::Rectangular => Rectangular::real_window,
            Self::Hamming => Hamming::real_window,
            Self::BlackmanHarris => BlackmanHarris::real_window,
        }
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Rectangular => "rectangular",
            Self::Hamming => "hamming",
            Self::BlackmanHarris => "blackman-harris",
        };
        f.write_str(name)
    }
}

impl FromStr for Window {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rectangular" | "none" => Ok(Self::Rectangular),
            "hamming" => Ok(Self::Hamming),
            "blackman-harris" | "blackmanharris" => Ok(Self::BlackmanHarris),
            other => Err(format!("unknown window '{other}', expected rectangular, hamming or blackman-harris")),
        }
    }
}
