use thiserror::Error;

/// Result type alias for audio device operations
pub type Result<T> = std::result::Result<T, DeviceError>;

#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("no input device available")]
    NoInputDevice,

    #[error("no output device available")]
    NoOutputDevice,

    /// The device offers no stream configuration usable at the requested rate
    #[error("unsupported device configuration: {0}")]
    UnsupportedConfig(String),

    /// Building, starting or running the stream failed
    #[error("audio stream error: {0}")]
    Stream(String),

    #[error("recording duration must be a non-negative number of seconds, got {0}")]
    InvalidDuration(f64),
}
