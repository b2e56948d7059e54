use lpc_model::LpcError;
use thiserror::Error;

/// Result type alias for conversion operations
pub type Result<T> = std::result::Result<T, ConvertError>;

#[derive(Debug, Error, PartialEq)]
pub enum ConvertError {
    /// Fitting or applying an AR model failed
    #[error(transparent)]
    Lpc(#[from] LpcError),

    /// The converted signal is silent, so it cannot be normalized
    #[error("converted signal is all zeros, cannot normalize its peak")]
    DegenerateSignal,

    /// The synthesis filter blew up and produced infinite or NaN samples
    #[error("converted signal is not finite, the target model is likely unstable")]
    NonFinite,

    /// A configuration value is out of range
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
