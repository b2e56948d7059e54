use thiserror::Error;

/// Result type alias for LPC operations
pub type Result<T> = std::result::Result<T, LpcError>;

#[derive(Debug, Error, PartialEq)]
pub enum LpcError {
    /// The signal is too short to fit a model of the requested order
    #[error("need more than {order} samples to fit an order {order} model, got {len}")]
    InsufficientData { len: usize, order: usize },

    /// The covariance normal equations have no unique solution
    #[error("covariance matrix is singular, cannot solve for an order {order} predictor")]
    Singular { order: usize },

    /// Filter coefficients that cannot describe a causal filter
    #[error("invalid filter: {0}")]
    InvalidFilter(&'static str),
}
