//! Linear-predictive (all-pole) modeling of audio signals.
//!
//! [`analysis::LpcAnalyzer`] fits an [`ArModel`] to a signal. The model's
//! [`ArModel::inverse_filter`] whitens a signal and its [`ArModel::synthesis_filter`]
//! imposes the model's spectral envelope on an excitation.

pub mod analysis;
pub mod error;
pub mod filter;
pub mod model;
pub mod resonator;
pub mod response;
pub mod window;

pub use analysis::{analyze, LpcAnalyzer, Method};
pub use error::{LpcError, Result};
pub use filter::{FilterState, LTISystem, LinearFilter};
pub use model::{ArModel, FORMANT_MIN_PROMINENCE_DB};
pub use resonator::ConjPoleResonator;
pub use response::TransferFunction;
pub use window::Window;
