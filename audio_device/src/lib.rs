//! Blocking microphone capture and speaker playback on the default audio devices.
//!
//! Both directions run one `cpal` stream for the duration of the call and block the caller
//! until every sample has been captured or played.

mod capture;
mod config;
mod error;
mod playback;

pub use capture::{record, Microphone};
pub use error::{DeviceError, Result};
pub use playback::{play, Speaker};
