//! Exposure and gain control
//!
//! Pure conversions from caller units to register values, the register
//! sequences that apply them, and the model-wide cache of the last applied
//! pair.

pub mod cache;
pub mod exposure;
pub mod gain;
mod ops;

pub use cache::{ExposureGain, ExposureGainCache};
pub use gain::{GainBand, GainSetting, GAIN_BANDS};
pub use ops::*;
