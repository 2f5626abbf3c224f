//! Sensor instances and the host control interface

mod control;
mod device;
mod state;

pub use control::{ControlId, ControlRange, SensorControl};
pub use device::{Gc2385, DETECT_RETRIES};
pub use state::{SensorState, SequencerState};
