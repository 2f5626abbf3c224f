//! Register bus abstractions
//!
//! This module defines the traits a control channel must implement to
//! drive the sensor, and the lock used around power transitions.

mod lock;
mod traits;

pub use lock::BusLock;
pub use traits::*;
