//! High-level sensor access for capture hosts
//!
//! This crate opens a register bus from a bus string or a TOML
//! configuration file and returns a ready [`SensorHandle`]. Every handle in
//! the process reports to the same exposure/gain cache, so a stream restart
//! on any GC2385 re-applies the most recent pair set on any of them.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        capture host                          │
//! │  - Only imports gc2385-host                                  │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     gc2385-host (this crate)                 │
//! │  - SensorHandle: sensor + config + process-wide cache        │
//! │  - Bus registry: opens register buses by name                │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!              ┌───────────────┴───────────────┐
//!              ▼                               ▼
//! ┌──────────────────────────┐   ┌──────────────────────────┐
//! │    gc2385-core           │   │  Bus crates              │
//! │  - Gc2385, SensorControl │   │  - dummy, linux_i2c      │
//! │  - register tables       │   │  - Implement RegisterBus │
//! └──────────────────────────┘   └──────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use gc2385_host::open_sensor;
//!
//! let mut handle = open_sensor("linux_i2c:dev=/dev/i2c-1")?;
//! handle.start()?;
//! handle.set_exposure_gain(16 * 800, 32)?;
//! ```

mod handle;
mod registry;

pub use handle::{model_cache, SensorHandle, SensorInfo, SharedLock};
pub use registry::{
    available_buses, bus_names_short, open_bus, open_sensor, open_sensor_with_config,
    parse_bus_params, BoxedBus, BusInfo, BusParams,
};

// Re-export core types hosts need
pub use gc2385_core::config::SensorConfig;
pub use gc2385_core::control::ExposureGain;
pub use gc2385_core::power::PowerAction;
pub use gc2385_core::sensor::{ControlId, SensorControl};
