//! gc2385-core - Control core for the GalaxyCore GC2385 image sensor
//!
//! This crate converts requested exposure times and gains into GC2385
//! register values and sequences chip detection, initialisation and stream
//! start. It is designed to be `no_std` compatible; the register transport
//! is supplied by the caller through [`bus::RegisterBus`].
//!
//! # Features
//!
//! - `std` - Enable standard library support (includes `alloc`), mutex
//!   based bus locks and TOML configuration files
//! - `alloc` - Enable boxed register buses
//!
//! # Example
//!
//! ```ignore
//! use gc2385_core::control::ExposureGainCache;
//! use gc2385_core::sensor::{Gc2385, SensorControl};
//!
//! static CACHE: ExposureGainCache = ExposureGainCache::new();
//!
//! fn start<B: gc2385_core::bus::RegisterBus>(bus: B) -> gc2385_core::Result<()> {
//!     let mut sensor = Gc2385::new(bus, &CACHE);
//!     sensor.initialize()?;
//!     sensor.stream_enable(true)?;
//!     sensor.set_exposure_gain(16 * 1000, 4 * 16)?;
//!     Ok(())
//! }
//! ```

#![no_std]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

#[cfg(feature = "alloc")]
extern crate alloc;

#[cfg(any(feature = "std", test))]
extern crate std;

pub mod bus;
#[cfg(feature = "std")]
pub mod config;
pub mod control;
pub mod error;
pub mod mode;
pub mod power;
pub mod regs;
pub mod sensor;

pub use error::{Error, Result};
