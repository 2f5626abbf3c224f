//! gc2385-linux-i2c - Linux i2c-dev register bus
//!
//! This crate drives a GC2385 from user space through the
//! `/dev/i2c-N` character devices exposed by the Linux i2c-dev driver.
//!
//! # Example
//!
//! ```no_run
//! use gc2385_core::control::ExposureGainCache;
//! use gc2385_core::sensor::{Gc2385, SensorControl};
//! use gc2385_linux_i2c::{LinuxI2c, LinuxI2cConfig};
//!
//! static CACHE: ExposureGainCache = ExposureGainCache::new();
//!
//! // Sensor at the default 7-bit address 0x37
//! let bus = LinuxI2c::open(&LinuxI2cConfig::new("/dev/i2c-1"))?;
//! let mut sensor = Gc2385::new(bus, &CACHE);
//! println!("chip id 0x{:04x}", sensor.detect()?);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Bus strings
//!
//! ```text
//! linux_i2c:dev=/dev/i2c-1
//! linux_i2c:dev=/dev/i2c-3,addr=0x3c
//! ```
//!
//! # System Requirements
//!
//! - Linux kernel with i2c-dev support enabled (`CONFIG_I2C_CHARDEV`)
//! - Read/write access to `/dev/i2c-N`
//! - No kernel driver bound to the sensor address

pub mod device;
pub mod error;

// Re-exports
pub use device::{parse_options, LinuxI2c, LinuxI2cConfig};
pub use error::{LinuxI2cError, Result};

/// Open a Linux I2C device and return a boxed RegisterBus
///
/// This is a convenience function for the bus registry.
///
/// # Example Options
///
/// - `dev=/dev/i2c-1` - Required: device path
/// - `addr=0x37` - Optional: 7-bit slave address (default: 0x37)
pub fn open_linux_i2c(
    options: &[(&str, &str)],
) -> std::result::Result<Box<dyn gc2385_core::bus::RegisterBus + Send>, Box<dyn std::error::Error>>
{
    let config = parse_options(options)?;
    let bus = LinuxI2c::open(&config)?;
    Ok(Box::new(bus))
}
