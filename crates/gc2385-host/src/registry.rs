//! Bus registry and sensor opening
//!
//! This module turns a bus string such as
//! `linux_i2c:dev=/dev/i2c-1,addr=0x37` into an open register bus, and a
//! bus plus configuration into a detected [`SensorHandle`].

use crate::handle::SensorHandle;
use gc2385_core::bus::RegisterBus;
use gc2385_core::config::SensorConfig;
use std::collections::HashMap;

/// Type-erased register bus owned by a handle
pub type BoxedBus = Box<dyn RegisterBus + Send>;

/// Parsed bus parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusParams {
    /// Bus name (canonical)
    pub name: String,
    /// Key-value parameters
    pub params: HashMap<String, String>,
}

impl BusParams {
    /// Parameters as borrowed pairs, sorted by key
    pub fn options(&self) -> Vec<(&str, &str)> {
        let mut options: Vec<(&str, &str)> = self
            .params
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        options.sort_unstable();
        options
    }
}

/// Parse a bus string into name and parameters
///
/// Format: "name" or "name:key1=value1,key2=value2"
///
/// # Example
/// ```ignore
/// let params = parse_bus_params("linux_i2c:dev=/dev/i2c-1")?;
/// assert_eq!(params.name, "linux_i2c");
/// assert_eq!(params.params.get("dev"), Some(&"/dev/i2c-1".to_string()));
/// ```
pub fn parse_bus_params(s: &str) -> Result<BusParams, Box<dyn std::error::Error>> {
    let s = s.trim();
    let (name, opts_str) = s.split_once(':').unwrap_or((s, ""));
    if name.is_empty() {
        return Err("Empty bus name".into());
    }

    let mut params = HashMap::new();
    if !opts_str.is_empty() {
        for opt in opts_str.split(',') {
            if let Some((key, value)) = opt.split_once('=') {
                params.insert(key.trim().to_string(), value.trim().to_string());
            } else {
                return Err(format!("Invalid parameter format: '{}' (expected key=value)", opt).into());
            }
        }
    }

    Ok(BusParams {
        name: name.to_string(),
        params,
    })
}

/// Open a register bus from its bus string
///
/// # Arguments
/// * `bus` - Bus string (e.g., "dummy" or "linux_i2c:dev=/dev/i2c-1")
pub fn open_bus(bus: &str) -> Result<BoxedBus, Box<dyn std::error::Error>> {
    let params = parse_bus_params(bus)?;
    log::debug!("Opening bus {} ({} parameters)", params.name, params.params.len());

    match params.name.as_str() {
        #[cfg(feature = "dummy")]
        "dummy" => open_dummy(&params),

        #[cfg(feature = "linux-i2c")]
        "linux_i2c" | "linux-i2c" | "i2c-dev" => {
            gc2385_linux_i2c::open_linux_i2c(&params.options())
        }

        _ => Err(format!(
            "Unknown bus: {} (available: {})",
            params.name,
            bus_names_short()
        )
        .into()),
    }
}

#[cfg(feature = "dummy")]
fn open_dummy(params: &BusParams) -> Result<BoxedBus, Box<dyn std::error::Error>> {
    use gc2385_dummy::{DummyConfig, DummySensor};

    let mut config = DummyConfig::default();
    for (key, value) in params.options() {
        match key {
            "chip_id" => {
                config.chip_id = gc2385_core::config::parse_number(value)
                    .ok()
                    .and_then(|id| u16::try_from(id).ok())
                    .ok_or_else(|| format!("Invalid chip_id value: {}", value))?;
            }
            _ => log::warn!("dummy: Unknown option: {}={}", key, value),
        }
    }
    Ok(Box::new(DummySensor::new(config)))
}

/// Open a sensor on the bus named by `bus` and detect it
///
/// The handle uses the primary instance name and the default mode.
pub fn open_sensor(bus: &str) -> Result<SensorHandle, Box<dyn std::error::Error>> {
    open_sensor_with_config(SensorConfig::new(bus))
}

/// Open a sensor described by a configuration and detect it
///
/// An initial exposure/gain pair in the configuration is stored in the
/// process-wide cache before detection.
pub fn open_sensor_with_config(
    config: SensorConfig,
) -> Result<SensorHandle, Box<dyn std::error::Error>> {
    let bus = open_bus(&config.bus)?;
    let mut handle = SensorHandle::new(bus, config);
    let chip_id = handle.detect()?;
    log::info!("{}: GC2385 (id 0x{:04X}) ready", handle.name(), chip_id);
    Ok(handle)
}

/// Information about an available bus
#[derive(Debug, Clone)]
pub struct BusInfo {
    /// Primary name
    pub name: &'static str,
    /// Alternative names
    pub aliases: &'static [&'static str],
    /// Short description
    pub description: &'static str,
}

/// Get information about all available buses (enabled at compile time)
#[allow(unused_mut, clippy::vec_init_then_push)]
pub fn available_buses() -> Vec<BusInfo> {
    let mut buses = Vec::new();

    #[cfg(feature = "dummy")]
    buses.push(BusInfo {
        name: "dummy",
        aliases: &[],
        description: "In-memory GC2385 emulator for testing (chip_id=<id>)",
    });

    #[cfg(feature = "linux-i2c")]
    buses.push(BusInfo {
        name: "linux_i2c",
        aliases: &["linux-i2c", "i2c-dev"],
        description: "Linux I2C device via i2c-dev interface (dev=/dev/i2c-N,addr=<7-bit>)",
    });

    buses
}

/// Short list of bus names for error messages
pub fn bus_names_short() -> String {
    let buses = available_buses();
    if buses.is_empty() {
        return "none (recompile with features)".to_string();
    }
    let names: Vec<&str> = buses.iter().map(|b| b.name).collect();
    names.join(", ")
}
