//! TOML sensor configuration
//!
//! ```toml
//! [sensor]
//! name = "gc2385_mipi"
//! bus = "linux_i2c:dev=/dev/i2c-1,addr=0x37"
//! mode = 0
//!
//! [initial]
//! exposure = 16000
//! gain = 0x200
//! ```
//!
//! Only `bus` is required. `[initial]` seeds the shared exposure/gain
//! cache before the first stream start.

use std::fs;
use std::path::Path;
use std::string::{String, ToString};

use crate::control::ExposureGain;
use crate::mode;
use crate::regs;

/// Errors from loading a sensor configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read
    #[error("failed to read {path}: {source}")]
    Io {
        /// Path that was read
        path: String,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
    /// The content is not valid TOML for this schema
    #[error("invalid sensor configuration: {0}")]
    Parse(#[from] toml::de::Error),
    /// The mode index is outside the mode catalog
    #[error("mode {index} does not exist ({available} available)")]
    InvalidMode {
        /// Requested index
        index: usize,
        /// Number of modes in the catalog
        available: usize,
    },
    /// The instance name is not one the sensor can be registered under
    #[error("unknown sensor name {0:?} (expected gc2385_mipi or gc2385_mipi_2)")]
    UnknownName(String),
    /// The bus string is empty
    #[error("bus string is empty")]
    EmptyBus,
}

#[derive(Debug, serde::Deserialize)]
struct TomlConfigFile {
    sensor: TomlSensor,
    initial: Option<TomlInitial>,
}

#[derive(Debug, serde::Deserialize)]
struct TomlSensor {
    name: Option<String>,
    bus: String,
    #[serde(default)]
    mode: usize,
}

#[derive(Debug, serde::Deserialize)]
struct TomlInitial {
    #[serde(deserialize_with = "deserialize_hex_u32")]
    exposure: u32,
    #[serde(deserialize_with = "deserialize_hex_u32")]
    gain: u32,
}

/// Deserialize a u32 that can be hex (0x...) or decimal
fn deserialize_hex_u32<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::Deserialize;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum HexOrInt {
        Int(u32),
        Str(String),
    }

    match HexOrInt::deserialize(deserializer)? {
        HexOrInt::Int(n) => Ok(n),
        HexOrInt::Str(s) => parse_number(&s).map_err(serde::de::Error::custom),
    }
}

/// Parse a number that can be hex (0x...) or decimal
pub fn parse_number(s: &str) -> Result<u32, String> {
    let s = s.trim();
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16).map_err(|e| std::format!("invalid hex: {}", e))
    } else {
        s.parse()
            .map_err(|e| std::format!("invalid number: {}", e))
    }
}

/// Configuration of one sensor instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensorConfig {
    /// Instance name
    pub name: String,
    /// Bus string, `name[:key=value,...]`
    pub bus: String,
    /// Index into the mode catalog
    pub mode: usize,
    /// Exposure/gain pair seeded into the shared cache
    pub initial: Option<ExposureGain>,
}

impl SensorConfig {
    /// Configuration for the primary instance on `bus`
    pub fn new(bus: impl Into<String>) -> Self {
        Self {
            name: regs::SENSOR_NAME.to_string(),
            bus: bus.into(),
            mode: 0,
            initial: None,
        }
    }

    /// Load a configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse a configuration from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let file: TomlConfigFile = toml::from_str(content)?;

        if file.sensor.bus.trim().is_empty() {
            return Err(ConfigError::EmptyBus);
        }
        let available = mode::modes().len();
        if file.sensor.mode >= available {
            return Err(ConfigError::InvalidMode {
                index: file.sensor.mode,
                available,
            });
        }

        let name = file
            .sensor
            .name
            .unwrap_or_else(|| regs::SENSOR_NAME.to_string());
        if !regs::SENSOR_NAMES.iter().any(|known| *known == name) {
            return Err(ConfigError::UnknownName(name));
        }

        Ok(Self {
            name,
            bus: file.sensor.bus.trim().to_string(),
            mode: file.sensor.mode,
            initial: file
                .initial
                .map(|initial| ExposureGain::new(initial.exposure, initial.gain)),
        })
    }

    /// Mode descriptor selected by this configuration
    pub fn mode_descriptor(&self) -> Option<&'static mode::ModeDescriptor> {
        mode::modes().get(self.mode)
    }
}
