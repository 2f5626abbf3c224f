//! Error types for Linux I2C operations

use thiserror::Error;

/// Linux I2C specific errors
#[derive(Debug, Error)]
pub enum LinuxI2cError {
    /// Failed to open device
    #[error("Failed to open {path}: {source}")]
    OpenFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to query adapter functionality
    #[error("Failed to query adapter functionality: {0}")]
    FuncsFailed(#[source] std::io::Error),

    /// Adapter cannot do combined transactions
    #[error("Adapter {0} does not support plain I2C transfers")]
    NoRawI2c(String),

    /// I2C transfer failed
    #[error("I2C transfer to 0x{addr:02x} failed: {source}")]
    TransferFailed {
        addr: u16,
        #[source]
        source: std::io::Error,
    },

    /// Invalid parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Device not specified
    #[error("No device specified. Use dev=/dev/i2c-N")]
    NoDevice,
}

/// Result type for Linux I2C operations
pub type Result<T> = std::result::Result<T, LinuxI2cError>;
