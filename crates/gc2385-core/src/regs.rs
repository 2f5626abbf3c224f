//! GC2385 register map and model constants
//!
//! Only the registers touched by the control path are named here. The
//! bulk of the sensor setup lives in the register tables of the mode
//! catalog.

// ============================================================================
// Model identity
// ============================================================================

/// Expected value of the chip identity register pair (0xf0:0xf1)
pub const CHIP_ID: u16 = 0x2385;

/// 8-bit (write) control bus address
pub const I2C_ADDR_8BIT: u8 = 0x6e;
/// 7-bit control bus address, as used by Linux i2c-dev
pub const I2C_ADDR: u8 = I2C_ADDR_8BIT >> 1;

/// Master clock fed to the sensor, in Hz
pub const MCLK_HZ: u32 = 24_000_000;

/// Nominal frame rate
pub const FRAME_RATE: u32 = 30;

/// Name of the primary sensor instance
pub const SENSOR_NAME: &str = "gc2385_mipi";
/// Name of the secondary sensor instance (dual-camera boards)
pub const SENSOR_NAME_2: &str = "gc2385_mipi_2";
/// Every instance name a sensor can be registered under
pub const SENSOR_NAMES: [&str; 2] = [SENSOR_NAME, SENSOR_NAME_2];

// ============================================================================
// Page (bank) selection
// ============================================================================

/// Page select register, visible from every page
pub const PAGE_SELECT: u8 = 0xfe;
/// Page 0: sensor core, exposure and gain
pub const PAGE_0: u8 = 0x00;
/// Page 3: MIPI controller
pub const PAGE_3: u8 = 0x03;

// ============================================================================
// Identification (page independent)
// ============================================================================

/// Chip identity, high byte
pub const CHIP_ID_HIGH: u8 = 0xf0;
/// Chip identity, low byte
pub const CHIP_ID_LOW: u8 = 0xf1;

// ============================================================================
// Exposure (page 0)
// ============================================================================

/// Exposure (integration) time in lines, bits 13:8
pub const EXP_HIGH: u8 = 0x03;
/// Exposure (integration) time in lines, bits 7:0
pub const EXP_LOW: u8 = 0x04;

/// Mask applied to the high exposure byte
pub const EXP_HIGH_MASK: u32 = 0x3f;

// ============================================================================
// Gain (page 0)
// ============================================================================

/// Analog control A (bias setting, depends on gain band)
pub const ANALOG_CTRL_A: u8 = 0x20;
/// Analog control B (bias setting, depends on gain band)
pub const ANALOG_CTRL_B: u8 = 0x22;
/// Analog gain band select
pub const ANALOG_GAIN_SEL: u8 = 0xb6;
/// Digital (pre) gain, high byte
pub const DIGITAL_GAIN_HIGH: u8 = 0xb1;
/// Digital (pre) gain, low byte
pub const DIGITAL_GAIN_LOW: u8 = 0xb2;

/// Analog control A value for the low bands
pub const ANALOG_A_NORMAL: u8 = 0x73;
/// Analog control A value for the high bands
pub const ANALOG_A_ALT: u8 = 0x74;
/// Analog control B value for the low bands
pub const ANALOG_B_NORMAL: u8 = 0xa2;
/// Analog control B value for the mid and high bands
pub const ANALOG_B_ALT: u8 = 0xa3;

// ============================================================================
// Stream control (page 0)
// ============================================================================

/// MIPI output enable; 0x90 streams, 0x00 stops
pub const STREAM_CTRL: u8 = 0xed;
