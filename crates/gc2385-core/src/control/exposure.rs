//! Exposure conversion and clamping
//!
//! Exposure is passed around in line units with 4 fractional bits
//! (16 = one line). The sensor only takes whole lines.

use crate::regs;

/// Shortest integration time the sensor accepts, in lines
pub const MIN_EXPOSURE_LINES: u32 = 6;
/// Longest integration time the exposure registers can hold, in lines
pub const MAX_EXPOSURE_LINES: u32 = 0x3fff;

/// Lower exposure bound on the combined path (raw units)
pub const MIN_EXPOSURE: u32 = MIN_EXPOSURE_LINES * 16;
/// Upper exposure bound on the combined path (raw units)
pub const MAX_EXPOSURE: u32 = MAX_EXPOSURE_LINES * 16;

/// Lower gain bound on the combined path (raw units, 16 = 1.00x)
pub const MIN_GAIN: u32 = 16;
/// Upper gain bound on the combined path (raw units)
pub const MAX_GAIN: u32 = 128 * 16 - 1;

/// Whole exposure lines for a raw exposure, clamped to the register range
pub fn exposure_lines(raw: u32) -> u32 {
    (raw >> 4).clamp(MIN_EXPOSURE_LINES, MAX_EXPOSURE_LINES)
}

/// Split a line count into the (high, low) register bytes
pub fn split_exposure(lines: u32) -> (u8, u8) {
    (
        ((lines >> 8) & regs::EXP_HIGH_MASK) as u8,
        (lines & 0xff) as u8,
    )
}

/// Clamp a raw exposure to the combined-path bounds
pub fn clamp_exposure(raw: u32) -> u32 {
    raw.clamp(MIN_EXPOSURE, MAX_EXPOSURE)
}

/// Clamp a raw gain to the combined-path bounds
pub fn clamp_gain(raw: u32) -> u32 {
    raw.clamp(MIN_GAIN, MAX_GAIN)
}
