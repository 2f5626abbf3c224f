//! Register sequences for exposure, gain and identification
//!
//! These functions only talk to the bus; caching and state handling live
//! in [`crate::sensor`].

use crate::bus::RegisterBus;
use crate::error::Result;
use crate::regs;

use super::exposure::{exposure_lines, split_exposure};
use super::gain::GainSetting;

/// Select the register page for page-relative accesses
pub fn select_page<B: RegisterBus + ?Sized>(bus: &mut B, page: u8) -> Result<()> {
    bus.write(regs::PAGE_SELECT, page)
}

/// Read the chip identity register pair
///
/// Returns the 16-bit identity, high byte from 0xf0.
pub fn read_chip_id<B: RegisterBus + ?Sized>(bus: &mut B) -> Result<u16> {
    let high = bus.read(regs::CHIP_ID_HIGH)?;
    let low = bus.read(regs::CHIP_ID_LOW)?;
    Ok((u16::from(high) << 8) | u16::from(low))
}

/// Program the integration time
///
/// `raw` is in lines with 4 fractional bits; the fraction is dropped and
/// the line count clamped to [6, 0x3fff]. Returns the programmed lines.
pub fn write_exposure<B: RegisterBus + ?Sized>(bus: &mut B, raw: u32) -> Result<u32> {
    let lines = exposure_lines(raw);
    let (high, low) = split_exposure(lines);

    select_page(bus, regs::PAGE_0)?;
    bus.write(regs::EXP_HIGH, high)?;
    bus.write(regs::EXP_LOW, low)?;

    Ok(lines)
}

/// Program analog band and digital gain
///
/// `raw` is a gain with 16 as unity. Returns the register plan that was
/// written.
pub fn write_gain<B: RegisterBus + ?Sized>(bus: &mut B, raw: u32) -> Result<GainSetting> {
    let setting = GainSetting::from_raw(raw);
    let band = setting.band;

    select_page(bus, regs::PAGE_0)?;
    bus.write(regs::ANALOG_CTRL_A, band.analog_a)?;
    bus.write(regs::ANALOG_CTRL_B, band.analog_b)?;
    bus.write(regs::ANALOG_GAIN_SEL, band.index)?;
    bus.write(regs::DIGITAL_GAIN_HIGH, setting.digital_high())?;
    bus.write(regs::DIGITAL_GAIN_LOW, setting.digital_low())?;

    Ok(setting)
}
