//! Power, standby and reset hooks
//!
//! Regulators, the master clock and the PWDN/RESET lines are board
//! specific. The sensor core only sequences them through [`PowerControl`]
//! and inserts the settling delays the chip needs.

use crate::error::Result;

/// Settling time around a software standby transition (µs)
pub const STANDBY_SETTLE_US: u32 = 1000;
/// Settling time after a reset line edge (µs)
pub const RESET_SETTLE_US: u32 = 100;
/// Settling time before removing power (µs)
pub const POWER_OFF_SETTLE_US: u32 = 100;

/// Power transitions accepted by [`crate::sensor::Gc2385::set_power`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerAction {
    /// Apply supplies and clock and release power-down
    On,
    /// Assert power-down and remove clock and supplies
    Off,
    /// Enter software standby
    StandbyOn,
    /// Leave software standby
    StandbyOff,
}

/// Board level power sequencing for one sensor instance
///
/// Implementations own the GPIO lines, regulators and clock of the
/// instance. All methods are called with the instance's bus lock held.
pub trait PowerControl {
    /// Run the full power-up sequence (supplies, MCLK, PWDN release)
    ///
    /// The master clock must run at [`regs::MCLK_HZ`](crate::regs::MCLK_HZ)
    /// before power-down is released.
    fn power_on(&mut self) -> Result<()>;

    /// Run the power-down sequence
    fn power_off(&mut self) -> Result<()>;

    /// Drive the RESET line; `asserted` holds the chip in reset
    fn set_reset(&mut self, asserted: bool) -> Result<()>;
}

impl<P: PowerControl + ?Sized> PowerControl for &mut P {
    fn power_on(&mut self) -> Result<()> {
        (**self).power_on()
    }

    fn power_off(&mut self) -> Result<()> {
        (**self).power_off()
    }

    fn set_reset(&mut self, asserted: bool) -> Result<()> {
        (**self).set_reset(asserted)
    }
}

/// Power control for sensors whose supplies are always on
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoPower;

impl PowerControl for NoPower {
    fn power_on(&mut self) -> Result<()> {
        Ok(())
    }

    fn power_off(&mut self) -> Result<()> {
        Ok(())
    }

    fn set_reset(&mut self, _asserted: bool) -> Result<()> {
        Ok(())
    }
}
