//! Gain banding
//!
//! The GC2385 splits gain into a coarse analog stage, selected from nine
//! fixed bands, and a fine digital stage that makes up the remainder.
//! Gains are handled in "combined" units where 64 is unity (1.00x), which
//! is four times the 16-based unit used by callers.

use crate::regs;

/// Combined-gain value of unity gain
pub const UNITY_GAIN: u32 = 0x40;

/// Digital gain register value for a 1.00x digital stage
pub const DIGITAL_UNITY: u32 = 256;

/// Largest value the 16-bit digital gain register pair can hold
pub const DIGITAL_MAX: u32 = 0xffff;

/// One analog gain band
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GainBand {
    /// Value written to the analog gain select register
    pub index: u8,
    /// Lowest combined gain covered by this band (inclusive)
    pub lower: u32,
    /// Analog control A setting
    pub analog_a: u8,
    /// Analog control B setting
    pub analog_b: u8,
}

impl GainBand {
    const fn new(index: u8, lower: u32, analog_a: u8, analog_b: u8) -> Self {
        Self {
            index,
            lower,
            analog_a,
            analog_b,
        }
    }

    /// Upper bound (exclusive) of this band, `None` for the last band
    pub fn upper(&self) -> Option<u32> {
        GAIN_BANDS
            .get(self.index as usize + 1)
            .map(|next| next.lower)
    }

    /// Whether the band uses the alternate analog bias settings
    pub fn uses_alt_bank(&self) -> bool {
        self.analog_b == regs::ANALOG_B_ALT
    }

    /// Whether `combined` falls in this band
    pub fn contains(&self, combined: u32) -> bool {
        combined >= self.lower && self.upper().map_or(true, |upper| combined < upper)
    }

    /// Digital gain register value for `combined` within this band
    ///
    /// The analog stage contributes `lower / 64`; the digital stage scales
    /// the rest with 256 as unity. Saturates at [`DIGITAL_MAX`].
    pub fn digital_gain(&self, combined: u32) -> u32 {
        let digital = u64::from(DIGITAL_UNITY) * u64::from(combined) / u64::from(self.lower);
        digital.min(u64::from(DIGITAL_MAX)) as u32
    }

    /// Overall gain in combined units after the digital stage, scaled by 256
    pub fn effective_gain(&self, digital: u32) -> u64 {
        u64::from(self.lower) * u64::from(digital)
    }
}

/// The nine analog gain bands, in ascending order
///
/// Thresholds follow a ~1.43x geometric progression:
/// 1.00x, 1.43x, 1.99x, 2.86x, 4.01x, 5.76x, 8.30x, 11.72x, 17.06x.
pub static GAIN_BANDS: [GainBand; 9] = [
    GainBand::new(0, 64, regs::ANALOG_A_NORMAL, regs::ANALOG_B_NORMAL),
    GainBand::new(1, 92, regs::ANALOG_A_NORMAL, regs::ANALOG_B_NORMAL),
    GainBand::new(2, 127, regs::ANALOG_A_NORMAL, regs::ANALOG_B_NORMAL),
    GainBand::new(3, 183, regs::ANALOG_A_NORMAL, regs::ANALOG_B_NORMAL),
    GainBand::new(4, 257, regs::ANALOG_A_NORMAL, regs::ANALOG_B_ALT),
    GainBand::new(5, 369, regs::ANALOG_A_NORMAL, regs::ANALOG_B_ALT),
    GainBand::new(6, 531, regs::ANALOG_A_ALT, regs::ANALOG_B_ALT),
    GainBand::new(7, 750, regs::ANALOG_A_ALT, regs::ANALOG_B_ALT),
    GainBand::new(8, 1092, regs::ANALOG_A_ALT, regs::ANALOG_B_ALT),
];

/// Convert a caller gain (16 = 1.00x) to combined units, floored at unity
pub fn combined_gain(raw: u32) -> u32 {
    raw.saturating_mul(4).max(UNITY_GAIN)
}

/// Select the band covering `combined`
///
/// Values below the first threshold map to the first band, values above
/// the last threshold to the last band.
pub fn select_band(combined: u32) -> &'static GainBand {
    GAIN_BANDS
        .iter()
        .rev()
        .find(|band| combined >= band.lower)
        .unwrap_or(&GAIN_BANDS[0])
}

/// Register plan for one gain setting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GainSetting {
    /// Gain in combined units after flooring at unity
    pub combined: u32,
    /// Selected analog band
    pub band: &'static GainBand,
    /// Digital gain register value
    pub digital: u32,
}

impl GainSetting {
    /// Compute the register plan for a caller gain (16 = 1.00x)
    pub fn from_raw(raw: u32) -> Self {
        let combined = combined_gain(raw);
        let band = select_band(combined);
        Self {
            combined,
            band,
            digital: band.digital_gain(combined),
        }
    }

    /// Digital gain high byte as written to the register
    pub fn digital_high(&self) -> u8 {
        (self.digital >> 8) as u8
    }

    /// Digital gain low byte as written to the register
    pub fn digital_low(&self) -> u8 {
        (self.digital & 0xff) as u8
    }
}
