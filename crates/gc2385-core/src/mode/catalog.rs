//! Supported formats and modes

use super::tables;
use super::types::{MbusConfig, MbusFlags, MbusType, ModeDescriptor, PixelFormat};

/// Media bus code for 10-bit GRBG Bayer, one sample per bus word
pub const MBUS_FMT_SGRBG10_1X10: u32 = 0x300a;

/// Output formats, first entry is the default
pub static FORMATS: [PixelFormat; 1] = [PixelFormat {
    desc: "Raw RGB Bayer",
    mbus_code: MBUS_FMT_SGRBG10_1X10,
    regs: &tables::FMT_RAW_REGS,
    bpp: 1,
}];

/// Capture modes, first entry is the default
pub static MODES: [ModeDescriptor; 1] = [ModeDescriptor {
    width: 1600,
    height: 1200,
    hoffset: 0,
    voffset: 0,
    hts: 1079,
    vts: 1248,
    pclk: 41_000_000,
    mipi_bps: 656_000_000,
    fps_fixed: 30,
    bin_factor: 1,
    intg_min: 1 << 4,
    intg_max: 1248 << 4,
    gain_min: 1 << 4,
    gain_max: 128 << 4,
    regs: &tables::MODE_1600X1200_30_REGS,
    set_size: None,
}];

/// Data interface of every mode: one CSI-2 lane on virtual channel 0
pub const MBUS_CONFIG: MbusConfig = MbusConfig {
    bus_type: MbusType::Csi2Dphy,
    flags: MbusFlags::LANES_1.union(MbusFlags::CHANNEL_0),
};

/// All supported output formats
pub fn formats() -> &'static [PixelFormat] {
    &FORMATS
}

/// All supported capture modes
pub fn modes() -> &'static [ModeDescriptor] {
    &MODES
}

/// Default output format
pub fn default_format() -> &'static PixelFormat {
    &FORMATS[0]
}

/// Default capture mode
pub fn default_mode() -> &'static ModeDescriptor {
    &MODES[0]
}

/// Find a mode by output size
pub fn find_mode(width: u32, height: u32) -> Option<&'static ModeDescriptor> {
    MODES.iter().find(|mode| mode.matches_size(width, height))
}

/// Mode closest to a requested output size
///
/// An exact size match wins; otherwise the mode with the smallest summed
/// width and height difference is returned.
pub fn nearest_mode(width: u32, height: u32) -> &'static ModeDescriptor {
    find_mode(width, height).unwrap_or_else(|| {
        MODES
            .iter()
            .min_by_key(|mode| {
                u64::from(mode.width.abs_diff(width)) + u64::from(mode.height.abs_diff(height))
            })
            .unwrap_or(&MODES[0])
    })
}

/// Find a format by media bus code
pub fn find_format(mbus_code: u32) -> Option<&'static PixelFormat> {
    FORMATS.iter().find(|fmt| fmt.mbus_code == mbus_code)
}
