//! Mode and format type definitions

use bitflags::bitflags;

use crate::bus::{RegVal, RegisterBus};
use crate::error::Result;

/// Hook run after a mode's register table, for sizes that need computed
/// register values
pub type SizeSetter = fn(&mut dyn RegisterBus) -> Result<()>;

/// An output pixel format
#[derive(Debug, Clone, Copy)]
pub struct PixelFormat {
    /// Human readable description
    pub desc: &'static str,
    /// Media bus code of the format
    pub mbus_code: u32,
    /// Registers selecting this format
    pub regs: &'static [RegVal],
    /// Bytes per pixel on the bus
    pub bpp: u8,
}

/// One supported capture configuration
#[derive(Debug, Clone, Copy)]
pub struct ModeDescriptor {
    /// Output width in pixels
    pub width: u32,
    /// Output height in pixels
    pub height: u32,
    /// Horizontal offset of the output window
    pub hoffset: u32,
    /// Vertical offset of the output window
    pub voffset: u32,
    /// Horizontal total (line length) in pixel clocks
    pub hts: u32,
    /// Vertical total (frame length) in lines
    pub vts: u32,
    /// Pixel clock in Hz
    pub pclk: u32,
    /// MIPI bit rate per lane in bit/s
    pub mipi_bps: u32,
    /// Fixed frame rate
    pub fps_fixed: u32,
    /// Binning factor
    pub bin_factor: u32,
    /// Shortest integration time (raw exposure units)
    pub intg_min: u32,
    /// Longest integration time (raw exposure units)
    pub intg_max: u32,
    /// Lowest gain (raw gain units)
    pub gain_min: u32,
    /// Highest gain (raw gain units)
    pub gain_max: u32,
    /// Registers programming this mode
    pub regs: &'static [RegVal],
    /// Optional hook run after `regs`
    pub set_size: Option<SizeSetter>,
}

impl ModeDescriptor {
    /// Line time in nanoseconds
    pub fn line_time_ns(&self) -> u64 {
        u64::from(self.hts) * 1_000_000_000 / u64::from(self.pclk)
    }

    /// Frame rate implied by the timing totals, in millihertz
    pub fn frame_rate_mhz(&self) -> u64 {
        u64::from(self.pclk) * 1000 / (u64::from(self.hts) * u64::from(self.vts))
    }

    /// Whether the descriptor has the given output size
    pub fn matches_size(&self, width: u32, height: u32) -> bool {
        self.width == width && self.height == height
    }
}

/// Time per frame as a fraction of a second
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameInterval {
    /// Numerator
    pub numerator: u32,
    /// Denominator
    pub denominator: u32,
}

impl FrameInterval {
    /// Interval of a fixed frame rate
    pub const fn from_fps(fps: u32) -> Self {
        Self {
            numerator: 1,
            denominator: fps,
        }
    }
}

/// Physical bus type of the data interface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MbusType {
    /// MIPI CSI-2 over a D-PHY
    Csi2Dphy,
}

bitflags! {
    /// Data interface configuration flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct MbusFlags: u32 {
        /// One data lane
        const LANES_1   = 1 << 0;
        /// Two data lanes
        const LANES_2   = 1 << 1;
        /// Four data lanes
        const LANES_4   = 1 << 3;
        /// Virtual channel 0
        const CHANNEL_0 = 1 << 4;
        /// Virtual channel 1
        const CHANNEL_1 = 1 << 5;
        /// Clock lane runs continuously
        const CONTINUOUS_CLOCK = 1 << 8;
    }
}

/// Data interface configuration reported to the receiver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MbusConfig {
    /// Bus type
    pub bus_type: MbusType,
    /// Lane and channel flags
    pub flags: MbusFlags,
}

impl MbusConfig {
    /// Number of data lanes in use
    pub fn lanes(&self) -> u32 {
        if self.flags.contains(MbusFlags::LANES_4) {
            4
        } else if self.flags.contains(MbusFlags::LANES_2) {
            2
        } else {
            1
        }
    }
}
