//! Per-instance sensor state

use core::fmt;

use crate::mode::{FrameInterval, ModeDescriptor, PixelFormat};
use crate::regs;

/// Lifecycle of a sensor instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SequencerState {
    /// Nothing known about the chip yet
    #[default]
    Uninitialized,
    /// Chip identity confirmed
    Detected,
    /// Format and mode selected, not streaming
    Configured,
    /// Register tables replayed, sensor producing frames
    Streaming,
}

impl SequencerState {
    /// Lowercase state name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Detected => "detected",
            Self::Configured => "configured",
            Self::Streaming => "streaming",
        }
    }

    /// Whether a format and mode have been selected
    pub fn is_configured(&self) -> bool {
        matches!(self, Self::Configured | Self::Streaming)
    }
}

impl fmt::Display for SequencerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything one sensor instance remembers between calls
#[derive(Debug, Clone, Copy)]
pub struct SensorState {
    /// Last exposure accepted by this instance (raw units)
    pub exposure: u32,
    /// Last gain accepted by this instance (raw units)
    pub gain: u32,
    /// Active capture mode
    pub mode: Option<&'static ModeDescriptor>,
    /// Active output format
    pub format: Option<&'static PixelFormat>,
    /// Output width in pixels
    pub width: u32,
    /// Output height in pixels
    pub height: u32,
    /// Horizontal mirror
    pub hflip: bool,
    /// Vertical flip
    pub vflip: bool,
    /// Focus status (fixed focus, always 0)
    pub focus_status: u32,
    /// Low speed readout
    pub low_speed: bool,
    /// Time per frame
    pub frame_interval: FrameInterval,
    /// Identity read by the last successful detection
    pub chip_id: Option<u16>,
    /// Lifecycle state
    pub sequencer: SequencerState,
}

impl SensorState {
    /// State of a freshly created instance
    pub const fn new() -> Self {
        Self {
            exposure: 0,
            gain: 0,
            mode: None,
            format: None,
            width: 0,
            height: 0,
            hflip: false,
            vflip: false,
            focus_status: 0,
            low_speed: false,
            frame_interval: FrameInterval::from_fps(regs::FRAME_RATE),
            chip_id: None,
            sequencer: SequencerState::Uninitialized,
        }
    }

    /// Whether the register tables have been replayed and streaming started
    pub fn is_streaming(&self) -> bool {
        self.sequencer == SequencerState::Streaming
    }
}

impl Default for SensorState {
    fn default() -> Self {
        Self::new()
    }
}
