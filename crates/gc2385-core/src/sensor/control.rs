//! Control interface exposed to the capture host

use crate::control::ExposureGain;
use crate::error::Result;
use crate::mode::ModeDescriptor;

/// Host visible controls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlId {
    /// Analog plus digital gain, raw units (16 = 1.00x)
    Gain,
    /// Integration time, lines with 4 fractional bits
    Exposure,
}

/// Published range of a control
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlRange {
    /// Smallest accepted value
    pub min: u32,
    /// Largest accepted value
    pub max: u32,
    /// Step between values
    pub step: u32,
    /// Value before the first update
    pub default: u32,
    /// Value may change without a host update and must be re-read
    pub volatile: bool,
}

impl ControlId {
    /// All controls, in registration order
    pub const ALL: [ControlId; 2] = [ControlId::Gain, ControlId::Exposure];

    /// Range published for this control
    pub const fn range(self) -> ControlRange {
        match self {
            Self::Gain => ControlRange {
                min: 1600,
                max: 256 * 1600,
                step: 1,
                default: 1600,
                volatile: false,
            },
            Self::Exposure => ControlRange {
                min: 0,
                max: 65536 * 16,
                step: 1,
                default: 0,
                volatile: true,
            },
        }
    }

    /// Control name
    pub fn name(self) -> &'static str {
        match self {
            Self::Gain => "gain",
            Self::Exposure => "exposure",
        }
    }
}

/// Operations a capture host drives on an image sensor
///
/// The lifecycle is `detect` → `initialize` → `stream_enable(true)`.
/// Exposure and gain may be updated in any state; the last combined
/// update is re-applied on every stream start.
pub trait SensorControl {
    /// Confirm the chip identity, returning it
    fn detect(&mut self) -> Result<u16>;

    /// Reset the instance to its power-on configuration
    fn initialize(&mut self) -> Result<()>;

    /// Last exposure accepted by this instance
    fn exposure(&self) -> u32;

    /// Program the integration time
    fn set_exposure(&mut self, raw: u32) -> Result<()>;

    /// Last gain accepted by this instance
    fn gain(&self) -> u32;

    /// Program the analog and digital gain
    fn set_gain(&mut self, raw: u32) -> Result<()>;

    /// Clamp and program exposure and gain together, returning the
    /// clamped pair
    fn set_exposure_gain(&mut self, exposure: u32, gain: u32) -> Result<ExposureGain>;

    /// Start or stop streaming
    fn stream_enable(&mut self, enable: bool) -> Result<()>;

    /// Active capture mode
    fn current_mode(&self) -> Result<&'static ModeDescriptor>;

    /// Read a control by id
    fn get_control(&self, id: ControlId) -> u32 {
        match id {
            ControlId::Gain => self.gain(),
            ControlId::Exposure => self.exposure(),
        }
    }

    /// Write a control by id
    fn set_control(&mut self, id: ControlId, value: u32) -> Result<()> {
        match id {
            ControlId::Gain => self.set_gain(value),
            ControlId::Exposure => self.set_exposure(value),
        }
    }
}

impl<S: SensorControl + ?Sized> SensorControl for &mut S {
    fn detect(&mut self) -> Result<u16> {
        (**self).detect()
    }

    fn initialize(&mut self) -> Result<()> {
        (**self).initialize()
    }

    fn exposure(&self) -> u32 {
        (**self).exposure()
    }

    fn set_exposure(&mut self, raw: u32) -> Result<()> {
        (**self).set_exposure(raw)
    }

    fn gain(&self) -> u32 {
        (**self).gain()
    }

    fn set_gain(&mut self, raw: u32) -> Result<()> {
        (**self).set_gain(raw)
    }

    fn set_exposure_gain(&mut self, exposure: u32, gain: u32) -> Result<ExposureGain> {
        (**self).set_exposure_gain(exposure, gain)
    }

    fn stream_enable(&mut self, enable: bool) -> Result<()> {
        (**self).stream_enable(enable)
    }

    fn current_mode(&self) -> Result<&'static ModeDescriptor> {
        (**self).current_mode()
    }
}
