//! SensorHandle - a sensor instance bound to its bus and configuration

use std::sync::{Arc, Mutex};

use gc2385_core::config::SensorConfig;
use gc2385_core::control::{ExposureGain, ExposureGainCache};
use gc2385_core::mode::{MbusConfig, ModeDescriptor};
use gc2385_core::power::{NoPower, PowerAction};
use gc2385_core::regs;
use gc2385_core::sensor::{ControlId, Gc2385, SensorControl, SequencerState};

use crate::registry::BoxedBus;

/// Exposure/gain cache shared by every GC2385 in the process
static MODEL_CACHE: ExposureGainCache = ExposureGainCache::new();

/// The process-wide GC2385 exposure/gain cache
pub fn model_cache() -> &'static ExposureGainCache {
    &MODEL_CACHE
}

/// Lock serialising power transitions of one sensor
pub type SharedLock = Arc<Mutex<()>>;

type Sensor = Gc2385<'static, BoxedBus, NoPower, SharedLock>;

/// Map a configured name onto a known instance name
///
/// Unknown names fall back to the primary instance.
fn instance_name(name: &str) -> &'static str {
    match regs::SENSOR_NAMES.iter().copied().find(|known| *known == name) {
        Some(known) => known,
        None => {
            log::warn!(
                "{}: unknown sensor name, registering as {}",
                name,
                regs::SENSOR_NAME
            );
            regs::SENSOR_NAME
        }
    }
}

/// Summary of an opened sensor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensorInfo {
    /// Instance name
    pub name: String,
    /// Identity read during detection
    pub chip_id: Option<u16>,
    /// Output width in pixels
    pub width: u32,
    /// Output height in pixels
    pub height: u32,
    /// Frames per second
    pub fps: u32,
    /// Lifecycle state
    pub state: SequencerState,
}

/// Host handle for one sensor
///
/// The handle owns the bus and the sensor state. Clone [`lock`](Self::lock)
/// to coordinate power transitions with other owners of the same control
/// bus.
pub struct SensorHandle {
    sensor: Sensor,
    config: SensorConfig,
    lock: SharedLock,
}

impl SensorHandle {
    /// Create a handle over an open bus
    ///
    /// Seeds the process-wide cache with the configuration's initial pair,
    /// if it has one.
    pub fn new(bus: BoxedBus, config: SensorConfig) -> Self {
        if let Some(initial) = config.initial {
            log::debug!(
                "{}: seeding exposure {} gain {}",
                config.name,
                initial.exposure,
                initial.gain
            );
            MODEL_CACHE.store(initial);
        }

        let name = instance_name(&config.name);
        let lock = SharedLock::default();
        let sensor = Gc2385::new(bus, &MODEL_CACHE)
            .with_lock(Arc::clone(&lock))
            .with_name(name);

        Self {
            sensor,
            config,
            lock,
        }
    }

    /// Instance name
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Configuration the handle was opened with
    pub fn config(&self) -> &SensorConfig {
        &self.config
    }

    /// Power transition lock of this sensor
    pub fn lock(&self) -> SharedLock {
        Arc::clone(&self.lock)
    }

    /// Summary of the sensor's current state
    pub fn info(&self) -> SensorInfo {
        let state = self.sensor.state();
        SensorInfo {
            name: self.config.name.clone(),
            chip_id: state.chip_id,
            width: state.width,
            height: state.height,
            fps: state.frame_interval.denominator / state.frame_interval.numerator.max(1),
            state: state.sequencer,
        }
    }

    /// Detect the chip
    pub fn detect(&mut self) -> Result<u16, Box<dyn std::error::Error>> {
        Ok(self.sensor.detect()?)
    }

    /// Initialise (if needed) and start streaming
    pub fn start(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        if !self.sensor.sequencer_state().is_configured() {
            self.configure()?;
        }
        self.sensor.stream_enable(true)?;
        Ok(())
    }

    /// Initialise the sensor and select the configured mode
    ///
    /// Stops a running stream first.
    pub fn configure(&mut self) -> Result<&'static ModeDescriptor, Box<dyn std::error::Error>> {
        if self.sensor.sequencer_state() == SequencerState::Streaming {
            self.sensor.stream_enable(false)?;
        }
        self.sensor.initialize()?;
        let mode = self
            .config
            .mode_descriptor()
            .ok_or_else(|| format!("mode {} does not exist", self.config.mode))?;
        let format = self.sensor.current_format()?;
        self.sensor.select_mode(format, mode)?;
        Ok(mode)
    }

    /// Select the supported format closest to the request
    pub fn set_format(
        &mut self,
        width: u32,
        height: u32,
        mbus_code: u32,
    ) -> Result<&'static ModeDescriptor, Box<dyn std::error::Error>> {
        Ok(self.sensor.set_format(width, height, mbus_code)?)
    }

    /// Stop streaming
    pub fn stop(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        Ok(self.sensor.stream_enable(false)?)
    }

    /// Set exposure and gain together, returning the applied pair
    pub fn set_exposure_gain(
        &mut self,
        exposure: u32,
        gain: u32,
    ) -> Result<ExposureGain, Box<dyn std::error::Error>> {
        Ok(self.sensor.set_exposure_gain(exposure, gain)?)
    }

    /// Read a control
    pub fn control(&self, id: ControlId) -> u32 {
        self.sensor.get_control(id)
    }

    /// Write a control
    pub fn set_control(&mut self, id: ControlId, value: u32) -> Result<(), Box<dyn std::error::Error>> {
        Ok(self.sensor.set_control(id, value)?)
    }

    /// Run a power transition
    pub fn set_power(&mut self, action: PowerAction) -> Result<(), Box<dyn std::error::Error>> {
        Ok(self.sensor.set_power(action)?)
    }

    /// Active capture mode
    pub fn current_mode(&self) -> Result<&'static ModeDescriptor, Box<dyn std::error::Error>> {
        Ok(self.sensor.current_mode()?)
    }

    /// Data interface configuration
    pub fn mbus_config(&self) -> MbusConfig {
        self.sensor.mbus_config()
    }

    /// Get mutable reference to the underlying sensor
    pub fn as_sensor_mut(&mut self) -> &mut (dyn SensorControl + Send) {
        &mut self.sensor
    }
}
