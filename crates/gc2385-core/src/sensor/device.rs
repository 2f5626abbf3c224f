//! GC2385 sensor instance
//!
//! `Gc2385` ties a register bus to the per-instance state, the shared
//! exposure/gain cache, and the board power hooks.

use crate::bus::{BusLock, RegisterBus};
use crate::control::exposure::{clamp_exposure, clamp_gain};
use crate::control::{self, ExposureGain, ExposureGainCache};
use crate::error::{Error, Result};
use crate::mode::{
    self, tables, FrameInterval, MbusConfig, ModeDescriptor, PixelFormat, MBUS_CONFIG,
};
use crate::power::{
    NoPower, PowerAction, PowerControl, POWER_OFF_SETTLE_US, RESET_SETTLE_US, STANDBY_SETTLE_US,
};
use crate::regs;

use super::control::SensorControl;
use super::state::{SensorState, SequencerState};

/// Identity reads attempted after the first mismatch
pub const DETECT_RETRIES: usize = 5;

/// One GC2385 sensor on a control bus
///
/// # Type parameters
/// * `B` - register transport
/// * `P` - board power hooks, [`NoPower`] when supplies are fixed
/// * `L` - lock serialising power transitions, `()` for single-owner use
///
/// # Example
///
/// ```ignore
/// use gc2385_core::control::ExposureGainCache;
/// use gc2385_core::sensor::{Gc2385, SensorControl};
///
/// static CACHE: ExposureGainCache = ExposureGainCache::new();
///
/// let mut sensor = Gc2385::new(bus, &CACHE);
/// sensor.initialize()?;
/// sensor.stream_enable(true)?;
/// sensor.set_exposure_gain(16 * 1000, 64)?;
/// ```
pub struct Gc2385<'c, B, P = NoPower, L = ()> {
    bus: B,
    power: P,
    lock: L,
    cache: &'c ExposureGainCache,
    name: &'static str,
    state: SensorState,
}

impl<'c, B: RegisterBus> Gc2385<'c, B> {
    /// Create an instance with fixed supplies and no locking
    pub fn new(bus: B, cache: &'c ExposureGainCache) -> Self {
        Self {
            bus,
            power: NoPower,
            lock: (),
            cache,
            name: regs::SENSOR_NAME,
            state: SensorState::new(),
        }
    }
}

impl<'c, B: RegisterBus, P: PowerControl, L: BusLock> Gc2385<'c, B, P, L> {
    /// Replace the power hooks
    pub fn with_power<Q: PowerControl>(self, power: Q) -> Gc2385<'c, B, Q, L> {
        Gc2385 {
            bus: self.bus,
            power,
            lock: self.lock,
            cache: self.cache,
            name: self.name,
            state: self.state,
        }
    }

    /// Replace the power transition lock
    pub fn with_lock<M: BusLock>(self, lock: M) -> Gc2385<'c, B, P, M> {
        Gc2385 {
            bus: self.bus,
            power: self.power,
            lock,
            cache: self.cache,
            name: self.name,
            state: self.state,
        }
    }

    /// Set the instance name reported to the host
    pub fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// Instance name
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Current per-instance state
    pub fn state(&self) -> &SensorState {
        &self.state
    }

    /// Lifecycle state
    pub fn sequencer_state(&self) -> SequencerState {
        self.state.sequencer
    }

    /// Shared exposure/gain cache this instance reports to
    pub fn cache(&self) -> &'c ExposureGainCache {
        self.cache
    }

    /// Get a mutable reference to the register bus
    pub fn bus(&mut self) -> &mut B {
        &mut self.bus
    }

    /// Consume the instance and return the register bus
    pub fn into_bus(self) -> B {
        self.bus
    }

    /// Output formats the sensor supports
    pub fn formats(&self) -> &'static [PixelFormat] {
        mode::formats()
    }

    /// Capture modes the sensor supports
    pub fn modes(&self) -> &'static [ModeDescriptor] {
        mode::modes()
    }

    /// Active output format
    pub fn current_format(&self) -> Result<&'static PixelFormat> {
        self.state.format.ok_or(Error::NotConfigured)
    }

    /// Data interface configuration
    pub fn mbus_config(&self) -> MbusConfig {
        MBUS_CONFIG
    }

    /// Time per frame
    pub fn frame_interval(&self) -> FrameInterval {
        self.state.frame_interval
    }

    /// Select the format and mode programmed by the next stream start
    ///
    /// Only valid while `Configured`; a running stream must be stopped
    /// first. The descriptors normally come from [`formats`](Self::formats)
    /// and [`modes`](Self::modes).
    pub fn select_mode(
        &mut self,
        format: &'static PixelFormat,
        mode: &'static ModeDescriptor,
    ) -> Result<()> {
        if self.state.sequencer != SequencerState::Configured {
            return Err(Error::InvalidState {
                op: "select_mode",
                state: self.state.sequencer,
            });
        }

        let state = &mut self.state;
        state.format = Some(format);
        state.mode = Some(mode);
        state.width = mode.width;
        state.height = mode.height;
        state.frame_interval = FrameInterval::from_fps(mode.fps_fixed);

        log::info!(
            "{}: selected {}x{}@{} ({})",
            self.name,
            mode.width,
            mode.height,
            mode.fps_fixed,
            format.desc
        );
        Ok(())
    }

    /// Select the catalog entries closest to a requested format
    ///
    /// Unknown media bus codes fall back to the default format and sizes
    /// snap to the nearest mode. Returns the mode that was selected.
    pub fn set_format(
        &mut self,
        width: u32,
        height: u32,
        mbus_code: u32,
    ) -> Result<&'static ModeDescriptor> {
        let format = mode::find_format(mbus_code).unwrap_or_else(mode::default_format);
        let mode = mode::nearest_mode(width, height);
        self.select_mode(format, mode)?;
        Ok(mode)
    }

    /// Run a power transition with the bus lock held
    pub fn set_power(&mut self, action: PowerAction) -> Result<()> {
        let _guard = self.lock.acquire();
        log::debug!("{}: power {:?}", self.name, action);

        match action {
            PowerAction::StandbyOn => {
                // Software standby has no register effect on this chip
                self.bus.delay_us(STANDBY_SETTLE_US);
            }
            PowerAction::StandbyOff => {
                self.bus.delay_us(STANDBY_SETTLE_US);
            }
            PowerAction::On => {
                self.power.power_on()?;
            }
            PowerAction::Off => {
                self.bus.delay_us(POWER_OFF_SETTLE_US);
                self.power.power_off()?;
            }
        }
        Ok(())
    }

    /// Drive the reset line with the bus lock held
    pub fn reset(&mut self, asserted: bool) -> Result<()> {
        let _guard = self.lock.acquire();
        self.power.set_reset(asserted)?;
        self.bus.delay_us(RESET_SETTLE_US);
        Ok(())
    }

    fn replay_tables(&mut self, format: &PixelFormat, mode: &ModeDescriptor) -> Result<()> {
        self.bus.write_table(&tables::DEFAULT_REGS)?;
        self.bus.write_table(format.regs)?;
        self.bus.write_table(mode.regs)?;
        if let Some(set_size) = mode.set_size {
            set_size(&mut self.bus)?;
        }
        Ok(())
    }

    fn start_stream(&mut self) -> Result<()> {
        let format = self.current_format()?;
        let mode = self.current_mode()?;

        if let Err(e) = self.replay_tables(format, mode) {
            log::error!("{}: register replay failed, stream not started: {}", self.name, e);
            return Err(e);
        }
        self.state.width = mode.width;
        self.state.height = mode.height;

        let pair = self.set_exposure_gain_inner(self.cache.load())?;
        self.state.sequencer = SequencerState::Streaming;
        log::info!(
            "{}: streaming {}x{}@{} (exposure {}, gain {})",
            self.name,
            mode.width,
            mode.height,
            mode.fps_fixed,
            pair.exposure,
            pair.gain
        );
        Ok(())
    }

    fn set_exposure_gain_inner(&mut self, requested: ExposureGain) -> Result<ExposureGain> {
        let pair = ExposureGain::new(
            clamp_exposure(requested.exposure),
            clamp_gain(requested.gain),
        );
        self.set_exposure(pair.exposure)?;
        self.set_gain(pair.gain)?;
        self.cache.store(pair);
        Ok(pair)
    }
}

impl<B: RegisterBus, P: PowerControl, L: BusLock> SensorControl for Gc2385<'_, B, P, L> {
    fn detect(&mut self) -> Result<u16> {
        let mut found = 0;

        for attempt in 0..=DETECT_RETRIES {
            match control::read_chip_id(&mut self.bus) {
                Ok(id) if id == regs::CHIP_ID => {
                    log::info!("{}: found chip id 0x{:04X}", self.name, id);
                    self.state.chip_id = Some(id);
                    if self.state.sequencer == SequencerState::Uninitialized {
                        self.state.sequencer = SequencerState::Detected;
                    }
                    return Ok(id);
                }
                Ok(id) => {
                    log::warn!(
                        "{}: chip id 0x{:04X} (attempt {} of {})",
                        self.name,
                        id,
                        attempt + 1,
                        DETECT_RETRIES + 1
                    );
                    found = id;
                }
                Err(e) => {
                    log::warn!(
                        "{}: chip id read failed (attempt {} of {}): {}",
                        self.name,
                        attempt + 1,
                        DETECT_RETRIES + 1,
                        e
                    );
                }
            }
        }

        log::error!("{}: chip found is not a GC2385", self.name);
        Err(Error::DeviceNotFound { found })
    }

    fn initialize(&mut self) -> Result<()> {
        match self.state.sequencer {
            SequencerState::Streaming => {
                return Err(Error::InvalidState {
                    op: "initialize",
                    state: SequencerState::Streaming,
                })
            }
            SequencerState::Uninitialized => {
                self.detect()?;
            }
            SequencerState::Detected | SequencerState::Configured => {}
        }

        let mode = mode::default_mode();
        let state = &mut self.state;
        state.focus_status = 0;
        state.low_speed = false;
        state.width = mode.width;
        state.height = mode.height;
        state.hflip = false;
        state.vflip = false;
        state.gain = 0;
        state.frame_interval = FrameInterval::from_fps(regs::FRAME_RATE);
        state.format = Some(mode::default_format());
        state.mode = Some(mode);
        state.sequencer = SequencerState::Configured;

        log::info!("{}: initialized, {}x{}", self.name, mode.width, mode.height);
        Ok(())
    }

    fn exposure(&self) -> u32 {
        self.state.exposure
    }

    fn set_exposure(&mut self, raw: u32) -> Result<()> {
        let lines = control::write_exposure(&mut self.bus, raw)?;
        log::debug!("{}: exposure {} -> {} lines", self.name, raw, lines);
        self.state.exposure = raw;
        Ok(())
    }

    fn gain(&self) -> u32 {
        self.state.gain
    }

    fn set_gain(&mut self, raw: u32) -> Result<()> {
        let setting = control::write_gain(&mut self.bus, raw)?;
        log::debug!(
            "{}: gain {} -> band {}, digital 0x{:04X}",
            self.name,
            raw,
            setting.band.index,
            setting.digital
        );
        self.state.gain = raw;
        Ok(())
    }

    fn set_exposure_gain(&mut self, exposure: u32, gain: u32) -> Result<ExposureGain> {
        self.set_exposure_gain_inner(ExposureGain::new(exposure, gain))
    }

    fn stream_enable(&mut self, enable: bool) -> Result<()> {
        match (enable, self.state.sequencer) {
            (true, SequencerState::Configured) => self.start_stream(),
            (true, SequencerState::Streaming) => {
                log::debug!("{}: already streaming", self.name);
                Ok(())
            }
            (false, SequencerState::Streaming) => {
                self.state.sequencer = SequencerState::Configured;
                log::info!("{}: stream off", self.name);
                Ok(())
            }
            (false, SequencerState::Configured) => Ok(()),
            (_, state) => Err(Error::InvalidState {
                op: "stream_enable",
                state,
            }),
        }
    }

    fn current_mode(&self) -> Result<&'static ModeDescriptor> {
        self.state.mode.ok_or(Error::NotConfigured)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::RegVal;
    use crate::control::gain::GainSetting;
    use crate::sensor::ControlId;
    use std::vec::Vec;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Access {
        Read(u8),
        Write(u8, u8),
        Delay(u32),
    }

    /// Flat register file that records every access
    struct RecordingBus {
        regs: [u8; 256],
        log: Vec<Access>,
        /// Identity reads (of 0xf0) that return a wrong id before the real one
        bad_id_reads: usize,
        /// Identity reads that fail on the bus before the real one
        failing_id_reads: usize,
        /// Fail the write with this index (0 based, counted from creation)
        fail_write_at: Option<usize>,
        writes: usize,
    }

    impl RecordingBus {
        fn new() -> Self {
            let mut regs = [0u8; 256];
            regs[0xf0] = 0x23;
            regs[0xf1] = 0x85;
            Self {
                regs,
                log: Vec::new(),
                bad_id_reads: 0,
                failing_id_reads: 0,
                fail_write_at: None,
                writes: 0,
            }
        }

        fn writes(&self) -> Vec<RegVal> {
            self.log
                .iter()
                .filter_map(|a| match *a {
                    Access::Write(addr, value) => Some(RegVal::new(addr, value)),
                    _ => None,
                })
                .collect()
        }

        fn delays(&self) -> Vec<u32> {
            self.log
                .iter()
                .filter_map(|a| match *a {
                    Access::Delay(us) => Some(us),
                    _ => None,
                })
                .collect()
        }
    }

    impl RegisterBus for RecordingBus {
        fn read(&mut self, addr: u8) -> Result<u8> {
            self.log.push(Access::Read(addr));
            if addr == regs::CHIP_ID_HIGH {
                if self.failing_id_reads > 0 {
                    self.failing_id_reads -= 1;
                    return Err(Error::read_failed(addr));
                }
                if self.bad_id_reads > 0 {
                    self.bad_id_reads -= 1;
                    return Ok(0x00);
                }
            }
            Ok(self.regs[addr as usize])
        }

        fn write(&mut self, addr: u8, value: u8) -> Result<()> {
            let index = self.writes;
            self.writes += 1;
            if self.fail_write_at == Some(index) {
                return Err(Error::write_failed(addr, value));
            }
            self.log.push(Access::Write(addr, value));
            self.regs[addr as usize] = value;
            Ok(())
        }

        fn delay_us(&mut self, us: u32) {
            self.log.push(Access::Delay(us));
        }
    }

    fn exposure_writes(lines: u32) -> [RegVal; 3] {
        [
            RegVal::new(regs::PAGE_SELECT, 0),
            RegVal::new(regs::EXP_HIGH, (lines >> 8) as u8 & 0x3f),
            RegVal::new(regs::EXP_LOW, lines as u8),
        ]
    }

    fn gain_writes(raw: u32) -> [RegVal; 6] {
        let s = GainSetting::from_raw(raw);
        [
            RegVal::new(regs::PAGE_SELECT, 0),
            RegVal::new(regs::ANALOG_CTRL_A, s.band.analog_a),
            RegVal::new(regs::ANALOG_CTRL_B, s.band.analog_b),
            RegVal::new(regs::ANALOG_GAIN_SEL, s.band.index),
            RegVal::new(regs::DIGITAL_GAIN_HIGH, s.digital_high()),
            RegVal::new(regs::DIGITAL_GAIN_LOW, s.digital_low()),
        ]
    }

    fn configured(cache: &ExposureGainCache) -> Gc2385<'_, RecordingBus> {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut sensor = Gc2385::new(RecordingBus::new(), cache);
        sensor.initialize().unwrap();
        sensor.bus().log.clear();
        sensor
    }

    static TEST_FORMAT_REGS: [RegVal; 2] = [RegVal::new(0xfe, 0x03), RegVal::new(0x10, 0x91)];
    static TEST_MODE_REGS: [RegVal; 3] = [
        RegVal::new(0xfe, 0x00),
        RegVal::new(0x0d, 0x02),
        RegVal::new(0x0e, 0x58),
    ];
    static TEST_SIZE_REGS: [RegVal; 2] = [RegVal::new(0x0f, 0x03), RegVal::new(0x10, 0x20)];

    fn write_test_size(bus: &mut dyn RegisterBus) -> Result<()> {
        bus.write_table(&TEST_SIZE_REGS)
    }

    static TEST_FORMAT: PixelFormat = PixelFormat {
        desc: "Raw RGB Bayer, test",
        mbus_code: 0x300b,
        regs: &TEST_FORMAT_REGS,
        bpp: 1,
    };

    static TEST_MODE: ModeDescriptor = ModeDescriptor {
        width: 800,
        height: 600,
        hoffset: 0,
        voffset: 0,
        hts: 1079,
        vts: 624,
        pclk: 41_000_000,
        mipi_bps: 656_000_000,
        fps_fixed: 60,
        bin_factor: 2,
        intg_min: 1 << 4,
        intg_max: 624 << 4,
        gain_min: 1 << 4,
        gain_max: 128 << 4,
        regs: &TEST_MODE_REGS,
        set_size: Some(write_test_size as mode::SizeSetter),
    };

    #[test]
    fn test_detect_first_try() {
        let cache = ExposureGainCache::new();
        let mut sensor = Gc2385::new(RecordingBus::new(), &cache);
        assert_eq!(sensor.detect().unwrap(), 0x2385);
        assert_eq!(sensor.sequencer_state(), SequencerState::Detected);
        assert_eq!(sensor.state().chip_id, Some(0x2385));
        assert_eq!(
            sensor.bus().log,
            [Access::Read(0xf0), Access::Read(0xf1)]
        );
    }

    #[test]
    fn test_detect_recovers_within_retries() {
        let cache = ExposureGainCache::new();
        let mut bus = RecordingBus::new();
        bus.bad_id_reads = DETECT_RETRIES;
        let mut sensor = Gc2385::new(bus, &cache);
        assert_eq!(sensor.detect().unwrap(), 0x2385);
        assert_eq!(sensor.bus().log.len(), 2 * (DETECT_RETRIES + 1));
    }

    #[test]
    fn test_detect_gives_up_after_retries() {
        let cache = ExposureGainCache::new();
        let mut bus = RecordingBus::new();
        bus.bad_id_reads = DETECT_RETRIES + 1;
        let mut sensor = Gc2385::new(bus, &cache);
        assert_eq!(
            sensor.detect(),
            Err(Error::DeviceNotFound { found: 0x0085 })
        );
        assert_eq!(sensor.sequencer_state(), SequencerState::Uninitialized);
        assert!(sensor.state().chip_id.is_none());
    }

    #[test]
    fn test_detect_read_error_counts_as_attempt() {
        let cache = ExposureGainCache::new();
        let mut bus = RecordingBus::new();
        bus.failing_id_reads = 2;
        let mut sensor = Gc2385::new(bus, &cache);
        assert_eq!(sensor.detect().unwrap(), 0x2385);

        let mut bus = RecordingBus::new();
        bus.failing_id_reads = DETECT_RETRIES + 1;
        let mut sensor = Gc2385::new(bus, &cache);
        assert_eq!(sensor.detect(), Err(Error::DeviceNotFound { found: 0 }));
    }

    #[test]
    fn test_initialize_runs_detection_and_selects_defaults() {
        let cache = ExposureGainCache::new();
        let mut sensor = Gc2385::new(RecordingBus::new(), &cache);
        assert_eq!(sensor.current_mode().unwrap_err(), Error::NotConfigured);

        sensor.initialize().unwrap();
        assert_eq!(sensor.sequencer_state(), SequencerState::Configured);
        let state = sensor.state();
        assert_eq!((state.width, state.height), (1600, 1200));
        assert_eq!(state.gain, 0);
        assert!(!state.hflip && !state.vflip && !state.low_speed);
        assert_eq!(sensor.frame_interval(), FrameInterval::from_fps(30));
        assert_eq!(sensor.current_mode().unwrap().hts, 1079);
        assert_eq!(sensor.current_format().unwrap().mbus_code, 0x300a);
        // Only the identity reads touched the bus
        assert!(sensor.bus().writes().is_empty());
    }

    #[test]
    fn test_initialize_fails_without_chip() {
        let cache = ExposureGainCache::new();
        let mut bus = RecordingBus::new();
        bus.regs[0xf1] = 0x86;
        let mut sensor = Gc2385::new(bus, &cache);
        assert_eq!(
            sensor.initialize(),
            Err(Error::DeviceNotFound { found: 0x2386 })
        );
        assert!(sensor.current_mode().is_err());
    }

    #[test]
    fn test_initialize_rejected_while_streaming() {
        let cache = ExposureGainCache::new();
        let mut sensor = configured(&cache);
        sensor.stream_enable(true).unwrap();
        assert_eq!(
            sensor.initialize(),
            Err(Error::InvalidState {
                op: "initialize",
                state: SequencerState::Streaming
            })
        );
    }

    #[test]
    fn test_stream_enable_requires_configuration() {
        let cache = ExposureGainCache::new();
        let mut sensor = Gc2385::new(RecordingBus::new(), &cache);
        sensor.detect().unwrap();
        assert!(matches!(
            sensor.stream_enable(true),
            Err(Error::InvalidState {
                state: SequencerState::Detected,
                ..
            })
        ));
        assert!(sensor.stream_enable(false).is_err());
    }

    #[test]
    fn test_stream_enable_replays_tables_then_cached_pair() {
        let cache = ExposureGainCache::new();
        let mut sensor = configured(&cache);
        sensor.stream_enable(true).unwrap();
        assert_eq!(sensor.sequencer_state(), SequencerState::Streaming);

        let mut expected: Vec<RegVal> = tables::MODE_1600X1200_30_REGS.to_vec();
        expected.extend_from_slice(&exposure_writes(1000));
        expected.extend_from_slice(&gain_writes(512));
        assert_eq!(sensor.bus().writes(), expected);

        // default pair 16000/512: 1000 lines, band 9, digital 256*2048/1092
        let tail = &expected[expected.len() - 6..];
        assert_eq!(tail[3], RegVal::new(0xb6, 8));
        assert_eq!(tail[4], RegVal::new(0xb1, 0x01));
        assert_eq!(tail[5], RegVal::new(0xb2, 0xe0));
        assert_eq!((sensor.exposure(), sensor.gain()), (16000, 512));
    }

    #[test]
    fn test_stream_enable_when_streaming_is_noop() {
        let cache = ExposureGainCache::new();
        let mut sensor = configured(&cache);
        sensor.stream_enable(true).unwrap();
        sensor.bus().log.clear();

        sensor.stream_enable(true).unwrap();
        assert!(sensor.bus().log.is_empty());
    }

    #[test]
    fn test_stream_disable_writes_nothing() {
        let cache = ExposureGainCache::new();
        let mut sensor = configured(&cache);
        sensor.stream_enable(true).unwrap();
        sensor.bus().log.clear();

        sensor.stream_enable(false).unwrap();
        assert_eq!(sensor.sequencer_state(), SequencerState::Configured);
        sensor.stream_enable(false).unwrap();
        assert!(sensor.bus().log.is_empty());
    }

    #[test]
    fn test_stream_restart_uses_latest_shared_pair() {
        let cache = ExposureGainCache::new();
        let mut sensor = configured(&cache);
        sensor.stream_enable(true).unwrap();
        sensor.set_exposure_gain(3200, 40).unwrap();
        sensor.stream_enable(false).unwrap();
        sensor.bus().log.clear();

        sensor.stream_enable(true).unwrap();
        let writes = sensor.bus().writes();
        let n = writes.len();
        assert_eq!(writes[n - 9..n - 6], exposure_writes(200));
        assert_eq!(writes[n - 6..], gain_writes(40));
    }

    #[test]
    fn test_replay_failure_aborts_and_stays_configured() {
        let cache = ExposureGainCache::new();
        let mut sensor = configured(&cache);
        sensor.bus().fail_write_at = Some(sensor.bus().writes + 10);

        let err = sensor.stream_enable(true).unwrap_err();
        assert!(err.is_bus_error());
        assert_eq!(sensor.sequencer_state(), SequencerState::Configured);
        // Nothing after the failing entry was written
        assert_eq!(sensor.bus().writes().len(), 10);
        assert_eq!(sensor.exposure(), 0);
    }

    #[test]
    fn test_set_exposure_registers_and_raw_cache() {
        let cache = ExposureGainCache::new();
        let mut sensor = configured(&cache);

        sensor.set_exposure(0x3fff * 16 + 100).unwrap();
        assert_eq!(sensor.bus().writes(), exposure_writes(0x3fff));
        assert_eq!(sensor.exposure(), 0x3fff * 16 + 100);

        sensor.bus().log.clear();
        sensor.set_exposure(5).unwrap();
        assert_eq!(sensor.bus().writes(), exposure_writes(6));
        assert_eq!(sensor.exposure(), 5);
        // Single-value setters leave the shared pair alone
        assert_eq!(cache.load(), ExposureGain::default());
    }

    #[test]
    fn test_set_gain_returns_raw_value() {
        let cache = ExposureGainCache::new();
        let mut sensor = configured(&cache);
        for raw in [0, 16, 187, 188, 2047, 5000] {
            sensor.bus().log.clear();
            sensor.set_gain(raw).unwrap();
            assert_eq!(sensor.gain(), raw);
            assert_eq!(sensor.bus().writes(), gain_writes(raw));
        }
    }

    #[test]
    fn test_set_gain_band_boundary() {
        let cache = ExposureGainCache::new();
        let mut sensor = configured(&cache);
        // raw 187 -> combined 748, raw 188 -> combined 752
        sensor.set_gain(187).unwrap();
        assert_eq!(sensor.bus().regs[0xb6], 6);
        assert_eq!(sensor.bus().regs[0x20], 0x74);
        sensor.set_gain(188).unwrap();
        assert_eq!(sensor.bus().regs[0xb6], 7);
    }

    #[test]
    fn test_set_exposure_gain_clamps_and_caches() {
        let cache = ExposureGainCache::new();
        let mut sensor = configured(&cache);

        let pair = sensor.set_exposure_gain(10, 5000).unwrap();
        assert_eq!(pair, ExposureGain::new(96, 2047));
        assert_eq!(cache.load(), pair);
        assert_eq!((sensor.exposure(), sensor.gain()), (96, 2047));

        let pair = sensor.set_exposure_gain(u32::MAX, 0).unwrap();
        assert_eq!(pair, ExposureGain::new(0x3fff * 16, 16));
    }

    #[test]
    fn test_set_exposure_gain_is_repeatable() {
        let cache = ExposureGainCache::new();
        let mut sensor = configured(&cache);
        sensor.set_exposure_gain(20000, 300).unwrap();
        let first = sensor.bus().writes();
        sensor.bus().log.clear();
        sensor.set_exposure_gain(20000, 300).unwrap();
        assert_eq!(sensor.bus().writes(), first);
        assert_eq!(first.len(), 9);
    }

    #[test]
    fn test_failed_write_keeps_previous_values() {
        let cache = ExposureGainCache::new();
        let mut sensor = configured(&cache);
        sensor.set_exposure_gain(1600, 32).unwrap();

        // Fail the gain page select
        sensor.bus().fail_write_at = Some(sensor.bus().writes + 3);
        assert!(sensor.set_exposure_gain(3200, 64).is_err());
        assert_eq!(sensor.exposure(), 3200);
        assert_eq!(sensor.gain(), 32);
        assert_eq!(cache.load(), ExposureGain::new(1600, 32));
    }

    #[test]
    fn test_instances_share_cache() {
        let cache = ExposureGainCache::new();
        let mut first = configured(&cache);
        let mut second = configured(&cache).with_name(regs::SENSOR_NAME_2);
        assert_eq!(second.name(), "gc2385_mipi_2");

        first.set_exposure_gain(4800, 80).unwrap();
        second.stream_enable(true).unwrap();
        let writes = second.bus().writes();
        assert_eq!(writes[writes.len() - 6..], gain_writes(80));
        assert_eq!(second.exposure(), 4800);
    }

    #[test]
    fn test_control_dispatch() {
        let cache = ExposureGainCache::new();
        let mut sensor = configured(&cache);
        sensor.set_control(ControlId::Exposure, 3200).unwrap();
        sensor.set_control(ControlId::Gain, 64).unwrap();
        assert_eq!(sensor.get_control(ControlId::Exposure), 3200);
        assert_eq!(sensor.get_control(ControlId::Gain), 64);
    }

    #[test]
    fn test_selected_mode_replay_order() {
        let cache = ExposureGainCache::new();
        let mut sensor = configured(&cache);
        sensor.select_mode(&TEST_FORMAT, &TEST_MODE).unwrap();
        assert_eq!((sensor.state().width, sensor.state().height), (800, 600));
        assert_eq!(sensor.frame_interval(), FrameInterval::from_fps(60));
        assert!(sensor.bus().log.is_empty());

        sensor.stream_enable(true).unwrap();

        let mut expected: Vec<RegVal> = tables::DEFAULT_REGS.to_vec();
        expected.extend_from_slice(&TEST_FORMAT_REGS);
        expected.extend_from_slice(&TEST_MODE_REGS);
        expected.extend_from_slice(&TEST_SIZE_REGS);
        expected.extend_from_slice(&exposure_writes(1000));
        expected.extend_from_slice(&gain_writes(512));
        assert_eq!(sensor.bus().writes(), expected);
        assert_eq!(sensor.current_mode().unwrap().vts, 624);
        assert_eq!(sensor.current_format().unwrap().mbus_code, 0x300b);
    }

    #[test]
    fn test_select_mode_requires_configured_state() {
        let cache = ExposureGainCache::new();
        let mut sensor = Gc2385::new(RecordingBus::new(), &cache);
        assert_eq!(
            sensor.select_mode(&TEST_FORMAT, &TEST_MODE),
            Err(Error::InvalidState {
                op: "select_mode",
                state: SequencerState::Uninitialized
            })
        );

        sensor.initialize().unwrap();
        sensor.stream_enable(true).unwrap();
        assert!(matches!(
            sensor.set_format(800, 600, 0x300b),
            Err(Error::InvalidState {
                state: SequencerState::Streaming,
                ..
            })
        ));
        assert_eq!(sensor.current_mode().unwrap().width, 1600);

        sensor.stream_enable(false).unwrap();
        sensor.select_mode(&TEST_FORMAT, &TEST_MODE).unwrap();
        assert_eq!(sensor.current_mode().unwrap().width, 800);
    }

    #[test]
    fn test_set_format_snaps_to_catalog() {
        let cache = ExposureGainCache::new();
        let mut sensor = configured(&cache);
        sensor.select_mode(&TEST_FORMAT, &TEST_MODE).unwrap();

        let mode = sensor.set_format(1920, 1080, 0).unwrap();
        assert!(mode.matches_size(1600, 1200));
        assert_eq!(
            sensor.current_format().unwrap().mbus_code,
            mode::MBUS_FMT_SGRBG10_1X10
        );
        assert_eq!((sensor.state().width, sensor.state().height), (1600, 1200));
        assert_eq!(sensor.frame_interval(), FrameInterval::from_fps(30));
    }

    #[test]
    fn test_gain_at_published_maximum_saturates_digital_stage() {
        let cache = ExposureGainCache::new();
        let mut sensor = configured(&cache);
        let max = ControlId::Gain.range().max;
        sensor.set_control(ControlId::Gain, max).unwrap();
        assert_eq!(sensor.get_control(ControlId::Gain), max);
        let regs = sensor.bus().regs;
        assert_eq!(regs[0xb6], 8);
        assert_eq!((regs[0xb1], regs[0xb2]), (0xff, 0xff));
    }

    #[test]
    fn test_catalog_accessors() {
        let cache = ExposureGainCache::new();
        let sensor = Gc2385::new(RecordingBus::new(), &cache);
        assert_eq!(sensor.formats().len(), 1);
        assert_eq!(sensor.modes()[0].width, 1600);
        assert_eq!(sensor.mbus_config().lanes(), 1);
        assert_eq!(sensor.name(), "gc2385_mipi");
    }

    #[derive(Default)]
    struct RecordingPower {
        calls: Vec<&'static str>,
    }

    impl PowerControl for RecordingPower {
        fn power_on(&mut self) -> Result<()> {
            self.calls.push("on");
            Ok(())
        }

        fn power_off(&mut self) -> Result<()> {
            self.calls.push("off");
            Ok(())
        }

        fn set_reset(&mut self, asserted: bool) -> Result<()> {
            self.calls.push(if asserted { "reset" } else { "release" });
            Ok(())
        }
    }

    #[test]
    fn test_power_transitions_and_settle_delays() {
        let cache = ExposureGainCache::new();
        let mut power = RecordingPower::default();
        let mut sensor = Gc2385::new(RecordingBus::new(), &cache)
            .with_power(&mut power);

        sensor.set_power(PowerAction::On).unwrap();
        sensor.reset(true).unwrap();
        sensor.reset(false).unwrap();
        sensor.set_power(PowerAction::StandbyOn).unwrap();
        sensor.set_power(PowerAction::StandbyOff).unwrap();
        sensor.set_power(PowerAction::Off).unwrap();

        assert_eq!(sensor.bus().delays(), [100, 100, 1000, 1000, 100]);
        assert!(sensor.bus().writes().is_empty());
        drop(sensor);
        assert_eq!(power.calls, ["on", "reset", "release", "off"]);
    }

    #[cfg(feature = "std")]
    #[test]
    fn test_power_lock_released_after_transition() {
        use std::sync::{Arc, Mutex};

        let cache = ExposureGainCache::new();
        let lock = Arc::new(Mutex::new(()));
        let mut sensor = Gc2385::new(RecordingBus::new(), &cache).with_lock(Arc::clone(&lock));
        sensor.set_power(PowerAction::StandbyOn).unwrap();
        sensor.reset(false).unwrap();
        assert!(lock.try_lock().is_ok());
    }
}
