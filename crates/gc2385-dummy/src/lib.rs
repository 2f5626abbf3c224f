//! gc2385-dummy - In-memory GC2385 emulator for testing
//!
//! This crate provides a register bus backed by an emulated GC2385 register
//! file. It's useful for testing and development without real hardware.
//!
//! The emulator models the paged register layout: 0xfe selects one of four
//! pages, and the system registers 0xf0..=0xff are visible from every page.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "alloc")]
extern crate alloc;

#[cfg(feature = "alloc")]
use alloc::vec::Vec;

use gc2385_core::bus::{RegVal, RegisterBus};
use gc2385_core::error::{Error, Result};
use gc2385_core::regs;

/// Number of register pages
const PAGES: usize = 4;
/// First page independent (system) register
const SYSTEM_BASE: u8 = 0xf0;
/// Value of the stream control register while frames are output
const STREAM_ON: u8 = 0x90;

/// Configuration for the dummy sensor
#[derive(Debug, Clone)]
pub struct DummyConfig {
    /// Identity reported at 0xf0:0xf1
    pub chip_id: u16,
    /// Identity reads that return garbage before the real identity
    pub id_glitch_reads: usize,
    /// Number of writes that succeed before every further write fails
    pub fail_write_after: Option<usize>,
    /// Fail every register read
    pub fail_reads: bool,
}

impl Default for DummyConfig {
    fn default() -> Self {
        Self {
            chip_id: regs::CHIP_ID,
            id_glitch_reads: 0,
            fail_write_after: None,
            fail_reads: false,
        }
    }
}

/// One recorded bus access
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Register read
    Read {
        /// Page selected at the time of the read
        page: u8,
        /// Register address
        addr: u8,
    },
    /// Register write
    Write {
        /// Page selected at the time of the write
        page: u8,
        /// Register address
        addr: u8,
        /// Value written
        value: u8,
    },
}

/// Emulated GC2385
#[cfg(feature = "alloc")]
pub struct DummySensor {
    config: DummyConfig,
    pages: [[u8; 256]; PAGES],
    system: [u8; 16],
    page: u8,
    log: Vec<Access>,
    writes_done: usize,
    delayed_us: u64,
}

#[cfg(feature = "alloc")]
impl DummySensor {
    /// Create a new dummy sensor with the given configuration
    pub fn new(config: DummyConfig) -> Self {
        let mut system = [0u8; 16];
        system[(regs::CHIP_ID_HIGH - SYSTEM_BASE) as usize] = (config.chip_id >> 8) as u8;
        system[(regs::CHIP_ID_LOW - SYSTEM_BASE) as usize] = config.chip_id as u8;
        Self {
            config,
            pages: [[0u8; 256]; PAGES],
            system,
            page: 0,
            log: Vec::new(),
            writes_done: 0,
            delayed_us: 0,
        }
    }

    /// Create a new dummy sensor that answers like a healthy GC2385
    pub fn new_default() -> Self {
        Self::new(DummyConfig::default())
    }

    /// Get the configuration
    pub fn config(&self) -> &DummyConfig {
        &self.config
    }

    /// Get a mutable reference to the configuration
    pub fn config_mut(&mut self) -> &mut DummyConfig {
        &mut self.config
    }

    /// Currently selected page
    pub fn page(&self) -> u8 {
        self.page
    }

    /// Register value on a given page
    pub fn page_reg(&self, page: u8, addr: u8) -> u8 {
        if addr >= SYSTEM_BASE {
            self.system[(addr - SYSTEM_BASE) as usize]
        } else {
            self.pages[page as usize % PAGES][addr as usize]
        }
    }

    /// Every access since creation or the last [`clear_log`](Self::clear_log)
    pub fn log(&self) -> &[Access] {
        &self.log
    }

    /// Successful writes in order, as table entries
    pub fn writes(&self) -> Vec<RegVal> {
        self.log
            .iter()
            .filter_map(|access| match *access {
                Access::Write { addr, value, .. } => Some(RegVal::new(addr, value)),
                Access::Read { .. } => None,
            })
            .collect()
    }

    /// Forget recorded accesses
    pub fn clear_log(&mut self) {
        self.log.clear();
    }

    /// Sum of all requested delays
    pub fn total_delay_us(&self) -> u64 {
        self.delayed_us
    }

    /// Exposure currently programmed, in lines
    pub fn exposure_lines(&self) -> u32 {
        let high = u32::from(self.page_reg(regs::PAGE_0, regs::EXP_HIGH)) & regs::EXP_HIGH_MASK;
        let low = u32::from(self.page_reg(regs::PAGE_0, regs::EXP_LOW));
        high << 8 | low
    }

    /// Digital gain currently programmed
    pub fn digital_gain(&self) -> u32 {
        u32::from(self.page_reg(regs::PAGE_0, regs::DIGITAL_GAIN_HIGH)) << 8
            | u32::from(self.page_reg(regs::PAGE_0, regs::DIGITAL_GAIN_LOW))
    }

    /// Analog gain band currently selected
    pub fn analog_band(&self) -> u8 {
        self.page_reg(regs::PAGE_0, regs::ANALOG_GAIN_SEL)
    }

    /// Whether the MIPI output is enabled
    pub fn is_streaming_output(&self) -> bool {
        self.page_reg(regs::PAGE_0, regs::STREAM_CTRL) == STREAM_ON
    }

    fn read_system(&mut self, addr: u8) -> u8 {
        if addr == regs::CHIP_ID_HIGH && self.config.id_glitch_reads > 0 {
            self.config.id_glitch_reads -= 1;
            log::trace!("dummy: glitched chip id read");
            return 0xff;
        }
        self.system[(addr - SYSTEM_BASE) as usize]
    }
}

#[cfg(feature = "alloc")]
impl RegisterBus for DummySensor {
    fn read(&mut self, addr: u8) -> Result<u8> {
        if self.config.fail_reads {
            return Err(Error::read_failed(addr));
        }
        self.log.push(Access::Read {
            page: self.page,
            addr,
        });

        let value = if addr >= SYSTEM_BASE {
            self.read_system(addr)
        } else {
            self.pages[self.page as usize][addr as usize]
        };
        Ok(value)
    }

    fn write(&mut self, addr: u8, value: u8) -> Result<()> {
        if self
            .config
            .fail_write_after
            .is_some_and(|limit| self.writes_done >= limit)
        {
            return Err(Error::write_failed(addr, value));
        }
        self.writes_done += 1;
        self.log.push(Access::Write {
            page: self.page,
            addr,
            value,
        });

        match addr {
            regs::PAGE_SELECT => {
                self.page = value % PAGES as u8;
                self.system[(addr - SYSTEM_BASE) as usize] = value;
            }
            // Chip identity is read only
            regs::CHIP_ID_HIGH | regs::CHIP_ID_LOW => {}
            a if a >= SYSTEM_BASE => self.system[(a - SYSTEM_BASE) as usize] = value,
            a => self.pages[self.page as usize][a as usize] = value,
        }
        Ok(())
    }

    fn delay_us(&mut self, us: u32) {
        // No real delay needed for in-memory operations
        self.delayed_us += u64::from(us);
    }
}
