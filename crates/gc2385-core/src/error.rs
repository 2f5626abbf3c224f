//! Error types for gc2385-core
//!
//! This module provides a no_std compatible error type that can be used
//! throughout the crate.

use core::fmt;

use crate::sensor::SequencerState;

/// Details about a failed register transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusFailure {
    /// Reading a register failed
    Read {
        /// Register address
        addr: u8,
    },
    /// Writing a register failed
    Write {
        /// Register address
        addr: u8,
        /// Value that was being written
        value: u8,
    },
    /// Transport failure with no register context (adapter setup, ioctl)
    Transport,
}

/// Core error type - no_std compatible, Copy for efficiency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Register read or write failed on the control bus
    Bus(BusFailure),
    /// Chip identity did not match after all detection attempts
    DeviceNotFound {
        /// Last identity read from the chip (0 if every read failed)
        found: u16,
    },
    /// Operation invoked outside the sequencer state it requires
    InvalidState {
        /// Name of the rejected operation
        op: &'static str,
        /// State the sensor was in
        state: SequencerState,
    },
    /// No mode has been selected yet (sensor not initialised)
    NotConfigured,
}

impl Error {
    /// Shorthand for a failed register read
    pub const fn read_failed(addr: u8) -> Self {
        Self::Bus(BusFailure::Read { addr })
    }

    /// Shorthand for a failed register write
    pub const fn write_failed(addr: u8, value: u8) -> Self {
        Self::Bus(BusFailure::Write { addr, value })
    }

    /// Whether this error came from the register transport
    pub fn is_bus_error(&self) -> bool {
        matches!(self, Self::Bus(_))
    }
}

impl fmt::Display for BusFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read { addr } => write!(f, "register read failed at 0x{:02X}", addr),
            Self::Write { addr, value } => write!(
                f,
                "register write of 0x{:02X} failed at 0x{:02X}",
                value, addr
            ),
            Self::Transport => write!(f, "bus transport failure"),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bus(failure) => write!(f, "{}", failure),
            Self::DeviceNotFound { found } => write!(
                f,
                "sensor not found: chip id 0x{:04X}, expected 0x{:04X}",
                found,
                crate::regs::CHIP_ID
            ),
            Self::InvalidState { op, state } => {
                write!(f, "{} is not allowed in state {}", op, state)
            }
            Self::NotConfigured => write!(f, "sensor mode not configured"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// Result type alias using the core Error type
pub type Result<T> = core::result::Result<T, Error>;
