//! Last commanded exposure/gain, shared by every instance of the model
//!
//! A stream restart re-applies the most recent exposure/gain pair set on
//! any GC2385 instance. The pair is packed into one atomic word so readers
//! never see the exposure of one update with the gain of another.

use core::sync::atomic::{AtomicU64, Ordering};

/// Exposure applied before the first explicit update (raw units)
pub const DEFAULT_EXPOSURE: u32 = 16000;
/// Gain applied before the first explicit update (raw units)
pub const DEFAULT_GAIN: u32 = 512;

/// An exposure/gain pair in raw units
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExposureGain {
    /// Exposure, lines with 4 fractional bits
    pub exposure: u32,
    /// Gain, 16 = 1.00x
    pub gain: u32,
}

impl ExposureGain {
    /// Create a new pair
    pub const fn new(exposure: u32, gain: u32) -> Self {
        Self { exposure, gain }
    }

    const fn pack(self) -> u64 {
        ((self.exposure as u64) << 32) | self.gain as u64
    }

    const fn unpack(word: u64) -> Self {
        Self {
            exposure: (word >> 32) as u32,
            gain: word as u32,
        }
    }
}

impl Default for ExposureGain {
    fn default() -> Self {
        Self::new(DEFAULT_EXPOSURE, DEFAULT_GAIN)
    }
}

/// Shared cache of the last applied exposure/gain pair
///
/// One cache exists per sensor model. Every instance holds a reference to
/// it; the host decides its lifetime (typically a `static`).
#[derive(Debug)]
pub struct ExposureGainCache {
    word: AtomicU64,
}

impl ExposureGainCache {
    /// Create a cache holding the power-on defaults
    pub const fn new() -> Self {
        Self::with_values(ExposureGain::new(DEFAULT_EXPOSURE, DEFAULT_GAIN))
    }

    /// Create a cache seeded with `initial`
    pub const fn with_values(initial: ExposureGain) -> Self {
        Self {
            word: AtomicU64::new(initial.pack()),
        }
    }

    /// Last stored pair
    pub fn load(&self) -> ExposureGain {
        ExposureGain::unpack(self.word.load(Ordering::Acquire))
    }

    /// Replace the stored pair
    pub fn store(&self, value: ExposureGain) {
        self.word.store(value.pack(), Ordering::Release);
    }
}

impl Default for ExposureGainCache {
    fn default() -> Self {
        Self::new()
    }
}
