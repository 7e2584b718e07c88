//! Lock-free gain cells
//!
//! An `f64` stored as its bit pattern in an `AtomicU64`. Every store is a
//! single 64-bit write, so a reader always observes a whole value, never a
//! mix of an old and a new one.

use std::sync::atomic::{AtomicU64, Ordering};

/// Bit pattern reserved for "no gain set". A quiet NaN with a payload that
/// `f64` arithmetic never produces.
const UNSET: u64 = 0x7FF8_DEAD_BEEF_0001;

/// Atomic optional gain in dB
#[derive(Debug)]
pub struct AtomicGain(AtomicU64);

impl AtomicGain {
    /// Create a cell holding `value`
    pub fn new(value: Option<f64>) -> Self {
        Self(AtomicU64::new(Self::encode(value)))
    }

    /// Create a cell with no value
    pub fn unset() -> Self {
        Self::new(None)
    }

    /// Read the current value
    #[inline]
    pub fn load(&self) -> Option<f64> {
        let bits = self.0.load(Ordering::Acquire);
        if bits == UNSET {
            None
        } else {
            Some(f64::from_bits(bits))
        }
    }

    /// Replace the current value. Non-finite values are stored as unset.
    #[inline]
    pub fn store(&self, value: Option<f64>) {
        self.0.store(Self::encode(value), Ordering::Release);
    }

    fn encode(value: Option<f64>) -> u64 {
        match value {
            Some(v) if v.is_finite() => v.to_bits(),
            _ => UNSET,
        }
    }
}

impl Default for AtomicGain {
    fn default() -> Self {
        Self::unset()
    }
}
