//! Aria Core
//!
//! Platform-agnostic building blocks shared by the Aria DSP crates.
//!
//! This crate provides:
//! - **Gain math**: decibel/linear conversions and saturating clamps
//! - **PCM formats**: the two supported integer sample depths and their
//!   little-endian byte codec
//! - **Error classification**: the [`ErrorKind`] every Aria error maps onto
//!
//! # Example
//!
//! ```rust
//! use aria_core::gain::{clamp_to_range, db_to_linear};
//! use aria_core::SampleFormat;
//!
//! let boosted = 20_000.0 * db_to_linear(6.0);
//! let clamped = clamp_to_range(boosted, SampleFormat::Pcm16.min_value(), SampleFormat::Pcm16.max_value());
//! assert_eq!(clamped, 32_767.0);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod format;
pub mod gain;

pub use error::{CoreError, ErrorKind, Result};
pub use format::{PcmFormat, SampleFormat, SampleRate};
