//! ReplayGain loudness normalization for Aria
//!
//! This crate provides:
//! - [`LoudnessProcessor`]: applies pre-amp plus track/album ReplayGain to
//!   16/24-bit PCM buffers with format-aware clamping
//! - [`ReplayGainMode`]: which measured gain is preferred
//! - [`AtomicGain`]: lock-free gain cells shared between the control thread
//!   and the audio thread
//!
//! # Threading
//!
//! ```text
//! Control thread                       Audio thread
//! ──────────────                       ────────────
//! set_track_gain() ──► AtomicGain ──► effective_gain_db()  (once per buffer)
//! set_pre_amp_gain() ─► AtomicGain ─►        │
//!                                            ▼
//!                                     process_buffer()
//! ```
//!
//! # Example
//!
//! ```rust
//! use aria_loudness::{LoudnessProcessor, ReplayGainMode};
//!
//! let processor = LoudnessProcessor::new(ReplayGainMode::Track);
//! let format = processor.configure(16)?;
//! processor.set_track_gain(Some(-6.0));
//!
//! let input = 16_384_i16.to_le_bytes();
//! let mut output = [0u8; 2];
//! processor.process_buffer(&input, &mut output, format)?;
//! assert!(i16::from_le_bytes(output) < 16_384);
//! # Ok::<(), aria_loudness::LoudnessError>(())
//! ```

#![forbid(unsafe_code)]

mod atomic;
mod error;
mod mode;
mod processor;

pub use atomic::AtomicGain;
pub use error::{LoudnessError, Result};
pub use mode::ReplayGainMode;
pub use processor::LoudnessProcessor;

/// Maximum pre-amp gain in dB
pub const MAX_PREAMP_DB: f64 = 12.0;

/// Minimum pre-amp gain in dB
pub const MIN_PREAMP_DB: f64 = -12.0;
