//! Aria Audio
//!
//! Real-time equalization and analysis for Aria.
//!
//! This crate provides:
//! - A ten-band recursive equalizer ([`eq::EqualizerChain`]) built from
//!   [`eq::FrequencyBand`]s, one [`eq::BandFilter`] per band
//! - Built-in presets and a PCM-buffer stage ([`eq::EqualizerProcessor`])
//! - Offline frequency response analysis ([`analysis::FrequencyResponseAnalyzer`])
//! - A render pipeline that combines loudness normalization and equalization,
//!   with lock-free chain hand-off to the audio thread ([`pipeline`])
//!
//! # Example: Equalizing samples
//!
//! ```rust
//! use aria_audio::eq::{BandReference, Preset, PresetId};
//!
//! let preset = Preset::builtin(PresetId::BassBoost);
//! let mut chain = preset.build_chain(44_100, 2, BandReference::Unity)?;
//!
//! let left = chain.process_sample(0.25, 0);
//! let right = chain.process_sample(0.25, 1);
//! assert_eq!(left, right);
//! # Ok::<(), aria_audio::AudioError>(())
//! ```
//!
//! # Example: Previewing the response
//!
//! ```rust
//! use aria_audio::analysis::FrequencyResponseAnalyzer;
//! use aria_audio::eq::EqualizerChain;
//!
//! let chain = EqualizerChain::flat(44_100, 1)?;
//! let analyzer = FrequencyResponseAnalyzer::new(1024)?;
//! let response = analyzer.analyze(&chain, 0.0);
//! assert_eq!(response.len(), 512);
//! # Ok::<(), aria_audio::AudioError>(())
//! ```

#![forbid(unsafe_code)]

pub mod analysis;
pub mod eq;
mod error;
pub mod pipeline;
pub mod settings;

pub use error::{AudioError, Result};
pub use settings::DspSettings;
