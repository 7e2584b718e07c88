//! Ten-band equalizer
//!
//! Each band is a second-order recursive peaking filter designed from a
//! center frequency, a gain, and a bandwidth gain. Ten filters at fixed
//! octave frequencies run in series to form an [`EqualizerChain`].
//!
//! Chains are immutable once built apart from their per-channel history.
//! Changing a preset or the stream format means building a new chain and
//! swapping it in, never editing coefficients of a running one.

mod band;
mod chain;
mod filter;
mod preset;
mod processor;

pub use band::{FrequencyBand, BANDWIDTH_RATIO};
pub use chain::{BandReference, EqualizerChain, BAND_COUNT, EQUALIZER_FREQUENCIES};
pub use filter::BandFilter;
pub use preset::{Preset, PresetId, MAX_BAND_GAIN_DB};
pub use processor::{EqualizerProcessor, RetiredChain};

#[cfg(test)]
pub(crate) mod tests {
    /// Generate a mono sine wave for testing
    pub(crate) fn generate_sine(freq: f32, sample_rate: u32, num_samples: usize) -> Vec<f32> {
        (0..num_samples)
            .map(|i| {
                let t = i as f32 / sample_rate as f32;
                (2.0 * std::f32::consts::PI * freq * t).sin()
            })
            .collect()
    }
}
