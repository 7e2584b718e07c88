//! Second-order peaking filter for one equalizer band
//!
//! Coefficients follow the bandwidth-gain parametrization: the filter is
//! described by a reference gain `G0` (far from the band), the band gain `G1`
//! (at the center) and the bandwidth gain `GB` (at the band edges).

use super::band::FrequencyBand;
use crate::error::{AudioError, Result};
use aria_core::gain::db_to_linear;
use std::f64::consts::PI;

/// Center frequencies above this fraction of the sample rate are pulled down
const MAX_CENTER_RATIO: f64 = 0.45;

/// Upper bound for half the bandwidth angle, just below π/2 where tan diverges
const MAX_HALF_BANDWIDTH: f64 = 0.49 * PI;

/// Below this, a squared-gain difference counts as zero
const DEGENERATE_EPSILON: f64 = 1e-12;

/// Output magnitude below which samples are flushed to zero
const DENORMAL_THRESHOLD: f64 = 1e-15;

/// Filter history for one channel
#[derive(Debug, Clone, Copy, Default)]
struct ChannelState {
    x1: f64,
    x2: f64,
    y1: f64,
    y2: f64,
}

/// Normalized biquad coefficients (a0 = 1)
#[derive(Debug, Clone, Copy, PartialEq)]
struct Coefficients {
    b0: f64,
    b1: f64,
    b2: f64,
    a1: f64,
    a2: f64,
}

impl Coefficients {
    /// A frequency-independent gain stage
    fn gain(linear: f64) -> Self {
        Self {
            b0: linear,
            b1: 0.0,
            b2: 0.0,
            a1: 0.0,
            a2: 0.0,
        }
    }

    fn design(band: &FrequencyBand, sample_rate_hz: u32, g0: f64, gb: f64, g1: f64) -> Self {
        let numerator = (gb * gb - g0 * g0).abs();
        let denominator = (g1 * g1 - gb * gb).abs();

        // Edge gain equal to the reference: beta -> 0, response collapses to G0.
        // Edge gain equal to the band gain: beta -> inf, response collapses to G1.
        if numerator < DEGENERATE_EPSILON {
            return Self::gain(g0);
        }
        if denominator < DEGENERATE_EPSILON {
            return Self::gain(g1);
        }

        let fs = f64::from(sample_rate_hz);
        let center = f64::from(band.center_frequency_hz()).min(fs * MAX_CENTER_RATIO);
        let w0 = 2.0 * PI * center / fs;
        let half_bandwidth = (PI * band.bandwidth_hz() / fs).min(MAX_HALF_BANDWIDTH);

        let beta = half_bandwidth.tan() * (numerator / denominator).sqrt();
        let cos_w0 = w0.cos();
        let norm = 1.0 + beta;

        Self {
            b0: (g0 + g1 * beta) / norm,
            b1: -2.0 * g0 * cos_w0 / norm,
            b2: (g0 - g1 * beta) / norm,
            a1: -2.0 * cos_w0 / norm,
            a2: (1.0 - beta) / norm,
        }
    }
}

/// Recursive peaking filter for one band, with independent history per channel
#[derive(Debug, Clone)]
pub struct BandFilter {
    band: FrequencyBand,
    sample_rate_hz: u32,
    reference_gain_db: f64,
    coefficients: Coefficients,
    channels: Vec<ChannelState>,
}

impl BandFilter {
    /// Design a filter for `band` against `reference_gain_db`
    ///
    /// # Errors
    /// - [`AudioError::InvalidSampleRate`] / [`AudioError::InvalidChannelCount`]
    ///   when either is zero
    /// - [`AudioError::InvalidBandGain`] unless the bandwidth gain lies between
    ///   the reference gain and the band gain (either end inclusive)
    pub fn new(
        band: FrequencyBand,
        sample_rate_hz: u32,
        channel_count: u16,
        reference_gain_db: f64,
    ) -> Result<Self> {
        if sample_rate_hz == 0 {
            return Err(AudioError::InvalidSampleRate(sample_rate_hz));
        }
        if channel_count == 0 {
            return Err(AudioError::InvalidChannelCount(channel_count));
        }

        let g0 = db_to_linear(reference_gain_db);
        let gb = db_to_linear(band.bandwidth_gain_db());
        let g1 = db_to_linear(band.gain_db());

        let boost = g0 <= gb && gb <= g1;
        let cut = g0 >= gb && gb >= g1;
        if !(boost || cut) {
            return Err(AudioError::InvalidBandGain {
                center_frequency_hz: band.center_frequency_hz(),
                gain_db: band.gain_db(),
                bandwidth_gain_db: band.bandwidth_gain_db(),
                reference_gain_db,
            });
        }

        Ok(Self {
            coefficients: Coefficients::design(&band, sample_rate_hz, g0, gb, g1),
            band,
            sample_rate_hz,
            reference_gain_db,
            channels: vec![ChannelState::default(); usize::from(channel_count)],
        })
    }

    /// Filter one sample of `channel`
    ///
    /// # Panics
    /// If `channel` is not below the channel count the filter was built for.
    #[inline]
    pub fn process_sample(&mut self, sample: f32, channel: usize) -> f32 {
        if self.band.is_flat() {
            return sample;
        }

        let c = self.coefficients;
        let state = &mut self.channels[channel];
        let x = f64::from(sample);

        let mut y = c.b0 * x + c.b1 * state.x1 + c.b2 * state.x2 - c.a1 * state.y1 - c.a2 * state.y2;
        if y.abs() < DENORMAL_THRESHOLD {
            y = 0.0;
        }

        state.x2 = state.x1;
        state.x1 = x;
        state.y2 = state.y1;
        state.y1 = y;

        y as f32
    }

    /// Zero the history of every channel
    pub fn reset(&mut self) {
        self.channels.fill(ChannelState::default());
    }

    /// Band this filter was designed from
    pub fn band(&self) -> &FrequencyBand {
        &self.band
    }

    /// Sample rate in Hz
    pub fn sample_rate_hz(&self) -> u32 {
        self.sample_rate_hz
    }

    /// Number of channels with independent history
    pub fn channel_count(&self) -> u16 {
        // Constructed from a u16, so this never truncates
        self.channels.len() as u16
    }

    /// Gain far from the band, in dB
    pub fn reference_gain_db(&self) -> f64 {
        self.reference_gain_db
    }

    /// Magnitude of the designed transfer function at `frequency_hz`, in dB
    pub fn magnitude_db_at(&self, frequency_hz: f64) -> f64 {
        if self.band.is_flat() {
            return 0.0;
        }
        let c = self.coefficients;
        let w = 2.0 * PI * frequency_hz / f64::from(self.sample_rate_hz);
        let (cos1, sin1) = (w.cos(), w.sin());
        let (cos2, sin2) = ((2.0 * w).cos(), (2.0 * w).sin());

        let num_re = c.b0 + c.b1 * cos1 + c.b2 * cos2;
        let num_im = -(c.b1 * sin1 + c.b2 * sin2);
        let den_re = 1.0 + c.a1 * cos1 + c.a2 * cos2;
        let den_im = -(c.a1 * sin1 + c.a2 * sin2);

        let magnitude = ((num_re * num_re + num_im * num_im) / (den_re * den_re + den_im * den_im)).sqrt();
        aria_core::gain::linear_to_db(magnitude)
    }
}
