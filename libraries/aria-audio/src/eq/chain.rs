//! Ten-band equalizer chain

use super::band::FrequencyBand;
use super::filter::BandFilter;
use crate::error::{AudioError, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Center frequencies of the ten bands (Hz)
pub const EQUALIZER_FREQUENCIES: [u32; BAND_COUNT] = [32, 63, 125, 250, 500, 1000, 2000, 4000, 8000, 16000];

/// Number of bands in every chain
pub const BAND_COUNT: usize = 10;

/// Boosts above this many dB trigger pre-attenuation
const HEADROOM_THRESHOLD_DB: f64 = 3.0;

/// Gain each band filter is designed against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BandReference {
    /// Band *i* uses the nominal gain of band *i − 1*; the first band uses 0 dB
    ///
    /// Rejects gain tables whose neighbouring bands move away from zero in
    /// opposite directions, e.g. a bass boost that tapers off.
    #[default]
    Chained,

    /// Every band is designed against 0 dB
    Unity,
}

impl BandReference {
    /// Reference gain for the band at `index`
    fn gain_db(self, bands: &[FrequencyBand], index: usize) -> f64 {
        match self {
            Self::Unity => 0.0,
            Self::Chained => index
                .checked_sub(1)
                .and_then(|previous| bands.get(previous))
                .map_or(0.0, FrequencyBand::gain_db),
        }
    }
}

/// Ten band filters applied in series
#[derive(Debug, Clone)]
pub struct EqualizerChain {
    filters: Vec<BandFilter>,
    reference: BandReference,
    sample_rate_hz: u32,
    channel_count: u16,
}

impl EqualizerChain {
    /// Build a chain with [`BandReference::Chained`] references
    pub fn new(bands: &[FrequencyBand], sample_rate_hz: u32, channel_count: u16) -> Result<Self> {
        Self::with_reference(bands, sample_rate_hz, channel_count, BandReference::Chained)
    }

    /// Build a chain, designing each band against `reference`
    ///
    /// Either every filter is built or none is.
    ///
    /// # Errors
    /// - [`AudioError::InvalidBandCount`] unless exactly ten bands are given
    /// - [`AudioError::UnexpectedBandFrequency`] when a band is not at its slot's frequency
    /// - any [`BandFilter::new`] error
    pub fn with_reference(
        bands: &[FrequencyBand],
        sample_rate_hz: u32,
        channel_count: u16,
        reference: BandReference,
    ) -> Result<Self> {
        if bands.len() != BAND_COUNT {
            return Err(AudioError::InvalidBandCount(bands.len()));
        }

        for (index, (band, &expected)) in bands.iter().zip(EQUALIZER_FREQUENCIES.iter()).enumerate() {
            if band.center_frequency_hz() != expected {
                return Err(AudioError::UnexpectedBandFrequency {
                    index,
                    expected,
                    found: band.center_frequency_hz(),
                });
            }
        }

        let filters = bands
            .iter()
            .enumerate()
            .map(|(index, band)| {
                BandFilter::new(*band, sample_rate_hz, channel_count, reference.gain_db(bands, index))
            })
            .collect::<Result<Vec<_>>>()?;

        debug!(sample_rate_hz, channel_count, ?reference, "Built equalizer chain");

        Ok(Self {
            filters,
            reference,
            sample_rate_hz,
            channel_count,
        })
    }

    /// A chain with every band at 0 dB
    pub fn flat(sample_rate_hz: u32, channel_count: u16) -> Result<Self> {
        let bands = EQUALIZER_FREQUENCIES.map(|frequency| FrequencyBand::new(frequency, 0.0));
        Self::new(&bands, sample_rate_hz, channel_count)
    }

    /// Run one sample of `channel` through all ten bands, lowest first
    ///
    /// # Panics
    /// If `channel` is not below [`Self::channel_count`].
    #[inline]
    pub fn process_sample(&mut self, sample: f32, channel: usize) -> f32 {
        self.filters
            .iter_mut()
            .fold(sample, |x, filter| filter.process_sample(x, channel))
    }

    /// Process an interleaved buffer in place
    ///
    /// A trailing partial frame is processed as far as it goes.
    pub fn process_interleaved(&mut self, buffer: &mut [f32]) {
        let channels = usize::from(self.channel_count);
        for frame in buffer.chunks_mut(channels) {
            for (channel, sample) in frame.iter_mut().enumerate() {
                *sample = self.process_sample(*sample, channel);
            }
        }
    }

    /// Zero the history of every band
    pub fn reset(&mut self) {
        for filter in &mut self.filters {
            filter.reset();
        }
    }

    /// Pre-attenuation in dB that keeps strong boosts from clipping
    ///
    /// The largest band gain when it exceeds 3 dB, otherwise zero.
    pub fn headroom_db(&self) -> f64 {
        let max_gain = self.gains().into_iter().fold(0.0, f64::max);
        if max_gain > HEADROOM_THRESHOLD_DB {
            max_gain
        } else {
            0.0
        }
    }

    /// Nominal gain of every band in dB
    pub fn gains(&self) -> [f64; BAND_COUNT] {
        let mut gains = [0.0; BAND_COUNT];
        for (gain, filter) in gains.iter_mut().zip(&self.filters) {
            *gain = filter.band().gain_db();
        }
        gains
    }

    /// Bands in frequency order
    pub fn bands(&self) -> impl Iterator<Item = &FrequencyBand> {
        self.filters.iter().map(BandFilter::band)
    }

    /// How references were assigned
    pub fn reference(&self) -> BandReference {
        self.reference
    }

    /// Sample rate in Hz
    pub fn sample_rate_hz(&self) -> u32 {
        self.sample_rate_hz
    }

    /// Number of channels
    pub fn channel_count(&self) -> u16 {
        self.channel_count
    }

    /// True when every band is flat
    pub fn is_flat(&self) -> bool {
        self.bands().all(FrequencyBand::is_flat)
    }
}
