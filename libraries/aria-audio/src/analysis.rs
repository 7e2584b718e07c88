//! Frequency response analysis
//!
//! Measures what a chain does to each frequency by feeding it a unit impulse
//! and taking the spectrum of the result. Runs off the audio thread, on a
//! private copy of the chain.

use crate::eq::{BandReference, EqualizerChain, Preset};
use crate::error::{AudioError, Result};
use aria_core::gain::db_to_linear;
use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Default FFT length
pub const DEFAULT_FFT_SIZE: usize = 16_384;

/// Sample rate used when previewing a preset without a stream
pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;

/// Floor for reported magnitudes (dB)
pub const MIN_MAGNITUDE_DB: f64 = -200.0;

/// One bin of a frequency response
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ResponsePoint {
    /// Bin frequency in Hz
    pub frequency_hz: f64,
    /// Magnitude in dB
    pub magnitude_db: f64,
}

/// Magnitude response from DC up to (but excluding) Nyquist
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrequencyResponse {
    sample_rate_hz: u32,
    points: Vec<ResponsePoint>,
}

impl FrequencyResponse {
    /// Points in ascending frequency order
    pub fn points(&self) -> &[ResponsePoint] {
        &self.points
    }

    /// Number of bins
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True when there are no bins
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Sample rate the response was measured at
    pub fn sample_rate_hz(&self) -> u32 {
        self.sample_rate_hz
    }

    /// Magnitude of the bin nearest to `frequency_hz`
    pub fn magnitude_at(&self, frequency_hz: f64) -> Option<f64> {
        let step = self.points.get(1)?.frequency_hz;
        let index = (frequency_hz / step).round();
        if !index.is_finite() || index < 0.0 {
            return None;
        }
        let index = (index as usize).min(self.points.len() - 1);
        Some(self.points[index].magnitude_db)
    }

    /// Loudest bin
    pub fn peak(&self) -> Option<ResponsePoint> {
        self.points
            .iter()
            .copied()
            .max_by(|a, b| a.magnitude_db.total_cmp(&b.magnitude_db))
    }
}

/// Computes frequency responses with a pre-planned forward FFT
#[derive(Clone)]
pub struct FrequencyResponseAnalyzer {
    fft: Arc<dyn Fft<f32>>,
    fft_size: usize,
    reference: BandReference,
}

impl fmt::Debug for FrequencyResponseAnalyzer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrequencyResponseAnalyzer")
            .field("fft_size", &self.fft_size)
            .field("reference", &self.reference)
            .finish_non_exhaustive()
    }
}

impl FrequencyResponseAnalyzer {
    /// Plan an FFT of `fft_size` points
    ///
    /// # Errors
    /// [`AudioError::InvalidFftSize`] unless `fft_size` is even and at least 2.
    pub fn new(fft_size: usize) -> Result<Self> {
        if fft_size < 2 || fft_size % 2 != 0 {
            return Err(AudioError::InvalidFftSize(fft_size));
        }
        let fft = FftPlanner::<f32>::new().plan_fft_forward(fft_size);
        Ok(Self {
            fft,
            fft_size,
            reference: BandReference::default(),
        })
    }

    /// Reference assignment used by [`Self::analyze_preset`]
    #[must_use]
    pub fn with_reference(mut self, reference: BandReference) -> Self {
        self.reference = reference;
        self
    }

    /// FFT length
    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    /// Response of `chain` preceded by a flat gain of `effective_gain_db`
    ///
    /// `chain` itself is not touched; a reset copy is measured on channel 0.
    pub fn analyze(&self, chain: &EqualizerChain, effective_gain_db: f64) -> FrequencyResponse {
        let mut probe = chain.clone();
        probe.reset();

        let gain = db_to_linear(effective_gain_db) as f32;
        let mut spectrum: Vec<Complex<f32>> = (0..self.fft_size)
            .map(|i| {
                let impulse = if i == 0 { gain } else { 0.0 };
                Complex::new(probe.process_sample(impulse, 0), 0.0)
            })
            .collect();

        self.fft.process(&mut spectrum);

        let half = self.fft_size / 2;
        let nyquist = f64::from(chain.sample_rate_hz()) / 2.0;
        let points = spectrum[..half]
            .iter()
            .enumerate()
            .map(|(bin, value)| {
                let magnitude_db = 20.0 * f64::from(value.norm()).log10();
                ResponsePoint {
                    frequency_hz: bin as f64 / half as f64 * nyquist,
                    magnitude_db: magnitude_db.max(MIN_MAGNITUDE_DB),
                }
            })
            .collect();

        FrequencyResponse {
            sample_rate_hz: chain.sample_rate_hz(),
            points,
        }
    }

    /// Build a mono chain for `preset` and measure it
    pub fn analyze_preset(
        &self,
        preset: &Preset,
        sample_rate_hz: u32,
        effective_gain_db: f64,
    ) -> Result<FrequencyResponse> {
        let chain = preset.build_chain(sample_rate_hz, 1, self.reference)?;
        debug!(preset = preset.name(), sample_rate_hz, fft_size = self.fft_size, "Analyzing preset");
        Ok(self.analyze(&chain, effective_gain_db))
    }
}
