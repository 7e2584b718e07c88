//! Loudness normalization for playback
//!
//! Applies pre-amp plus the selected ReplayGain value to integer PCM.

use crate::{AtomicGain, LoudnessError, ReplayGainMode, Result, MAX_PREAMP_DB, MIN_PREAMP_DB};
use aria_core::gain::db_to_linear;
use aria_core::SampleFormat;
use std::sync::atomic::{AtomicU8, Ordering};
use tracing::{debug, warn};

/// Loudness processor for playback
///
/// All setters take `&self`: the processor is shared (typically in an `Arc`)
/// between the control thread that writes gains and the audio thread that
/// processes buffers. Each field is its own atomic; there is no lock spanning
/// fields, so during a track change a buffer may combine the new track gain
/// with the old album gain. That staleness is bounded to one buffer because
/// the gain is read once at the start of each buffer.
///
/// # Example
///
/// ```rust
/// use aria_loudness::{LoudnessProcessor, ReplayGainMode};
///
/// let processor = LoudnessProcessor::new(ReplayGainMode::Album);
/// processor.set_track_gain(Some(-4.0));
/// processor.set_pre_amp_gain(1.5);
///
/// // No album gain measured, so album mode falls back to the track gain
/// assert_eq!(processor.effective_gain_db(), -2.5);
/// ```
#[derive(Debug)]
pub struct LoudnessProcessor {
    mode: AtomicU8,
    track_gain_db: AtomicGain,
    album_gain_db: AtomicGain,
    pre_amp_gain_db: AtomicGain,
}

impl LoudnessProcessor {
    /// Create a processor with no measured gains and 0 dB pre-amp
    pub fn new(mode: ReplayGainMode) -> Self {
        Self {
            mode: AtomicU8::new(mode.as_u8()),
            track_gain_db: AtomicGain::unset(),
            album_gain_db: AtomicGain::unset(),
            pre_amp_gain_db: AtomicGain::new(Some(0.0)),
        }
    }

    /// Validate the stream's sample depth
    ///
    /// Anything other than 16 or 24 bit signed PCM is refused with a format
    /// error; the caller is expected to bypass this stage for that stream.
    pub fn configure(&self, bits_per_sample: u16) -> Result<SampleFormat> {
        match SampleFormat::from_bits(bits_per_sample) {
            Ok(format) => {
                debug!(bits_per_sample, "Loudness processor configured");
                Ok(format)
            }
            Err(_) => {
                warn!(bits_per_sample, "Loudness processor bypassed for unsupported format");
                Err(LoudnessError::UnsupportedFormat(bits_per_sample))
            }
        }
    }

    /// Set the normalization mode
    pub fn set_mode(&self, mode: ReplayGainMode) {
        self.mode.store(mode.as_u8(), Ordering::Release);
    }

    /// Get the current normalization mode
    pub fn mode(&self) -> ReplayGainMode {
        ReplayGainMode::from_u8(self.mode.load(Ordering::Acquire))
    }

    /// Set (or clear) the current track's ReplayGain
    pub fn set_track_gain(&self, gain_db: Option<f64>) {
        self.track_gain_db.store(gain_db);
    }

    /// Current track gain, if measured
    pub fn track_gain(&self) -> Option<f64> {
        self.track_gain_db.load()
    }

    /// Set (or clear) the current album's ReplayGain
    pub fn set_album_gain(&self, gain_db: Option<f64>) {
        self.album_gain_db.store(gain_db);
    }

    /// Current album gain, if measured
    pub fn album_gain(&self) -> Option<f64> {
        self.album_gain_db.load()
    }

    /// Set pre-amplification gain in dB, clamped to -12..+12
    pub fn set_pre_amp_gain(&self, gain_db: f64) {
        if !gain_db.is_finite() {
            warn!(gain_db, "Ignoring non-finite pre-amp gain");
            return;
        }
        self.pre_amp_gain_db
            .store(Some(gain_db.clamp(MIN_PREAMP_DB, MAX_PREAMP_DB)));
    }

    /// Get the current pre-amp gain in dB
    pub fn pre_amp_gain(&self) -> f64 {
        self.pre_amp_gain_db.load().unwrap_or(0.0)
    }

    /// Clear both measured gains (for a new track with no tags)
    pub fn clear_gains(&self) {
        self.track_gain_db.store(None);
        self.album_gain_db.store(None);
    }

    /// Pre-amp plus the gain selected by the current mode
    pub fn effective_gain_db(&self) -> f64 {
        let selected = self
            .mode()
            .select(self.track_gain_db.load(), self.album_gain_db.load());
        self.pre_amp_gain() + selected
    }

    /// Apply the effective gain from `input` into `output`
    ///
    /// Both buffers hold interleaved little-endian samples of `format` and must
    /// have the same length. With an effective gain of exactly 0 dB the input
    /// is copied byte for byte.
    pub fn process_buffer(&self, input: &[u8], output: &mut [u8], format: SampleFormat) -> Result<()> {
        let width = format.bytes_per_sample();
        if input.len() != output.len() || input.len() % width != 0 {
            return Err(LoudnessError::BufferMismatch {
                input: input.len(),
                output: output.len(),
                format,
            });
        }

        let gain_db = self.effective_gain_db();
        if gain_db == 0.0 {
            output.copy_from_slice(input);
            return Ok(());
        }

        let delta = db_to_linear(gain_db);
        for (src, dst) in input.chunks_exact(width).zip(output.chunks_exact_mut(width)) {
            let sample = f64::from(format.decode(src));
            format.encode(format.quantize(sample * delta), dst);
        }
        Ok(())
    }

    /// In-place form of [`Self::process_buffer`]
    pub fn process_in_place(&self, buffer: &mut [u8], format: SampleFormat) -> Result<()> {
        let width = format.bytes_per_sample();
        if buffer.len() % width != 0 {
            return Err(LoudnessError::BufferMismatch {
                input: buffer.len(),
                output: buffer.len(),
                format,
            });
        }

        let gain_db = self.effective_gain_db();
        if gain_db == 0.0 {
            return Ok(());
        }

        let delta = db_to_linear(gain_db);
        for chunk in buffer.chunks_exact_mut(width) {
            let sample = f64::from(format.decode(chunk));
            format.encode(format.quantize(sample * delta), chunk);
        }
        Ok(())
    }
}

impl Default for LoudnessProcessor {
    fn default() -> Self {
        Self::new(ReplayGainMode::default())
    }
}
