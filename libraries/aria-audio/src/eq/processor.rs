//! Equalizer stage for interleaved integer PCM

use super::chain::{BandReference, EqualizerChain};
use super::preset::Preset;
use crate::error::{AudioError, Result};
use aria_core::gain::db_to_linear;
use aria_core::{PcmFormat, SampleFormat, SampleRate};
use tracing::{debug, warn};

/// What an equalizer gave up when a new preset was installed
///
/// Handed back so the caller decides where it gets dropped.
#[derive(Debug)]
pub struct RetiredChain {
    /// Previously active preset
    pub preset: Preset,
    /// Previously active chain, if one was configured
    pub chain: Option<EqualizerChain>,
}

/// Runs an [`EqualizerChain`] over interleaved 16 or 24-bit PCM
///
/// The channel layout and sample rate come from the installed chain; the
/// sample depth comes from [`Self::configure`]. Every failed reconfiguration
/// leaves the previous preset and chain in place.
#[derive(Debug)]
pub struct EqualizerProcessor {
    preset: Preset,
    reference: BandReference,
    sample_format: Option<SampleFormat>,
    chain: Option<EqualizerChain>,
    enabled: bool,
    auto_headroom: bool,
}

impl EqualizerProcessor {
    /// Create an unconfigured, enabled processor
    pub fn new(preset: Preset, reference: BandReference) -> Self {
        Self {
            preset,
            reference,
            sample_format: None,
            chain: None,
            enabled: true,
            auto_headroom: false,
        }
    }

    /// Build a chain for `format` and make it active
    pub fn configure(&mut self, format: PcmFormat) -> Result<()> {
        let chain = match self
            .preset
            .build_chain(format.sample_rate.as_hz(), format.channels, self.reference)
        {
            Ok(chain) => chain,
            Err(err) => {
                warn!(%err, preset = self.preset.name(), "Equalizer configuration rejected");
                return Err(err);
            }
        };

        debug!(
            sample_rate = format.sample_rate.as_hz(),
            channels = format.channels,
            bits = format.sample_format.bits(),
            "Equalizer configured"
        );
        self.install_for_format(format.sample_format, chain);
        Ok(())
    }

    /// Switch presets, building the new chain for the current format first
    ///
    /// Before [`Self::configure`] the preset is only recorded.
    pub fn set_preset(&mut self, preset: Preset) -> Result<()> {
        if let Some(chain) = &self.chain {
            let next = preset
                .build_chain(chain.sample_rate_hz(), chain.channel_count(), self.reference)
                .map_err(|err| {
                    warn!(%err, preset = preset.name(), "Preset rejected");
                    err
                })?;
            self.install_preset(preset, next);
        } else {
            debug!(preset = preset.name(), "Preset recorded before configuration");
            self.preset = preset;
        }
        Ok(())
    }

    /// Change how band references are assigned, rebuilding the active chain
    pub fn set_reference(&mut self, reference: BandReference) -> Result<()> {
        if let Some(chain) = &self.chain {
            let next = self
                .preset
                .build_chain(chain.sample_rate_hz(), chain.channel_count(), reference)
                .map_err(|err| {
                    warn!(%err, ?reference, "Band reference rejected");
                    err
                })?;
            self.chain = Some(next);
        }
        self.reference = reference;
        Ok(())
    }

    /// Swap in a chain built elsewhere, keeping the current preset
    pub fn install_chain(&mut self, chain: EqualizerChain) -> Option<EqualizerChain> {
        self.chain.replace(chain)
    }

    /// Swap in a preset together with its already-built chain
    pub fn install_preset(&mut self, preset: Preset, chain: EqualizerChain) -> RetiredChain {
        debug!(preset = preset.name(), "Equalizer preset installed");
        RetiredChain {
            preset: std::mem::replace(&mut self.preset, preset),
            chain: self.chain.replace(chain),
        }
    }

    /// Swap in a chain built for a new stream format
    pub fn install_for_format(&mut self, sample_format: SampleFormat, chain: EqualizerChain) -> Option<EqualizerChain> {
        self.sample_format = Some(sample_format);
        self.chain.replace(chain)
    }

    /// Enable or bypass the equalizer
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Whether buffers are equalized
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Pre-attenuate by [`EqualizerChain::headroom_db`] before filtering
    pub fn set_auto_headroom(&mut self, auto_headroom: bool) {
        self.auto_headroom = auto_headroom;
    }

    /// Whether pre-attenuation is applied
    pub fn auto_headroom(&self) -> bool {
        self.auto_headroom
    }

    /// Clear filter history (seek or flush)
    pub fn flush(&mut self) {
        if let Some(chain) = &mut self.chain {
            chain.reset();
        }
    }

    /// Active preset
    pub fn preset(&self) -> &Preset {
        &self.preset
    }

    /// Reference assignment used for new chains
    pub fn reference(&self) -> BandReference {
        self.reference
    }

    /// Active chain
    pub fn chain(&self) -> Option<&EqualizerChain> {
        self.chain.as_ref()
    }

    /// Stream format currently configured
    pub fn format(&self) -> Option<PcmFormat> {
        let chain = self.chain.as_ref()?;
        Some(PcmFormat {
            sample_rate: SampleRate(chain.sample_rate_hz()),
            channels: chain.channel_count(),
            sample_format: self.sample_format?,
        })
    }

    /// Equalize `input` into `output`
    ///
    /// Both buffers must hold the same number of whole frames. Disabled
    /// processors copy the input unchanged.
    pub fn process_buffer(&mut self, input: &[u8], output: &mut [u8]) -> Result<()> {
        let (Some(format), Some(chain)) = (self.sample_format, self.chain.as_mut()) else {
            return Err(AudioError::NotConfigured);
        };
        let frame_bytes = usize::from(chain.channel_count()) * format.bytes_per_sample();
        if input.len() != output.len() || input.len() % frame_bytes != 0 {
            return Err(AudioError::BufferMismatch {
                input: input.len(),
                output: output.len(),
                frame_bytes,
            });
        }

        output.copy_from_slice(input);
        if self.enabled {
            Self::equalize(chain, format, self.auto_headroom, output);
        }
        Ok(())
    }

    /// In-place form of [`Self::process_buffer`]
    pub fn process_in_place(&mut self, buffer: &mut [u8]) -> Result<()> {
        let (Some(format), Some(chain)) = (self.sample_format, self.chain.as_mut()) else {
            return Err(AudioError::NotConfigured);
        };
        let frame_bytes = usize::from(chain.channel_count()) * format.bytes_per_sample();
        if buffer.len() % frame_bytes != 0 {
            return Err(AudioError::BufferMismatch {
                input: buffer.len(),
                output: buffer.len(),
                frame_bytes,
            });
        }

        if self.enabled {
            Self::equalize(chain, format, self.auto_headroom, buffer);
        }
        Ok(())
    }

    fn equalize(chain: &mut EqualizerChain, format: SampleFormat, auto_headroom: bool, buffer: &mut [u8]) {
        let width = format.bytes_per_sample();
        let channels = usize::from(chain.channel_count());
        let pre_gain = if auto_headroom {
            db_to_linear(-chain.headroom_db()) as f32
        } else {
            1.0
        };

        for frame in buffer.chunks_exact_mut(width * channels) {
            for (channel, sample) in frame.chunks_exact_mut(width).enumerate() {
                let x = format.decode(sample) as f32 * pre_gain;
                let y = chain.process_sample(x, channel);
                format.encode(format.quantize(f64::from(y)), sample);
            }
        }
    }
}

impl Default for EqualizerProcessor {
    fn default() -> Self {
        Self::new(Preset::default(), BandReference::default())
    }
}
