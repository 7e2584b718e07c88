//! Control-thread half of the pipeline

use super::{PipelineCommand, Retired};
use crate::eq::{BandReference, Preset};
use crate::error::{AudioError, Result};
use aria_core::PcmFormat;
use aria_loudness::{LoudnessProcessor, ReplayGainMode};
use crossbeam_channel::{Receiver, Sender, TrySendError};
use std::sync::Arc;
use tracing::{debug, warn};

/// Builds chains and queues them for the audio thread
///
/// Loudness settings bypass the queue: they are written straight into the
/// shared [`LoudnessProcessor`] and picked up on the next buffer.
pub struct PipelineController {
    commands: Sender<PipelineCommand>,
    retired: Receiver<Retired>,
    loudness: Arc<LoudnessProcessor>,
    format: PcmFormat,
    preset: Preset,
    reference: BandReference,
}

impl PipelineController {
    pub(super) fn new(
        commands: Sender<PipelineCommand>,
        retired: Receiver<Retired>,
        loudness: Arc<LoudnessProcessor>,
        format: PcmFormat,
        preset: Preset,
        reference: BandReference,
    ) -> Self {
        Self {
            commands,
            retired,
            loudness,
            format,
            preset,
            reference,
        }
    }

    /// Build a chain for `preset` and queue it
    ///
    /// Nothing is sent when the chain cannot be built; the audio thread keeps
    /// its current preset.
    pub fn select_preset(&mut self, preset: Preset) -> Result<()> {
        self.collect_retired();
        let chain = preset
            .build_chain(self.format.sample_rate.as_hz(), self.format.channels, self.reference)
            .map_err(|err| {
                warn!(%err, preset = preset.name(), "Preset rejected");
                err
            })?;

        self.send(PipelineCommand::InstallPreset {
            preset: preset.clone(),
            chain,
        })?;
        debug!(preset = preset.name(), "Preset queued");
        self.preset = preset;
        Ok(())
    }

    /// Rebuild the current preset for a new stream format and queue it
    pub fn reconfigure(&mut self, format: PcmFormat) -> Result<()> {
        self.collect_retired();
        self.loudness.configure(format.sample_format.bits())?;
        let chain = self
            .preset
            .build_chain(format.sample_rate.as_hz(), format.channels, self.reference)?;

        self.send(PipelineCommand::Reconfigure {
            sample_format: format.sample_format,
            chain,
        })?;
        debug!(
            sample_rate = format.sample_rate.as_hz(),
            channels = format.channels,
            "Format change queued"
        );
        self.format = format;
        Ok(())
    }

    /// Rebuild the current preset against a different band reference
    pub fn set_reference(&mut self, reference: BandReference) -> Result<()> {
        self.collect_retired();
        let chain = self.preset.build_chain(
            self.format.sample_rate.as_hz(),
            self.format.channels,
            reference,
        )?;
        self.send(PipelineCommand::InstallChain(chain))?;
        self.reference = reference;
        Ok(())
    }

    /// Enable or bypass the equalizer
    pub fn set_equalizer_enabled(&self, enabled: bool) -> Result<()> {
        self.send(PipelineCommand::SetEqualizerEnabled(enabled))
    }

    /// Toggle headroom pre-attenuation
    pub fn set_auto_headroom(&self, auto_headroom: bool) -> Result<()> {
        self.send(PipelineCommand::SetAutoHeadroom(auto_headroom))
    }

    /// Clear filter history, e.g. after a seek
    pub fn flush(&self) -> Result<()> {
        self.send(PipelineCommand::Flush)
    }

    /// Set the ReplayGain mode
    pub fn set_replay_gain_mode(&self, mode: ReplayGainMode) {
        self.loudness.set_mode(mode);
    }

    /// Set (or clear) the track gain
    pub fn set_track_gain(&self, gain_db: Option<f64>) {
        self.loudness.set_track_gain(gain_db);
    }

    /// Set (or clear) the album gain
    pub fn set_album_gain(&self, gain_db: Option<f64>) {
        self.loudness.set_album_gain(gain_db);
    }

    /// Set the pre-amp gain
    pub fn set_pre_amp_gain(&self, gain_db: f64) {
        self.loudness.set_pre_amp_gain(gain_db);
    }

    /// Shared loudness processor
    pub fn loudness(&self) -> &Arc<LoudnessProcessor> {
        &self.loudness
    }

    /// Most recently selected preset
    pub fn preset(&self) -> &Preset {
        &self.preset
    }

    /// Format chains are currently built for
    pub fn format(&self) -> PcmFormat {
        self.format
    }

    /// Drop everything the audio thread has handed back
    ///
    /// Returns how many retired items were released.
    pub fn collect_retired(&self) -> usize {
        self.retired.try_iter().count()
    }

    fn send(&self, command: PipelineCommand) -> Result<()> {
        self.commands.try_send(command).map_err(|err| match err {
            TrySendError::Full(_) => {
                warn!("Pipeline command queue full");
                AudioError::CommandQueueFull
            }
            TrySendError::Disconnected(_) => AudioError::PipelineClosed,
        })
    }
}

impl std::fmt::Debug for PipelineController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineController")
            .field("format", &self.format)
            .field("preset", &self.preset.name())
            .field("reference", &self.reference)
            .field("queued", &self.commands.len())
            .finish_non_exhaustive()
    }
}
