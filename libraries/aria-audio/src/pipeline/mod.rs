//! Render pipeline: loudness normalization followed by equalization
//!
//! The pipeline is split in two halves connected by bounded channels:
//!
//! - [`PipelineController`] lives on the control thread. It builds every
//!   chain, so construction errors surface there, synchronously.
//! - [`RenderPipeline`] lives on the audio thread. It picks up finished
//!   chains with `try_recv` before each buffer and never blocks.
//!
//! Chains replaced on the audio thread travel back to the controller, which
//! drops them on its next call.
//!
//! ```rust
//! use aria_audio::eq::{Preset, PresetId};
//! use aria_audio::{pipeline, DspSettings};
//! use aria_core::PcmFormat;
//!
//! let settings = DspSettings {
//!     band_reference: aria_audio::eq::BandReference::Unity,
//!     ..DspSettings::default()
//! };
//! let (mut controller, mut render) = pipeline::channel(PcmFormat::cd_quality(), &settings)?;
//!
//! controller.select_preset(Preset::builtin(PresetId::VocalBoost))?;
//!
//! let input = [0u8; 16];
//! let mut output = [0u8; 16];
//! render.process(&input, &mut output)?;
//! assert_eq!(render.equalizer().preset().name(), "Vocal Boost");
//! # Ok::<(), aria_audio::AudioError>(())
//! ```

mod controller;
mod render;

pub use controller::PipelineController;
pub use render::RenderPipeline;

use crate::eq::{EqualizerChain, EqualizerProcessor, Preset, RetiredChain};
use crate::error::Result;
use crate::settings::DspSettings;
use aria_core::{PcmFormat, SampleFormat};
use aria_loudness::LoudnessProcessor;
use crossbeam_channel::bounded;
use std::sync::Arc;
use tracing::info;

/// Commands that can be queued before the audio thread catches up
const COMMAND_CAPACITY: usize = 32;

/// Retired chains held for the controller before they are dropped in place
const RETIRED_CAPACITY: usize = 32;

/// Work handed to the audio thread
enum PipelineCommand {
    /// New preset with its chain
    InstallPreset { preset: Preset, chain: EqualizerChain },
    /// Same preset, rebuilt chain
    InstallChain(EqualizerChain),
    /// New stream format with a chain built for it
    Reconfigure {
        sample_format: SampleFormat,
        chain: EqualizerChain,
    },
    /// Enable or bypass the equalizer
    SetEqualizerEnabled(bool),
    /// Toggle headroom pre-attenuation
    SetAutoHeadroom(bool),
    /// Clear filter history
    Flush,
}

/// Whatever the audio thread replaced
enum Retired {
    Preset(RetiredChain),
    Chain(EqualizerChain),
}

/// Create a connected controller and render pipeline for `format`
///
/// Settings are validated and the initial chain is built before anything is
/// returned.
pub fn channel(format: PcmFormat, settings: &DspSettings) -> Result<(PipelineController, RenderPipeline)> {
    settings.validate()?;

    let loudness = Arc::new(LoudnessProcessor::new(settings.replay_gain_mode));
    loudness.set_pre_amp_gain(settings.pre_amp_gain_db);
    loudness.configure(format.sample_format.bits())?;

    let preset = settings.preset();
    let mut equalizer = EqualizerProcessor::new(preset.clone(), settings.band_reference);
    equalizer.set_enabled(settings.equalizer_enabled);
    equalizer.set_auto_headroom(settings.auto_headroom);
    equalizer.configure(format)?;

    let (command_tx, command_rx) = bounded::<PipelineCommand>(COMMAND_CAPACITY);
    let (retired_tx, retired_rx) = bounded::<Retired>(RETIRED_CAPACITY);

    info!(
        preset = preset.name(),
        sample_rate = format.sample_rate.as_hz(),
        channels = format.channels,
        bits = format.sample_format.bits(),
        "DSP pipeline created"
    );

    let controller = PipelineController::new(
        command_tx,
        retired_rx,
        Arc::clone(&loudness),
        format,
        preset,
        settings.band_reference,
    );
    let render = RenderPipeline::new(command_rx, retired_tx, loudness, equalizer, format.sample_format);
    Ok((controller, render))
}
