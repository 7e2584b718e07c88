//! Audio-thread half of the pipeline

use super::{PipelineCommand, Retired};
use crate::eq::EqualizerProcessor;
use crate::error::{AudioError, Result};
use aria_core::SampleFormat;
use aria_loudness::LoudnessProcessor;
use crossbeam_channel::{Receiver, Sender};
use std::sync::Arc;

/// Processes PCM buffers on the audio thread
///
/// # Real-Time Safety
/// - Commands are polled with `try_recv`; nothing here blocks
/// - Chains arrive fully built; nothing is designed or allocated per buffer
/// - Replaced chains are sent back to the controller; they are only dropped
///   here when the return queue is full
pub struct RenderPipeline {
    commands: Receiver<PipelineCommand>,
    retired: Sender<Retired>,
    loudness: Arc<LoudnessProcessor>,
    equalizer: EqualizerProcessor,
    sample_format: SampleFormat,
}

impl RenderPipeline {
    pub(super) fn new(
        commands: Receiver<PipelineCommand>,
        retired: Sender<Retired>,
        loudness: Arc<LoudnessProcessor>,
        equalizer: EqualizerProcessor,
        sample_format: SampleFormat,
    ) -> Self {
        Self {
            commands,
            retired,
            loudness,
            equalizer,
            sample_format,
        }
    }

    /// Apply pending commands, then loudness, then the equalizer
    ///
    /// `input` and `output` must hold the same number of whole frames in the
    /// current format.
    pub fn process(&mut self, input: &[u8], output: &mut [u8]) -> Result<()> {
        self.apply_pending();
        self.check_frames(input.len(), output.len())?;

        self.loudness.process_buffer(input, output, self.sample_format)?;
        self.equalizer.process_in_place(output)
    }

    /// In-place form of [`Self::process`]
    pub fn process_in_place(&mut self, buffer: &mut [u8]) -> Result<()> {
        self.apply_pending();
        self.check_frames(buffer.len(), buffer.len())?;

        self.loudness.process_in_place(buffer, self.sample_format)?;
        self.equalizer.process_in_place(buffer)
    }

    /// Apply every queued command without waiting for more
    ///
    /// Returns how many commands were applied.
    pub fn apply_pending(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(command) = self.commands.try_recv() {
            self.apply(command);
            applied += 1;
        }
        applied
    }

    fn apply(&mut self, command: PipelineCommand) {
        match command {
            PipelineCommand::InstallPreset { preset, chain } => {
                let retired = self.equalizer.install_preset(preset, chain);
                self.retire(Retired::Preset(retired));
            }
            PipelineCommand::InstallChain(chain) => {
                if let Some(old) = self.equalizer.install_chain(chain) {
                    self.retire(Retired::Chain(old));
                }
            }
            PipelineCommand::Reconfigure { sample_format, chain } => {
                self.sample_format = sample_format;
                if let Some(old) = self.equalizer.install_for_format(sample_format, chain) {
                    self.retire(Retired::Chain(old));
                }
            }
            PipelineCommand::SetEqualizerEnabled(enabled) => self.equalizer.set_enabled(enabled),
            PipelineCommand::SetAutoHeadroom(auto_headroom) => self.equalizer.set_auto_headroom(auto_headroom),
            PipelineCommand::Flush => self.equalizer.flush(),
        }
    }

    fn retire(&self, retired: Retired) {
        // A full queue means the controller is not collecting; drop in place
        let _ = self.retired.try_send(retired);
    }

    fn check_frames(&self, input: usize, output: usize) -> Result<()> {
        let frame_bytes = self
            .equalizer
            .format()
            .map_or(self.sample_format.bytes_per_sample(), |format| format.frame_bytes());
        if input != output || input % frame_bytes != 0 {
            return Err(AudioError::BufferMismatch {
                input,
                output,
                frame_bytes,
            });
        }
        Ok(())
    }

    /// Equalizer stage
    pub fn equalizer(&self) -> &EqualizerProcessor {
        &self.equalizer
    }

    /// Sample depth buffers are decoded with
    pub fn sample_format(&self) -> SampleFormat {
        self.sample_format
    }
}

impl std::fmt::Debug for RenderPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderPipeline")
            .field("equalizer", &self.equalizer)
            .field("sample_format", &self.sample_format)
            .field("pending", &self.commands.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use crate::eq::{BandReference, Preset, PresetId};
    use crate::error::AudioError;
    use crate::pipeline;
    use crate::settings::DspSettings;
    use aria_core::PcmFormat;
    use aria_loudness::ReplayGainMode;

    fn pcm16(samples: &[i16]) -> Vec<u8> {
        samples.iter().flat_map(|s| s.to_le_bytes()).collect()
    }

    fn read_pcm16(bytes: &[u8]) -> Vec<i16> {
        bytes
            .chunks_exact(2)
            .map(|b| i16::from_le_bytes([b[0], b[1]]))
            .collect()
    }

    fn unity_settings() -> DspSettings {
        DspSettings {
            band_reference: BandReference::Unity,
            ..DspSettings::default()
        }
    }

    #[test]
    fn flat_pipeline_is_bit_exact() {
        let (_controller, mut render) = pipeline::channel(PcmFormat::cd_quality(), &DspSettings::default()).unwrap();
        let input = pcm16(&[0, 16_384, -16_384, 32_767]);
        let mut output = vec![0u8; input.len()];

        render.process(&input, &mut output).unwrap();
        assert_eq!(output, input);
    }

    #[test]
    fn loudness_runs_before_equalizer() {
        let (controller, mut render) = pipeline::channel(PcmFormat::cd_quality(), &DspSettings::default()).unwrap();
        controller.set_replay_gain_mode(ReplayGainMode::Track);
        controller.set_track_gain(Some(-6.0));

        let input = pcm16(&[10_000, -10_000]);
        let mut output = vec![0u8; input.len()];
        render.process(&input, &mut output).unwrap();
        assert_eq!(read_pcm16(&output), [5_011, -5_011]);
    }

    #[test]
    fn preset_reaches_audio_thread_on_next_buffer() {
        let (mut controller, mut render) = pipeline::channel(PcmFormat::cd_quality(), &unity_settings()).unwrap();
        controller.select_preset(Preset::builtin(PresetId::BassBoost)).unwrap();
        assert_eq!(render.equalizer().preset().name(), "Flat");

        let mut buffer = pcm16(&[100, 100]);
        render.process_in_place(&mut buffer).unwrap();
        assert_eq!(render.equalizer().preset().name(), "Bass Boost");

        // The replaced chain came back to the controller
        assert_eq!(controller.collect_retired(), 1);
    }

    #[test]
    fn rejected_preset_sends_nothing() {
        let (mut controller, mut render) = pipeline::channel(PcmFormat::cd_quality(), &DspSettings::default()).unwrap();
        let err = controller.select_preset(Preset::builtin(PresetId::BassBoost)).unwrap_err();
        assert!(matches!(err, AudioError::InvalidBandGain { .. }));

        assert_eq!(render.apply_pending(), 0);
        assert_eq!(render.equalizer().preset().name(), "Flat");
        assert_eq!(controller.preset().name(), "Flat");
    }

    #[test]
    fn reconfigure_switches_sample_depth() {
        let (mut controller, mut render) = pipeline::channel(PcmFormat::cd_quality(), &unity_settings()).unwrap();
        controller.reconfigure(PcmFormat::new(96_000, 1, 24).unwrap()).unwrap();

        let mut buffer = vec![0u8; 9];
        render.process_in_place(&mut buffer).unwrap();
        let format = render.equalizer().format().unwrap();
        assert_eq!(format.sample_rate.as_hz(), 96_000);
        assert_eq!(format.channels, 1);
        assert_eq!(render.sample_format().bits(), 24);
    }

    #[test]
    fn unsupported_depth_is_a_format_error() {
        let (mut controller, _render) = pipeline::channel(PcmFormat::cd_quality(), &DspSettings::default()).unwrap();
        let err = PcmFormat::new(44_100, 2, 32).map_err(AudioError::from).unwrap_err();
        assert!(err.is_format_error());
        // The controller keeps its format
        controller.reconfigure(PcmFormat::cd_quality()).unwrap();
        assert_eq!(controller.format(), PcmFormat::cd_quality());
    }

    #[test]
    fn full_queue_is_reported() {
        let (controller, _render) = pipeline::channel(PcmFormat::cd_quality(), &DspSettings::default()).unwrap();
        let mut result = Ok(());
        for _ in 0..=pipeline::COMMAND_CAPACITY {
            result = controller.flush();
        }
        assert_eq!(result, Err(AudioError::CommandQueueFull));
    }

    #[test]
    fn dropped_render_side_closes_pipeline() {
        let (controller, render) = pipeline::channel(PcmFormat::cd_quality(), &DspSettings::default()).unwrap();
        drop(render);
        assert_eq!(controller.set_equalizer_enabled(false), Err(AudioError::PipelineClosed));
    }

    #[test]
    fn partial_frame_is_rejected_before_processing() {
        let (_controller, mut render) = pipeline::channel(PcmFormat::cd_quality(), &DspSettings::default()).unwrap();
        let mut output = [0u8; 6];
        assert!(matches!(
            render.process(&[0u8; 6], &mut output),
            Err(AudioError::BufferMismatch { frame_bytes: 4, .. })
        ));
    }
}
