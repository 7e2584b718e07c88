//! End-to-end tests for the equalizer, analyzer and render pipeline
//!
//! Covers:
//! - Flat passthrough through the whole pipeline
//! - Gain-ordering rules for boosts and cuts
//! - Channel independence and reset determinism
//! - Frequency response of a single boosted band
//! - Preset swaps across threads

use aria_audio::analysis::{FrequencyResponseAnalyzer, DEFAULT_FFT_SIZE, DEFAULT_SAMPLE_RATE};
use aria_audio::eq::{
    BandFilter, BandReference, EqualizerChain, FrequencyBand, Preset, PresetId, EQUALIZER_FREQUENCIES,
};
use aria_audio::{pipeline, AudioError, DspSettings};
use aria_core::{ErrorKind, PcmFormat};
use aria_loudness::ReplayGainMode;
use std::f32::consts::PI;
use std::thread;

// ========== Helper Functions ==========

fn sine(freq: f32, sample_rate: u32, len: usize) -> Vec<f32> {
    (0..len)
        .map(|i| (2.0 * PI * freq * i as f32 / sample_rate as f32).sin())
        .collect()
}

fn pcm16(samples: &[i16]) -> Vec<u8> {
    samples.iter().flat_map(|s| s.to_le_bytes()).collect()
}

fn single_band(index: usize, gain_db: f64) -> Vec<FrequencyBand> {
    EQUALIZER_FREQUENCIES
        .iter()
        .enumerate()
        .map(|(i, &f)| FrequencyBand::new(f, if i == index { gain_db } else { 0.0 }))
        .collect()
}

// ========== Scenarios ==========

#[test]
fn scenario_flat_preset_with_unset_gains_is_identity() {
    let settings = DspSettings {
        replay_gain_mode: ReplayGainMode::Track,
        ..DspSettings::default()
    };
    let (_controller, mut render) = pipeline::channel(PcmFormat::cd_quality(), &settings).unwrap();

    let input = pcm16(&[0, 16_384, -16_384, 32_767]);
    let mut output = vec![0u8; input.len()];
    render.process(&input, &mut output).unwrap();

    assert_eq!(output, input);
}

#[test]
fn scenario_boost_with_cut_bandwidth_gain_is_rejected() {
    let band = FrequencyBand::with_bandwidth_gain(1000, 6.0, -1.0);
    let err = BandFilter::new(band, 44_100, 2, 0.0).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert!(!err.is_format_error());
}

#[test]
fn scenario_single_boost_peaks_at_its_band() {
    let chain = EqualizerChain::new(&single_band(5, 6.0), DEFAULT_SAMPLE_RATE, 1).unwrap();
    let analyzer = FrequencyResponseAnalyzer::new(DEFAULT_FFT_SIZE).unwrap();
    let response = analyzer.analyze(&chain, 0.0);

    assert_eq!(response.len(), DEFAULT_FFT_SIZE / 2);
    let peak = response.peak().unwrap();
    assert!((peak.frequency_hz - 1000.0).abs() < 60.0);
    assert!((peak.magnitude_db - 6.0).abs() < 0.5);

    // Far from the band the response is flat
    assert!(response.magnitude_at(100.0).unwrap().abs() < 0.2);
    assert!(response.magnitude_at(10_000.0).unwrap().abs() < 0.2);
}

// ========== Channel Behaviour ==========

#[test]
fn channels_are_processed_independently() {
    let preset = Preset::builtin(PresetId::VocalBoost);
    let mut stereo = preset.build_chain(48_000, 2, BandReference::Unity).unwrap();
    let mut left_only = preset.build_chain(48_000, 1, BandReference::Unity).unwrap();
    let mut right_only = preset.build_chain(48_000, 1, BandReference::Unity).unwrap();

    let left = sine(440.0, 48_000, 2048);
    let right = sine(3_000.0, 48_000, 2048);

    for (&l, &r) in left.iter().zip(&right) {
        assert_eq!(stereo.process_sample(l, 0), left_only.process_sample(l, 0));
        assert_eq!(stereo.process_sample(r, 1), right_only.process_sample(r, 0));
    }
}

#[test]
fn reset_makes_processing_repeatable() {
    let mut chain = Preset::builtin(PresetId::BassReduction)
        .build_chain(44_100, 2, BandReference::Unity)
        .unwrap();
    let mut buffer: Vec<f32> = sine(80.0, 44_100, 1024).into_iter().flat_map(|x| [x, -x]).collect();
    let original = buffer.clone();

    chain.process_interleaved(&mut buffer);
    let first = buffer.clone();

    chain.reset();
    buffer.copy_from_slice(&original);
    chain.process_interleaved(&mut buffer);

    assert_eq!(buffer, first);
}

// ========== Error Handling ==========

#[test]
fn construction_errors_are_configuration_errors() {
    let errors = [
        EqualizerChain::new(&single_band(0, 0.0)[..9], 44_100, 2).unwrap_err(),
        EqualizerChain::flat(0, 2).unwrap_err(),
        EqualizerChain::flat(44_100, 0).unwrap_err(),
        FrequencyResponseAnalyzer::new(5).unwrap_err(),
        Preset::builtin(PresetId::VocalReduction)
            .build_chain(44_100, 2, BandReference::Chained)
            .unwrap_err(),
    ];
    for err in errors {
        assert_eq!(err.kind(), ErrorKind::Configuration, "{err}");
    }
}

#[test]
fn unsupported_bit_depth_is_a_format_error() {
    let err = AudioError::from(PcmFormat::new(44_100, 2, 32).unwrap_err());
    assert_eq!(err.kind(), ErrorKind::Format);
    assert!(err.is_format_error());
}

// ========== Cross-thread Preset Swaps ==========

#[test]
fn presets_swap_while_audio_thread_renders() {
    let settings = DspSettings {
        band_reference: BandReference::Unity,
        ..DspSettings::default()
    };
    let (mut controller, mut render) = pipeline::channel(PcmFormat::cd_quality(), &settings).unwrap();

    let audio = thread::spawn(move || {
        let tone: Vec<i16> = sine(1_000.0, 44_100, 512)
            .into_iter()
            .map(|x| (x * 8_000.0) as i16)
            .flat_map(|x| [x, x])
            .collect();
        let input = pcm16(&tone);
        let mut output = vec![0u8; input.len()];
        for _ in 0..200 {
            render.process(&input, &mut output).unwrap();
        }
        render.apply_pending();
        render
    });

    for id in PresetId::ALL.iter().cycle().take(24) {
        loop {
            match controller.select_preset(Preset::builtin(*id)) {
                Ok(()) => break,
                // The audio thread drains the queue between buffers
                Err(AudioError::CommandQueueFull) => thread::yield_now(),
                Err(err) => panic!("preset swap failed: {err}"),
            }
        }
    }

    let mut render = audio.join().unwrap();
    render.apply_pending();
    assert_eq!(render.equalizer().preset(), controller.preset());
    assert!(render.equalizer().chain().is_some());
}

#[test]
fn rejected_preset_keeps_previous_chain_running() {
    let (mut controller, mut render) = pipeline::channel(PcmFormat::cd_quality(), &DspSettings::default()).unwrap();
    assert!(controller.select_preset(Preset::builtin(PresetId::BassBoost)).is_err());

    let input = pcm16(&[1_234, -1_234, 30_000, -30_000]);
    let mut output = vec![0u8; input.len()];
    render.process(&input, &mut output).unwrap();

    assert_eq!(output, input);
    assert_eq!(render.equalizer().preset().name(), "Flat");
}
