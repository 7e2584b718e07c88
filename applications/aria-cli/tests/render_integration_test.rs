//! End-to-end rendering through config files and WAV I/O

use aria_audio::eq::{BandReference, PresetId};
use aria_audio::DspSettings;
use aria_cli::render::{render_wav, LoudnessTags};
use aria_cli::CliConfig;
use std::collections::HashMap;
use std::f32::consts::PI;
use std::io::Write;
use std::path::Path;

const SAMPLE_RATE: u32 = 44_100;

fn write_sine(path: &Path, frequency: f32, amplitude: f32, frames: usize) {
    let spec = hound::WavSpec {
        channels: 2,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    for i in 0..frames {
        let value = (amplitude * (2.0 * PI * frequency * i as f32 / SAMPLE_RATE as f32).sin()) as i16;
        writer.write_sample(value).unwrap();
        writer.write_sample(value).unwrap();
    }
    writer.finalize().unwrap();
}

/// RMS of the left channel over the second half of the file
fn settled_rms(path: &Path) -> f64 {
    let samples: Vec<i32> = hound::WavReader::open(path)
        .unwrap()
        .samples::<i32>()
        .map(|s| s.unwrap())
        .collect();
    let left: Vec<f64> = samples.iter().step_by(2).map(|&s| f64::from(s)).collect();
    let tail = &left[left.len() / 2..];
    (tail.iter().map(|s| s * s).sum::<f64>() / tail.len() as f64).sqrt()
}

fn unity(preset: PresetId) -> DspSettings {
    DspSettings {
        preset,
        band_reference: BandReference::Unity,
        ..DspSettings::default()
    }
}

#[test]
fn bass_boost_raises_low_tone() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("tone.wav");
    let output = dir.path().join("boosted.wav");
    write_sine(&input, 100.0, 4000.0, SAMPLE_RATE as usize);

    render_wav(&input, &output, &unity(PresetId::BassBoost), LoudnessTags::default(), 512).unwrap();

    let ratio = settled_rms(&output) / settled_rms(&input);
    assert!(ratio > 1.4, "expected at least +3 dB, got ratio {ratio}");
}

#[test]
fn vocal_reduction_lowers_midrange_tone() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("tone.wav");
    let output = dir.path().join("reduced.wav");
    write_sine(&input, 1000.0, 8000.0, SAMPLE_RATE as usize);

    render_wav(&input, &output, &unity(PresetId::VocalReduction), LoudnessTags::default(), 512).unwrap();

    let ratio = settled_rms(&output) / settled_rms(&input);
    assert!(ratio < 0.71, "expected at least -3 dB, got ratio {ratio}");
}

#[test]
fn config_file_drives_the_render() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("aria.toml");
    let mut file = std::fs::File::create(&config_path).unwrap();
    writeln!(
        file,
        r#"
[dsp]
equalizer_enabled = false
replay_gain_mode = "album"
pre_amp_gain_db = -6.0

[render]
buffer_frames = 100
"#
    )
    .unwrap();

    let environment = config::Environment::with_prefix("ARIA").source(Some(HashMap::new()));
    let config = CliConfig::load_with(Some(&config_path), environment).unwrap();
    config.validate().unwrap();

    let input = dir.path().join("tone.wav");
    let output = dir.path().join("quiet.wav");
    write_sine(&input, 440.0, 10_000.0, 4410);

    let summary = render_wav(
        &input,
        &output,
        &config.dsp,
        LoudnessTags::default(),
        config.render.buffer_frames,
    )
    .unwrap();

    // No album gain tag, so only the pre-amp applies
    assert_eq!(summary.effective_gain_db, -6.0);
    assert_eq!(summary.frames, 4410);
    let ratio = settled_rms(&output) / settled_rms(&input);
    assert!((ratio - 0.501).abs() < 0.01, "ratio {ratio}");
}
