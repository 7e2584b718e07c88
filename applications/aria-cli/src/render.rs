/// Offline WAV rendering through the DSP pipeline
use crate::error::Result;
use aria_audio::{pipeline, DspSettings};
use aria_core::{PcmFormat, SampleFormat};
use aria_loudness::ReplayGainMode;
use serde::Serialize;
use std::path::Path;
use tracing::{info, warn};

/// Measured gains and mode applied on top of the settings
#[derive(Debug, Clone, Copy, Default)]
pub struct LoudnessTags {
    pub mode: Option<ReplayGainMode>,
    pub track_gain_db: Option<f64>,
    pub album_gain_db: Option<f64>,
}

/// What happened to a rendered file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderSummary {
    pub frames: u64,
    pub sample_rate: u32,
    pub channels: u16,
    pub bits_per_sample: u16,
    /// The file was copied unchanged because its format is not supported
    pub bypassed: bool,
    pub effective_gain_db: f64,
}

/// Render `input` into `output`, processing `buffer_frames` frames at a time
pub fn render_wav(
    input: &Path,
    output: &Path,
    settings: &DspSettings,
    tags: LoudnessTags,
    buffer_frames: usize,
) -> Result<RenderSummary> {
    let mut reader = hound::WavReader::open(input)?;
    let spec = reader.spec();
    let mut writer = hound::WavWriter::create(output, spec)?;

    let format = match spec.sample_format {
        hound::SampleFormat::Int => PcmFormat::new(spec.sample_rate, spec.channels, spec.bits_per_sample).ok(),
        hound::SampleFormat::Float => None,
    };

    let Some(format) = format else {
        warn!(
            bits = spec.bits_per_sample,
            sample_format = ?spec.sample_format,
            "Unsupported WAV format, copying through unchanged"
        );
        let frames = copy_samples(&mut reader, &mut writer)? / u64::from(spec.channels.max(1));
        writer.finalize()?;
        return Ok(RenderSummary {
            frames,
            sample_rate: spec.sample_rate,
            channels: spec.channels,
            bits_per_sample: spec.bits_per_sample,
            bypassed: true,
            effective_gain_db: 0.0,
        });
    };

    let (controller, mut render) = pipeline::channel(format, settings)?;
    if let Some(mode) = tags.mode {
        controller.set_replay_gain_mode(mode);
    }
    controller.set_track_gain(tags.track_gain_db);
    controller.set_album_gain(tags.album_gain_db);
    let effective_gain_db = controller.loudness().effective_gain_db();

    info!(
        input = %input.display(),
        preset = controller.preset().name(),
        effective_gain_db,
        "Rendering"
    );

    let width = format.sample_format.bytes_per_sample();
    let samples_per_buffer = buffer_frames.max(1) * usize::from(format.channels);
    let mut bytes = vec![0u8; samples_per_buffer * width];
    let mut block = Vec::with_capacity(samples_per_buffer);
    let mut samples = reader.samples::<i32>();
    let mut total_samples = 0u64;

    loop {
        block.clear();
        for sample in samples.by_ref().take(samples_per_buffer) {
            block.push(sample?);
        }
        if block.is_empty() {
            break;
        }

        let buffer = &mut bytes[..block.len() * width];
        for (value, chunk) in block.iter().zip(buffer.chunks_exact_mut(width)) {
            format.sample_format.encode(*value, chunk);
        }
        render.process_in_place(buffer)?;

        for chunk in buffer.chunks_exact(width) {
            let value = format.sample_format.decode(chunk);
            match format.sample_format {
                SampleFormat::Pcm16 => writer.write_sample(value as i16)?,
                SampleFormat::Pcm24 => writer.write_sample(value)?,
            }
        }
        total_samples += block.len() as u64;
    }

    writer.finalize()?;
    Ok(RenderSummary {
        frames: total_samples / u64::from(format.channels),
        sample_rate: spec.sample_rate,
        channels: spec.channels,
        bits_per_sample: spec.bits_per_sample,
        bypassed: false,
        effective_gain_db,
    })
}

fn copy_samples<R, W>(reader: &mut hound::WavReader<R>, writer: &mut hound::WavWriter<W>) -> Result<u64>
where
    R: std::io::Read,
    W: std::io::Write + std::io::Seek,
{
    let mut count = 0u64;
    match reader.spec().sample_format {
        hound::SampleFormat::Float => {
            for sample in reader.samples::<f32>() {
                writer.write_sample(sample?)?;
                count += 1;
            }
        }
        hound::SampleFormat::Int => {
            for sample in reader.samples::<i32>() {
                writer.write_sample(sample?)?;
                count += 1;
            }
        }
    }
    Ok(count)
}
