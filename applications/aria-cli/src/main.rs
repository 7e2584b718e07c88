/// Aria - equalizer and loudness DSP from the command line
use anyhow::Context;
use aria_audio::analysis::{FrequencyResponseAnalyzer, DEFAULT_SAMPLE_RATE};
use aria_audio::eq::{BandReference, PresetId};
use aria_cli::render::{render_wav, LoudnessTags};
use aria_cli::{report, CliConfig};
use aria_loudness::ReplayGainMode;
use clap::{Args, Parser, Subcommand};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "aria")]
#[command(about = "Ten-band equalizer and ReplayGain processing", long_about = None)]
struct Cli {
    /// Configuration file path (defaults to ./aria.toml when present)
    #[arg(short, long, global = true, env = "ARIA_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List built-in presets and their band gains
    Presets {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Print the frequency response of a preset
    Response {
        #[command(flatten)]
        eq: EqArgs,
        /// Flat gain applied before the equalizer (dB)
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        gain_db: f64,
        /// Sample rate to design the chain for
        #[arg(long, default_value_t = DEFAULT_SAMPLE_RATE)]
        sample_rate: u32,
        /// FFT length (defaults to the configured value)
        #[arg(long)]
        fft_size: Option<usize>,
        /// Print every bin as JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Process a 16 or 24-bit WAV file through loudness and equalization
    Render {
        /// Input WAV file
        input: PathBuf,
        /// Output WAV file
        output: PathBuf,
        #[command(flatten)]
        eq: EqArgs,
        /// ReplayGain mode (track, album, off)
        #[arg(long)]
        mode: Option<ReplayGainMode>,
        /// Track gain (dB)
        #[arg(long, allow_negative_numbers = true)]
        track_gain: Option<f64>,
        /// Album gain (dB)
        #[arg(long, allow_negative_numbers = true)]
        album_gain: Option<f64>,
        /// Pre-amp gain (dB, -12 to 12)
        #[arg(long, allow_negative_numbers = true)]
        pre_amp: Option<f64>,
        /// Pre-attenuate strong boosts
        #[arg(long)]
        auto_headroom: bool,
    },
}

#[derive(Args)]
struct EqArgs {
    /// Preset identifier (e.g. bass-boost)
    #[arg(long)]
    preset: Option<PresetId>,
    /// Design every band against 0 dB instead of its lower neighbour
    #[arg(long)]
    unity_reference: bool,
}

impl EqArgs {
    fn apply(&self, config: &mut CliConfig) {
        if let Some(preset) = self.preset {
            config.dsp.preset = preset;
        }
        if self.unity_reference {
            config.dsp.band_reference = BandReference::Unity;
        }
    }
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "aria=info,aria_audio=info,aria_loudness=info,aria_cli=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();
    let mut config = CliConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Commands::Presets { json } => {
            report::write_presets(&mut out, json)?;
        }
        Commands::Response {
            eq,
            gain_db,
            sample_rate,
            fft_size,
            json,
        } => {
            eq.apply(&mut config);
            if let Some(fft_size) = fft_size {
                config.dsp.fft_size = fft_size;
            }
            config.validate()?;

            let analyzer = FrequencyResponseAnalyzer::new(config.dsp.fft_size)?.with_reference(config.dsp.band_reference);
            let preset = config.dsp.preset();
            let response = analyzer
                .analyze_preset(&preset, sample_rate, gain_db)
                .with_context(|| format!("Cannot build preset '{}'", preset.name()))?;
            report::write_response(&mut out, &response, json)?;
        }
        Commands::Render {
            input,
            output,
            eq,
            mode,
            track_gain,
            album_gain,
            pre_amp,
            auto_headroom,
        } => {
            eq.apply(&mut config);
            if let Some(pre_amp) = pre_amp {
                config.dsp.pre_amp_gain_db = pre_amp;
            }
            if auto_headroom {
                config.dsp.auto_headroom = true;
            }
            config.validate()?;

            let tags = LoudnessTags {
                mode,
                track_gain_db: track_gain,
                album_gain_db: album_gain,
            };
            let summary = render_wav(&input, &output, &config.dsp, tags, config.render.buffer_frames)
                .with_context(|| format!("Failed to render {}", input.display()))?;

            if summary.bypassed {
                tracing::warn!("Format not supported by the DSP chain; output is an unmodified copy");
            }
            tracing::info!(
                frames = summary.frames,
                effective_gain_db = summary.effective_gain_db,
                "Wrote {}",
                output.display()
            );
        }
    }

    out.flush()?;
    Ok(())
}
