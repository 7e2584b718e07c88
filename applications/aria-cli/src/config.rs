/// CLI configuration
use crate::error::{CliError, Result};
use aria_audio::DspSettings;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File picked up from the working directory when no `--config` is given
pub const DEFAULT_CONFIG_FILE: &str = "aria.toml";

/// Environment variable prefix, e.g. `ARIA_DSP__PRESET=bass-boost`
pub const ENV_PREFIX: &str = "ARIA";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct CliConfig {
    #[serde(default)]
    pub dsp: DspSettings,

    #[serde(default = "default_render")]
    pub render: RenderSettings,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RenderSettings {
    /// Frames handed to the pipeline per buffer
    #[serde(default = "default_buffer_frames")]
    pub buffer_frames: usize,
}

impl CliConfig {
    /// Load configuration from file and environment
    ///
    /// An explicit `path` must exist; otherwise `aria.toml` is used when present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with(path, config::Environment::with_prefix(ENV_PREFIX))
    }

    /// Load with a caller-supplied environment source
    pub fn load_with(path: Option<&Path>, environment: config::Environment) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                settings = settings.add_source(config::File::from(path.to_path_buf()).required(true));
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        // Override with environment variables (ARIA_SECTION__FIELD)
        settings = settings.add_source(
            environment
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: Self = settings.build()?.try_deserialize()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.dsp.validate()?;

        if self.render.buffer_frames == 0 {
            return Err(CliError::Config("render.buffer_frames must be at least 1".to_string()));
        }

        Ok(())
    }
}

// Default values
fn default_render() -> RenderSettings {
    RenderSettings {
        buffer_frames: default_buffer_frames(),
    }
}

fn default_buffer_frames() -> usize {
    1024
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            dsp: DspSettings::default(),
            render: default_render(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aria_audio::eq::{BandReference, PresetId};
    use aria_loudness::ReplayGainMode;
    use std::collections::HashMap;
    use std::io::Write;

    fn no_env() -> config::Environment {
        config::Environment::with_prefix(ENV_PREFIX).source(Some(HashMap::new()))
    }

    #[test]
    fn loads_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[dsp]
preset = "vocal-boost"
band_reference = "unity"
replay_gain_mode = "album"
pre_amp_gain_db = -2.5

[render]
buffer_frames = 256
"#
        )
        .unwrap();

        let config = CliConfig::load_with(Some(file.path()), no_env()).unwrap();
        assert_eq!(config.dsp.preset, PresetId::VocalBoost);
        assert_eq!(config.dsp.band_reference, BandReference::Unity);
        assert_eq!(config.dsp.replay_gain_mode, ReplayGainMode::Album);
        assert_eq!(config.dsp.pre_amp_gain_db, -2.5);
        assert_eq!(config.render.buffer_frames, 256);
        // Unspecified values keep their defaults
        assert!(config.dsp.equalizer_enabled);
        config.validate().unwrap();
    }

    #[test]
    fn environment_overrides_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[dsp]\npreset = \"flat\"").unwrap();

        let env: HashMap<String, String> = [
            ("ARIA_DSP__PRESET".to_string(), "bass-reduction".to_string()),
            ("ARIA_RENDER__BUFFER_FRAMES".to_string(), "64".to_string()),
        ]
        .into_iter()
        .collect();
        let environment = config::Environment::with_prefix(ENV_PREFIX).source(Some(env));

        let config = CliConfig::load_with(Some(file.path()), environment).unwrap();
        assert_eq!(config.dsp.preset, PresetId::BassReduction);
        assert_eq!(config.render.buffer_frames, 64);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(matches!(
            CliConfig::load_with(Some(&missing), no_env()),
            Err(CliError::Config(_))
        ));
    }

    #[test]
    fn validation_catches_bad_values() {
        let mut config = CliConfig::default();
        config.validate().unwrap();

        config.render.buffer_frames = 0;
        assert!(matches!(config.validate(), Err(CliError::Config(_))));

        let mut config = CliConfig::default();
        config.dsp.fft_size = 3;
        assert!(matches!(config.validate(), Err(CliError::Audio(_))));
    }
}
