//! Persisted DSP settings

use crate::analysis::DEFAULT_FFT_SIZE;
use crate::eq::{BandReference, Preset, PresetId, BAND_COUNT, MAX_BAND_GAIN_DB};
use crate::error::{AudioError, Result};
use aria_loudness::{ReplayGainMode, MAX_PREAMP_DB, MIN_PREAMP_DB};
use serde::{Deserialize, Serialize};

/// Everything the user can choose about the DSP chain
///
/// Missing fields take their [`Default`] value when deserializing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DspSettings {
    /// Selected preset
    pub preset: PresetId,

    /// Band gains used when [`PresetId::Custom`] is selected
    pub custom_gains: [f64; BAND_COUNT],

    /// Equalizer on or bypassed
    pub equalizer_enabled: bool,

    /// Pre-attenuate strong boosts to avoid clipping
    pub auto_headroom: bool,

    /// Gain each band is designed against
    pub band_reference: BandReference,

    /// ReplayGain mode
    pub replay_gain_mode: ReplayGainMode,

    /// Pre-amp gain (dB)
    pub pre_amp_gain_db: f64,

    /// FFT length for response previews
    pub fft_size: usize,
}

impl Default for DspSettings {
    fn default() -> Self {
        Self {
            preset: PresetId::Flat,
            custom_gains: [0.0; BAND_COUNT],
            equalizer_enabled: true,
            auto_headroom: false,
            band_reference: BandReference::Chained,
            replay_gain_mode: ReplayGainMode::Off,
            pre_amp_gain_db: 0.0,
            fft_size: DEFAULT_FFT_SIZE,
        }
    }
}

impl DspSettings {
    /// Resolve the selected preset
    pub fn preset(&self) -> Preset {
        match self.preset {
            PresetId::Custom => Preset::custom(self.custom_gains),
            id => Preset::builtin(id),
        }
    }

    /// Check every value against its documented range
    pub fn validate(&self) -> Result<()> {
        if let Some((index, gain)) = self
            .custom_gains
            .iter()
            .enumerate()
            .find(|(_, gain)| !gain.is_finite() || gain.abs() > MAX_BAND_GAIN_DB)
        {
            return Err(AudioError::InvalidSettings(format!(
                "custom gain for band {index} is {gain} dB, must be within ±{MAX_BAND_GAIN_DB} dB"
            )));
        }

        if !self.pre_amp_gain_db.is_finite()
            || !(MIN_PREAMP_DB..=MAX_PREAMP_DB).contains(&self.pre_amp_gain_db)
        {
            return Err(AudioError::InvalidSettings(format!(
                "pre-amp gain {} dB must be within {MIN_PREAMP_DB}..={MAX_PREAMP_DB} dB",
                self.pre_amp_gain_db
            )));
        }

        if self.fft_size < 2 || self.fft_size % 2 != 0 {
            return Err(AudioError::InvalidFftSize(self.fft_size));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let settings = DspSettings::default();
        assert_eq!(settings.preset().name(), "Flat");
        assert!(settings.equalizer_enabled);
        assert_eq!(settings.replay_gain_mode, ReplayGainMode::Off);
        assert_eq!(settings.fft_size, 16_384);
        settings.validate().unwrap();
    }

    #[test]
    fn custom_preset_uses_custom_gains() {
        let settings = DspSettings {
            preset: PresetId::Custom,
            custom_gains: [1.0, 2.0, 3.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, -4.0],
            ..DspSettings::default()
        };
        let preset = settings.preset();
        assert_eq!(preset.name(), "Custom");
        assert_eq!(preset.gains()[2], 3.0);
        assert_eq!(preset.gains()[9], -4.0);
    }

    #[test]
    fn validation_rejects_out_of_range_values() {
        let mut settings = DspSettings::default();
        settings.custom_gains[4] = 13.0;
        assert!(matches!(settings.validate(), Err(AudioError::InvalidSettings(_))));

        let settings = DspSettings {
            pre_amp_gain_db: f64::NAN,
            ..DspSettings::default()
        };
        assert!(settings.validate().is_err());

        let settings = DspSettings {
            fft_size: 1001,
            ..DspSettings::default()
        };
        assert_eq!(settings.validate(), Err(AudioError::InvalidFftSize(1001)));
    }

    #[test]
    fn partial_json_fills_defaults() {
        let settings: DspSettings =
            serde_json::from_str(r#"{"preset": "vocal-boost", "replay_gain_mode": "album"}"#).unwrap();
        assert_eq!(settings.preset, PresetId::VocalBoost);
        assert_eq!(settings.replay_gain_mode, ReplayGainMode::Album);
        assert_eq!(settings.band_reference, BandReference::Chained);
        assert_eq!(settings.fft_size, DEFAULT_FFT_SIZE);
    }
}
