//! Named equalizer presets

use super::band::FrequencyBand;
use super::chain::{BandReference, EqualizerChain, BAND_COUNT, EQUALIZER_FREQUENCIES};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// Maximum boost or cut for any band (dB)
pub const MAX_BAND_GAIN_DB: f64 = 12.0;

/// Built-in preset identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PresetId {
    /// User-defined gains
    Custom,

    /// All bands at 0 dB
    #[default]
    Flat,

    /// Raised low end
    BassBoost,

    /// Lowered low end
    BassReduction,

    /// Raised midrange
    VocalBoost,

    /// Lowered midrange
    VocalReduction,
}

impl PresetId {
    /// Every built-in preset in display order
    pub const ALL: [Self; 6] = [
        Self::Custom,
        Self::Flat,
        Self::BassBoost,
        Self::BassReduction,
        Self::VocalBoost,
        Self::VocalReduction,
    ];

    /// Display name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Custom => "Custom",
            Self::Flat => "Flat",
            Self::BassBoost => "Bass Boost",
            Self::BassReduction => "Bass Reduction",
            Self::VocalBoost => "Vocal Boost",
            Self::VocalReduction => "Vocal Reduction",
        }
    }

    /// Identifier used in settings files and on the command line
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Custom => "custom",
            Self::Flat => "flat",
            Self::BassBoost => "bass-boost",
            Self::BassReduction => "bass-reduction",
            Self::VocalBoost => "vocal-boost",
            Self::VocalReduction => "vocal-reduction",
        }
    }

    /// Band gains in dB, lowest band first
    pub fn gains(&self) -> [f64; BAND_COUNT] {
        match self {
            Self::Custom | Self::Flat => [0.0; BAND_COUNT],
            Self::BassBoost => [6.0, 5.0, 4.0, 3.0, 2.0, 0.0, 0.0, 0.0, 0.0, 0.0],
            Self::BassReduction => [-6.0, -5.0, -4.0, -3.0, -2.0, 0.0, 0.0, 0.0, 0.0, 0.0],
            Self::VocalBoost => [-2.0, -3.0, -3.0, 2.0, 5.0, 5.0, 4.0, 3.0, 0.0, -2.0],
            Self::VocalReduction => [2.0, 3.0, 3.0, -2.0, -5.0, -5.0, -4.0, -3.0, 0.0, 2.0],
        }
    }
}

impl fmt::Display for PresetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PresetId {
    type Err = String;

    /// Accepts the kebab-case identifier or the display name, ignoring case
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(|c: char| c == ' ' || c == '_', "-");
        Self::ALL
            .into_iter()
            .find(|id| id.as_str() == normalized)
            .ok_or_else(|| format!("Unknown preset: '{s}'"))
    }
}

/// A named set of band gains
///
/// Two presets are the same preset when their names match, whatever their
/// gains.
#[derive(Debug, Clone)]
pub struct Preset {
    name: Cow<'static, str>,
    bands: Vec<FrequencyBand>,
}

impl Preset {
    /// Create a preset from explicit bands
    ///
    /// The bands are checked when a chain is built from them.
    pub fn new(name: impl Into<Cow<'static, str>>, bands: Vec<FrequencyBand>) -> Self {
        Self {
            name: name.into(),
            bands,
        }
    }

    /// Create a preset from `(center_frequency_hz, gain_db)` pairs
    pub fn from_pairs(name: impl Into<Cow<'static, str>>, pairs: &[(u32, f64)]) -> Self {
        let bands = pairs
            .iter()
            .map(|&(frequency, gain)| FrequencyBand::new(frequency, gain))
            .collect();
        Self::new(name, bands)
    }

    /// A built-in preset
    pub fn builtin(id: PresetId) -> Self {
        Self::at_fixed_frequencies(Cow::Borrowed(id.name()), id.gains())
    }

    /// The custom preset with user gains, each clamped to ±12 dB
    pub fn custom(gains: [f64; BAND_COUNT]) -> Self {
        let gains = gains.map(|gain| {
            if gain.is_finite() {
                gain.clamp(-MAX_BAND_GAIN_DB, MAX_BAND_GAIN_DB)
            } else {
                0.0
            }
        });
        Self::at_fixed_frequencies(Cow::Borrowed(PresetId::Custom.name()), gains)
    }

    /// Every built-in preset in display order
    pub fn all() -> Vec<Self> {
        PresetId::ALL.into_iter().map(Self::builtin).collect()
    }

    fn at_fixed_frequencies(name: Cow<'static, str>, gains: [f64; BAND_COUNT]) -> Self {
        let bands = EQUALIZER_FREQUENCIES
            .iter()
            .zip(gains)
            .map(|(&frequency, gain)| FrequencyBand::new(frequency, gain))
            .collect();
        Self { name, bands }
    }

    /// Preset name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Bands, lowest first
    pub fn bands(&self) -> &[FrequencyBand] {
        &self.bands
    }

    /// Band gains in dB, lowest first
    pub fn gains(&self) -> Vec<f64> {
        self.bands.iter().map(FrequencyBand::gain_db).collect()
    }

    /// Build an equalizer chain for a stream
    pub fn build_chain(
        &self,
        sample_rate_hz: u32,
        channel_count: u16,
        reference: BandReference,
    ) -> Result<EqualizerChain> {
        EqualizerChain::with_reference(&self.bands, sample_rate_hz, channel_count, reference)
    }
}

impl Default for Preset {
    fn default() -> Self {
        Self::builtin(PresetId::Flat)
    }
}

impl From<PresetId> for Preset {
    fn from(id: PresetId) -> Self {
        Self::builtin(id)
    }
}

impl PartialEq for Preset {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Preset {}

impl Hash for Preset {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}
