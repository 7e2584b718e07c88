//! ReplayGain mode selection

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which measured ReplayGain value the processor prefers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplayGainMode {
    /// Track gain, falling back to album gain
    Track,
    /// Album gain, falling back to track gain
    Album,
    /// No normalization (pre-amp still applies)
    #[default]
    Off,
}

impl ReplayGainMode {
    /// Decode the ordinal older settings stored (`0` track, `1` album).
    /// Unknown ordinals disable normalization.
    pub fn from_ordinal(ordinal: i32) -> Self {
        match ordinal {
            0 => Self::Track,
            1 => Self::Album,
            _ => Self::Off,
        }
    }

    /// Ordinal used by [`Self::from_ordinal`]
    pub fn ordinal(&self) -> i32 {
        match self {
            Self::Track => 0,
            Self::Album => 1,
            Self::Off => 2,
        }
    }

    /// Convert to string for settings persistence
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Track => "track",
            Self::Album => "album",
            Self::Off => "off",
        }
    }

    /// Pick the gain this mode applies from the measured values
    pub fn select(&self, track_gain_db: Option<f64>, album_gain_db: Option<f64>) -> f64 {
        match self {
            Self::Track => track_gain_db.or(album_gain_db).unwrap_or(0.0),
            Self::Album => album_gain_db.or(track_gain_db).unwrap_or(0.0),
            Self::Off => 0.0,
        }
    }

    pub(crate) fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Track,
            1 => Self::Album,
            _ => Self::Off,
        }
    }

    pub(crate) fn as_u8(self) -> u8 {
        match self {
            Self::Track => 0,
            Self::Album => 1,
            Self::Off => 2,
        }
    }
}

impl FromStr for ReplayGainMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "track" | "replaygain_track" | "rg_track" => Ok(Self::Track),
            "album" | "replaygain_album" | "rg_album" => Ok(Self::Album),
            "off" | "disabled" | "none" => Ok(Self::Off),
            other => Err(format!("unknown ReplayGain mode: {other}")),
        }
    }
}

impl fmt::Display for ReplayGainMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
