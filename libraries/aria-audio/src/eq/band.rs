//! Equalizer band description

/// Bandwidth of every band as a fraction of its center frequency
pub const BANDWIDTH_RATIO: f64 = 0.35;

/// One equalizer band: a center frequency and a gain
///
/// The bandwidth and the bandwidth gain (the gain at the band edges used for
/// filter design) are derived on construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrequencyBand {
    center_frequency_hz: u32,
    gain_db: f64,
    bandwidth_hz: f64,
    bandwidth_gain_db: f64,
}

impl FrequencyBand {
    /// Create a band, deriving its bandwidth and bandwidth gain
    ///
    /// The bandwidth gain keeps the sign of `gain_db` with magnitude
    /// `sqrt(gain_db² / 2)`, i.e. the -3 dB point of the band in dB terms.
    pub fn new(center_frequency_hz: u32, gain_db: f64) -> Self {
        let bandwidth_gain_db = if gain_db == 0.0 {
            0.0
        } else {
            (gain_db * gain_db / 2.0).sqrt().copysign(gain_db)
        };
        Self::with_bandwidth_gain(center_frequency_hz, gain_db, bandwidth_gain_db)
    }

    /// Create a band with an explicit bandwidth gain
    ///
    /// Bands built this way may violate the ordering a [`super::BandFilter`]
    /// requires; that is reported when the filter is constructed.
    pub fn with_bandwidth_gain(center_frequency_hz: u32, gain_db: f64, bandwidth_gain_db: f64) -> Self {
        Self {
            center_frequency_hz,
            gain_db,
            bandwidth_hz: f64::from(center_frequency_hz) * BANDWIDTH_RATIO,
            bandwidth_gain_db,
        }
    }

    /// Center frequency in Hz
    pub fn center_frequency_hz(&self) -> u32 {
        self.center_frequency_hz
    }

    /// Gain at the center frequency in dB
    pub fn gain_db(&self) -> f64 {
        self.gain_db
    }

    /// Bandwidth in Hz
    pub fn bandwidth_hz(&self) -> f64 {
        self.bandwidth_hz
    }

    /// Gain at the band edges in dB
    pub fn bandwidth_gain_db(&self) -> f64 {
        self.bandwidth_gain_db
    }

    /// True when both the gain and the bandwidth gain are exactly zero
    pub fn is_flat(&self) -> bool {
        self.gain_db == 0.0 && self.bandwidth_gain_db == 0.0
    }
}
