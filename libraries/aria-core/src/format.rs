//! PCM format descriptions and the integer sample codec
//!
//! Samples travel as interleaved little-endian signed integers:
//! 16-bit samples take two bytes, 24-bit samples are packed into three.

use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};

/// Sample rate in Hz
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SampleRate(pub u32);

impl SampleRate {
    /// CD quality
    pub const CD_QUALITY: Self = Self(44_100);
    /// DVD / video standard
    pub const DVD_QUALITY: Self = Self(48_000);

    /// Create a new sample rate
    #[must_use]
    pub fn new(hz: u32) -> Self {
        Self(hz)
    }

    /// Get the sample rate as Hz
    pub fn as_hz(&self) -> u32 {
        self.0
    }
}

/// Signed integer PCM sample depth
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleFormat {
    /// 16-bit signed, 2 bytes per sample
    Pcm16,
    /// 24-bit signed, packed into 3 bytes per sample
    Pcm24,
}

impl SampleFormat {
    /// Map a bit depth onto a supported format
    pub fn from_bits(bits_per_sample: u16) -> Result<Self> {
        match bits_per_sample {
            16 => Ok(Self::Pcm16),
            24 => Ok(Self::Pcm24),
            other => Err(CoreError::UnsupportedBitDepth(other)),
        }
    }

    /// Bits per sample
    pub fn bits(&self) -> u16 {
        match self {
            Self::Pcm16 => 16,
            Self::Pcm24 => 24,
        }
    }

    /// Bytes per encoded sample
    pub fn bytes_per_sample(&self) -> usize {
        match self {
            Self::Pcm16 => 2,
            Self::Pcm24 => 3,
        }
    }

    /// Smallest representable sample value
    pub fn min_value(&self) -> f64 {
        match self {
            Self::Pcm16 => f64::from(i16::MIN),
            Self::Pcm24 => -8_388_608.0,
        }
    }

    /// Largest representable sample value
    pub fn max_value(&self) -> f64 {
        match self {
            Self::Pcm16 => f64::from(i16::MAX),
            Self::Pcm24 => 8_388_607.0,
        }
    }

    /// Decode one sample from the front of `bytes`
    ///
    /// # Panics
    /// If `bytes` is shorter than [`Self::bytes_per_sample`].
    #[inline]
    pub fn decode(&self, bytes: &[u8]) -> i32 {
        match self {
            Self::Pcm16 => i32::from(i16::from_le_bytes([bytes[0], bytes[1]])),
            // Shift into the top three bytes, then arithmetic-shift back to sign extend
            Self::Pcm24 => i32::from_le_bytes([0, bytes[0], bytes[1], bytes[2]]) >> 8,
        }
    }

    /// Encode one sample into the front of `out`
    ///
    /// `value` must already be within the format range; higher bits are dropped.
    ///
    /// # Panics
    /// If `out` is shorter than [`Self::bytes_per_sample`].
    #[inline]
    pub fn encode(&self, value: i32, out: &mut [u8]) {
        let bytes = value.to_le_bytes();
        match self {
            Self::Pcm16 => out[..2].copy_from_slice(&bytes[..2]),
            Self::Pcm24 => out[..3].copy_from_slice(&bytes[..3]),
        }
    }

    /// Saturate `value` into range and truncate it toward zero
    #[inline]
    pub fn quantize(&self, value: f64) -> i32 {
        crate::gain::clamp_to_range(value, self.min_value(), self.max_value()) as i32
    }
}

/// Format of the PCM stream delivered by the decoder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PcmFormat {
    /// Sample rate
    pub sample_rate: SampleRate,

    /// Number of interleaved channels
    pub channels: u16,

    /// Sample depth
    pub sample_format: SampleFormat,
}

impl PcmFormat {
    /// Describe a stream, rejecting unsupported depths and empty layouts
    pub fn new(sample_rate: u32, channels: u16, bits_per_sample: u16) -> Result<Self> {
        if sample_rate == 0 {
            return Err(CoreError::InvalidSampleRate(sample_rate));
        }
        if channels == 0 {
            return Err(CoreError::InvalidChannelCount(channels));
        }
        Ok(Self {
            sample_rate: SampleRate(sample_rate),
            channels,
            sample_format: SampleFormat::from_bits(bits_per_sample)?,
        })
    }

    /// CD quality stereo (44.1kHz, 16-bit, stereo)
    pub fn cd_quality() -> Self {
        Self {
            sample_rate: SampleRate::CD_QUALITY,
            channels: 2,
            sample_format: SampleFormat::Pcm16,
        }
    }

    /// Bytes in one interleaved frame
    pub fn frame_bytes(&self) -> usize {
        usize::from(self.channels) * self.sample_format.bytes_per_sample()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn from_bits_accepts_only_16_and_24() {
        assert_eq!(SampleFormat::from_bits(16), Ok(SampleFormat::Pcm16));
        assert_eq!(SampleFormat::from_bits(24), Ok(SampleFormat::Pcm24));
        for bits in [8, 20, 32] {
            let err = SampleFormat::from_bits(bits).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Format);
        }
    }

    #[test]
    fn pcm16_codec() {
        let mut buf = [0u8; 2];
        for value in [0, 1, -1, 16_384, i32::from(i16::MIN), i32::from(i16::MAX)] {
            SampleFormat::Pcm16.encode(value, &mut buf);
            assert_eq!(SampleFormat::Pcm16.decode(&buf), value);
        }
        SampleFormat::Pcm16.encode(-2, &mut buf);
        assert_eq!(buf, [0xFE, 0xFF]);
    }

    #[test]
    fn pcm24_sign_extension() {
        assert_eq!(SampleFormat::Pcm24.decode(&[0xFF, 0xFF, 0xFF]), -1);
        assert_eq!(SampleFormat::Pcm24.decode(&[0x00, 0x00, 0x80]), -8_388_608);
        assert_eq!(SampleFormat::Pcm24.decode(&[0xFF, 0xFF, 0x7F]), 8_388_607);

        let mut buf = [0u8; 3];
        SampleFormat::Pcm24.encode(-8_388_608, &mut buf);
        assert_eq!(buf, [0x00, 0x00, 0x80]);
        SampleFormat::Pcm24.encode(123_456, &mut buf);
        assert_eq!(SampleFormat::Pcm24.decode(&buf), 123_456);
    }

    #[test]
    fn quantize_clamps_and_truncates() {
        assert_eq!(SampleFormat::Pcm16.quantize(40_000.7), 32_767);
        assert_eq!(SampleFormat::Pcm16.quantize(-1e9), -32_768);
        assert_eq!(SampleFormat::Pcm16.quantize(-2.9), -2);
        assert_eq!(SampleFormat::Pcm24.quantize(9e6), 8_388_607);
    }

    #[test]
    fn pcm_format_validation() {
        let format = PcmFormat::new(48_000, 2, 24).unwrap();
        assert_eq!(format.frame_bytes(), 6);
        assert_eq!(PcmFormat::new(0, 2, 16), Err(CoreError::InvalidSampleRate(0)));
        assert_eq!(PcmFormat::new(44_100, 0, 16), Err(CoreError::InvalidChannelCount(0)));
        assert_eq!(PcmFormat::new(44_100, 2, 32), Err(CoreError::UnsupportedBitDepth(32)));
    }

    #[test]
    fn sample_format_serializes_lowercase() {
        let json = serde_json::to_string(&SampleFormat::Pcm24).unwrap();
        assert_eq!(json, "\"pcm24\"");
    }
}
