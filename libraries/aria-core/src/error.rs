//! Core error types and the shared error classification

use thiserror::Error;

/// Result type alias using `CoreError`
pub type Result<T> = std::result::Result<T, CoreError>;

/// How a DSP error should be handled by the caller
///
/// Both kinds are deterministic and never retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Invalid parameters supplied when building a stage.
    /// The previously active stage stays in effect.
    Configuration,
    /// The audio format is outside what the stage supports.
    /// The stage stays inactive and audio is passed through unmodified.
    Format,
}

/// Errors raised while describing PCM formats
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Sample depth other than 16 or 24 bit signed integer
    #[error("Unsupported sample depth: {0} bits (only 16 and 24 bit PCM are supported)")]
    UnsupportedBitDepth(u16),

    /// Zero channels
    #[error("Invalid channel count: {0}")]
    InvalidChannelCount(u16),

    /// Zero sample rate
    #[error("Invalid sample rate: {0} Hz")]
    InvalidSampleRate(u32),
}

impl CoreError {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnsupportedBitDepth(_) => ErrorKind::Format,
            Self::InvalidChannelCount(_) | Self::InvalidSampleRate(_) => ErrorKind::Configuration,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bit_depth_is_a_format_error() {
        assert_eq!(CoreError::UnsupportedBitDepth(32).kind(), ErrorKind::Format);
        assert_eq!(CoreError::InvalidChannelCount(0).kind(), ErrorKind::Configuration);
    }

    #[test]
    fn messages_name_the_value() {
        let err = CoreError::UnsupportedBitDepth(8);
        assert!(err.to_string().contains("8 bits"));
    }
}
