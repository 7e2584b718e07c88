/// Audio-specific errors
use aria_core::{CoreError, ErrorKind};
use aria_loudness::LoudnessError;
use thiserror::Error;

/// Result type alias using `AudioError`
pub type Result<T> = std::result::Result<T, AudioError>;

/// Audio error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AudioError {
    /// Bandwidth gain does not lie between the reference gain and the band gain
    #[error(
        "Invalid gain ordering for {center_frequency_hz} Hz band: bandwidth gain {bandwidth_gain_db:.3} dB \
         must lie between reference {reference_gain_db:.3} dB and band gain {gain_db:.3} dB"
    )]
    InvalidBandGain {
        /// Band center frequency
        center_frequency_hz: u32,
        /// Band gain
        gain_db: f64,
        /// Band edge gain
        bandwidth_gain_db: f64,
        /// Gain the band was designed against
        reference_gain_db: f64,
    },

    /// Preset without exactly ten bands
    #[error("Invalid band count: expected 10, got {0}")]
    InvalidBandCount(usize),

    /// Band placed at a frequency other than the fixed one for its slot
    #[error("Band {index} must be centered at {expected} Hz, found {found} Hz")]
    UnexpectedBandFrequency {
        /// Slot in the chain
        index: usize,
        /// Fixed frequency for the slot
        expected: u32,
        /// Frequency supplied
        found: u32,
    },

    /// Zero channels
    #[error("Invalid channel count: {0}")]
    InvalidChannelCount(u16),

    /// Zero sample rate
    #[error("Invalid sample rate: {0} Hz")]
    InvalidSampleRate(u32),

    /// FFT size that cannot be split into a half spectrum
    #[error("Invalid FFT size: {0} (must be an even number of at least 2)")]
    InvalidFftSize(usize),

    /// Settings outside their documented ranges
    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    /// Input and output buffers do not describe whole frames of the same length
    #[error("Buffer mismatch: input {input} bytes, output {output} bytes, frame size {frame_bytes} bytes")]
    BufferMismatch {
        /// Input length in bytes
        input: usize,
        /// Output length in bytes
        output: usize,
        /// Bytes per interleaved frame
        frame_bytes: usize,
    },

    /// Buffer processed before a format was configured
    #[error("Equalizer has no configured format")]
    NotConfigured,

    /// Too many commands queued for the audio thread
    #[error("Pipeline command queue is full")]
    CommandQueueFull,

    /// Audio side of the pipeline has been dropped
    #[error("Pipeline render side has been dropped")]
    PipelineClosed,

    /// Loudness stage error
    #[error(transparent)]
    Loudness(#[from] LoudnessError),

    /// Stream description error
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl AudioError {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Loudness(err) => err.kind(),
            Self::Core(err) => err.kind(),
            _ => ErrorKind::Configuration,
        }
    }

    /// Whether the caller should bypass the stage and pass audio through
    pub fn is_format_error(&self) -> bool {
        self.kind() == ErrorKind::Format
    }
}
