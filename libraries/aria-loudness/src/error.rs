//! Error types for loudness normalization

use aria_core::{CoreError, ErrorKind, SampleFormat};
use thiserror::Error;

/// Result type for loudness operations
pub type Result<T> = std::result::Result<T, LoudnessError>;

/// Errors that can occur while configuring or running the loudness stage
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoudnessError {
    /// Sample depth the stage cannot process
    #[error("Unsupported PCM format: {0} bits per sample")]
    UnsupportedFormat(u16),

    /// Input and output buffers do not describe the same samples
    #[error("Buffer mismatch: input {input} bytes, output {output} bytes, {format:?} samples")]
    BufferMismatch {
        /// Input length in bytes
        input: usize,
        /// Output length in bytes
        output: usize,
        /// Sample format the buffers were interpreted as
        format: SampleFormat,
    },

    /// Invalid stream description
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl LoudnessError {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnsupportedFormat(_) => ErrorKind::Format,
            Self::BufferMismatch { .. } => ErrorKind::Configuration,
            Self::Core(err) => err.kind(),
        }
    }
}
