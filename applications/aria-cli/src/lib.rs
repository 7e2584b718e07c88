//! Aria command-line front end
//!
//! Library half of the `aria` binary: configuration loading, preset and
//! response reports, and offline WAV rendering.

pub mod config;
pub mod error;
pub mod render;
pub mod report;

pub use config::CliConfig;
pub use error::{CliError, Result};
