//! Error types for the fountain engine.

use thiserror::Error;

/// Result type alias for fountain operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised at the control and configuration boundaries.
///
/// Nothing inside the frame loop produces these; a rejected request leaves
/// the simulation untouched.
#[derive(Error, Debug)]
pub enum Error {
    /// Fountain index outside the ensemble
    #[error("fountain index {index} out of range (ensemble has {count} fountains)")]
    InvalidFountainIndex { index: usize, count: usize },

    /// Motion type name not in basic/dome/spinning/wave/random
    #[error("unknown motion type: {0}")]
    UnknownMotionType(String),

    /// Parameter set failed validation
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Audio device or synthesis engine failure
    #[error("audio error: {0}")]
    Audio(String),

    /// WAV decoding failure
    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    /// Snapshot encoding failure
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
