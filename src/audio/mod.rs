//! Audio playback and FFT analysis system.
//!
//! Plays Glicol procedural synthesis or a WAV track and analyses the output
//! on a background thread into the magnitude spectrum the feature extractor
//! polls.

mod fft;
mod playback;
mod synthesis;
mod system;

// Re-export public types
pub use fft::{hann_window, magnitude_to_byte, SpectrumAnalyser};
pub use playback::{Track, TrackPlayer};
pub use system::{poll_shared_spectrum, AudioInput, AudioSystem};
