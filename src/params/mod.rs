//! Parameter definitions with physical units and documented semantics.
//!
//! All tunable numbers live here with:
//! - Physical units (meters, seconds, Hz, etc.)
//! - Documented ranges and meanings
//! - A `validate()` check where a bad value would break the simulation

mod audio;
mod fountain;
mod render;

// Re-export all types
pub use audio::{audio_constants, AudioConfig, BandLayout, SilencePolicy, SpectrumConfig};
pub use fountain::{
    AudioReactiveMapping, ColorMapping, EnsembleConfig, EnsembleLayout, FountainPhysics,
};
pub use render::RecordingConfig;
