//! Audio analysis configuration and spectrum band layout.

use std::ops::Range;

use crate::error::{Error, Result};

/// Analysis configuration for the audio collaborator
#[derive(Debug, Clone)]
pub struct AudioConfig {
    /// Audio sample rate (Hz)
    pub sample_rate_hz: usize,

    /// FFT window size (must be power of 2)
    /// 2048 gives 1024 magnitude bins
    pub fft_size: usize,

    /// FFT update interval (milliseconds)
    /// 16 ≈ one analysis per display refresh at 60 Hz
    pub update_interval_ms: u64,

    /// Magnitude mapped to byte value 0 (dBFS)
    pub min_decibels: f32,

    /// Magnitude mapped to byte value 255 (dBFS)
    pub max_decibels: f32,

    /// Analyser-side temporal smoothing of bin magnitudes (0 = none)
    pub analyser_smoothing: f32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate_hz: 44100,
            fft_size: 2048,
            update_interval_ms: 16,
            min_decibels: -100.0,
            max_decibels: -30.0,
            analyser_smoothing: 0.8,
        }
    }
}

impl AudioConfig {
    /// Number of magnitude bins published per analysis
    pub fn bin_count(&self) -> usize {
        self.fft_size / 2
    }

    /// Lower edge frequency (Hz) of an FFT bin
    pub fn bin_to_hz(&self, bin: usize) -> f32 {
        bin as f32 * self.sample_rate_hz as f32 / self.fft_size as f32
    }

    /// Validate configuration (FFT size must be power of 2, etc.)
    pub fn validate(&self) -> Result<()> {
        if !self.fft_size.is_power_of_two() || self.fft_size < 2 {
            return Err(Error::InvalidConfig(format!(
                "FFT size must be power of 2, got {}",
                self.fft_size
            )));
        }
        if self.sample_rate_hz == 0 {
            return Err(Error::InvalidConfig("Sample rate must be > 0".to_string()));
        }
        if self.min_decibels >= self.max_decibels {
            return Err(Error::InvalidConfig(format!(
                "decibel range is empty: [{}, {}]",
                self.min_decibels, self.max_decibels
            )));
        }
        if !(0.0..1.0).contains(&self.analyser_smoothing) {
            return Err(Error::InvalidConfig(format!(
                "analyser smoothing must be in [0, 1), got {}",
                self.analyser_smoothing
            )));
        }
        Ok(())
    }
}

/// Fixed bin-index windows for the band averages.
///
/// These are indices, not frequencies: what "bass" means depends on the
/// FFT size and sample rate of whatever produced the spectrum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BandLayout {
    pub bass: Range<usize>,
    pub low_mid: Range<usize>,
    pub high_mid: Range<usize>,
}

impl Default for BandLayout {
    fn default() -> Self {
        Self {
            bass: 0..10,
            low_mid: 10..100,
            high_mid: 100..200,
        }
    }
}

/// What the extractor publishes while nothing is playing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SilencePolicy {
    /// Keep publishing the last vector unchanged
    Hold,
    /// Smooth toward zero each tick, as if the spectrum were all zeros
    #[default]
    Decay,
}

/// Feature extraction parameters
#[derive(Debug, Clone)]
pub struct SpectrumConfig {
    /// Band windows over the spectrum bins
    pub bands: BandLayout,

    /// Exponential smoothing factor in [0, 1]
    /// Higher = slower response, less jitter
    pub smoothing_factor: f32,

    /// Multiplier from averaged bin magnitude to feature units
    /// 1/85 maps byte-scale magnitudes (0..255) onto 0..3
    pub magnitude_scale: f32,

    /// Behaviour while the source reports nothing playing
    pub silence_policy: SilencePolicy,
}

impl Default for SpectrumConfig {
    fn default() -> Self {
        Self {
            bands: BandLayout::default(),
            smoothing_factor: 0.8,
            magnitude_scale: 1.0 / 85.0,
            silence_policy: SilencePolicy::Decay,
        }
    }
}

impl SpectrumConfig {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.smoothing_factor) {
            return Err(Error::InvalidConfig(format!(
                "smoothing factor must be in [0, 1], got {}",
                self.smoothing_factor
            )));
        }
        if !self.magnitude_scale.is_finite() || self.magnitude_scale < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "magnitude scale must be finite and >= 0, got {}",
                self.magnitude_scale
            )));
        }
        for (name, range) in [
            ("bass", &self.bands.bass),
            ("low-mid", &self.bands.low_mid),
            ("high-mid", &self.bands.high_mid),
        ] {
            if range.start > range.end {
                return Err(Error::InvalidConfig(format!(
                    "{} band window is reversed: {:?}",
                    name, range
                )));
            }
        }
        Ok(())
    }
}

/// Audio constants (compile-time, match Glicol engine setup)
pub mod audio_constants {
    /// Audio block size (samples per buffer)
    /// 128 = 2.9ms @ 44.1kHz
    pub const BLOCK_SIZE: usize = 128;
}
