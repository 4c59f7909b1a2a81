//! Audio feature extraction: spectrum bands in, smoothed control signal out.

mod extractor;
mod smoother;

pub use extractor::{
    band_intensities, AudioFeatureExtractor, ExtractorStats, NullSpectrum, SpectrumPoll,
    SpectrumSource,
};
pub use smoother::{smooth, SpectrumSmoother};

/// Smoothed four-band audio control signal.
///
/// Values are non-negative and, with the default normalization, practically
/// within [0, 3]. `treble` carries the full-spectrum average.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FeatureVector {
    pub bass: f32,
    pub low_mid: f32,
    pub high_mid: f32,
    pub treble: f32,
}

impl FeatureVector {
    pub const ZERO: Self = Self::splat(0.0);

    /// All four bands set to `value`
    pub const fn splat(value: f32) -> Self {
        Self {
            bass: value,
            low_mid: value,
            high_mid: value,
            treble: value,
        }
    }

    /// Combined bass + treble energy driving size and opacity
    pub fn energy(&self) -> f32 {
        self.bass + self.treble
    }

    /// Apply `f` band-wise to two vectors
    pub fn zip_with(self, other: Self, f: impl Fn(f32, f32) -> f32) -> Self {
        Self {
            bass: f(self.bass, other.bass),
            low_mid: f(self.low_mid, other.low_mid),
            high_mid: f(self.high_mid, other.high_mid),
            treble: f(self.treble, other.treble),
        }
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.bass, self.low_mid, self.high_mid, self.treble]
    }
}
