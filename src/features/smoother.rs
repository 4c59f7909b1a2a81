//! Exponential smoothing of band intensities.

use super::FeatureVector;
use crate::error::{Error, Result};

/// Blend `raw` into `previous`, per band: `factor * previous + (1 - factor) * raw`
pub fn smooth(previous: FeatureVector, raw: FeatureVector, factor: f32) -> FeatureVector {
    previous.zip_with(raw, |p, r| factor * p + (1.0 - factor) * r)
}

/// Exponential smoother with a factor fixed at construction.
///
/// A higher factor responds more slowly: sampling jitter is suppressed at
/// the cost of visible lag behind the music.
#[derive(Debug, Clone, Copy)]
pub struct SpectrumSmoother {
    factor: f32,
}

impl SpectrumSmoother {
    /// Create a smoother; `factor` must lie in [0, 1]
    pub fn new(factor: f32) -> Result<Self> {
        if !(0.0..=1.0).contains(&factor) {
            return Err(Error::InvalidConfig(format!(
                "smoothing factor must be in [0, 1], got {}",
                factor
            )));
        }
        Ok(Self { factor })
    }

    pub fn factor(&self) -> f32 {
        self.factor
    }

    pub fn smooth(&self, previous: FeatureVector, raw: FeatureVector) -> FeatureVector {
        smooth(previous, raw, self.factor)
    }
}

impl Default for SpectrumSmoother {
    fn default() -> Self {
        Self { factor: 0.8 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn within(value: f32, a: f32, b: f32) -> bool {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let tol = 1e-5 * (1.0 + hi.abs());
        value >= lo - tol && value <= hi + tol
    }

    #[test]
    fn test_smooth_blend() {
        let out = smooth(FeatureVector::splat(1.0), FeatureVector::splat(2.0), 0.8);
        assert!((out.bass - 1.2).abs() < 1e-6);
        assert!((out.treble - 1.2).abs() < 1e-6);
    }

    #[test]
    fn test_smooth_extremes() {
        let prev = FeatureVector {
            bass: 0.5,
            low_mid: 1.0,
            high_mid: 1.5,
            treble: 2.0,
        };
        let raw = FeatureVector::splat(3.0);

        assert_eq!(smooth(prev, raw, 1.0), prev);
        assert_eq!(smooth(prev, raw, 0.0), raw);
    }

    #[test]
    fn test_smooth_never_overshoots() {
        let raws = [0.0, 3.0, 0.1, 2.7, 2.7, 0.0, 1.3, 250.0, 0.0];

        for step in 0..=20 {
            let factor = step as f32 / 20.0;
            let mut previous = FeatureVector::ZERO;

            for (i, &r) in raws.iter().enumerate() {
                let raw = FeatureVector {
                    bass: r,
                    low_mid: r * 0.5,
                    high_mid: raws[(i + 1) % raws.len()],
                    treble: 1.0,
                };
                let out = smooth(previous, raw, factor);

                for ((o, p), r) in out
                    .to_array()
                    .iter()
                    .zip(previous.to_array())
                    .zip(raw.to_array())
                {
                    assert!(within(*o, p, r), "factor {factor}: {o} not in [{p}, {r}]");
                }
                previous = out;
            }
        }
    }

    #[test]
    fn test_smoother_rejects_bad_factor() {
        assert!(SpectrumSmoother::new(-0.1).is_err());
        assert!(SpectrumSmoother::new(1.01).is_err());
        assert!(SpectrumSmoother::new(f32::NAN).is_err());
        assert_eq!(SpectrumSmoother::new(0.3).unwrap().factor(), 0.3);
    }
}
