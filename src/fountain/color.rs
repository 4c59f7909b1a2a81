//! Feature-driven fountain color.

use crate::features::FeatureVector;
use crate::params::ColorMapping;

/// Hue/saturation/lightness, each in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorState {
    pub hue: f32,
    pub saturation: f32,
    pub lightness: f32,
}

impl ColorState {
    /// Color at `elapsed_s` seconds for the given features
    ///
    /// Hue drifts with time and is pushed by treble; saturation follows the
    /// low-mid band and lightness the bass.
    pub fn from_features(
        elapsed_s: f64,
        features: &FeatureVector,
        mapping: &ColorMapping,
    ) -> Self {
        let drift = (elapsed_s * f64::from(mapping.hue_drift_per_s)).rem_euclid(1.0) as f32;
        let hue =
            (mapping.base_hue + drift + features.treble * mapping.treble_to_hue).rem_euclid(1.0);
        let saturation = (mapping.base_saturation
            + features.low_mid * mapping.low_mid_to_saturation)
            .clamp(0.0, 1.0);
        let lightness = (mapping.base_lightness + features.bass * mapping.bass_to_lightness)
            .clamp(0.0, mapping.max_lightness.clamp(0.0, 1.0));

        Self {
            // rem_euclid may round up to 1.0
            hue: if hue < 1.0 { hue } else { 0.0 },
            saturation,
            lightness,
        }
    }

    /// Convert to linear RGB in [0, 1]
    pub fn to_rgb(&self) -> [f32; 3] {
        let s = self.saturation;
        let l = self.lightness;
        if s <= 0.0 {
            return [l, l, l];
        }

        let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
        let p = 2.0 * l - q;
        [
            hue_to_channel(p, q, self.hue + 1.0 / 3.0),
            hue_to_channel(p, q, self.hue),
            hue_to_channel(p, q, self.hue - 1.0 / 3.0),
        ]
    }

    /// RGB scaled to bytes
    pub fn to_rgb8(&self) -> [u8; 3] {
        self.to_rgb().map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8)
    }
}

impl Default for ColorState {
    fn default() -> Self {
        Self::from_features(0.0, &FeatureVector::ZERO, &ColorMapping::default())
    }
}

fn hue_to_channel(p: f32, q: f32, t: f32) -> f32 {
    let t = t.rem_euclid(1.0);
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: [f32; 3], b: [f32; 3]) -> bool {
        a.iter().zip(b).all(|(x, y)| (x - y).abs() < 1e-4)
    }

    #[test]
    fn test_hsl_to_rgb() {
        let red = ColorState { hue: 0.0, saturation: 1.0, lightness: 0.5 };
        assert!(close(red.to_rgb(), [1.0, 0.0, 0.0]));

        let green = ColorState { hue: 1.0 / 3.0, saturation: 1.0, lightness: 0.5 };
        assert!(close(green.to_rgb(), [0.0, 1.0, 0.0]));

        let grey = ColorState { hue: 0.7, saturation: 0.0, lightness: 0.25 };
        assert!(close(grey.to_rgb(), [0.25, 0.25, 0.25]));

        assert_eq!(red.to_rgb8(), [255, 0, 0]);
    }

    #[test]
    fn test_default_is_water_blue() {
        let [r, g, b] = ColorState::default().to_rgb();
        assert!(b > g && g > r);
    }

    #[test]
    fn test_hue_drifts_and_wraps() {
        let mapping = ColorMapping::default();
        let quiet = FeatureVector::ZERO;

        let a = ColorState::from_features(0.0, &quiet, &mapping);
        let b = ColorState::from_features(1.0, &quiet, &mapping);
        assert!((b.hue - a.hue - mapping.hue_drift_per_s).abs() < 1e-5);

        for step in 0..500 {
            let loud = FeatureVector::splat(2.5);
            let c = ColorState::from_features(step as f64 * 3.7, &loud, &mapping);
            assert!((0.0..1.0).contains(&c.hue));
        }
    }

    #[test]
    fn test_bands_drive_saturation_and_lightness() {
        let mapping = ColorMapping::default();
        let quiet = ColorState::from_features(2.0, &FeatureVector::ZERO, &mapping);

        let bassy = FeatureVector { bass: 2.0, ..FeatureVector::ZERO };
        let lit = ColorState::from_features(2.0, &bassy, &mapping);
        assert!(lit.lightness > quiet.lightness);
        assert_eq!(lit.saturation, quiet.saturation);

        let mids = FeatureVector { low_mid: 2.0, ..FeatureVector::ZERO };
        let rich = ColorState::from_features(2.0, &mids, &mapping);
        assert!(rich.saturation > quiet.saturation);
        assert_eq!(rich.lightness, quiet.lightness);

        let blown = ColorState::from_features(2.0, &FeatureVector::splat(100.0), &mapping);
        assert!(blown.lightness <= mapping.max_lightness);
        assert!(blown.saturation <= 1.0);
    }
}
