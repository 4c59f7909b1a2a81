//! One fountain: particle pool, motion style, color and clock.

use glam::Vec3;

use super::{ColorState, MotionType, ParticleField};
use crate::features::FeatureVector;
use crate::params::ColorMapping;

/// A single fountain in the scene
pub struct FountainInstance {
    position: Vec3,
    motion: MotionType,
    field: ParticleField,
    color: ColorState,
    color_mapping: ColorMapping,
    /// Seconds since creation (f64 so the phase clock stays precise on long runs)
    elapsed_s: f64,
}

impl FountainInstance {
    pub fn new(
        position: Vec3,
        motion: MotionType,
        field: ParticleField,
        color_mapping: ColorMapping,
    ) -> Self {
        let color = ColorState::from_features(0.0, &FeatureVector::ZERO, &color_mapping);
        Self {
            position,
            motion,
            field,
            color,
            color_mapping,
            elapsed_s: 0.0,
        }
    }

    /// Advance the clock by `dt` seconds, recolor, then move the particles
    ///
    /// Negative or non-finite `dt` counts as zero.
    pub fn update(&mut self, dt: f32, features: &FeatureVector) {
        let dt = if dt.is_finite() && dt > 0.0 { dt } else { 0.0 };
        self.elapsed_s += f64::from(dt);

        self.color = ColorState::from_features(self.elapsed_s, features, &self.color_mapping);
        let phase_clock = self.phase_clock();
        self.field.update(dt, phase_clock, self.motion, features);
    }

    /// Swap the motion style; takes effect on the next update
    pub fn set_motion(&mut self, motion: MotionType) {
        self.motion = motion;
    }

    pub fn motion(&self) -> MotionType {
        self.motion
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn color(&self) -> ColorState {
        self.color
    }

    pub fn field(&self) -> &ParticleField {
        &self.field
    }

    pub fn elapsed_s(&self) -> f64 {
        self.elapsed_s
    }

    /// Elapsed time wrapped into the launch cycle
    pub fn phase_clock(&self) -> f32 {
        let cycle = f64::from(self.field.physics().cycle_length_s);
        self.elapsed_s.rem_euclid(cycle) as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{AudioReactiveMapping, FountainPhysics};

    fn instance(motion: MotionType) -> FountainInstance {
        let physics = FountainPhysics {
            particle_count: 200,
            ..FountainPhysics::default()
        };
        let field = ParticleField::new(physics, AudioReactiveMapping::default(), 8);
        FountainInstance::new(Vec3::new(12.0, 0.0, 0.0), motion, field, ColorMapping::default())
    }

    #[test]
    fn test_clock_wraps_cycle() {
        let mut fountain = instance(MotionType::Basic);
        for _ in 0..150 {
            fountain.update(0.016, &FeatureVector::ZERO);
        }
        assert!((fountain.elapsed_s() - 2.4).abs() < 1e-4);
        assert!((fountain.phase_clock() - 0.4).abs() < 1e-3);
    }

    #[test]
    fn test_bad_dt_is_ignored() {
        let mut fountain = instance(MotionType::Wave);
        fountain.update(0.5, &FeatureVector::ZERO);
        let positions: Vec<Vec3> = fountain.field().render_positions().collect();

        fountain.update(-1.0, &FeatureVector::ZERO);
        fountain.update(f32::NAN, &FeatureVector::ZERO);
        assert_eq!(fountain.elapsed_s(), 0.5);
        assert_eq!(positions, fountain.field().render_positions().collect::<Vec<_>>());
    }

    #[test]
    fn test_motion_swap_keeps_pool() {
        let mut fountain = instance(MotionType::Basic);
        fountain.update(0.3, &FeatureVector::ZERO);
        let seeds: Vec<Vec3> = fountain.field().particles().iter().map(|p| p.seed).collect();

        fountain.set_motion(MotionType::Spinning);
        fountain.update(0.0, &FeatureVector::ZERO);

        assert_eq!(fountain.motion(), MotionType::Spinning);
        let after: Vec<Vec3> = fountain.field().particles().iter().map(|p| p.seed).collect();
        assert_eq!(seeds, after);
        // Spinning particles orbit at radius 2 around their base
        let p = fountain.field().particles()[0];
        let radial = (p.render_position - p.base_position) * Vec3::new(1.0, 0.0, 1.0);
        assert!((radial.length() - 2.0).abs() < 1e-3);
    }

    #[test]
    fn test_color_follows_features() {
        let mut fountain = instance(MotionType::Basic);
        fountain.update(0.1, &FeatureVector::ZERO);
        let quiet = fountain.color();

        fountain.update(0.0, &FeatureVector::splat(2.0));
        let loud = fountain.color();
        assert!(loud.lightness > quiet.lightness);
        assert!(loud.saturation > quiet.saturation);
        assert_ne!(loud.hue, quiet.hue);
    }
}
