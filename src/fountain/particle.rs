//! Fixed particle pool advanced once per frame.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::TAU;

use super::MotionType;
use crate::features::FeatureVector;
use crate::params::{AudioReactiveMapping, FountainPhysics};

/// One slot of the pool.
///
/// Everything except `render_position` is fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    /// Spawn offset on the nozzle plane
    pub base_position: Vec3,
    /// Launch seed; `y` is the vertical launch speed
    pub seed: Vec3,
    /// Render size hint
    pub size: f32,
    /// Offset into the shared cycle, in [0, cycle length)
    pub phase_offset: f32,
    /// Position written by the last update
    pub render_position: Vec3,
}

impl Particle {
    pub fn new(base_position: Vec3, seed: Vec3, size: f32, phase_offset: f32) -> Self {
        Self {
            base_position,
            seed,
            size,
            phase_offset,
            render_position: base_position,
        }
    }
}

/// Per-particle vertex for point-sprite rendering
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct ParticleVertex {
    pub position: [f32; 3],
    pub size: f32,
    pub opacity: f32,
}

/// Feature-driven scaling applied on top of the motion strategy
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldModulation {
    pub vertical_scale: f32,
    pub horizontal_scale: f32,
    pub size_scale: f32,
    pub opacity: f32,
}

impl Default for FieldModulation {
    fn default() -> Self {
        Self::from_features(&FeatureVector::ZERO, &AudioReactiveMapping::default())
    }
}

impl FieldModulation {
    /// Map a feature vector to field scaling factors
    pub fn from_features(features: &FeatureVector, mapping: &AudioReactiveMapping) -> Self {
        let vertical_scale = 1.0
            + features.bass * mapping.bass_to_height
            + features.low_mid * mapping.low_mid_to_height
            + features.high_mid * mapping.high_mid_to_height;
        let horizontal_scale = 1.0 + features.high_mid * mapping.high_mid_to_spread;
        let size_scale = 1.0 + features.energy() * mapping.energy_to_size;
        let opacity = mapping.base_opacity + features.energy() * mapping.energy_to_opacity;

        Self {
            vertical_scale: vertical_scale.max(0.0),
            horizontal_scale: horizontal_scale.max(0.0),
            size_scale: size_scale.max(0.0),
            opacity: opacity.clamp(0.0, 1.0),
        }
    }
}

/// Wrap `phase_clock + offset` into [0, cycle)
pub fn phase_time(phase_clock: f32, offset: f32, cycle: f32) -> f32 {
    let t = (phase_clock + offset).rem_euclid(cycle);
    // rem_euclid can round up to exactly `cycle` for tiny negative inputs
    if t.is_finite() && t < cycle {
        t
    } else {
        0.0
    }
}

/// Generate a pool of `physics.particle_count` particles from `seed`.
///
/// Phase offsets are stratified with jitter so every slice of the cycle
/// holds the same share of particles.
pub fn spawn_particles(physics: &FountainPhysics, seed: u64) -> Vec<Particle> {
    let mut rng = StdRng::seed_from_u64(seed);
    let count = physics.particle_count;
    let cycle = physics.cycle_length_s;
    let spread = physics.nozzle_spread_m;
    let (speed_lo, speed_hi) = physics.launch_speed_range_m_per_s;
    let (size_lo, size_hi) = physics.size_range;

    (0..count)
        .map(|i| {
            let base_position = Vec3::new(
                (rng.gen::<f32>() - 0.5) * spread,
                0.0,
                (rng.gen::<f32>() - 0.5) * spread,
            );

            let angle = rng.gen::<f32>() * TAU;
            let lateral = (2.0 + rng.gen::<f32>() * 2.0) * 0.2;
            let launch = speed_lo + rng.gen::<f32>() * (speed_hi - speed_lo);
            let seed = Vec3::new(angle.cos() * lateral, launch, angle.sin() * lateral);

            let size = size_lo + rng.gen::<f32>() * (size_hi - size_lo);
            let stratum = (i as f32 + rng.gen::<f32>()) / count as f32;
            let phase_offset = phase_time(stratum * cycle, 0.0, cycle);

            Particle::new(base_position, seed, size, phase_offset)
        })
        .collect()
}

/// Fixed-capacity particle pool for one fountain
pub struct ParticleField {
    particles: Vec<Particle>,
    physics: FountainPhysics,
    mapping: AudioReactiveMapping,
    /// Mixed with the phase clock to seed per-frame jitter
    jitter_seed: u64,
    modulation: FieldModulation,
}

impl ParticleField {
    /// Create a field with a freshly generated pool
    pub fn new(physics: FountainPhysics, mapping: AudioReactiveMapping, seed: u64) -> Self {
        let particles = spawn_particles(&physics, seed);
        Self::from_particles(particles, physics, mapping, seed)
    }

    /// Create a field over an explicit pool
    pub fn from_particles(
        particles: Vec<Particle>,
        physics: FountainPhysics,
        mapping: AudioReactiveMapping,
        seed: u64,
    ) -> Self {
        let modulation = FieldModulation::from_features(&FeatureVector::ZERO, &mapping);
        Self {
            particles,
            physics,
            mapping,
            jitter_seed: seed,
            modulation,
        }
    }

    /// Advance every particle to `phase_clock`
    ///
    /// # Arguments
    /// * `_dt` - Frame delta (seconds); the result depends only on `phase_clock`
    /// * `phase_clock` - Shared cycle clock (seconds)
    /// * `strategy` - Active motion style
    /// * `features` - Current audio features
    ///
    /// The same inputs always produce the same positions. Random jitter is
    /// re-rolled whenever the clock moves.
    pub fn update(
        &mut self,
        _dt: f32,
        phase_clock: f32,
        strategy: MotionType,
        features: &FeatureVector,
    ) {
        self.modulation = FieldModulation::from_features(features, &self.mapping);
        if self.particles.is_empty() {
            return;
        }

        let cycle = self.physics.cycle_length_s;
        let scale = Vec3::new(
            self.modulation.horizontal_scale,
            self.modulation.vertical_scale,
            self.modulation.horizontal_scale,
        );

        let clock_mix = u64::from(phase_clock.to_bits()).wrapping_mul(0x9E37_79B9_7F4A_7C15);
        let mut jitter = StdRng::seed_from_u64(self.jitter_seed ^ clock_mix);

        for particle in &mut self.particles {
            let t = phase_time(phase_clock, particle.phase_offset, cycle);
            let offset = strategy.position(t, particle.seed, &self.physics, &mut jitter);
            particle.render_position = particle.base_position + offset * scale;
        }
    }

    pub fn capacity(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn render_positions(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.particles.iter().map(|p| p.render_position)
    }

    pub fn sizes(&self) -> impl Iterator<Item = f32> + '_ {
        self.particles.iter().map(|p| p.size)
    }

    /// Scaling applied by the last update
    pub fn modulation(&self) -> FieldModulation {
        self.modulation
    }

    pub fn physics(&self) -> &FountainPhysics {
        &self.physics
    }

    /// Highest particle after the last update (0 for an empty pool)
    pub fn max_height(&self) -> f32 {
        self.particles
            .iter()
            .map(|p| p.render_position.y)
            .fold(0.0, f32::max)
    }

    /// Pack the pool into `out` for upload, replacing its contents
    pub fn pack_vertices(&self, out: &mut Vec<ParticleVertex>) {
        out.clear();
        out.extend(self.particles.iter().map(|p| ParticleVertex {
            position: p.render_position.to_array(),
            size: p.size * self.modulation.size_scale,
            opacity: self.modulation.opacity,
        }));
    }
}
