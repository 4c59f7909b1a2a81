//! Trajectory functions for the five fountain styles.

use glam::Vec3;
use rand::Rng;
use std::f32::consts::{PI, TAU};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;
use crate::params::FountainPhysics;

/// Fountain motion style.
///
/// Each variant is a function of (phase time, seed) with no per-particle
/// state, so switching styles never touches the particle pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MotionType {
    /// Straight parabolic jet
    #[default]
    Basic,
    /// Jet that opens into a dome and closes again
    Dome,
    /// Jet circling the nozzle
    Spinning,
    /// Jet with an oscillating height
    Wave,
    /// Jet with planar scatter re-rolled on every evaluation
    Random,
}

impl MotionType {
    pub const ALL: [MotionType; 5] = [
        MotionType::Basic,
        MotionType::Dome,
        MotionType::Spinning,
        MotionType::Wave,
        MotionType::Random,
    ];

    pub fn name(self) -> &'static str {
        match self {
            MotionType::Basic => "basic",
            MotionType::Dome => "dome",
            MotionType::Spinning => "spinning",
            MotionType::Wave => "wave",
            MotionType::Random => "random",
        }
    }

    /// Offset from the particle's base position at `phase_time` seconds into its cycle
    ///
    /// # Arguments
    /// * `phase_time` - Time since launch, in [0, cycle length)
    /// * `seed` - Per-particle seed; `seed.y` is the launch speed (m/s)
    /// * `physics` - Gravity and shape constants
    /// * `jitter` - Randomness for Dome angles and Random scatter
    ///
    /// The returned `y` is never below the ground plane.
    pub fn position<R: Rng + ?Sized>(
        self,
        phase_time: f32,
        seed: Vec3,
        physics: &FountainPhysics,
        jitter: &mut R,
    ) -> Vec3 {
        let t = phase_time;
        let rise = seed.y * t + 0.5 * physics.gravity_m_per_s2 * t * t;

        let (x, y, z) = match self {
            MotionType::Basic => (0.0, rise, 0.0),
            MotionType::Dome => {
                let angle = jitter.gen::<f32>() * TAU;
                let radius = (t * PI).sin() * physics.dome_radius_m;
                (angle.cos() * radius, rise, angle.sin() * radius)
            }
            MotionType::Spinning => {
                let angle = t * physics.spin_rate_rad_per_s;
                let radius = physics.spin_radius_m;
                (angle.cos() * radius, rise, angle.sin() * radius)
            }
            MotionType::Wave => {
                let wave = (t * physics.wave_rate_rad_per_s).sin() * physics.wave_amplitude_m;
                (0.0, rise + wave, 0.0)
            }
            MotionType::Random => {
                let span = 2.0 * physics.random_jitter_m;
                let x = (jitter.gen::<f32>() - 0.5) * span;
                let z = (jitter.gen::<f32>() - 0.5) * span;
                (x, rise, z)
            }
        };

        // Ground collision freezes at y = 0, no bounce
        Vec3::new(x, y.max(0.0), z)
    }
}

impl fmt::Display for MotionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MotionType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "basic" => Ok(MotionType::Basic),
            "dome" => Ok(MotionType::Dome),
            "spinning" => Ok(MotionType::Spinning),
            "wave" => Ok(MotionType::Wave),
            "random" => Ok(MotionType::Random),
            _ => Err(Error::UnknownMotionType(s.to_string())),
        }
    }
}
