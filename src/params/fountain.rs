//! Fountain kinematics, audio-reactive mapping and color parameters.

use crate::error::{Error, Result};
use crate::fountain::MotionType;

/// Particle pool and trajectory parameters
#[derive(Debug, Clone)]
pub struct FountainPhysics {
    /// Particles per fountain (0 is allowed and renders nothing)
    pub particle_count: usize,

    /// Duration of one launch cycle (seconds)
    /// Each particle re-launches every cycle
    pub cycle_length_s: f32,

    /// Vertical acceleration (m/s², negative = down)
    pub gravity_m_per_s2: f32,

    /// Range of the vertical launch speed stored in each seed (m/s)
    pub launch_speed_range_m_per_s: (f32, f32),

    /// Side length of the square nozzle area particles spawn from (meters)
    pub nozzle_spread_m: f32,

    /// Range of per-particle render size
    pub size_range: (f32, f32),

    // === Strategy shape constants ===
    /// Peak dome radius at mid-cycle (meters)
    pub dome_radius_m: f32,

    /// Spinning fountain angular rate (rad/s)
    pub spin_rate_rad_per_s: f32,

    /// Spinning fountain radius (meters)
    pub spin_radius_m: f32,

    /// Wave fountain oscillation rate (rad/s)
    pub wave_rate_rad_per_s: f32,

    /// Wave fountain oscillation amplitude (meters)
    pub wave_amplitude_m: f32,

    /// Random fountain planar jitter half-width (meters)
    pub random_jitter_m: f32,
}

impl Default for FountainPhysics {
    fn default() -> Self {
        Self {
            particle_count: 5000,
            cycle_length_s: 2.0,
            gravity_m_per_s2: -9.8,
            launch_speed_range_m_per_s: (8.0, 10.0),
            nozzle_spread_m: 0.5,
            size_range: (0.1, 0.4),

            dome_radius_m: 2.0,
            spin_rate_rad_per_s: 5.0,
            spin_radius_m: 2.0,
            wave_rate_rad_per_s: 5.0,
            wave_amplitude_m: 2.0,
            random_jitter_m: 2.0,
        }
    }
}

impl FountainPhysics {
    pub fn validate(&self) -> Result<()> {
        if !self.cycle_length_s.is_finite() || self.cycle_length_s <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "cycle length must be > 0, got {}",
                self.cycle_length_s
            )));
        }
        if !self.gravity_m_per_s2.is_finite() {
            return Err(Error::InvalidConfig("gravity must be finite".to_string()));
        }
        let (lo, hi) = self.launch_speed_range_m_per_s;
        if !(lo.is_finite() && hi.is_finite()) || lo > hi {
            return Err(Error::InvalidConfig(format!(
                "launch speed range is invalid: ({}, {})",
                lo, hi
            )));
        }
        let (lo, hi) = self.size_range;
        if lo < 0.0 || lo > hi {
            return Err(Error::InvalidConfig(format!(
                "size range is invalid: ({}, {})",
                lo, hi
            )));
        }
        Ok(())
    }
}

/// Mapping from feature bands to particle field modulation
#[derive(Debug, Clone)]
pub struct AudioReactiveMapping {
    /// Vertical scale gain per unit bass
    /// Formula: vertical = 1 + bass * this + low_mid * .. + high_mid * ..
    pub bass_to_height: f32,

    /// Vertical scale gain per unit low-mid
    pub low_mid_to_height: f32,

    /// Vertical scale gain per unit high-mid
    pub high_mid_to_height: f32,

    /// Horizontal scale gain per unit high-mid
    /// Formula: horizontal = 1 + high_mid * this
    pub high_mid_to_spread: f32,

    /// Size scale gain per unit (bass + treble)
    /// Formula: size_scale = 1 + (bass + treble) * this
    pub energy_to_size: f32,

    /// Opacity with no audio
    pub base_opacity: f32,

    /// Opacity gain per unit (bass + treble), clamped to [0, 1]
    pub energy_to_opacity: f32,
}

impl Default for AudioReactiveMapping {
    fn default() -> Self {
        Self {
            bass_to_height: 0.35,
            low_mid_to_height: 0.2,
            high_mid_to_height: 0.1,
            high_mid_to_spread: 0.15,
            energy_to_size: 0.25,
            base_opacity: 0.6,
            energy_to_opacity: 0.1,
        }
    }
}

/// Mapping from elapsed time and feature bands to HSL color
#[derive(Debug, Clone)]
pub struct ColorMapping {
    /// Starting hue in turns [0, 1)
    /// 0.555 ≈ #00aaff water blue
    pub base_hue: f32,

    /// Hue drift (turns per second)
    pub hue_drift_per_s: f32,

    /// Hue offset per unit treble (turns)
    pub treble_to_hue: f32,

    /// Saturation with no audio
    pub base_saturation: f32,

    /// Saturation gain per unit low-mid
    pub low_mid_to_saturation: f32,

    /// Lightness with no audio
    pub base_lightness: f32,

    /// Lightness gain per unit bass
    pub bass_to_lightness: f32,

    /// Upper lightness clamp (keeps colors from washing out to white)
    pub max_lightness: f32,
}

impl Default for ColorMapping {
    fn default() -> Self {
        Self {
            base_hue: 0.555,
            hue_drift_per_s: 0.05,
            treble_to_hue: 0.1,
            base_saturation: 0.6,
            low_mid_to_saturation: 0.15,
            base_lightness: 0.45,
            bass_to_lightness: 0.1,
            max_lightness: 0.85,
        }
    }
}

/// Spatial arrangement of the fountains
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EnsembleLayout {
    /// Evenly spaced along the X axis, centered on the origin
    Line { spacing_m: f32 },
    /// Evenly spaced on a circle in the XZ plane
    Ring { radius_m: f32 },
}

impl Default for EnsembleLayout {
    fn default() -> Self {
        Self::Line { spacing_m: 12.0 }
    }
}

/// Ensemble construction parameters
#[derive(Debug, Clone)]
pub struct EnsembleConfig {
    /// Number of fountains
    pub fountain_count: usize,

    /// Where the fountains stand
    pub layout: EnsembleLayout,

    /// Initial motion types, cycled when shorter than `fountain_count`
    pub motion_types: Vec<MotionType>,

    /// Seed for particle pool generation (fountain i uses pool_seed + i)
    pub pool_seed: u64,

    pub physics: FountainPhysics,
    pub mapping: AudioReactiveMapping,
    pub color: ColorMapping,
}

impl Default for EnsembleConfig {
    fn default() -> Self {
        Self {
            fountain_count: 5,
            layout: EnsembleLayout::default(),
            motion_types: MotionType::ALL.to_vec(),
            pool_seed: 42,
            physics: FountainPhysics::default(),
            mapping: AudioReactiveMapping::default(),
            color: ColorMapping::default(),
        }
    }
}

impl EnsembleConfig {
    pub fn validate(&self) -> Result<()> {
        self.physics.validate()?;
        match self.layout {
            EnsembleLayout::Line { spacing_m } if !spacing_m.is_finite() => Err(
                Error::InvalidConfig(format!("line spacing must be finite, got {}", spacing_m)),
            ),
            EnsembleLayout::Ring { radius_m } if !radius_m.is_finite() => Err(
                Error::InvalidConfig(format!("ring radius must be finite, got {}", radius_m)),
            ),
            _ => Ok(()),
        }
    }
}
