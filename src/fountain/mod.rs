//! Fountain simulation: motion styles, particle pools, color and the ensemble.

mod color;
mod ensemble;
mod instance;
mod motion;
mod particle;

// Re-export public types
pub use color::ColorState;
pub use ensemble::{layout_positions, FountainEnsemble, FountainView};
pub use instance::FountainInstance;
pub use motion::MotionType;
pub use particle::{
    phase_time, spawn_particles, FieldModulation, Particle, ParticleField, ParticleVertex,
};
