//! The set of fountains in the scene and the per-frame update pass.

use glam::Vec3;
use log::{info, warn};
use std::f32::consts::TAU;

use super::{ColorState, FountainInstance, MotionType, ParticleField};
use crate::error::{Error, Result};
use crate::features::FeatureVector;
use crate::params::{EnsembleConfig, EnsembleLayout};

/// Read-only view of one fountain for the renderer
pub struct FountainView<'a> {
    pub index: usize,
    /// World-space nozzle position; particle positions are relative to it
    pub position: Vec3,
    pub motion: MotionType,
    pub color: ColorState,
    pub field: &'a ParticleField,
}

/// Nozzle positions for `count` fountains
pub fn layout_positions(layout: EnsembleLayout, count: usize) -> Vec<Vec3> {
    match layout {
        EnsembleLayout::Line { spacing_m } => {
            let center = (count.saturating_sub(1)) as f32 * 0.5;
            (0..count)
                .map(|i| Vec3::new((i as f32 - center) * spacing_m, 0.0, 0.0))
                .collect()
        }
        EnsembleLayout::Ring { radius_m } => (0..count)
            .map(|i| {
                let angle = i as f32 / count as f32 * TAU;
                Vec3::new(angle.cos() * radius_m, 0.0, angle.sin() * radius_m)
            })
            .collect(),
    }
}

/// All fountains, updated together once per frame
pub struct FountainEnsemble {
    instances: Vec<FountainInstance>,
}

impl FountainEnsemble {
    /// Build the ensemble described by `config`
    pub fn new(config: &EnsembleConfig) -> Result<Self> {
        config.validate()?;

        let positions = layout_positions(config.layout, config.fountain_count);
        let instances = positions
            .into_iter()
            .enumerate()
            .map(|(i, position)| {
                let motion = if config.motion_types.is_empty() {
                    MotionType::default()
                } else {
                    config.motion_types[i % config.motion_types.len()]
                };
                let field = ParticleField::new(
                    config.physics.clone(),
                    config.mapping.clone(),
                    config.pool_seed.wrapping_add(i as u64),
                );
                FountainInstance::new(position, motion, field, config.color.clone())
            })
            .collect::<Vec<_>>();

        info!(
            "Ensemble: {} fountains x {} particles ({:?})",
            instances.len(),
            config.physics.particle_count,
            config.layout
        );

        Ok(Self { instances })
    }

    /// Advance every fountain by `dt` seconds with the current features
    pub fn update(&mut self, dt: f32, features: &FeatureVector) {
        for instance in &mut self.instances {
            instance.update(dt, features);
        }
    }

    /// Reassign one fountain's motion style by name
    ///
    /// An unrecognised name is not an error: it logs a warning and applies
    /// `basic`. An out-of-range index is rejected and nothing changes.
    ///
    /// # Returns
    /// * `Ok(motion)` with the type actually applied, so `Ok(MotionType::Basic)`
    ///   for an unrecognised name; callers spot the fallback by comparing it
    ///   with what they asked for
    /// * `Err(InvalidFountainIndex)` for a bad index
    pub fn set_motion_type(&mut self, index: usize, name: &str) -> Result<MotionType> {
        let motion = name.parse::<MotionType>().unwrap_or_else(|e| {
            warn!("{}, using {}", e, MotionType::Basic);
            MotionType::Basic
        });
        self.set_motion(index, motion)?;
        Ok(motion)
    }

    /// Reassign one fountain's motion style
    pub fn set_motion(&mut self, index: usize, motion: MotionType) -> Result<()> {
        let count = self.instances.len();
        let instance = self
            .instances
            .get_mut(index)
            .ok_or(Error::InvalidFountainIndex { index, count })?;
        instance.set_motion(motion);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn instance(&self, index: usize) -> Option<&FountainInstance> {
        self.instances.get(index)
    }

    pub fn instances(&self) -> &[FountainInstance] {
        &self.instances
    }

    pub fn motion_types(&self) -> Vec<MotionType> {
        self.instances.iter().map(|i| i.motion()).collect()
    }

    /// Per-fountain views for the renderer, in index order
    pub fn views(&self) -> impl Iterator<Item = FountainView<'_>> {
        self.instances
            .iter()
            .enumerate()
            .map(|(index, instance)| FountainView {
                index,
                position: instance.position(),
                motion: instance.motion(),
                color: instance.color(),
                field: instance.field(),
            })
    }

    /// Total particles across all fountains
    pub fn particle_count(&self) -> usize {
        self.instances.iter().map(|i| i.field().capacity()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::FountainPhysics;

    fn config() -> EnsembleConfig {
        EnsembleConfig {
            physics: FountainPhysics {
                particle_count: 400,
                ..FountainPhysics::default()
            },
            ..EnsembleConfig::default()
        }
    }

    fn positions(ensemble: &FountainEnsemble, index: usize) -> Vec<Vec3> {
        ensemble.instances()[index].field().render_positions().collect()
    }

    #[test]
    fn test_default_ensemble_layout() {
        let ensemble = FountainEnsemble::new(&config()).unwrap();
        assert_eq!(ensemble.len(), 5);
        assert_eq!(ensemble.motion_types(), MotionType::ALL.to_vec());
        assert_eq!(ensemble.particle_count(), 2000);

        let xs: Vec<f32> = ensemble.views().map(|v| v.position.x).collect();
        assert_eq!(xs, vec![-24.0, -12.0, 0.0, 12.0, 24.0]);
    }

    #[test]
    fn test_ring_layout() {
        let ring = layout_positions(EnsembleLayout::Ring { radius_m: 10.0 }, 4);
        assert_eq!(ring.len(), 4);
        for p in &ring {
            assert!((p.length() - 10.0).abs() < 1e-4);
            assert_eq!(p.y, 0.0);
        }
        assert!(layout_positions(EnsembleLayout::Ring { radius_m: 10.0 }, 0).is_empty());
    }

    #[test]
    fn test_set_motion_type_isolated() {
        let mut control = FountainEnsemble::new(&config()).unwrap();
        let mut switched = FountainEnsemble::new(&config()).unwrap();
        let features = FeatureVector::splat(1.0);

        assert_eq!(switched.set_motion_type(2, "dome").unwrap(), MotionType::Dome);

        for _ in 0..30 {
            control.update(0.016, &features);
            switched.update(0.016, &features);
        }

        for index in [0, 1, 3, 4] {
            assert_eq!(positions(&control, index), positions(&switched, index));
            assert_eq!(
                control.instances()[index].color(),
                switched.instances()[index].color()
            );
        }
        assert_ne!(positions(&control, 2), positions(&switched, 2));
        assert_eq!(switched.instance(2).unwrap().motion(), MotionType::Dome);
    }

    #[test]
    fn test_invalid_index_rejected() {
        let mut ensemble = FountainEnsemble::new(&config()).unwrap();
        let before = ensemble.motion_types();

        let err = ensemble.set_motion_type(5, "wave").unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidFountainIndex { index: 5, count: 5 }
        ));
        assert_eq!(ensemble.motion_types(), before);
    }

    #[test]
    fn test_unknown_type_falls_back_to_basic() {
        let mut ensemble = FountainEnsemble::new(&config()).unwrap();
        let applied = ensemble.set_motion_type(1, "geyser").unwrap();
        assert_eq!(applied, MotionType::Basic);
        assert_ne!(applied.name(), "geyser");
        assert_eq!(ensemble.instance(1).unwrap().motion(), MotionType::Basic);

        // A recognised name reports itself back
        assert_eq!(ensemble.set_motion_type(1, " Wave ").unwrap(), MotionType::Wave);
    }

    #[test]
    fn test_empty_pools_render_nothing() {
        let mut config = config();
        config.physics.particle_count = 0;
        let mut ensemble = FountainEnsemble::new(&config).unwrap();
        ensemble.update(0.016, &FeatureVector::splat(2.0));

        assert_eq!(ensemble.particle_count(), 0);
        assert!(ensemble.views().all(|v| v.field.is_empty()));
    }

    #[test]
    fn test_motion_types_cycle() {
        let mut config = config();
        config.fountain_count = 7;
        config.motion_types = vec![MotionType::Wave, MotionType::Random];
        let ensemble = FountainEnsemble::new(&config).unwrap();
        assert_eq!(ensemble.motion_types()[6], MotionType::Wave);
        assert_eq!(ensemble.motion_types()[5], MotionType::Random);
    }
}
