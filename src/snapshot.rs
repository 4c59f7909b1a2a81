//! Recording mode: side-view PNG snapshots of the particle buffers.
//!
//! A CPU point splat for inspecting the simulation offline; real rendering
//! belongs to a GPU frontend consuming [`FountainView`]s.

use image::{Rgba, RgbaImage};

use crate::error::Result;
use crate::fountain::{FountainEnsemble, FountainView};
use crate::params::RecordingConfig;

const BACKGROUND: Rgba<u8> = Rgba([6, 8, 18, 255]);

/// Horizontal margin around the outermost fountains (meters)
const MARGIN_M: f32 = 6.0;

/// Particle size drawn at full point brightness
const SIZE_REFERENCE: f32 = 0.25;

/// World X range covered by a snapshot
fn horizontal_extent(ensemble: &FountainEnsemble) -> (f32, f32) {
    let (lo, hi) = ensemble
        .views()
        .map(|v| v.position.x)
        .fold((0.0f32, 0.0f32), |(lo, hi), x| (lo.min(x), hi.max(x)));
    (lo - MARGIN_M, hi + MARGIN_M)
}

/// Additively splat one fountain into `image`
fn splat(
    image: &mut RgbaImage,
    view: &FountainView<'_>,
    x_range: (f32, f32),
    view_height_m: f32,
) {
    let (width, height) = image.dimensions();
    let [r, g, b] = view.color.to_rgb8();
    let modulation = view.field.modulation();

    let span = (x_range.1 - x_range.0).max(f32::EPSILON);
    for (p, size) in view.field.render_positions().zip(view.field.sizes()) {
        let world_x = view.position.x + p.x;
        let u = (world_x - x_range.0) / span;
        let v = 1.0 - p.y / view_height_m;
        if !(0.0..1.0).contains(&u) || !(0.0..1.0).contains(&v) {
            continue;
        }

        // Dim each point so dense streams build up brightness; bigger drops glow more
        let size_weight = (size * modulation.size_scale / SIZE_REFERENCE).min(2.0);
        let weight = modulation.opacity * size_weight * 0.35;
        let add = |c: u8| (f32::from(c) * weight) as u8;
        let (dr, dg, db) = (add(r), add(g), add(b));

        let px = (u * width as f32) as u32;
        let py = (v * height as f32) as u32;
        let pixel = image.get_pixel_mut(px.min(width - 1), py.min(height - 1));
        pixel.0[0] = pixel.0[0].saturating_add(dr);
        pixel.0[1] = pixel.0[1].saturating_add(dg);
        pixel.0[2] = pixel.0[2].saturating_add(db);
    }
}

/// Draw the whole ensemble seen from the front (X right, Y up)
pub fn render_side_view(ensemble: &FountainEnsemble, config: &RecordingConfig) -> RgbaImage {
    let mut image = RgbaImage::from_pixel(config.width.max(1), config.height.max(1), BACKGROUND);
    let x_range = horizontal_extent(ensemble);
    let view_height = config.view_height_m.max(f32::EPSILON);

    for view in ensemble.views() {
        splat(&mut image, &view, x_range, view_height);
    }
    image
}

/// Render and save the snapshot for `frame_num`
pub fn save_snapshot(
    ensemble: &FountainEnsemble,
    config: &RecordingConfig,
    frame_num: usize,
) -> Result<()> {
    let image = render_side_view(ensemble, config);
    image.save(config.frame_path(frame_num))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::FeatureVector;
    use crate::params::{EnsembleConfig, FountainPhysics};

    fn ensemble() -> FountainEnsemble {
        let config = EnsembleConfig {
            physics: FountainPhysics {
                particle_count: 500,
                ..FountainPhysics::default()
            },
            ..EnsembleConfig::default()
        };
        let mut ensemble = FountainEnsemble::new(&config).unwrap();
        ensemble.update(0.5, &FeatureVector::splat(1.0));
        ensemble
    }

    fn small_config(dir: &str) -> RecordingConfig {
        RecordingConfig {
            width: 160,
            height: 60,
            ..RecordingConfig::new(dir, 1)
        }
    }

    #[test]
    fn test_side_view_draws_particles() {
        let config = small_config("unused");
        let image = render_side_view(&ensemble(), &config);

        assert_eq!(image.dimensions(), (160, 60));
        let lit = image.pixels().filter(|p| **p != BACKGROUND).count();
        assert!(lit > 0);
    }

    #[test]
    fn test_empty_ensemble_is_blank() {
        let config = EnsembleConfig {
            fountain_count: 0,
            ..EnsembleConfig::default()
        };
        let ensemble = FountainEnsemble::new(&config).unwrap();
        let image = render_side_view(&ensemble, &small_config("unused"));
        assert!(image.pixels().all(|p| *p == BACKGROUND));
    }

    #[test]
    fn test_save_snapshot() {
        let dir = std::env::temp_dir().join(format!("fountain-snap-{}", std::process::id()));
        let config = small_config(dir.to_str().unwrap());
        std::fs::create_dir_all(config.frames_dir()).unwrap();

        save_snapshot(&ensemble(), &config, 3).unwrap();
        assert!(std::path::Path::new(&config.frame_path(3)).exists());

        std::fs::remove_dir_all(&dir).ok();
    }
}
