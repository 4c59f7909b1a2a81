//! Command-line argument parsing.

use clap::Parser;
use log::{info, warn};
use std::path::PathBuf;

use crate::audio::AudioInput;
use crate::error::{Error, Result};
use crate::fountain::MotionType;
use crate::params::{
    EnsembleConfig, EnsembleLayout, FountainPhysics, RecordingConfig, SilencePolicy,
    SpectrumConfig,
};

/// Seconds to run when no duration is given and no track bounds the run
const DEFAULT_DURATION_S: f32 = 30.0;

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "dancing-fountain")]
#[command(about = "Audio-reactive dancing fountain simulator", long_about = None)]
pub struct Args {
    /// Number of fountains
    #[arg(long, default_value = "5")]
    pub fountains: usize,

    /// Particles per fountain
    #[arg(long, default_value = "5000")]
    pub particles: usize,

    /// Motion types, comma separated, cycled over the fountains
    #[arg(long, value_delimiter = ',', default_value = "basic,dome,spinning,wave,random")]
    pub types: Vec<String>,

    /// Fountain layout: line (default) or ring
    #[arg(long, default_value = "line")]
    pub layout: String,

    /// Distance between fountains in line layout (meters)
    #[arg(long, value_name = "METERS", default_value = "12")]
    pub spacing: f32,

    /// Circle radius in ring layout (meters)
    #[arg(long, value_name = "METERS", default_value = "20")]
    pub radius: f32,

    /// Spectrum smoothing factor in [0, 1]
    #[arg(long, default_value = "0.8")]
    pub smoothing: f32,

    /// Features while nothing plays: decay (default) or hold
    #[arg(long, default_value = "decay")]
    pub silence: String,

    /// Play a WAV file instead of the procedural synth
    #[arg(long, value_name = "FILE", conflicts_with = "silent")]
    pub wav: Option<PathBuf>,

    /// Run without audio output (features decay to zero)
    #[arg(long)]
    pub silent: bool,

    /// Run length in seconds (default: until the track ends, else 30)
    #[arg(long, value_name = "SECONDS")]
    pub duration: Option<f32>,

    /// Target frame rate (0 = unpaced)
    #[arg(long, default_value = "60")]
    pub fps: u32,

    /// Scheduled motion change FRAME:INDEX:TYPE (repeatable)
    #[arg(long, value_name = "FRAME:INDEX:TYPE")]
    pub switch: Vec<String>,

    /// Write side-view PNG snapshots into this directory
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<String>,

    /// Snapshot interval in frames
    #[arg(long, value_name = "FRAMES", default_value = "30")]
    pub snapshot_every: usize,

    /// Particle pool seed
    #[arg(long, default_value = "42")]
    pub seed: u64,
}

/// A motion type change applied at a given frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledSwitch {
    pub frame: usize,
    pub index: usize,
    pub motion: String,
}

impl std::str::FromStr for ScheduledSwitch {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid =
            || Error::InvalidConfig(format!("bad switch '{}', want FRAME:INDEX:TYPE", s));
        let mut parts = s.splitn(3, ':');
        let frame = parts.next().and_then(|p| p.trim().parse().ok());
        let index = parts.next().and_then(|p| p.trim().parse().ok());
        let motion = parts.next().map(str::trim).filter(|m| !m.is_empty());

        match (frame, index, motion) {
            (Some(frame), Some(index), Some(motion)) => Ok(Self {
                frame,
                index,
                motion: motion.to_string(),
            }),
            _ => Err(invalid()),
        }
    }
}

impl Args {
    /// Parse the layout flag
    pub fn parse_layout(&self) -> EnsembleLayout {
        match self.layout.to_lowercase().as_str() {
            "line" => EnsembleLayout::Line {
                spacing_m: self.spacing,
            },
            "ring" => EnsembleLayout::Ring {
                radius_m: self.radius,
            },
            other => {
                warn!("Unknown layout '{}', using line", other);
                EnsembleLayout::Line {
                    spacing_m: self.spacing,
                }
            }
        }
    }

    /// Parse the motion type list; unknown names fall back to basic
    pub fn parse_motion_types(&self) -> Vec<MotionType> {
        let types: Vec<MotionType> = self
            .types
            .iter()
            .map(|name| {
                name.parse().unwrap_or_else(|_| {
                    warn!("Unknown motion type '{}', using basic", name);
                    MotionType::Basic
                })
            })
            .collect();

        if types.is_empty() {
            MotionType::ALL.to_vec()
        } else {
            types
        }
    }

    pub fn ensemble_config(&self) -> EnsembleConfig {
        EnsembleConfig {
            fountain_count: self.fountains,
            layout: self.parse_layout(),
            motion_types: self.parse_motion_types(),
            pool_seed: self.seed,
            physics: FountainPhysics {
                particle_count: self.particles,
                ..FountainPhysics::default()
            },
            ..EnsembleConfig::default()
        }
    }

    pub fn spectrum_config(&self) -> SpectrumConfig {
        let silence_policy = match self.silence.to_lowercase().as_str() {
            "hold" => SilencePolicy::Hold,
            "decay" => SilencePolicy::Decay,
            other => {
                warn!("Unknown silence policy '{}', using decay", other);
                SilencePolicy::Decay
            }
        };

        SpectrumConfig {
            smoothing_factor: self.smoothing,
            silence_policy,
            ..SpectrumConfig::default()
        }
    }

    /// Audio input, or None when running silent
    pub fn audio_input(&self) -> Option<AudioInput> {
        if self.silent {
            return None;
        }
        Some(match &self.wav {
            Some(path) => AudioInput::Wav(path.clone()),
            None => AudioInput::Synth,
        })
    }

    /// Frame budget for the run
    ///
    /// # Arguments
    /// * `fps` - Frame rate the budget is counted against
    /// * `source_ends` - The opened source stops on its own (a playing track)
    ///
    /// # Returns
    /// * `None` only when no duration was given and the source will end the
    ///   run itself; a source that never finishes always gets a budget
    pub fn max_frames(&self, fps: u32, source_ends: bool) -> Option<usize> {
        let duration = match self.duration {
            Some(duration) => duration,
            None if source_ends => return None,
            None => DEFAULT_DURATION_S,
        };
        let fps = if fps == 0 { 60 } else { fps };
        Some((duration.max(0.0) * fps as f32).ceil() as usize)
    }

    /// Create recording configuration if recording mode is enabled
    pub fn recording_config(&self) -> Result<Option<RecordingConfig>> {
        let Some(dir) = &self.output_dir else {
            return Ok(None);
        };

        let config = RecordingConfig::new(dir.clone(), self.snapshot_every);
        std::fs::create_dir_all(config.frames_dir())?;
        info!(
            "Recording every {} frames into {}",
            config.snapshot_every,
            config.frames_dir()
        );
        Ok(Some(config))
    }

    /// Parse all `--switch` entries, sorted by frame
    pub fn parse_switches(&self) -> Result<Vec<ScheduledSwitch>> {
        let mut switches = self
            .switch
            .iter()
            .map(|s| s.parse())
            .collect::<Result<Vec<ScheduledSwitch>>>()?;
        switches.sort_by_key(|s| s.frame);
        Ok(switches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{AudioFeatureExtractor, NullSpectrum};
    use crate::fountain::FountainEnsemble;
    use crate::frame::FrameLoop;
    use std::ops::ControlFlow;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["dancing-fountain"];
        argv.extend_from_slice(extra);
        Args::parse_from(argv)
    }

    #[test]
    fn test_defaults() {
        let args = args(&[]);
        let config = args.ensemble_config();
        assert_eq!(config.fountain_count, 5);
        assert_eq!(config.motion_types, MotionType::ALL.to_vec());
        assert_eq!(config.physics.particle_count, 5000);
        assert_eq!(config.layout, EnsembleLayout::Line { spacing_m: 12.0 });
        assert!(matches!(args.audio_input(), Some(AudioInput::Synth)));
        assert_eq!(args.max_frames(60, false), Some(1800));
        assert!(args.recording_config().unwrap().is_none());
    }

    #[test]
    fn test_unknown_type_falls_back_to_basic() {
        let args = args(&["--types", "wave, fireworks ,DOME"]);
        assert_eq!(
            args.parse_motion_types(),
            vec![MotionType::Wave, MotionType::Basic, MotionType::Dome]
        );
    }

    #[test]
    fn test_ring_layout_and_silence_policy() {
        let args = args(&["--layout", "ring", "--radius", "8", "--silence", "hold"]);
        assert_eq!(
            args.ensemble_config().layout,
            EnsembleLayout::Ring { radius_m: 8.0 }
        );
        assert_eq!(args.spectrum_config().silence_policy, SilencePolicy::Hold);
    }

    #[test]
    fn test_wav_runs_until_track_ends() {
        let unbounded = args(&["--wav", "song.wav"]);
        assert!(matches!(unbounded.audio_input(), Some(AudioInput::Wav(_))));
        assert_eq!(unbounded.max_frames(60, true), None);

        let bounded = args(&["--wav", "song.wav", "--duration", "2"]);
        assert_eq!(bounded.max_frames(30, true), Some(60));
    }

    #[test]
    fn test_wav_without_audio_still_stops() {
        // Track requested but the silent fallback source is running instead
        let args = args(&["--wav", "missing.wav"]);
        let budget = args.max_frames(60, false);
        assert_eq!(budget, Some(1800));

        let extractor =
            AudioFeatureExtractor::new(NullSpectrum { bins: 64 }, args.spectrum_config()).unwrap();
        let ensemble = FountainEnsemble::new(&EnsembleConfig {
            fountain_count: 1,
            physics: FountainPhysics {
                particle_count: 10,
                ..FountainPhysics::default()
            },
            ..EnsembleConfig::default()
        })
        .unwrap();
        let mut frame_loop = FrameLoop::new(extractor, ensemble);

        let frames = frame_loop.run(
            || 1.0 / 60.0,
            |report, _| {
                if report.ends_run(budget) {
                    ControlFlow::Break(())
                } else {
                    ControlFlow::Continue(())
                }
            },
        );
        assert_eq!(frames, 1800);
    }

    #[test]
    fn test_silent_has_no_input() {
        let args = args(&["--silent", "--duration", "1"]);
        assert!(args.audio_input().is_none());
        assert_eq!(args.max_frames(0, false), Some(60));
    }

    #[test]
    fn test_parse_switches() {
        let args = args(&["--switch", "120:2:dome", "--switch", "30:0:wave"]);
        let switches = args.parse_switches().unwrap();
        assert_eq!(
            switches,
            vec![
                ScheduledSwitch {
                    frame: 30,
                    index: 0,
                    motion: "wave".to_string()
                },
                ScheduledSwitch {
                    frame: 120,
                    index: 2,
                    motion: "dome".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_malformed_switch_rejected() {
        for bad in ["abc", "10:dome", "10:x:dome", "10:1:", "-1:0:wave"] {
            assert!(bad.parse::<ScheduledSwitch>().is_err(), "{}", bad);
        }
    }

    #[test]
    fn test_recording_config_creates_dirs() {
        let dir = std::env::temp_dir().join(format!("fountain-cli-{}", std::process::id()));
        let dir_str = dir.to_str().unwrap().to_string();
        let args = args(&["--output-dir", &dir_str, "--snapshot-every", "5"]);

        let config = args.recording_config().unwrap().unwrap();
        assert_eq!(config.snapshot_every, 5);
        assert!(std::path::Path::new(&config.frames_dir()).is_dir());

        std::fs::remove_dir_all(&dir).ok();
    }
}
