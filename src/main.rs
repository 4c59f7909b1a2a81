//! Dancing Fountain - audio-reactive particle fountains
//!
//! Plays procedural music (or a WAV track), analyses it, and drives an
//! ensemble of particle fountains from the resulting band features.

use clap::Parser;
use log::{info, warn};
use std::ops::ControlFlow;

use dancing_fountain::audio::{AudioInput, AudioSystem};
use dancing_fountain::cli::Args;
use dancing_fountain::features::{AudioFeatureExtractor, NullSpectrum, SpectrumSource};
use dancing_fountain::fountain::FountainEnsemble;
use dancing_fountain::frame::{FrameClock, FrameLoop};
use dancing_fountain::params::AudioConfig;
use dancing_fountain::snapshot::save_snapshot;
use dancing_fountain::Error;

/// Open the requested audio source, or a silent one
///
/// A WAV file that can't be read is fatal; a missing audio device falls
/// back to silence.
///
/// # Returns
/// * The source, and whether it ends on its own (a playing track)
fn open_source(
    args: &Args,
    audio_config: AudioConfig,
) -> dancing_fountain::Result<(Box<dyn SpectrumSource>, bool)> {
    let silent = NullSpectrum {
        bins: audio_config.bin_count(),
    };
    let Some(input) = args.audio_input() else {
        info!("Running silent");
        return Ok((Box::new(silent), false));
    };

    let plays_track = matches!(input, AudioInput::Wav(_));
    match AudioSystem::new(audio_config, input) {
        Ok(audio) => Ok((Box::new(audio), plays_track)),
        Err(e @ Error::Wav(_)) => Err(e),
        Err(e) => {
            warn!("Audio unavailable ({}), running silent", e);
            Ok((Box::new(silent), false))
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    info!("Dancing Fountain - audio-reactive particle fountains");

    let ensemble = FountainEnsemble::new(&args.ensemble_config())?;
    let recording = args.recording_config()?;
    let switches = args.parse_switches()?;

    let audio_config = AudioConfig::default();
    audio_config.validate()?;
    let (source, source_ends) = open_source(&args, audio_config)?;
    let max_frames = args.max_frames(args.fps, source_ends);
    let extractor = AudioFeatureExtractor::new(source, args.spectrum_config())?;

    let mut frame_loop = FrameLoop::new(extractor, ensemble);
    let mut clock = FrameClock::new(args.fps);
    let mut pending = switches.iter().peekable();

    let frames = frame_loop.run(
        || clock.tick(),
        |report, ensemble| {
            while let Some(switch) = pending.next_if(|s| s.frame <= report.frame) {
                match ensemble.set_motion_type(switch.index, &switch.motion) {
                    Ok(motion) => info!(
                        "Frame {}: fountain {} -> {}",
                        report.frame, switch.index, motion
                    ),
                    Err(e) => warn!("Frame {}: switch rejected: {}", report.frame, e),
                }
            }

            if let Some(config) = &recording {
                if config.captures(report.frame) {
                    if let Err(e) = save_snapshot(ensemble, config, report.frame) {
                        warn!("Snapshot for frame {} failed: {}", report.frame, e);
                    }
                }
            }

            if report.ends_run(max_frames) {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        },
    );

    let stats = frame_loop.shutdown();
    info!(
        "Ran {} frames (spectrum ready {}, silent {}, skipped {})",
        frames, stats.ready, stats.silent, stats.skipped
    );
    Ok(())
}
