//! Frame scheduling: one pass per display refresh drives extraction and simulation.

use log::{debug, info};
use std::ops::ControlFlow;
use std::thread;
use std::time::{Duration, Instant};

use crate::features::{AudioFeatureExtractor, ExtractorStats, FeatureVector, SpectrumSource};
use crate::fountain::FountainEnsemble;

/// Wall-clock frame pacing
pub struct FrameClock {
    /// Target frame duration (None = run as fast as possible)
    target: Option<Duration>,
    last: Instant,
    /// Upper bound on a reported delta, so a stall doesn't jump the simulation
    max_dt_s: f32,
}

impl FrameClock {
    /// Clock pacing to `fps` frames per second (0 = unpaced)
    pub fn new(fps: u32) -> Self {
        let target = (fps > 0).then(|| Duration::from_secs_f64(1.0 / f64::from(fps)));
        Self {
            target,
            last: Instant::now(),
            max_dt_s: 0.25,
        }
    }

    /// Wait for the next frame slot and return the elapsed delta (seconds)
    pub fn tick(&mut self) -> f32 {
        if let Some(target) = self.target {
            let next = self.last + target;
            let now = Instant::now();
            if next > now {
                thread::sleep(next - now);
            }
        }

        let now = Instant::now();
        let dt = now.duration_since(self.last).as_secs_f32();
        self.last = now;
        dt.min(self.max_dt_s)
    }
}

/// What happened in one frame
#[derive(Debug, Clone, Copy)]
pub struct FrameReport {
    /// Zero-based frame number
    pub frame: usize,
    pub dt: f32,
    pub features: FeatureVector,
    /// The audio source has nothing more to play
    pub source_finished: bool,
}

impl FrameReport {
    /// Whether a run limited to `max_frames` frames should stop after this one
    ///
    /// With no budget the run lasts until the source finishes.
    pub fn ends_run(&self, max_frames: Option<usize>) -> bool {
        let out_of_time = max_frames.is_some_and(|max| self.frame + 1 >= max);
        out_of_time || self.source_finished
    }
}

/// Owns the extractor and the ensemble and advances them together.
///
/// Dropping the loop (or calling [`FrameLoop::shutdown`]) drops the
/// extractor's spectrum source, releasing any audio resources.
pub struct FrameLoop<S: SpectrumSource> {
    extractor: AudioFeatureExtractor<S>,
    ensemble: FountainEnsemble,
    frame: usize,
}

impl<S: SpectrumSource> FrameLoop<S> {
    pub fn new(extractor: AudioFeatureExtractor<S>, ensemble: FountainEnsemble) -> Self {
        Self {
            extractor,
            ensemble,
            frame: 0,
        }
    }

    /// Run one frame: poll audio features, then update every fountain
    pub fn step(&mut self, dt: f32) -> FrameReport {
        let features = self.extractor.tick();
        self.ensemble.update(dt, &features);

        let report = FrameReport {
            frame: self.frame,
            dt,
            features,
            source_finished: self.extractor.source().finished(),
        };
        self.frame += 1;
        report
    }

    /// Run frames until `host` breaks
    ///
    /// # Arguments
    /// * `next_dt` - Frame driver; returns the delta for the coming frame
    /// * `host` - Called after every frame with its report and the ensemble
    ///   (for rendering and control); return `Break` to stop
    ///
    /// # Returns
    /// * Number of frames run
    pub fn run<D, H>(&mut self, mut next_dt: D, mut host: H) -> usize
    where
        D: FnMut() -> f32,
        H: FnMut(&FrameReport, &mut FountainEnsemble) -> ControlFlow<()>,
    {
        let first = self.frame;
        loop {
            let report = self.step(next_dt());

            if report.frame % 600 == 0 {
                let stats = self.extractor.stats();
                debug!(
                    "Frame {}: features {:?}, ticks ready/silent/skipped {}/{}/{}",
                    report.frame, report.features, stats.ready, stats.silent, stats.skipped
                );
            }

            if host(&report, &mut self.ensemble).is_break() {
                break;
            }
        }
        self.frame - first
    }

    pub fn frame(&self) -> usize {
        self.frame
    }

    pub fn ensemble(&self) -> &FountainEnsemble {
        &self.ensemble
    }

    /// Control access (e.g. motion type changes between frames)
    pub fn ensemble_mut(&mut self) -> &mut FountainEnsemble {
        &mut self.ensemble
    }

    pub fn extractor(&self) -> &AudioFeatureExtractor<S> {
        &self.extractor
    }

    /// Stop for good, releasing the audio source
    pub fn shutdown(self) -> ExtractorStats {
        let stats = self.extractor.stats();
        drop(self.extractor);
        info!("Frame loop stopped after {} frames", self.frame);
        stats
    }
}
