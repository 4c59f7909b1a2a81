//! Per-frame spectrum polling and band averaging.

use log::{debug, trace};
use std::ops::Range;

use super::{FeatureVector, SpectrumSmoother};
use crate::error::Result;
use crate::params::{BandLayout, SilencePolicy, SpectrumConfig};

/// Outcome of polling a spectrum source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpectrumPoll {
    /// `bins` holds a fresh magnitude array
    Ready,
    /// Nothing is playing; `bins` is untouched
    NotPlaying,
    /// The source could not be read this tick; `bins` is untouched
    Unavailable,
}

/// Producer of frequency-domain magnitude arrays.
///
/// Implementations must not block: a source that cannot hand over its data
/// right now reports [`SpectrumPoll::Unavailable`].
pub trait SpectrumSource {
    /// Fixed length of the magnitude array
    fn bin_count(&self) -> usize;

    /// Copy the latest non-negative magnitudes into `bins` (len == `bin_count()`)
    fn poll(&mut self, bins: &mut [f32]) -> SpectrumPoll;

    /// True once the source will never play again (e.g. a track has ended)
    fn finished(&self) -> bool {
        false
    }
}

impl<S: SpectrumSource + ?Sized> SpectrumSource for Box<S> {
    fn bin_count(&self) -> usize {
        (**self).bin_count()
    }

    fn poll(&mut self, bins: &mut [f32]) -> SpectrumPoll {
        (**self).poll(bins)
    }

    fn finished(&self) -> bool {
        (**self).finished()
    }
}

/// Source that never plays anything
#[derive(Debug, Clone, Copy)]
pub struct NullSpectrum {
    pub bins: usize,
}

impl SpectrumSource for NullSpectrum {
    fn bin_count(&self) -> usize {
        self.bins
    }

    fn poll(&mut self, _bins: &mut [f32]) -> SpectrumPoll {
        SpectrumPoll::NotPlaying
    }
}

/// Tick counters, by poll outcome
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractorStats {
    pub ready: u64,
    pub silent: u64,
    pub skipped: u64,
}

/// Mean of `bins[range]`, with the range clipped to the array.
///
/// Negative or non-finite magnitudes count as zero; an empty window is 0.
fn window_average(bins: &[f32], range: &Range<usize>) -> f32 {
    let end = range.end.min(bins.len());
    let start = range.start.min(end);
    let window = &bins[start..end];
    if window.is_empty() {
        return 0.0;
    }

    let sum: f32 = window
        .iter()
        .map(|&m| if m.is_finite() && m > 0.0 { m } else { 0.0 })
        .sum();
    sum / window.len() as f32
}

/// Average a magnitude array into the four raw (unsmoothed) bands
pub fn band_intensities(bins: &[f32], bands: &BandLayout, scale: f32) -> FeatureVector {
    FeatureVector {
        bass: window_average(bins, &bands.bass) * scale,
        low_mid: window_average(bins, &bands.low_mid) * scale,
        high_mid: window_average(bins, &bands.high_mid) * scale,
        treble: window_average(bins, &(0..bins.len())) * scale,
    }
}

/// Turns the source's spectrum into one smoothed [`FeatureVector`] per tick.
///
/// The extractor owns its source, so dropping the extractor (or whatever
/// owns it) releases the audio resources behind it.
pub struct AudioFeatureExtractor<S: SpectrumSource> {
    source: S,
    config: SpectrumConfig,
    smoother: SpectrumSmoother,
    bins: Vec<f32>,
    current: FeatureVector,
    stats: ExtractorStats,
}

impl<S: SpectrumSource> AudioFeatureExtractor<S> {
    /// Create an extractor over `source`
    pub fn new(source: S, config: SpectrumConfig) -> Result<Self> {
        config.validate()?;
        let smoother = SpectrumSmoother::new(config.smoothing_factor)?;
        let bins = vec![0.0; source.bin_count()];

        debug!(
            "Feature extractor: {} bins, bands {:?}/{:?}/{:?}, smoothing {}",
            bins.len(),
            config.bands.bass,
            config.bands.low_mid,
            config.bands.high_mid,
            smoother.factor()
        );

        Ok(Self {
            source,
            config,
            smoother,
            bins,
            current: FeatureVector::ZERO,
            stats: ExtractorStats::default(),
        })
    }

    /// Poll the source once and publish the next feature vector
    pub fn tick(&mut self) -> FeatureVector {
        match self.source.poll(&mut self.bins) {
            SpectrumPoll::Ready => {
                self.stats.ready += 1;
                let raw = band_intensities(
                    &self.bins,
                    &self.config.bands,
                    self.config.magnitude_scale,
                );
                self.current = self.smoother.smooth(self.current, raw);
            }
            SpectrumPoll::NotPlaying => {
                self.stats.silent += 1;
                if self.config.silence_policy == SilencePolicy::Decay {
                    self.current = self.smoother.smooth(self.current, FeatureVector::ZERO);
                }
            }
            SpectrumPoll::Unavailable => {
                self.stats.skipped += 1;
                trace!("Spectrum unavailable, keeping last features");
            }
        }
        self.current
    }

    /// Last published feature vector
    pub fn current(&self) -> FeatureVector {
        self.current
    }

    /// Forget the smoothing history
    pub fn reset(&mut self) {
        self.current = FeatureVector::ZERO;
    }

    pub fn stats(&self) -> ExtractorStats {
        self.stats
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Give the source back, ending extraction
    pub fn into_source(self) -> S {
        self.source
    }
}
