//! FFT analysis thread and utilities.
//!
//! Produces byte-scaled magnitude spectra (0..255 over a decibel window),
//! the same scale a browser analyser node reports.

use log::warn;
use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::f32::consts::PI;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use crate::params::AudioConfig;

/// Hann window function for FFT analysis
pub fn hann_window(index: usize, size: usize) -> f32 {
    0.5 * (1.0 - ((2.0 * PI * index as f32) / (size as f32 - 1.0)).cos())
}

/// Map a linear magnitude onto 0..255 across `[min_db, max_db]`
pub fn magnitude_to_byte(magnitude: f32, min_db: f32, max_db: f32) -> f32 {
    if magnitude.is_nan() || magnitude <= 0.0 {
        return 0.0;
    }
    let db = 20.0 * magnitude.log10();
    (255.0 * (db - min_db) / (max_db - min_db)).clamp(0.0, 255.0)
}

/// Windowed FFT with temporal smoothing of bin magnitudes
pub struct SpectrumAnalyser {
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    buffer: Vec<Complex<f32>>,
    smoothed: Vec<f32>,
    config: AudioConfig,
}

impl SpectrumAnalyser {
    pub fn new(config: AudioConfig) -> Self {
        let size = config.fft_size;
        let mut planner = FftPlanner::new();
        Self {
            fft: planner.plan_fft_forward(size),
            window: (0..size).map(|i| hann_window(i, size)).collect(),
            buffer: vec![Complex::new(0.0, 0.0); size],
            smoothed: vec![0.0; config.bin_count()],
            config,
        }
    }

    pub fn bin_count(&self) -> usize {
        self.smoothed.len()
    }

    /// Analyse the last `fft_size` samples of `samples` into `out`
    ///
    /// Missing samples (short input) are treated as silence.
    pub fn process(&mut self, samples: &[f32], out: &mut [f32]) {
        let size = self.config.fft_size;
        let start = samples.len().saturating_sub(size);
        let recent = &samples[start..];
        let pad = size - recent.len();

        for (i, slot) in self.buffer.iter_mut().enumerate() {
            let sample = if i < pad { 0.0 } else { recent[i - pad] };
            *slot = Complex::new(sample * self.window[i], 0.0);
        }
        self.fft.process(&mut self.buffer);

        let tau = self.config.analyser_smoothing;
        let scale = 1.0 / size as f32;
        for (k, (smoothed, out)) in self.smoothed.iter_mut().zip(out.iter_mut()).enumerate() {
            let magnitude = self.buffer[k].norm() * scale;
            *smoothed = tau * *smoothed + (1.0 - tau) * magnitude;
            *out = magnitude_to_byte(
                *smoothed,
                self.config.min_decibels,
                self.config.max_decibels,
            );
        }
    }
}

/// Spawn FFT analysis thread
///
/// Every `update_interval_ms` it analyses the most recent window of
/// `samples` into `spectrum`, until `running` is cleared.
pub fn spawn_fft_thread(
    config: AudioConfig,
    samples: Arc<Mutex<Vec<f32>>>,
    spectrum: Arc<Mutex<Vec<f32>>>,
    running: Arc<AtomicBool>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let interval = Duration::from_millis(config.update_interval_ms);
        let size = config.fft_size;
        let mut analyser = SpectrumAnalyser::new(config);
        let mut frame = Vec::with_capacity(size);
        let mut out = vec![0.0; analyser.bin_count()];

        while running.load(Ordering::Relaxed) {
            thread::sleep(interval);

            {
                let Ok(mut buf) = samples.lock() else {
                    warn!("Sample buffer poisoned, stopping analysis");
                    break;
                };
                if buf.len() < size {
                    continue;
                }
                // Keep only the latest window; older audio is never analysed
                let start = buf.len() - size;
                buf.drain(..start);
                frame.clear();
                frame.extend_from_slice(&buf);
            }

            analyser.process(&frame, &mut out);

            match spectrum.lock() {
                Ok(mut spectrum) => spectrum.copy_from_slice(&out),
                Err(_) => {
                    warn!("Spectrum buffer poisoned, stopping analysis");
                    break;
                }
            }
        }
    })
}
