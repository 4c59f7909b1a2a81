//! Audio system: playback through cpal plus background spectrum analysis.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use log::{debug, error, info, warn};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use super::fft::spawn_fft_thread;
use super::playback::{Track, TrackPlayer};
use super::synthesis::SynthVoice;
use crate::error::{Error, Result};
use crate::features::{SpectrumPoll, SpectrumSource};
use crate::params::AudioConfig;

/// What the audio system plays
#[derive(Debug, Clone)]
pub enum AudioInput {
    /// Endless procedural composition
    Synth,
    /// A WAV file, played once
    Wav(PathBuf),
}

/// Sample generator living inside the output callback
enum Voice {
    Synth(SynthVoice),
    Track(TrackPlayer),
}

impl Voice {
    fn next_frame(&mut self) -> Option<[f32; 2]> {
        match self {
            Voice::Synth(synth) => Some(synth.next_frame()),
            Voice::Track(player) => player.next_frame(),
        }
    }

    /// True once a track has played to its end
    fn finished(&self) -> bool {
        match self {
            Voice::Synth(_) => false,
            Voice::Track(player) => player.finished(),
        }
    }
}

/// Audio system managing playback and FFT analysis.
///
/// Holds the output stream and the analysis thread; both are released when
/// the system is dropped.
pub struct AudioSystem {
    /// Latest byte-scaled spectrum (shared with the FFT thread)
    spectrum: Arc<Mutex<Vec<f32>>>,

    /// Cleared by the output callback when a track ends
    playing: Arc<AtomicBool>,

    /// Cleared on drop to stop the FFT thread
    running: Arc<AtomicBool>,

    /// Audio output stream (kept alive)
    stream: Option<cpal::Stream>,

    /// FFT analysis thread handle, joined on drop
    fft_thread: Option<thread::JoinHandle<()>>,

    bin_count: usize,
}

impl AudioSystem {
    /// Open the default output device and start playing `input`
    ///
    /// An unreadable WAV file fails with [`Error::Wav`] before the device
    /// is opened.
    pub fn new(config: AudioConfig, input: AudioInput) -> Result<Self> {
        // Read the track first so a bad file fails before any device is touched
        let track = match &input {
            AudioInput::Synth => None,
            AudioInput::Wav(path) => {
                let track = Track::open(path)?;
                info!(
                    "Track: {} ({:.1}s @ {}Hz)",
                    path.display(),
                    track.duration_s(),
                    track.sample_rate_hz()
                );
                Some(track)
            }
        };

        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| Error::Audio("No audio output device found".to_string()))?;

        let supported = device
            .default_output_config()
            .map_err(|e| Error::Audio(format!("Failed to get audio config: {}", e)))?;
        let device_rate = supported.sample_rate().0;
        let channels = supported.channels() as usize;

        info!(
            "Audio: {} @ {}Hz, {} channels",
            device.name().unwrap_or_else(|_| "Unknown".to_string()),
            device_rate,
            channels
        );

        // Analyse at the rate the device actually runs
        let config = AudioConfig {
            sample_rate_hz: device_rate as usize,
            ..config
        };
        config.validate()?;

        let mut voice = match track {
            Some(track) => Voice::Track(TrackPlayer::new(track, device_rate)),
            None => Voice::Synth(SynthVoice::new(config.sample_rate_hz)?),
        };

        let bin_count = config.bin_count();
        debug!(
            "Analysis: {} bins of {:.1} Hz, FFT every {}ms",
            bin_count,
            config.bin_to_hz(1),
            config.update_interval_ms
        );
        let max_backlog = config.fft_size * 4;
        let samples = Arc::new(Mutex::new(Vec::<f32>::with_capacity(max_backlog)));
        let spectrum = Arc::new(Mutex::new(vec![0.0; bin_count]));
        let playing = Arc::new(AtomicBool::new(true));
        let running = Arc::new(AtomicBool::new(true));

        let samples_cb = Arc::clone(&samples);
        let playing_cb = Arc::clone(&playing);
        let stream_config: cpal::StreamConfig = supported.into();

        let stream = device
            .build_output_stream(
                &stream_config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    let Ok(mut buf) = samples_cb.lock() else {
                        data.fill(0.0);
                        return;
                    };

                    for frame in data.chunks_mut(channels.max(1)) {
                        // Safety limiter: hard clip to ±0.5 to prevent ear damage
                        let [left, right] = voice
                            .next_frame()
                            .map_or([0.0, 0.0], |f| f.map(|s| s.clamp(-0.5, 0.5)));
                        for (ch, out) in frame.iter_mut().enumerate() {
                            *out = if ch % 2 == 0 { left } else { right };
                        }
                        buf.push(0.5 * (left + right)); // Mono mix for analysis
                    }

                    if voice.finished() {
                        playing_cb.store(false, Ordering::Relaxed);
                    }

                    if buf.len() > max_backlog {
                        let excess = buf.len() - max_backlog;
                        buf.drain(..excess);
                    }
                },
                |err| error!("Audio stream error: {}", err),
                None,
            )
            .map_err(|e| Error::Audio(format!("Failed to build audio stream: {}", e)))?;

        stream
            .play()
            .map_err(|e| Error::Audio(format!("Failed to start audio stream: {}", e)))?;

        let fft_thread = spawn_fft_thread(
            config,
            samples,
            Arc::clone(&spectrum),
            Arc::clone(&running),
        );

        Ok(Self {
            spectrum,
            playing,
            running,
            stream: Some(stream),
            fft_thread: Some(fft_thread),
            bin_count,
        })
    }

    /// Whether audio is still playing (false once a track has ended)
    pub fn is_playing(&self) -> bool {
        self.playing.load(Ordering::Relaxed)
    }
}

/// Copy the analysis thread's spectrum into `bins` without blocking
///
/// # Arguments
/// * `spectrum` - Spectrum shared with the FFT thread
/// * `playing` - Cleared by the output callback when playback ends
/// * `bins` - Destination, same length as the shared spectrum
///
/// # Returns
/// * `NotPlaying` once playback has ended, `Unavailable` when the spectrum is
///   busy, poisoned or mis-sized (`bins` untouched), else `Ready`
pub fn poll_shared_spectrum(
    spectrum: &Mutex<Vec<f32>>,
    playing: &AtomicBool,
    bins: &mut [f32],
) -> SpectrumPoll {
    if !playing.load(Ordering::Relaxed) {
        return SpectrumPoll::NotPlaying;
    }
    match spectrum.try_lock() {
        Ok(spectrum) if spectrum.len() == bins.len() => {
            bins.copy_from_slice(&spectrum);
            SpectrumPoll::Ready
        }
        _ => SpectrumPoll::Unavailable,
    }
}

impl SpectrumSource for AudioSystem {
    fn bin_count(&self) -> usize {
        self.bin_count
    }

    fn poll(&mut self, bins: &mut [f32]) -> SpectrumPoll {
        poll_shared_spectrum(&self.spectrum, &self.playing, bins)
    }

    fn finished(&self) -> bool {
        !self.is_playing()
    }
}

impl Drop for AudioSystem {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Relaxed);
        drop(self.stream.take());
        if let Some(handle) = self.fft_thread.take() {
            if handle.join().is_err() {
                warn!("FFT thread panicked");
            }
        }
        debug!("Audio system released");
    }
}
