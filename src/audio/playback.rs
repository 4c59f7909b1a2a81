//! Decoded audio tracks and their playback cursor.

use std::path::Path;

use crate::error::{Error, Result};

/// A fully decoded stereo track
#[derive(Debug, Clone)]
pub struct Track {
    frames: Vec<[f32; 2]>,
    sample_rate_hz: u32,
}

impl Track {
    /// Decode a WAV file (integer or float PCM, any channel count)
    ///
    /// Mono is duplicated to both sides; channels beyond the second are dropped.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let mut reader = hound::WavReader::open(path.as_ref())?;
        let spec = reader.spec();
        let channels = spec.channels as usize;
        if channels == 0 {
            return Err(Error::Audio("WAV file has no channels".to_string()));
        }

        let samples: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => reader
                .samples::<f32>()
                .collect::<std::result::Result<_, _>>()?,
            hound::SampleFormat::Int => {
                let full_scale = (1i64 << (spec.bits_per_sample.max(1) - 1)) as f32;
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|v| v as f32 / full_scale))
                    .collect::<std::result::Result<_, _>>()?
            }
        };

        let frames = samples
            .chunks_exact(channels)
            .map(|frame| match frame {
                [mono] => [*mono, *mono],
                [left, right, ..] => [*left, *right],
                [] => [0.0, 0.0],
            })
            .collect();

        Ok(Self::from_frames(frames, spec.sample_rate))
    }

    pub fn from_frames(frames: Vec<[f32; 2]>, sample_rate_hz: u32) -> Self {
        Self {
            frames,
            sample_rate_hz,
        }
    }

    pub fn sample_rate_hz(&self) -> u32 {
        self.sample_rate_hz
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn duration_s(&self) -> f32 {
        if self.sample_rate_hz == 0 {
            return 0.0;
        }
        self.frames.len() as f32 / self.sample_rate_hz as f32
    }
}

/// Plays a track once at the output device's rate
pub struct TrackPlayer {
    track: Track,
    position: f64,
    step: f64,
}

impl TrackPlayer {
    /// Player resampling `track` (nearest frame) to `output_rate_hz`
    pub fn new(track: Track, output_rate_hz: u32) -> Self {
        let step = if output_rate_hz == 0 {
            1.0
        } else {
            f64::from(track.sample_rate_hz) / f64::from(output_rate_hz)
        };
        Self {
            track,
            position: 0.0,
            step,
        }
    }

    /// Next output frame, or `None` once the track has ended
    pub fn next_frame(&mut self) -> Option<[f32; 2]> {
        let frame = self.track.frames.get(self.position as usize).copied()?;
        self.position += self.step;
        Some(frame)
    }

    pub fn finished(&self) -> bool {
        self.position as usize >= self.track.frames.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_plays_once() {
        let track = Track::from_frames(vec![[0.1, 0.2], [0.3, 0.4]], 44100);
        let mut player = TrackPlayer::new(track, 44100);

        assert_eq!(player.next_frame(), Some([0.1, 0.2]));
        assert_eq!(player.next_frame(), Some([0.3, 0.4]));
        assert!(player.finished());
        assert_eq!(player.next_frame(), None);
    }

    #[test]
    fn test_player_resamples() {
        let frames: Vec<[f32; 2]> = (0..100).map(|i| [i as f32, 0.0]).collect();
        let track = Track::from_frames(frames, 22050);
        let mut player = TrackPlayer::new(track, 44100);

        // Half-rate source: every frame is played twice
        let played: Vec<f32> = std::iter::from_fn(|| player.next_frame())
            .map(|f| f[0])
            .collect();
        assert_eq!(played.len(), 200);
        assert_eq!(&played[..4], &[0.0, 0.0, 1.0, 1.0]);
    }

    #[test]
    fn test_open_wav() {
        let path =
            std::env::temp_dir().join(format!("fountain-track-{}.wav", std::process::id()));
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 8000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        for i in 0..800 {
            writer.write_sample(if i % 2 == 0 { 16384i16 } else { -16384 }).unwrap();
        }
        writer.finalize().unwrap();

        let track = Track::open(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(track.len(), 800);
        assert_eq!(track.sample_rate_hz(), 8000);
        assert!((track.duration_s() - 0.1).abs() < 1e-6);
        let mut player = TrackPlayer::new(track, 8000);
        assert_eq!(player.next_frame(), Some([0.5, 0.5]));
    }

    #[test]
    fn test_open_missing_file() {
        let result = Track::open("/nonexistent/fountain.wav");
        assert!(matches!(result, Err(crate::error::Error::Wav(_))));
    }
}
