//! Recording configuration.

/// Recording mode configuration
#[derive(Debug, Clone)]
pub struct RecordingConfig {
    /// Output directory for snapshots
    pub output_dir: String,

    /// Write one snapshot every N frames
    pub snapshot_every: usize,

    /// Snapshot width (pixels)
    pub width: u32,

    /// Snapshot height (pixels)
    pub height: u32,

    /// World-space height visible in a snapshot (meters)
    pub view_height_m: f32,
}

impl RecordingConfig {
    pub fn new(output_dir: impl Into<String>, snapshot_every: usize) -> Self {
        Self {
            output_dir: output_dir.into(),
            snapshot_every: snapshot_every.max(1),
            width: 1280,
            height: 480,
            view_height_m: 12.0,
        }
    }

    /// Whether frame `frame_num` should be captured
    pub fn captures(&self, frame_num: usize) -> bool {
        frame_num % self.snapshot_every == 0
    }

    /// Frame directory path
    pub fn frames_dir(&self) -> String {
        format!("{}/frames", self.output_dir)
    }

    /// Snapshot path for a frame
    pub fn frame_path(&self, frame_num: usize) -> String {
        format!("{}/frame_{:05}.png", self.frames_dir(), frame_num)
    }
}
