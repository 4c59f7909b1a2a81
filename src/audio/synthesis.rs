//! Procedural music voice driven by the Glicol engine.

use glicol::Engine;

use crate::error::{Error, Result};
use crate::params::audio_constants::BLOCK_SIZE;

/// Glicol composition (procedural music code)
pub const GLICOL_COMPOSITION: &str = r#"
~gate: speed 2.0 >> seq 60 _60 _~a 48
~a: choose 48 48 48 72 0 0 0
~amp: ~gate >> envperc 0.001 0.1
~pit: ~gate >> mul 261.63
~lead: saw ~pit >> mul ~amp >> lpf ~mod 5.0 >> mul 0.1
~mod: sin 0.2 >> mul 1300 >> add 1500
o: ~lead >> plate 0.1
"#;

/// Endless stereo voice rendering the composition block by block
pub struct SynthVoice {
    engine: Engine<BLOCK_SIZE>,
    block: Vec<[f32; 2]>,
    cursor: usize,
}

impl SynthVoice {
    pub fn new(sample_rate_hz: usize) -> Result<Self> {
        let mut engine = Engine::<BLOCK_SIZE>::new();
        engine.set_sr(sample_rate_hz);
        engine.update_with_code(GLICOL_COMPOSITION);
        engine
            .update()
            .map_err(|e| Error::Audio(format!("Glicol engine init failed: {:?}", e)))?;

        Ok(Self {
            engine,
            block: Vec::with_capacity(BLOCK_SIZE),
            cursor: 0,
        })
    }

    /// Next stereo frame, rendering a new block when the current one runs out
    pub fn next_frame(&mut self) -> [f32; 2] {
        if self.cursor >= self.block.len() {
            let (buffers, _) = self.engine.next_block(vec![]);
            self.block.clear();
            for i in 0..BLOCK_SIZE {
                self.block.push([buffers[0][i], buffers[1][i]]);
            }
            self.cursor = 0;
        }

        let frame = self.block[self.cursor];
        self.cursor += 1;
        frame
    }
}
