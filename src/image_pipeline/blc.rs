//! Black level correction

use rayon::prelude::*;
use tracing::debug;

use crate::image_pipeline::common::error::Result;
use crate::image_pipeline::raw::{BayerPattern, BlackLevelTable, SensorFrame};

/// Subtracts per-channel black offsets from a Bayer grid.
pub struct BlackLevelCorrector {
    pattern: BayerPattern,
    table: BlackLevelTable,
}

impl BlackLevelCorrector {
    pub fn new(pattern: BayerPattern, table: BlackLevelTable) -> Self {
        Self { pattern, table }
    }

    /// Returns a corrected copy of `frame`.
    ///
    /// Each 2x2 sub-lattice loses the offset of the channel this corrector's
    /// pattern places there, clipped at zero. The frame's own pattern label is
    /// carried through untouched.
    pub fn process(&self, frame: &SensorFrame) -> Result<SensorFrame> {
        let layout = self.pattern.layout();
        // offsets[row parity][col parity]
        let offsets = [
            [
                self.table.for_channel(layout.channel_at(0, 0)),
                self.table.for_channel(layout.channel_at(0, 1)),
            ],
            [
                self.table.for_channel(layout.channel_at(1, 0)),
                self.table.for_channel(layout.channel_at(1, 1)),
            ],
        ];
        debug!(pattern = %self.pattern, ?offsets, "Applying black level correction");

        let mut corrected = frame.clone();
        if frame.width == 0 {
            return Ok(corrected);
        }
        corrected
            .data
            .par_chunks_mut(frame.width)
            .enumerate()
            .for_each(|(row, samples)| {
                let row_offsets = offsets[row & 1];
                for (col, sample) in samples.iter_mut().enumerate() {
                    *sample = sample.saturating_sub(row_offsets[col & 1]);
                }
            });

        Ok(corrected)
    }
}
