//! Debayering module for converting Bayer pattern RAW images to camera RGB

mod bilinear;
mod subsample;

use tracing::debug;

use crate::image_pipeline::common::error::Result;
use crate::image_pipeline::common::image::LinearImage;
use crate::image_pipeline::raw::types::max_value_for_bit_depth;
use crate::image_pipeline::raw::{BayerPattern, SensorFrame};

/// How the Bayer grid becomes a three-channel image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DemosaicMode {
    /// One RGB pixel per 2x2 cell, half resolution, no interpolation
    #[default]
    Subsample,
    /// Full-resolution bilinear interpolation with edge clamping
    Bilinear,
}

impl DemosaicMode {
    pub fn from_flag(demosaic: bool) -> Self {
        if demosaic {
            DemosaicMode::Bilinear
        } else {
            DemosaicMode::Subsample
        }
    }
}

/// Converts a black-level-corrected Bayer grid into normalized camera RGB.
pub struct Demosaicer {
    pattern: BayerPattern,
    mode: DemosaicMode,
    bit_depth: f64,
}

impl Demosaicer {
    pub fn new(pattern: BayerPattern, mode: DemosaicMode, bit_depth: f64) -> Self {
        Self {
            pattern,
            mode,
            bit_depth,
        }
    }

    /// Normalizes by `2^bit_depth - 1`, then subsamples or interpolates.
    ///
    /// Output is `(H/2, W/2)` in [`DemosaicMode::Subsample`] and `(H, W)` in
    /// [`DemosaicMode::Bilinear`]. The grid must have even, non-zero sides.
    pub fn process(&self, frame: &SensorFrame) -> Result<LinearImage> {
        frame.validate_dimensions()?;

        let max_value = max_value_for_bit_depth(self.bit_depth);
        let normalized: Vec<f64> = frame.data.iter().map(|&v| v as f64 / max_value).collect();
        let layout = self.pattern.layout();

        debug!(
            "Demosaicing {}x{} {} grid, mode={:?}, bit_depth={:.3}",
            frame.width, frame.height, self.pattern, self.mode, self.bit_depth
        );

        let image = match self.mode {
            DemosaicMode::Subsample => {
                subsample::demosaic(&normalized, frame.width, frame.height, &layout)
            }
            DemosaicMode::Bilinear => {
                bilinear::demosaic(&normalized, frame.width, frame.height, &layout)
            }
        };
        Ok(image)
    }
}

/// Reads one 2x2 sub-lattice of a normalized grid by block index, clamping
/// indices past the last block to the last valid sample.
struct SubLattice<'a> {
    data: &'a [f64],
    width: usize,
    row_offset: usize,
    col_offset: usize,
    last_block_row: usize,
    last_block_col: usize,
}

impl<'a> SubLattice<'a> {
    fn new(data: &'a [f64], width: usize, height: usize, (row_offset, col_offset): (usize, usize)) -> Self {
        Self {
            data,
            width,
            row_offset,
            col_offset,
            last_block_row: height / 2 - 1,
            last_block_col: width / 2 - 1,
        }
    }

    #[inline]
    fn at(&self, block_row: usize, block_col: usize) -> f64 {
        let row = 2 * block_row.min(self.last_block_row) + self.row_offset;
        let col = 2 * block_col.min(self.last_block_col) + self.col_offset;
        self.data[row * self.width + col]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(width: usize, height: usize, data: Vec<u16>, pattern: BayerPattern, bit_depth: f64) -> SensorFrame {
        SensorFrame::new(width, height, data, pattern, bit_depth).unwrap()
    }

    fn ramp(width: usize, height: usize) -> Vec<u16> {
        (0..width * height).map(|i| (i * 37 % 1000) as u16).collect()
    }

    #[test]
    fn test_output_resolution_per_mode() {
        for (w, h) in [(2, 2), (4, 6), (8, 4)] {
            let input = frame(w, h, ramp(w, h), BayerPattern::Rggb, 10.0);
            let half = Demosaicer::new(BayerPattern::Rggb, DemosaicMode::Subsample, 10.0)
                .process(&input)
                .unwrap();
            let full = Demosaicer::new(BayerPattern::Rggb, DemosaicMode::Bilinear, 10.0)
                .process(&input)
                .unwrap();

            assert_eq!(half.shape(), (h / 2, w / 2, 3));
            assert_eq!(full.shape(), (h, w, 3));
        }
    }

    #[test]
    fn test_uniform_grid_is_flat_for_both_patterns() {
        let value = 512u16;
        let expected = value as f64 / 1023.0;
        for pattern in [BayerPattern::Rggb, BayerPattern::Bggr] {
            for mode in [DemosaicMode::Subsample, DemosaicMode::Bilinear] {
                let input = frame(6, 4, vec![value; 24], pattern, 10.0);
                let image = Demosaicer::new(pattern, mode, 10.0).process(&input).unwrap();
                for v in &image.data {
                    assert!((v - expected).abs() < 1e-12, "{pattern} {mode:?}: {v}");
                }
            }
        }
    }

    #[test]
    fn test_odd_grid_is_rejected() {
        let input = frame(3, 4, vec![0; 12], BayerPattern::Rggb, 10.0);
        let result = Demosaicer::new(BayerPattern::Rggb, DemosaicMode::Bilinear, 10.0).process(&input);
        assert!(result.is_err());
    }

    #[test]
    fn test_fractional_bit_depth_normalizes_to_white_level() {
        let bit_depth = (15001f64).log2();
        let input = frame(2, 2, vec![15000; 4], BayerPattern::Rggb, bit_depth);
        let image = Demosaicer::new(BayerPattern::Rggb, DemosaicMode::Subsample, bit_depth)
            .process(&input)
            .unwrap();
        for v in &image.data {
            assert!((v - 1.0).abs() < 1e-9);
        }
    }
}
