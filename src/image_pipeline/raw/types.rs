//! RAW sensor data types

use serde::Deserialize;

use crate::image_pipeline::common::error::{PipelineError, Result};
use crate::image_pipeline::raw::pattern::{BayerPattern, CfaChannel};

/// Single-channel Bayer grid as read off the sensor
#[derive(Debug, Clone, PartialEq)]
pub struct SensorFrame {
    /// Width of the image in pixels
    pub width: usize,
    /// Height of the image in pixels
    pub height: usize,
    /// Row-major photosite samples
    pub data: Vec<u16>,
    /// Color filter layout of the grid
    pub pattern: BayerPattern,
    /// Effective bits per sample, `log2(white_level + 1)`; need not be integral
    pub bit_depth: f64,
}

impl SensorFrame {
    pub fn new(
        width: usize,
        height: usize,
        data: Vec<u16>,
        pattern: BayerPattern,
        bit_depth: f64,
    ) -> Result<Self> {
        if data.len() != width * height {
            return Err(PipelineError::InvalidDimensions(width, height));
        }
        if !(bit_depth.is_finite() && bit_depth > 0.0) {
            return Err(PipelineError::InvalidConfig(format!(
                "bit depth must be positive, got {bit_depth}"
            )));
        }
        Ok(Self {
            width,
            height,
            data,
            pattern,
            bit_depth,
        })
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> u16 {
        self.data[row * self.width + col]
    }

    /// Largest representable sample, `2^bit_depth - 1`.
    pub fn max_value(&self) -> f64 {
        max_value_for_bit_depth(self.bit_depth)
    }

    /// Both stages that walk 2x2 cells need a non-empty grid with even sides.
    pub fn validate_dimensions(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 || self.width % 2 != 0 || self.height % 2 != 0 {
            return Err(PipelineError::InvalidDimensions(self.width, self.height));
        }
        Ok(())
    }
}

/// `2^bit_depth - 1`
pub fn max_value_for_bit_depth(bit_depth: f64) -> f64 {
    2f64.powf(bit_depth) - 1.0
}

/// `log2(white_level + 1)`; a 14-bit sensor with white level 16383 gives exactly 14.
pub fn bit_depth_from_white_level(white_level: u32) -> f64 {
    (white_level as f64 + 1.0).log2()
}

/// Black offsets keyed by physical channel role
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct BlackLevelTable {
    #[serde(rename = "R")]
    pub r: u16,
    #[serde(rename = "G1")]
    pub g1: u16,
    #[serde(rename = "G2")]
    pub g2: u16,
    #[serde(rename = "B")]
    pub b: u16,
}

impl BlackLevelTable {
    pub fn new(r: u16, g1: u16, g2: u16, b: u16) -> Self {
        Self { r, g1, g2, b }
    }

    pub fn uniform(level: u16) -> Self {
        Self::new(level, level, level, level)
    }

    pub fn for_channel(&self, channel: CfaChannel) -> u16 {
        match channel {
            CfaChannel::R => self.r,
            CfaChannel::G1 => self.g1,
            CfaChannel::G2 => self.g2,
            CfaChannel::B => self.b,
        }
    }
}

/// What a RAW decoder hands to the pipeline
#[derive(Debug, Clone)]
pub struct DecodedRaw {
    pub frame: SensorFrame,
    pub black_levels: BlackLevelTable,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bit_depth_from_white_level() {
        assert_eq!(bit_depth_from_white_level(16383), 14.0);
        assert_eq!(bit_depth_from_white_level(1023), 10.0);
        let fractional = bit_depth_from_white_level(15000);
        assert!(fractional > 13.0 && fractional < 14.0);
        assert!((max_value_for_bit_depth(fractional) - 15000.0).abs() < 1e-6);
    }

    #[test]
    fn test_frame_rejects_mismatched_data() {
        let result = SensorFrame::new(4, 4, vec![0; 15], BayerPattern::Rggb, 10.0);
        assert!(matches!(result, Err(PipelineError::InvalidDimensions(4, 4))));
    }

    #[test]
    fn test_odd_dimensions_fail_validation() {
        let frame = SensorFrame::new(3, 2, vec![0; 6], BayerPattern::Rggb, 10.0).unwrap();
        assert!(matches!(
            frame.validate_dimensions(),
            Err(PipelineError::InvalidDimensions(3, 2))
        ));
    }

    #[test]
    fn test_black_level_table_from_json() {
        let table: BlackLevelTable =
            serde_json::from_str(r#"{"R": 64, "G1": 60, "G2": 62, "B": 66}"#).unwrap();
        assert_eq!(table, BlackLevelTable::new(64, 60, 62, 66));
        assert_eq!(table.for_channel(CfaChannel::G2), 62);
    }
}
