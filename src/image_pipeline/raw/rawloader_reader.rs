//! RAW image reader implementation using the rawloader library.
//!
//! This module decodes the vendor RAW container (ARW, CR2, NEF, DNG, ...) into a
//! [`SensorFrame`] plus the black levels the pipeline needs for correction.

use std::io::Cursor;

use rawloader::RawImageData as RawloaderImageData;
use tracing::debug;

use crate::image_pipeline::common::error::{PipelineError, Result};
use crate::image_pipeline::raw::pattern::BayerPattern;
use crate::image_pipeline::raw::reader::RawImageReader;
use crate::image_pipeline::raw::types::{
    bit_depth_from_white_level, BlackLevelTable, DecodedRaw, SensorFrame,
};

/// RAW image reader that uses the rawloader library for decoding.
///
/// Only single-component Bayer sensors with an RGGB or BGGR filter array are
/// accepted; everything else fails with [`PipelineError::UnsupportedPattern`].
pub struct RawLoaderReader;

/// White level assumed when the decoder reports none.
const DEFAULT_WHITE_LEVEL: u16 = u16::MAX;

impl RawImageReader for RawLoaderReader {
    /// Decodes a RAW file held in memory.
    ///
    /// The bit depth is derived from the largest white level the decoder reports
    /// as `log2(white_level + 1)`. rawloader orders black levels by color
    /// (R, G, B, E), so both green photosites take the G level.
    fn read_raw(&self, data: &[u8]) -> Result<DecodedRaw> {
        debug!("Decoding RAW image, {} bytes", data.len());

        let decoded = rawloader::decode(&mut Cursor::new(data))
            .map_err(|e| PipelineError::DecodeError(e.to_string()))?;

        if decoded.cpp != 1 {
            return Err(PipelineError::DecodeError(format!(
                "expected a single-component Bayer image, got {} components per pixel",
                decoded.cpp
            )));
        }

        let width = decoded.width;
        let height = decoded.height;
        let pattern: BayerPattern = decoded.cfa.name.parse()?;

        debug!("Decoded image: {}x{}, CFA {}", width, height, pattern);

        let white_level = decoded
            .whitelevels
            .iter()
            .max()
            .copied()
            .filter(|&w| w > 0)
            .unwrap_or(DEFAULT_WHITE_LEVEL);

        // Float RAW data is normalized to 0.0-1.0; bring it onto the white-level scale
        let samples: Vec<u16> = match decoded.data {
            RawloaderImageData::Integer(values) => values,
            RawloaderImageData::Float(values) => values
                .iter()
                .map(|&v| (v.clamp(0.0, 1.0) * white_level as f32).round() as u16)
                .collect(),
        };

        let bit_depth = bit_depth_from_white_level(white_level as u32);
        let [bl_r, bl_g, bl_b, _] = decoded.blacklevels;
        let black_levels = BlackLevelTable::new(bl_r, bl_g, bl_g, bl_b);

        debug!(
            "White level {} -> bit depth {:.3}, black levels {:?}",
            white_level, bit_depth, black_levels
        );

        Ok(DecodedRaw {
            frame: SensorFrame::new(width, height, samples, pattern, bit_depth)?,
            black_levels,
        })
    }
}
