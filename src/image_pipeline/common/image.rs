//! Floating-point image buffers passed between the color stages

use std::fmt;

use rayon::prelude::*;

use crate::image_pipeline::common::error::{PipelineError, Result};

/// Linear space a [`LinearImage`] currently holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorEncoding {
    /// Camera-native RGB straight out of the demosaicer
    CameraRgb,
    /// CIE 1931 XYZ
    Xyz,
    /// Linear RGB of the target display color space
    DisplayRgb,
}

impl fmt::Display for ColorEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CameraRgb => f.write_str("camera RGB"),
            Self::Xyz => f.write_str("XYZ"),
            Self::DisplayRgb => f.write_str("display RGB"),
        }
    }
}

/// Three-channel linear image, interleaved row-major `[R, G, B, R, G, B, ...]`
#[derive(Debug, Clone, PartialEq)]
pub struct LinearImage {
    /// Width of the image in pixels
    pub width: usize,
    /// Height of the image in pixels
    pub height: usize,
    /// Interleaved samples, `width * height * 3` long
    pub data: Vec<f64>,
    /// Space the samples are expressed in
    pub encoding: ColorEncoding,
}

impl LinearImage {
    pub fn zeros(width: usize, height: usize, encoding: ColorEncoding) -> Self {
        Self {
            width,
            height,
            data: vec![0.0; width * height * 3],
            encoding,
        }
    }

    pub fn from_data(
        width: usize,
        height: usize,
        data: Vec<f64>,
        encoding: ColorEncoding,
    ) -> Result<Self> {
        if data.len() != width * height * 3 {
            return Err(PipelineError::InvalidDimensions(width, height));
        }
        Ok(Self { width, height, data, encoding })
    }

    /// Builds an image from one RGB triple per pixel, row-major.
    pub fn from_pixels(
        width: usize,
        height: usize,
        pixels: &[[f64; 3]],
        encoding: ColorEncoding,
    ) -> Result<Self> {
        let data = pixels.iter().flatten().copied().collect();
        Self::from_data(width, height, data, encoding)
    }

    /// `(height, width, channels)`
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.height, self.width, 3)
    }

    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    pub fn pixel(&self, row: usize, col: usize) -> [f64; 3] {
        let idx = (row * self.width + col) * 3;
        [self.data[idx], self.data[idx + 1], self.data[idx + 2]]
    }

    pub fn get(&self, row: usize, col: usize, channel: usize) -> f64 {
        self.data[(row * self.width + col) * 3 + channel]
    }

    pub fn pixels(&self) -> impl Iterator<Item = [f64; 3]> + '_ {
        self.data.chunks_exact(3).map(|p| [p[0], p[1], p[2]])
    }

    /// Arithmetic mean of one channel over the whole image.
    ///
    /// Summed sequentially so repeated runs give the same bits.
    pub fn channel_mean(&self, channel: usize) -> f64 {
        let n = self.pixel_count();
        if n == 0 {
            return 0.0;
        }
        let sum: f64 = self.data.iter().skip(channel).step_by(3).sum();
        sum / n as f64
    }

    /// Smallest and largest sample over all channels.
    pub fn min_max(&self) -> (f64, f64) {
        self.data
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)))
    }

    /// Applies `f` to every pixel, row-parallel, producing a new image in `encoding`.
    pub fn map_pixels<F>(&self, encoding: ColorEncoding, f: F) -> LinearImage
    where
        F: Fn([f64; 3]) -> [f64; 3] + Sync,
    {
        let mut out = LinearImage::zeros(self.width, self.height, encoding);
        let row_len = self.width * 3;
        if row_len == 0 {
            return out;
        }
        out.data
            .par_chunks_mut(row_len)
            .zip(self.data.par_chunks(row_len))
            .for_each(|(dst_row, src_row)| {
                for (dst, src) in dst_row.chunks_exact_mut(3).zip(src_row.chunks_exact(3)) {
                    let rgb = f([src[0], src[1], src[2]]);
                    dst.copy_from_slice(&rgb);
                }
            });
        out
    }
}
