use std::io::Write;

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::image_pipeline::common::error::{PipelineError, Result};
use crate::image_pipeline::common::image::LinearImage;
use crate::image_pipeline::output::transfer::{gamma_encode, hlg_encode, pq_encode};
use crate::image_pipeline::output::types::{
    HdrTransfer, OutputMode, OutputSettings, TiffCompression,
};
use crate::image_pipeline::output::writer::ImageWriter;

/// Writes RGB TIFFs: 8-bit gamma-encoded for SDR, 16-bit PQ/HLG for HDR.
pub struct StandardTiffWriter;

impl StandardTiffWriter {
    fn compression(settings: &OutputSettings) -> tiff::encoder::Compression {
        match settings.compression {
            TiffCompression::None => tiff::encoder::Compression::Uncompressed,
            TiffCompression::Lzw => tiff::encoder::Compression::Lzw,
            TiffCompression::DeflateFast => tiff::encoder::Compression::Deflate(tiff::encoder::compression::DeflateLevel::Fast),
            TiffCompression::DeflateBalanced => tiff::encoder::Compression::Deflate(tiff::encoder::compression::DeflateLevel::Balanced),
            TiffCompression::DeflateBest => tiff::encoder::Compression::Deflate(tiff::encoder::compression::DeflateLevel::Best),
        }
    }
}

/// Gamma-encodes and quantizes to 8 bits.
pub fn quantize_sdr(image: &LinearImage, gamma: f64) -> Vec<u8> {
    image
        .data
        .par_iter()
        .map(|&v| (gamma_encode(v, gamma) * u8::MAX as f64).round() as u8)
        .collect()
}

/// Applies the HDR transfer curve and quantizes to 16 bits.
pub fn quantize_hdr(image: &LinearImage, transfer: HdrTransfer) -> Vec<u16> {
    image
        .data
        .par_iter()
        .map(|&v| {
            let encoded = match transfer {
                HdrTransfer::Pq => pq_encode(v),
                HdrTransfer::Hlg => hlg_encode(v),
            };
            (encoded * u16::MAX as f64).round() as u16
        })
        .collect()
}

impl ImageWriter for StandardTiffWriter {
    fn write_image(&self, image: &LinearImage, output: &mut dyn Write, settings: &OutputSettings) -> Result<()> {
        debug!(
            "Encoding {} TIFF image: {}x{}, {}",
            settings.mode, image.width, image.height, settings.color_space
        );

        if !(settings.gamma.is_finite() && settings.gamma > 0.0) {
            return Err(PipelineError::InvalidConfig(format!(
                "gamma must be positive, got {}",
                settings.gamma
            )));
        }

        let mut buffer = Vec::new();

        let mut encoder = tiff::encoder::TiffEncoder::new(std::io::Cursor::new(&mut buffer))
            .map_err(|e| PipelineError::EncodeError(e.to_string()))?
            .with_compression(Self::compression(settings));

        if let Some(predictor_val) = settings.predictor {
            let predictor = match predictor_val {
                2 => tiff::tags::Predictor::Horizontal,
                _ => tiff::tags::Predictor::None,
            };
            encoder = encoder.with_predictor(predictor);
        }

        let (width, height) = (image.width as u32, image.height as u32);
        match settings.mode {
            OutputMode::Sdr => {
                let samples = quantize_sdr(image, settings.gamma);
                encoder
                    .write_image::<tiff::encoder::colortype::RGB8>(width, height, &samples)
                    .map_err(|e| PipelineError::EncodeError(e.to_string()))?;
            }
            OutputMode::Hdr => {
                warn!(
                    "No {} muxer available, storing HDR data as 16-bit TIFF",
                    settings.hdr_format
                );
                let samples = quantize_hdr(image, settings.hdr_transfer);
                encoder
                    .write_image::<tiff::encoder::colortype::RGB16>(width, height, &samples)
                    .map_err(|e| PipelineError::EncodeError(e.to_string()))?;
            }
        }

        output.write_all(&buffer)?;

        debug!("TIFF encoding complete, {} bytes", buffer.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_pipeline::common::image::ColorEncoding;

    fn image() -> LinearImage {
        LinearImage::from_pixels(
            2,
            1,
            &[[0.0, 0.5, 1.0], [0.25, 0.75, 1.0]],
            ColorEncoding::DisplayRgb,
        )
        .unwrap()
    }

    #[test]
    fn test_sdr_quantization() {
        let samples = quantize_sdr(&image(), 1.0);
        assert_eq!(samples, vec![0, 128, 255, 64, 191, 255]);
    }

    #[test]
    fn test_hdr_quantization_spans_full_range() {
        let samples = quantize_hdr(&image(), HdrTransfer::Pq);
        assert_eq!(samples[2], u16::MAX);
        assert!(samples[0] < 64);
        assert!(samples[1] > samples[3]);
    }

    #[test]
    fn test_writes_tiff_header() {
        for mode in [OutputMode::Sdr, OutputMode::Hdr] {
            let settings = OutputSettings {
                mode,
                ..OutputSettings::default()
            };
            let mut out = Vec::new();
            StandardTiffWriter.write_image(&image(), &mut out, &settings).unwrap();
            // little-endian TIFF magic
            assert_eq!(&out[..4], &[0x49, 0x49, 0x2A, 0x00]);
        }
    }

    #[test]
    fn test_rejects_non_positive_gamma() {
        let settings = OutputSettings {
            gamma: 0.0,
            ..OutputSettings::default()
        };
        let mut out = Vec::new();
        let err = StandardTiffWriter.write_image(&image(), &mut out, &settings).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidConfig(_)));
        assert!(out.is_empty());
    }
}
