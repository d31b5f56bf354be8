//! Output configuration types

use std::fmt;
use std::str::FromStr;

use crate::image_pipeline::color::DisplayColorSpace;
use crate::image_pipeline::common::error::{PipelineError, Result};

/// Dynamic range of the encoded file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Gamma-encoded, 8 bits per sample
    #[default]
    Sdr,
    /// PQ or HLG encoded, 16 bits per sample
    Hdr,
}

impl FromStr for OutputMode {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "SDR" => Ok(OutputMode::Sdr),
            "HDR" => Ok(OutputMode::Hdr),
            other => Err(PipelineError::UnsupportedMethod(format!("output mode {other}"))),
        }
    }
}

impl fmt::Display for OutputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sdr => f.write_str("SDR"),
            Self::Hdr => f.write_str("HDR"),
        }
    }
}

/// Container an HDR-capable encoder should produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HdrFormat {
    #[default]
    Heif,
    Avif,
}

impl FromStr for HdrFormat {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "HEIF" => Ok(HdrFormat::Heif),
            "AVIF" => Ok(HdrFormat::Avif),
            other => Err(PipelineError::UnsupportedMethod(format!("HDR format {other}"))),
        }
    }
}

impl fmt::Display for HdrFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Heif => f.write_str("HEIF"),
            Self::Avif => f.write_str("AVIF"),
        }
    }
}

/// Transfer curve for HDR output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HdrTransfer {
    /// SMPTE ST 2084
    #[default]
    Pq,
    /// ARIB STD-B67 / BT.2100 HLG
    Hlg,
}

impl FromStr for HdrTransfer {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "PQ" => Ok(HdrTransfer::Pq),
            "HLG" => Ok(HdrTransfer::Hlg),
            other => Err(PipelineError::UnsupportedMethod(format!("HDR transfer {other}"))),
        }
    }
}

/// TIFF compression methods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TiffCompression {
    /// No compression (fastest, largest file)
    #[default]
    None,
    /// LZW compression
    Lzw,
    /// Deflate compression - fast level
    DeflateFast,
    /// Deflate compression - balanced
    DeflateBalanced,
    /// Deflate compression - best compression (slower)
    DeflateBest,
}

/// Everything the encoder needs besides the pixels
#[derive(Debug, Clone, PartialEq)]
pub struct OutputSettings {
    pub mode: OutputMode,
    /// Display gamma for SDR output
    pub gamma: f64,
    /// Primaries the pixels are expressed in
    pub color_space: DisplayColorSpace,
    pub hdr_format: HdrFormat,
    pub hdr_transfer: HdrTransfer,
    pub compression: TiffCompression,
    /// Predictor value for compression (2 for horizontal differencing)
    pub predictor: Option<u16>,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            mode: OutputMode::Sdr,
            gamma: 2.2,
            color_space: DisplayColorSpace::Srgb,
            hdr_format: HdrFormat::Heif,
            hdr_transfer: HdrTransfer::Pq,
            compression: TiffCompression::None,
            predictor: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_output_keys() {
        assert_eq!("HDR".parse::<OutputMode>().unwrap(), OutputMode::Hdr);
        assert_eq!("AVIF".parse::<HdrFormat>().unwrap(), HdrFormat::Avif);
        assert_eq!("HLG".parse::<HdrTransfer>().unwrap(), HdrTransfer::Hlg);

        let err = "JPEG-XL".parse::<HdrFormat>().unwrap_err();
        assert!(matches!(err, PipelineError::UnsupportedMethod(_)));
        assert!(err.to_string().contains("JPEG-XL"));
    }
}
