//! CIE XYZ to display RGB

use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::image_pipeline::color::matrix::{self, Matrix3};
use crate::image_pipeline::common::error::{PipelineError, Result};
use crate::image_pipeline::common::image::{ColorEncoding, LinearImage};

pub const XYZ_TO_SRGB: Matrix3 = [
    [3.2406, -1.5372, -0.4986],
    [-0.9689, 1.8758, 0.0415],
    [0.0557, -0.2040, 1.0570],
];

pub const XYZ_TO_DISPLAY_P3: Matrix3 = [
    [2.4934, -1.0296, -0.4958],
    [-0.9314, 1.9082, 0.0239],
    [0.0358, -0.1486, 1.2483],
];

pub const XYZ_TO_BT2020: Matrix3 = [
    [1.7167, -0.3557, -0.2534],
    [-0.6667, 1.6165, 0.0158],
    [0.0176, -0.0428, 0.9421],
];

/// Built-in display color spaces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayColorSpace {
    #[default]
    Srgb,
    DisplayP3,
    Bt2020,
}

impl DisplayColorSpace {
    pub fn xyz_to_rgb_matrix(self) -> Matrix3 {
        match self {
            DisplayColorSpace::Srgb => XYZ_TO_SRGB,
            DisplayColorSpace::DisplayP3 => XYZ_TO_DISPLAY_P3,
            DisplayColorSpace::Bt2020 => XYZ_TO_BT2020,
        }
    }
}

impl FromStr for DisplayColorSpace {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "sRGB" => Ok(DisplayColorSpace::Srgb),
            "DisplayP3" | "Display P3" => Ok(DisplayColorSpace::DisplayP3),
            "BT2020" | "BT-2020" => Ok(DisplayColorSpace::Bt2020),
            other => Err(PipelineError::UnknownColorSpace(other.to_string())),
        }
    }
}

impl fmt::Display for DisplayColorSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Srgb => f.write_str("sRGB"),
            Self::DisplayP3 => f.write_str("DisplayP3"),
            Self::Bt2020 => f.write_str("BT2020"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DisplayTransformConfig {
    /// One of the built-in XYZ to RGB matrices
    Default(DisplayColorSpace),
    /// Caller-supplied XYZ to RGB matrix
    Custom(Matrix3),
}

impl DisplayTransformConfig {
    /// Resolves the `xyzToRgbMethod` / `colorSpace` / display matrix triple of a
    /// parameter file.
    pub fn from_parts(method: &str, color_space: &str, matrix: Option<Matrix3>) -> Result<Self> {
        match method {
            "default" => Ok(DisplayTransformConfig::Default(color_space.parse()?)),
            "custom" => matrix
                .map(DisplayTransformConfig::Custom)
                .ok_or_else(|| PipelineError::MissingMatrix("custom display transform".to_string())),
            other => Err(PipelineError::UnsupportedMethod(other.to_string())),
        }
    }

    pub fn matrix(&self) -> Matrix3 {
        match self {
            DisplayTransformConfig::Default(space) => space.xyz_to_rgb_matrix(),
            DisplayTransformConfig::Custom(m) => *m,
        }
    }
}

impl Default for DisplayTransformConfig {
    fn default() -> Self {
        DisplayTransformConfig::Default(DisplayColorSpace::Srgb)
    }
}

pub struct XyzToRgbTransform {
    config: DisplayTransformConfig,
}

impl XyzToRgbTransform {
    pub fn new(config: DisplayTransformConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DisplayTransformConfig {
        &self.config
    }

    /// `RGB = XYZ · Mᵗ`, clipped to [0, 1].
    pub fn process(&self, xyz: &LinearImage) -> Result<LinearImage> {
        let m = self.config.matrix();
        debug!(config = ?self.config, "XYZ to display RGB");
        Ok(xyz.map_pixels(ColorEncoding::DisplayRgb, |v| {
            matrix::apply(&m, v).map(|c| c.clamp(0.0, 1.0))
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_pipeline::color::matrix::{IDENTITY, SRGB_TO_XYZ};

    fn xyz(pixels: &[[f64; 3]]) -> LinearImage {
        LinearImage::from_pixels(pixels.len(), 1, pixels, ColorEncoding::Xyz).unwrap()
    }

    #[test]
    fn test_in_gamut_srgb_round_trip() {
        let rgb = [0.2, 0.5, 0.7];
        let input = xyz(&[matrix::apply(&SRGB_TO_XYZ, rgb)]);
        let out = XyzToRgbTransform::new(DisplayTransformConfig::Default(DisplayColorSpace::Srgb))
            .process(&input)
            .unwrap();

        for (got, want) in out.pixel(0, 0).iter().zip(rgb) {
            assert!((0.0..=1.0).contains(got));
            // both matrices are rounded to four decimals
            assert!((got - want).abs() < 1e-3, "{got} vs {want}");
        }
    }

    #[test]
    fn test_out_of_gamut_clips_to_bounds() {
        // pure X drives green negative and red above 1
        let input = xyz(&[[1.0, 0.0, 0.0]]);
        let out = XyzToRgbTransform::new(DisplayTransformConfig::default())
            .process(&input)
            .unwrap();
        let px = out.pixel(0, 0);
        assert_eq!(px[0], 1.0);
        assert_eq!(px[1], 0.0);
        assert_eq!(px[2], 0.0557);
    }

    #[test]
    fn test_custom_matrix() {
        let input = xyz(&[[0.25, 0.5, 0.75]]);
        let out = XyzToRgbTransform::new(DisplayTransformConfig::Custom(IDENTITY))
            .process(&input)
            .unwrap();
        assert_eq!(out.pixel(0, 0), [0.25, 0.5, 0.75]);
        assert_eq!(out.encoding, ColorEncoding::DisplayRgb);
    }

    #[test]
    fn test_from_parts_errors_name_the_value() {
        let err = DisplayTransformConfig::from_parts("default", "AdobeRGB", None).unwrap_err();
        assert!(matches!(err, PipelineError::UnknownColorSpace(ref s) if s == "AdobeRGB"));

        let err = DisplayTransformConfig::from_parts("custom", "sRGB", None).unwrap_err();
        assert!(matches!(err, PipelineError::MissingMatrix(_)));

        let err = DisplayTransformConfig::from_parts("lut", "sRGB", None).unwrap_err();
        assert!(err.to_string().contains("lut"));
    }

    #[test]
    fn test_color_space_aliases() {
        assert_eq!(
            DisplayTransformConfig::from_parts("default", "Display P3", None).unwrap(),
            DisplayTransformConfig::Default(DisplayColorSpace::DisplayP3)
        );
        assert_eq!("BT-2020".parse::<DisplayColorSpace>().unwrap(), DisplayColorSpace::Bt2020);
        assert_eq!(DisplayColorSpace::Bt2020.xyz_to_rgb_matrix(), XYZ_TO_BT2020);
    }
}
