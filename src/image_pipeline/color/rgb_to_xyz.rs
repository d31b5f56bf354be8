//! Camera RGB to CIE XYZ

use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::image_pipeline::color::matrix::{self, Matrix3};
use crate::image_pipeline::color::polynomial::{expand_into, PolynomialCoefficients, MAX_TERMS};
use crate::image_pipeline::common::error::{PipelineError, Result};
use crate::image_pipeline::common::image::{ColorEncoding, LinearImage};
use crate::image_pipeline::raw::types::max_value_for_bit_depth;

/// Polynomial coefficients are fitted against XYZ scaled by 10000.
pub const POLYNOMIAL_OUTPUT_SCALE: f64 = 10000.0;

/// Method names accepted in parameter files
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RgbToXyzMethod {
    GreyWorld,
    Polynomial,
}

impl FromStr for RgbToXyzMethod {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "greyworld" => Ok(RgbToXyzMethod::GreyWorld),
            "polynomial" => Ok(RgbToXyzMethod::Polynomial),
            other => Err(PipelineError::UnsupportedMethod(other.to_string())),
        }
    }
}

impl fmt::Display for RgbToXyzMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GreyWorld => f.write_str("greyworld"),
            Self::Polynomial => f.write_str("polynomial"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ColorTransformConfig {
    /// Grey-world white balance followed by a 3x3 color correction matrix
    GreyWorld { ccm: Matrix3 },
    /// Polynomial regression on sensor-domain values, normalized for exposure
    Polynomial {
        coeffs: PolynomialCoefficients,
        bit_depth: f64,
        exposure_factor: f64,
    },
}

impl ColorTransformConfig {
    pub fn method(&self) -> RgbToXyzMethod {
        match self {
            ColorTransformConfig::GreyWorld { .. } => RgbToXyzMethod::GreyWorld,
            ColorTransformConfig::Polynomial { .. } => RgbToXyzMethod::Polynomial,
        }
    }
}

pub struct RgbToXyzTransform {
    config: ColorTransformConfig,
}

impl RgbToXyzTransform {
    pub fn new(config: ColorTransformConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ColorTransformConfig {
        &self.config
    }

    /// Maps normalized camera RGB to XYZ at the same resolution.
    pub fn process(&self, rgb: &LinearImage) -> Result<LinearImage> {
        match &self.config {
            ColorTransformConfig::GreyWorld { ccm } => greyworld_ccm(rgb, ccm),
            ColorTransformConfig::Polynomial {
                coeffs,
                bit_depth,
                exposure_factor,
            } => polynomial_transform(rgb, coeffs, *bit_depth, *exposure_factor),
        }
    }
}

/// Per-channel gains `[mean(G)/mean(R), 1, mean(G)/mean(B)]`.
///
/// A channel whose mean is exactly zero is reported as
/// [`PipelineError::DivisionByZero`] rather than producing inf/NaN gains.
pub fn greyworld_gains(rgb: &LinearImage) -> Result<[f64; 3]> {
    let means = [rgb.channel_mean(0), rgb.channel_mean(1), rgb.channel_mean(2)];
    for (channel, mean) in ["R", "G", "B"].into_iter().zip(means) {
        if mean == 0.0 {
            return Err(PipelineError::DivisionByZero { channel });
        }
    }
    let [mean_r, mean_g, mean_b] = means;
    Ok([mean_g / mean_r, 1.0, mean_g / mean_b])
}

fn greyworld_ccm(rgb: &LinearImage, ccm: &Matrix3) -> Result<LinearImage> {
    let [scale_r, _, scale_b] = greyworld_gains(rgb)?;
    debug!(scale_r, scale_b, "Grey-world gains");

    Ok(rgb.map_pixels(ColorEncoding::Xyz, |[r, g, b]| {
        let balanced = [
            (r * scale_r).clamp(0.0, 1.0),
            g.clamp(0.0, 1.0),
            (b * scale_b).clamp(0.0, 1.0),
        ];
        matrix::apply(ccm, balanced)
    }))
}

fn polynomial_transform(
    rgb: &LinearImage,
    coeffs: &PolynomialCoefficients,
    bit_depth: f64,
    exposure_factor: f64,
) -> Result<LinearImage> {
    let max_value = max_value_for_bit_depth(bit_depth);
    let gain = exposure_factor / POLYNOMIAL_OUTPUT_SCALE;
    let order = coeffs.order();
    debug!(%order, max_value, exposure_factor, "Polynomial transform");

    Ok(rgb.map_pixels(ColorEncoding::Xyz, |[r, g, b]| {
        let mut features = [0.0; MAX_TERMS];
        let n = expand_into([r * max_value, g * max_value, b * max_value], order, &mut features);
        let [x, y, z] = coeffs.apply(&features[..n]);
        [x * gain, y * gain, z * gain]
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_pipeline::color::matrix::IDENTITY;

    fn image(pixels: &[[f64; 3]]) -> LinearImage {
        LinearImage::from_pixels(pixels.len(), 1, pixels, ColorEncoding::CameraRgb).unwrap()
    }

    #[test]
    fn test_balanced_input_is_unchanged() {
        // every channel sums the same values in the same order
        let input = image(&[[0.2, 0.2, 0.2], [0.4, 0.4, 0.4]]);
        assert_eq!(greyworld_gains(&input).unwrap(), [1.0, 1.0, 1.0]);

        let out = RgbToXyzTransform::new(ColorTransformConfig::GreyWorld { ccm: IDENTITY })
            .process(&input)
            .unwrap();
        assert_eq!(out.data, input.data);
        assert_eq!(out.encoding, ColorEncoding::Xyz);
    }

    #[test]
    fn test_gains_pivot_on_green_and_clip() {
        // mean R = 0.1, mean G = 0.4, mean B = 0.2
        let input = image(&[[0.05, 0.4, 0.1], [0.15, 0.4, 0.3]]);
        let gains = greyworld_gains(&input).unwrap();
        assert!((gains[0] - 4.0).abs() < 1e-12);
        assert_eq!(gains[1], 1.0);
        assert!((gains[2] - 2.0).abs() < 1e-12);

        let out = RgbToXyzTransform::new(ColorTransformConfig::GreyWorld { ccm: IDENTITY })
            .process(&input)
            .unwrap();
        let second = out.pixel(0, 1);
        assert!((second[0] - 0.6).abs() < 1e-12);
        assert_eq!(second[1], 0.4);
        assert!((second[2] - 0.6).abs() < 1e-12);

        let bright = image(&[[0.5, 0.9, 0.9], [0.1, 0.9, 0.9]]);
        let clipped = RgbToXyzTransform::new(ColorTransformConfig::GreyWorld { ccm: IDENTITY })
            .process(&bright)
            .unwrap();
        assert_eq!(clipped.pixel(0, 0)[0], 1.0);
    }

    #[test]
    fn test_ccm_is_applied_after_balance() {
        let input = image(&[[0.5, 0.5, 0.5]]);
        let out = RgbToXyzTransform::new(ColorTransformConfig::GreyWorld {
            ccm: matrix::SRGB_TO_XYZ,
        })
        .process(&input)
        .unwrap();
        let expected = matrix::apply(&matrix::SRGB_TO_XYZ, [0.5, 0.5, 0.5]);
        assert_eq!(out.pixel(0, 0), expected);
    }

    #[test]
    fn test_zero_channel_mean_is_an_error() {
        let input = image(&[[0.0, 0.5, 0.5], [0.0, 0.2, 0.1]]);
        let err = RgbToXyzTransform::new(ColorTransformConfig::GreyWorld { ccm: IDENTITY })
            .process(&input)
            .unwrap_err();
        assert!(matches!(err, PipelineError::DivisionByZero { channel: "R" }));

        let black = image(&[[0.0, 0.0, 0.0]]);
        assert!(greyworld_gains(&black).is_err());
    }

    #[test]
    fn test_polynomial_path_rescales_and_normalizes() {
        // order 3 identity: XYZ = sensor RGB * factor / 10000
        let coeffs = PolynomialCoefficients::new(IDENTITY.to_vec()).unwrap();
        let input = image(&[[1.0, 0.5, 0.0]]);
        let out = RgbToXyzTransform::new(ColorTransformConfig::Polynomial {
            coeffs,
            bit_depth: 10.0,
            exposure_factor: 2.0,
        })
        .process(&input)
        .unwrap();

        let gain = 2.0 / 10000.0;
        let px = out.pixel(0, 0);
        assert!((px[0] - 1023.0 * gain).abs() < 1e-12);
        assert!((px[1] - 511.5 * gain).abs() < 1e-12);
        assert_eq!(px[2], 0.0);
    }

    #[test]
    fn test_polynomial_output_is_not_clipped() {
        // order 5: constant term alone drives X far above 1
        let mut rows = vec![[0.0; 3]; 5];
        rows[0] = [50000.0, 0.0, -50000.0];
        let coeffs = PolynomialCoefficients::new(rows).unwrap();
        let input = image(&[[0.1, 0.1, 0.1]]);
        let out = RgbToXyzTransform::new(ColorTransformConfig::Polynomial {
            coeffs,
            bit_depth: 12.0,
            exposure_factor: 1.0,
        })
        .process(&input)
        .unwrap();

        let px = out.pixel(0, 0);
        assert!((px[0] - 5.0).abs() < 1e-12);
        assert_eq!(px[1], 0.0);
        assert!((px[2] + 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_method_names() {
        assert_eq!("greyworld".parse::<RgbToXyzMethod>().unwrap(), RgbToXyzMethod::GreyWorld);
        assert_eq!("polynomial".parse::<RgbToXyzMethod>().unwrap(), RgbToXyzMethod::Polynomial);
        let err = "matrix".parse::<RgbToXyzMethod>().unwrap_err();
        assert!(matches!(err, PipelineError::UnsupportedMethod(ref m) if m == "matrix"));
    }
}
