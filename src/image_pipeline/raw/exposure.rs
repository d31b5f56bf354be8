//! Exposure normalization for the polynomial color path
//!
//! Polynomial coefficients are calibrated at a reference exposure of
//! 1/4 s, f/8 and ISO 100. Other exposures are brought back to that
//! reference with a single scalar.

use serde::Deserialize;

use crate::image_pipeline::common::error::{PipelineError, Result};

pub const REF_SHUTTER: f64 = 1.0 / 4.0;
pub const REF_APERTURE: f64 = 8.0;
pub const REF_ISO: f64 = 100.0;

/// Shot parameters read from EXIF
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExposureSettings {
    /// Shutter time in seconds
    pub shutter: f64,
    /// Aperture as an f-number
    pub f_number: f64,
    pub iso: f64,
}

impl ExposureSettings {
    pub fn new(shutter: f64, f_number: f64, iso: f64) -> Self {
        Self { shutter, f_number, iso }
    }

    /// The calibration exposure; its factor is exactly 1.
    pub fn reference() -> Self {
        Self::new(REF_SHUTTER, REF_APERTURE, REF_ISO)
    }

    /// `(ref_shutter / shutter) * (f_number / ref_aperture)^2 * (ref_iso / iso)`
    pub fn exposure_factor(&self) -> Result<f64> {
        for (name, value) in [
            ("shutter", self.shutter),
            ("fNumber", self.f_number),
            ("iso", self.iso),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(PipelineError::InvalidConfig(format!(
                    "exposure {name} must be positive, got {value}"
                )));
            }
        }

        Ok((REF_SHUTTER / self.shutter)
            * (self.f_number / REF_APERTURE).powi(2)
            * (REF_ISO / self.iso))
    }
}

impl Default for ExposureSettings {
    fn default() -> Self {
        Self::reference()
    }
}
