//! Pipeline configuration
//!
//! [`PipelineConfig`] is the typed configuration the orchestrator runs with.
//! It is built in code through [`PipelineConfigBuilder`] or parsed from a
//! JSON parameter bundle ([`PipelineParams`]), which is where string-valued
//! keys are validated.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::image_pipeline::color::matrix::{matrix3_from_rows, Matrix3, SRGB_TO_XYZ};
use crate::image_pipeline::color::{
    ColorTransformConfig, DisplayColorSpace, DisplayTransformConfig, PolynomialCoefficients,
    RgbToXyzMethod,
};
use crate::image_pipeline::common::error::{PipelineError, Result};
use crate::image_pipeline::conversions::stage::StagePlan;
use crate::image_pipeline::debayer::DemosaicMode;
use crate::image_pipeline::output::OutputSettings;
use crate::image_pipeline::raw::{BlackLevelTable, ExposureSettings};

/// Camera RGB to XYZ settings that do not depend on the decoded frame.
///
/// The frame's bit depth is filled in when the stage runs, see [`ColorMethod::resolve`].
#[derive(Debug, Clone, PartialEq)]
pub enum ColorMethod {
    GreyWorld {
        ccm: Matrix3,
    },
    Polynomial {
        coeffs: PolynomialCoefficients,
        exposure_factor: f64,
    },
}

impl ColorMethod {
    pub fn method(&self) -> RgbToXyzMethod {
        match self {
            ColorMethod::GreyWorld { .. } => RgbToXyzMethod::GreyWorld,
            ColorMethod::Polynomial { .. } => RgbToXyzMethod::Polynomial,
        }
    }

    pub fn resolve(&self, bit_depth: f64) -> ColorTransformConfig {
        match self {
            ColorMethod::GreyWorld { ccm } => ColorTransformConfig::GreyWorld { ccm: *ccm },
            ColorMethod::Polynomial {
                coeffs,
                exposure_factor,
            } => ColorTransformConfig::Polynomial {
                coeffs: coeffs.clone(),
                bit_depth,
                exposure_factor: *exposure_factor,
            },
        }
    }
}

impl Default for ColorMethod {
    fn default() -> Self {
        ColorMethod::GreyWorld { ccm: SRGB_TO_XYZ }
    }
}

/// Configuration for a RAW to display conversion
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// RAW file read by `read_raw_data`
    pub raw_file_path: Option<PathBuf>,
    /// Destination written by `save_image`
    pub output_path: Option<PathBuf>,
    pub demosaic: DemosaicMode,
    pub color_method: ColorMethod,
    pub display: DisplayTransformConfig,
    pub output: OutputSettings,
    /// Replaces the decoder's bit depth when set
    pub bit_depth: Option<f64>,
    /// Replaces the decoder's black levels when set
    pub black_levels: Option<BlackLevelTable>,
    /// Whether to reject empty or odd-sized frames right after decoding
    pub validate_dimensions: bool,
    /// Stages executed by `run_all`
    pub steps: StagePlan,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            raw_file_path: None,
            output_path: None,
            demosaic: DemosaicMode::Subsample,
            color_method: ColorMethod::default(),
            display: DisplayTransformConfig::default(),
            output: OutputSettings::default(),
            bit_depth: None,
            black_levels: None,
            validate_dimensions: true,
            steps: StagePlan::full(),
        }
    }
}

impl PipelineConfig {
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        PipelineParams::from_json_str(json)?.into_config()
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        PipelineParams::from_file(path)?.into_config()
    }
}

/// Builder for PipelineConfig
#[derive(Default)]
pub struct PipelineConfigBuilder {
    raw_file_path: Option<PathBuf>,
    output_path: Option<PathBuf>,
    demosaic: Option<DemosaicMode>,
    color_method: Option<ColorMethod>,
    display: Option<DisplayTransformConfig>,
    output: Option<OutputSettings>,
    bit_depth: Option<f64>,
    black_levels: Option<BlackLevelTable>,
    validate_dimensions: Option<bool>,
    steps: Option<StagePlan>,
}

impl PipelineConfigBuilder {
    pub fn raw_file_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.raw_file_path = Some(path.into());
        self
    }

    pub fn output_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.output_path = Some(path.into());
        self
    }

    pub fn demosaic(mut self, enable: bool) -> Self {
        self.demosaic = Some(DemosaicMode::from_flag(enable));
        self
    }

    pub fn color_method(mut self, method: ColorMethod) -> Self {
        self.color_method = Some(method);
        self
    }

    pub fn display(mut self, display: DisplayTransformConfig) -> Self {
        self.display = Some(display);
        self
    }

    pub fn output(mut self, output: OutputSettings) -> Self {
        self.output = Some(output);
        self
    }

    pub fn bit_depth(mut self, bit_depth: f64) -> Self {
        self.bit_depth = Some(bit_depth);
        self
    }

    pub fn black_levels(mut self, table: BlackLevelTable) -> Self {
        self.black_levels = Some(table);
        self
    }

    pub fn validate_dimensions(mut self, validate: bool) -> Self {
        self.validate_dimensions = Some(validate);
        self
    }

    pub fn steps(mut self, steps: StagePlan) -> Self {
        self.steps = Some(steps);
        self
    }

    pub fn build(self) -> PipelineConfig {
        let default = PipelineConfig::default();
        PipelineConfig {
            raw_file_path: self.raw_file_path.or(default.raw_file_path),
            output_path: self.output_path.or(default.output_path),
            demosaic: self.demosaic.unwrap_or(default.demosaic),
            color_method: self.color_method.unwrap_or(default.color_method),
            display: self.display.unwrap_or(default.display),
            output: self.output.unwrap_or(default.output),
            bit_depth: self.bit_depth.or(default.bit_depth),
            black_levels: self.black_levels.or(default.black_levels),
            validate_dimensions: self.validate_dimensions.unwrap_or(default.validate_dimensions),
            steps: self.steps.unwrap_or(default.steps),
        }
    }
}

fn default_rgb_to_xyz_method() -> String {
    "greyworld".to_string()
}

fn default_xyz_to_rgb_method() -> String {
    "default".to_string()
}

fn default_color_space() -> String {
    "sRGB".to_string()
}

fn default_output_mode() -> String {
    "SDR".to_string()
}

fn default_gamma() -> f64 {
    2.2
}

fn default_hdr_format() -> String {
    "HEIF".to_string()
}

fn default_hdr_transfer() -> String {
    "PQ".to_string()
}

fn default_true() -> bool {
    true
}

/// Parameter bundle as stored on disk
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PipelineParams {
    pub raw_file_path: Option<PathBuf>,
    #[serde(default)]
    pub demosaic: bool,
    #[serde(default = "default_rgb_to_xyz_method")]
    pub rgb_to_xyz_method: String,
    pub ccm: Option<Vec<Vec<f64>>>,
    pub polynomial_coeffs: Option<Vec<Vec<f64>>>,
    pub exposure: Option<ExposureSettings>,
    #[serde(default = "default_xyz_to_rgb_method")]
    pub xyz_to_rgb_method: String,
    pub display_matrix: Option<Vec<Vec<f64>>>,
    #[serde(default = "default_color_space")]
    pub color_space: String,
    #[serde(default = "default_output_mode")]
    pub output_mode: String,
    #[serde(default = "default_gamma")]
    pub gamma: f64,
    #[serde(default = "default_hdr_format")]
    pub hdr_format: String,
    #[serde(default = "default_hdr_transfer")]
    pub hdr_transfer: String,
    pub output_path: Option<PathBuf>,
    pub bit_depth: Option<f64>,
    pub black_levels: Option<BlackLevelTable>,
    #[serde(default = "default_true")]
    pub validate_dimensions: bool,
    pub steps: Option<Vec<String>>,
}

impl PipelineParams {
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| PipelineError::InvalidConfig(e.to_string()))
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            PipelineError::InputReadError(format!("{}: {}", path.display(), e))
        })?;
        debug!("Loaded parameters from {}", path.display());
        Self::from_json_str(&content)
    }

    /// Validates every string-valued key and builds the typed configuration.
    pub fn into_config(self) -> Result<PipelineConfig> {
        let color_method = match self.rgb_to_xyz_method.parse::<RgbToXyzMethod>()? {
            RgbToXyzMethod::GreyWorld => {
                let rows = self
                    .ccm
                    .as_deref()
                    .ok_or_else(|| PipelineError::MissingMatrix("ccm for greyworld method".to_string()))?;
                ColorMethod::GreyWorld {
                    ccm: matrix3_from_rows("ccm", rows)?,
                }
            }
            RgbToXyzMethod::Polynomial => {
                let rows = self.polynomial_coeffs.as_deref().ok_or_else(|| {
                    PipelineError::MissingMatrix("polynomialCoeffs for polynomial method".to_string())
                })?;
                let exposure_factor = self.exposure.unwrap_or_default().exposure_factor()?;
                ColorMethod::Polynomial {
                    coeffs: PolynomialCoefficients::from_nested(rows)?,
                    exposure_factor,
                }
            }
        };

        let display_matrix = self
            .display_matrix
            .as_deref()
            .map(|rows| matrix3_from_rows("display", rows))
            .transpose()?;
        let display =
            DisplayTransformConfig::from_parts(&self.xyz_to_rgb_method, &self.color_space, display_matrix)?;

        let color_space: DisplayColorSpace = self.color_space.parse()?;
        let output = OutputSettings {
            mode: self.output_mode.parse()?,
            gamma: self.gamma,
            color_space,
            hdr_format: self.hdr_format.parse()?,
            hdr_transfer: self.hdr_transfer.parse()?,
            ..OutputSettings::default()
        };

        let steps = match &self.steps {
            Some(names) => StagePlan::parse(names)?,
            None => StagePlan::full(),
        };

        if let Some(bit_depth) = self.bit_depth {
            if !(bit_depth.is_finite() && bit_depth > 0.0) {
                return Err(PipelineError::InvalidConfig(format!(
                    "bitDepth must be positive, got {bit_depth}"
                )));
            }
        }

        Ok(PipelineConfig {
            raw_file_path: self.raw_file_path,
            output_path: self.output_path,
            demosaic: DemosaicMode::from_flag(self.demosaic),
            color_method,
            display,
            output,
            bit_depth: self.bit_depth,
            black_levels: self.black_levels,
            validate_dimensions: self.validate_dimensions,
            steps,
        })
    }
}
