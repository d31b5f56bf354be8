//! Color transform module
//!
//! Camera RGB to XYZ (grey-world + CCM, or polynomial regression) and XYZ to
//! display RGB.

pub mod matrix;
pub mod polynomial;
pub mod rgb_to_xyz;
pub mod xyz_to_rgb;

pub use matrix::Matrix3;
pub use polynomial::{expand, PolynomialCoefficients, PolynomialOrder};
pub use rgb_to_xyz::{ColorTransformConfig, RgbToXyzMethod, RgbToXyzTransform};
pub use xyz_to_rgb::{DisplayColorSpace, DisplayTransformConfig, XyzToRgbTransform};
