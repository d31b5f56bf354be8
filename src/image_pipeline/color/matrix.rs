//! 3x3 color matrices

use crate::image_pipeline::common::error::{PipelineError, Result};

/// Row-major 3x3 matrix; row `i` produces output channel `i`.
pub type Matrix3 = [[f64; 3]; 3];

pub const IDENTITY: Matrix3 = [
    [1.0, 0.0, 0.0],
    [0.0, 1.0, 0.0],
    [0.0, 0.0, 1.0],
];

/// Linear sRGB (D65) to XYZ, the stock camera CCM when nothing better is calibrated.
pub const SRGB_TO_XYZ: Matrix3 = [
    [0.4124, 0.3576, 0.1805],
    [0.2126, 0.7152, 0.0722],
    [0.0193, 0.1192, 0.9505],
];

/// `v · Mᵗ`, i.e. `M · v` for a column vector.
#[inline]
pub fn apply(m: &Matrix3, v: [f64; 3]) -> [f64; 3] {
    [
        v[0] * m[0][0] + v[1] * m[0][1] + v[2] * m[0][2],
        v[0] * m[1][0] + v[1] * m[1][1] + v[2] * m[1][2],
        v[0] * m[2][0] + v[1] * m[2][1] + v[2] * m[2][2],
    ]
}

/// Converts nested rows (as they come out of a parameter file) into a 3x3 matrix.
pub fn matrix3_from_rows(name: &'static str, rows: &[Vec<f64>]) -> Result<Matrix3> {
    if rows.len() != 3 {
        return Err(PipelineError::InvalidConfig(format!(
            "{name} matrix must have 3 rows, got {}",
            rows.len()
        )));
    }
    let mut m = [[0.0; 3]; 3];
    for (dst, src) in m.iter_mut().zip(rows) {
        if src.len() != 3 {
            return Err(PipelineError::MatrixShape {
                name,
                expected: 3,
                got: src.len(),
            });
        }
        dst.copy_from_slice(src);
    }
    Ok(m)
}
