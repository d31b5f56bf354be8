//! Polynomial feature expansion for regression-based color correction
//!
//! The column layout of every order is fixed: coefficient matrices are
//! calibrated against it, so terms must never be reordered.

use std::fmt;

use crate::image_pipeline::common::error::{PipelineError, Result};

/// Largest number of terms any order produces.
pub const MAX_TERMS: usize = 20;

/// Supported expansion orders, named by their term count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PolynomialOrder {
    /// `R, G, B`
    Order3,
    /// `1, RGB, R, G, B`
    Order5,
    /// `R, G, B, RG, RB, GB, R², G², B²`
    Order9,
    /// `1, RGB` followed by order 9
    Order11,
    /// order 9 followed by `RG², RB², GR², GB², BR², BG², R³, G³, B³`
    Order18,
    /// `1, RGB` followed by order 18
    Order20,
}

impl PolynomialOrder {
    pub fn terms(self) -> usize {
        match self {
            PolynomialOrder::Order3 => 3,
            PolynomialOrder::Order5 => 5,
            PolynomialOrder::Order9 => 9,
            PolynomialOrder::Order11 => 11,
            PolynomialOrder::Order18 => 18,
            PolynomialOrder::Order20 => 20,
        }
    }
}

impl TryFrom<usize> for PolynomialOrder {
    type Error = PipelineError;

    fn try_from(order: usize) -> Result<Self> {
        match order {
            3 => Ok(PolynomialOrder::Order3),
            5 => Ok(PolynomialOrder::Order5),
            9 => Ok(PolynomialOrder::Order9),
            11 => Ok(PolynomialOrder::Order11),
            18 => Ok(PolynomialOrder::Order18),
            20 => Ok(PolynomialOrder::Order20),
            other => Err(PipelineError::InvalidOrder(other)),
        }
    }
}

impl fmt::Display for PolynomialOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.terms())
    }
}

/// Writes the expansion of one pixel into `out` and returns the term count.
#[inline]
pub fn expand_into(rgb: [f64; 3], order: PolynomialOrder, out: &mut [f64; MAX_TERMS]) -> usize {
    let [r, g, b] = rgb;
    let mut n = 0;
    let mut push = |v: f64| {
        out[n] = v;
        n += 1;
    };

    match order {
        PolynomialOrder::Order3 => {
            push(r);
            push(g);
            push(b);
        }
        PolynomialOrder::Order5 => {
            push(1.0);
            push(r * g * b);
            push(r);
            push(g);
            push(b);
        }
        PolynomialOrder::Order9 | PolynomialOrder::Order11 | PolynomialOrder::Order18 | PolynomialOrder::Order20 => {
            if matches!(order, PolynomialOrder::Order11 | PolynomialOrder::Order20) {
                push(1.0);
                push(r * g * b);
            }
            push(r);
            push(g);
            push(b);
            push(r * g);
            push(r * b);
            push(g * b);
            push(r * r);
            push(g * g);
            push(b * b);
            if matches!(order, PolynomialOrder::Order18 | PolynomialOrder::Order20) {
                push(r * (g * g));
                push(r * (b * b));
                push(g * (r * r));
                push(g * (b * b));
                push(b * (r * r));
                push(b * (g * g));
                push(r * r * r);
                push(g * g * g);
                push(b * b * b);
            }
        }
    }
    n
}

/// Expands every row of an `N x 3` RGB matrix into its `N x k` monomial features.
pub fn expand(rgb: &[[f64; 3]], order: usize) -> Result<Vec<Vec<f64>>> {
    let order = PolynomialOrder::try_from(order)?;
    let mut scratch = [0.0; MAX_TERMS];
    Ok(rgb
        .iter()
        .map(|&pixel| {
            let n = expand_into(pixel, order, &mut scratch);
            scratch[..n].to_vec()
        })
        .collect())
}

/// `k x 3` regression coefficients; `k` fixes the expansion order.
#[derive(Debug, Clone, PartialEq)]
pub struct PolynomialCoefficients {
    rows: Vec<[f64; 3]>,
    order: PolynomialOrder,
}

impl PolynomialCoefficients {
    pub fn new(rows: Vec<[f64; 3]>) -> Result<Self> {
        let order = PolynomialOrder::try_from(rows.len())?;
        Ok(Self { rows, order })
    }

    /// Accepts nested rows from a parameter file; each row must have 3 columns.
    pub fn from_nested(rows: &[Vec<f64>]) -> Result<Self> {
        let rows = rows
            .iter()
            .map(|row| {
                <[f64; 3]>::try_from(row.as_slice()).map_err(|_| PipelineError::MatrixShape {
                    name: "polynomial coefficient",
                    expected: 3,
                    got: row.len(),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Self::new(rows)
    }

    pub fn order(&self) -> PolynomialOrder {
        self.order
    }

    /// `features · C` for one expanded pixel.
    #[inline]
    pub fn apply(&self, features: &[f64]) -> [f64; 3] {
        let mut out = [0.0; 3];
        for (&f, row) in features.iter().zip(&self.rows) {
            out[0] += f * row[0];
            out[1] += f * row[1];
            out[2] += f * row[2];
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RGB: [f64; 3] = [0.5, 0.25, 0.1];

    fn expand_one(order: usize) -> Vec<f64> {
        expand(&[RGB], order).unwrap().remove(0)
    }

    #[test]
    fn test_order_9_layout() {
        let [r, g, b] = RGB;
        assert_eq!(expand_one(9), vec![r, g, b, r * g, r * b, g * b, r * r, g * g, b * b]);
    }

    #[test]
    fn test_order_3_and_5_layout() {
        let [r, g, b] = RGB;
        assert_eq!(expand_one(3), vec![r, g, b]);
        assert_eq!(expand_one(5), vec![1.0, r * g * b, r, g, b]);
    }

    #[test]
    fn test_composite_orders_prefix_constant_and_product() {
        let nine = expand_one(9);
        let eleven = expand_one(11);
        assert_eq!(eleven.len(), 11);
        assert_eq!(&eleven[..2], &expand_one(5)[..2]);
        assert_eq!(&eleven[2..], nine.as_slice());

        let eighteen = expand_one(18);
        assert_eq!(&eighteen[..9], nine.as_slice());
        let [r, g, b] = RGB;
        assert_eq!(
            &eighteen[9..],
            &[
                r * (g * g),
                r * (b * b),
                g * (r * r),
                g * (b * b),
                b * (r * r),
                b * (g * g),
                r * r * r,
                g * g * g,
                b * b * b,
            ]
        );

        let twenty = expand_one(20);
        assert_eq!(twenty.len(), 20);
        assert_eq!(&twenty[..2], &[1.0, r * g * b]);
        assert_eq!(&twenty[2..], eighteen.as_slice());
    }

    #[test]
    fn test_invalid_order() {
        assert!(matches!(expand(&[RGB], 4), Err(PipelineError::InvalidOrder(4))));
        assert!(matches!(
            PolynomialCoefficients::new(vec![[0.0; 3]; 7]),
            Err(PipelineError::InvalidOrder(7))
        ));
    }

    #[test]
    fn test_coefficients_from_nested_rows() {
        let rows = vec![vec![1.0, 0.0, 0.0], vec![0.0, 1.0, 0.0], vec![0.0, 0.0, 1.0]];
        let coeffs = PolynomialCoefficients::from_nested(&rows).unwrap();
        assert_eq!(coeffs.order(), PolynomialOrder::Order3);
        assert_eq!(coeffs.apply(&[0.1, 0.2, 0.3]), [0.1, 0.2, 0.3]);

        let ragged = vec![vec![1.0, 0.0], vec![0.0, 1.0, 0.0], vec![0.0, 0.0, 1.0]];
        assert!(matches!(
            PolynomialCoefficients::from_nested(&ragged),
            Err(PipelineError::MatrixShape { got: 2, .. })
        ));
    }
}
