//! Bayer pattern descriptors
//!
//! A [`BayerPattern`] is resolved once into a [`CfaLayout`], a lookup table from
//! 2x2 sub-lattice position to physical channel. Stages only ever consult the
//! layout, so the two supported patterns share one code path everywhere.

use std::fmt;
use std::str::FromStr;

use crate::image_pipeline::common::error::{PipelineError, Result};

/// Physical photosite role inside one 2x2 Bayer cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CfaChannel {
    R,
    G1,
    G2,
    B,
}

impl CfaChannel {
    /// Index of the channel in an interleaved RGB pixel.
    pub fn rgb_index(self) -> usize {
        match self {
            CfaChannel::R => 0,
            CfaChannel::G1 | CfaChannel::G2 => 1,
            CfaChannel::B => 2,
        }
    }
}

impl fmt::Display for CfaChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::R => f.write_str("R"),
            Self::G1 => f.write_str("G1"),
            Self::G2 => f.write_str("G2"),
            Self::B => f.write_str("B"),
        }
    }
}

/// The two recognized 2x2 Bayer layouts.
///
/// Any other layout is rejected when the pattern is constructed, so holding a
/// `BayerPattern` is proof that downstream stages can handle it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BayerPattern {
    /// `[[R, G1], [G2, B]]`, raw indices `[[0, 1], [3, 2]]`
    Rggb,
    /// `[[B, G1], [G2, R]]`, raw indices `[[2, 3], [1, 0]]`
    Bggr,
}

const RGGB_INDICES: [[u8; 2]; 2] = [[0, 1], [3, 2]];
const BGGR_INDICES: [[u8; 2]; 2] = [[2, 3], [1, 0]];

impl BayerPattern {
    /// Resolves a decoder's 2x2 channel-index matrix.
    pub fn from_indices(indices: [[u8; 2]; 2]) -> Result<Self> {
        match indices {
            RGGB_INDICES => Ok(BayerPattern::Rggb),
            BGGR_INDICES => Ok(BayerPattern::Bggr),
            other => Err(PipelineError::UnsupportedPattern(format!("{other:?}"))),
        }
    }

    pub fn indices(self) -> [[u8; 2]; 2] {
        match self {
            BayerPattern::Rggb => RGGB_INDICES,
            BayerPattern::Bggr => BGGR_INDICES,
        }
    }

    pub fn layout(self) -> CfaLayout {
        use CfaChannel::*;
        match self {
            BayerPattern::Rggb => CfaLayout { cells: [[R, G1], [G2, B]] },
            BayerPattern::Bggr => CfaLayout { cells: [[B, G1], [G2, R]] },
        }
    }
}

impl FromStr for BayerPattern {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "RGGB" => Ok(BayerPattern::Rggb),
            "BGGR" => Ok(BayerPattern::Bggr),
            _ => Err(PipelineError::UnsupportedPattern(s.to_string())),
        }
    }
}

impl fmt::Display for BayerPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rggb => f.write_str("RGGB"),
            Self::Bggr => f.write_str("BGGR"),
        }
    }
}

/// Sub-lattice position to channel lookup table.
///
/// Greens always sit off the diagonal: G1 at (0, 1), G2 at (1, 0).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CfaLayout {
    cells: [[CfaChannel; 2]; 2],
}

impl CfaLayout {
    #[inline]
    pub fn channel_at(&self, row: usize, col: usize) -> CfaChannel {
        self.cells[row & 1][col & 1]
    }

    /// Channel on the even/even sub-lattice (R or B).
    pub fn top_left(&self) -> CfaChannel {
        self.cells[0][0]
    }

    /// Channel on the odd/odd sub-lattice (B or R).
    pub fn bottom_right(&self) -> CfaChannel {
        self.cells[1][1]
    }
}
