use rayon::prelude::*;

use crate::image_pipeline::common::image::{ColorEncoding, LinearImage};
use crate::image_pipeline::raw::CfaLayout;

use super::SubLattice;

/// Full-resolution bilinear demosaic.
///
/// Red and blue are interpolated the same way whichever corner of the cell
/// they occupy: position (0, 1) of a cell averages horizontally, (1, 0)
/// vertically, and the remaining non-native corner averages four samples.
/// Neighbours past the right or bottom edge repeat the last valid block.
pub(super) fn demosaic(input: &[f64], width: usize, height: usize, layout: &CfaLayout) -> LinearImage {
    let mut image = LinearImage::zeros(width, height, ColorEncoding::CameraRgb);

    let top_left = SubLattice::new(input, width, height, (0, 0));
    let green1 = SubLattice::new(input, width, height, (0, 1));
    let green2 = SubLattice::new(input, width, height, (1, 0));
    let bottom_right = SubLattice::new(input, width, height, (1, 1));
    let tl_index = layout.top_left().rgb_index();
    let br_index = layout.bottom_right().rgb_index();

    image
        .data
        .par_chunks_mut(width * 3)
        .enumerate()
        .for_each(|(y, row)| {
            let (i, dy) = (y / 2, y & 1);
            for (x, pixel) in row.chunks_exact_mut(3).enumerate() {
                let (j, dx) = (x / 2, x & 1);
                pixel[tl_index] = chroma(&top_left, (0, 0), dy, dx, i, j);
                pixel[1] = green(&green1, &green2, dy, dx, i, j);
                pixel[br_index] = chroma(&bottom_right, (1, 1), dy, dx, i, j);
            }
        });

    image
}

#[inline]
fn chroma(src: &SubLattice<'_>, native: (usize, usize), dy: usize, dx: usize, i: usize, j: usize) -> f64 {
    if (dy, dx) == native {
        return src.at(i, j);
    }
    match (dy, dx) {
        (0, 1) => (src.at(i, j) + src.at(i, j + 1)) / 2.0,
        (1, 0) => (src.at(i, j) + src.at(i + 1, j)) / 2.0,
        _ => (src.at(i, j) + src.at(i, j + 1) + src.at(i + 1, j) + src.at(i + 1, j + 1)) / 4.0,
    }
}

#[inline]
fn green(g1: &SubLattice<'_>, g2: &SubLattice<'_>, dy: usize, dx: usize, i: usize, j: usize) -> f64 {
    match (dy, dx) {
        (0, 1) => g1.at(i, j),
        (1, 0) => g2.at(i, j),
        (0, 0) => (g1.at(i, j) + g2.at(i, j)) / 2.0,
        _ => (g1.at(i, j) + g2.at(i, j) + g1.at(i, j + 1) + g2.at(i + 1, j)) / 4.0,
    }
}
