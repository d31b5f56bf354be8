use crate::image_pipeline::common::image::{ColorEncoding, LinearImage};
use crate::image_pipeline::raw::CfaLayout;

use super::SubLattice;

/// Half-resolution mapping: every 2x2 cell becomes one pixel.
///
/// Red and blue are taken as-is from their sub-lattice; green is the mean of
/// the two green photosites of the cell.
pub(super) fn demosaic(input: &[f64], width: usize, height: usize, layout: &CfaLayout) -> LinearImage {
    let out_width = width / 2;
    let out_height = height / 2;
    let mut image = LinearImage::zeros(out_width, out_height, ColorEncoding::CameraRgb);

    let top_left = SubLattice::new(input, width, height, (0, 0));
    let green1 = SubLattice::new(input, width, height, (0, 1));
    let green2 = SubLattice::new(input, width, height, (1, 0));
    let bottom_right = SubLattice::new(input, width, height, (1, 1));
    let tl_index = layout.top_left().rgb_index();
    let br_index = layout.bottom_right().rgb_index();

    for (idx, pixel) in image.data.chunks_exact_mut(3).enumerate() {
        let (i, j) = (idx / out_width, idx % out_width);
        pixel[tl_index] = top_left.at(i, j);
        pixel[1] = (green1.at(i, j) + green2.at(i, j)) / 2.0;
        pixel[br_index] = bottom_right.at(i, j);
    }

    image
}
