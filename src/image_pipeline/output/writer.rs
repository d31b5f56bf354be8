use std::io::Write;

use crate::image_pipeline::common::error::Result;
use crate::image_pipeline::common::image::LinearImage;
use crate::image_pipeline::output::types::OutputSettings;

/// Encoder boundary: takes linear display RGB in [0, 1] and owns tone curves,
/// quantization and container layout.
pub trait ImageWriter {
    fn write_image(&self, image: &LinearImage, output: &mut dyn Write, settings: &OutputSettings) -> Result<()>;
}
