//! Image output module
//!
//! The encoder boundary of the pipeline plus a TIFF implementation with
//! gamma, PQ and HLG transfer curves.

mod standard_tiff_writer;
mod writer;
pub mod transfer;
pub mod types;

pub use standard_tiff_writer::{quantize_hdr, quantize_sdr, StandardTiffWriter};
pub use types::{HdrFormat, HdrTransfer, OutputMode, OutputSettings, TiffCompression};
pub use writer::ImageWriter;
