//! RAW sensor data module
//!
//! Sensor frames, Bayer pattern descriptors and the decoder boundary.

mod reader;
mod rawloader_reader;
pub mod exposure;
pub mod pattern;
pub mod types;

pub use exposure::ExposureSettings;
pub use pattern::{BayerPattern, CfaChannel, CfaLayout};
pub use reader::RawImageReader;
pub use rawloader_reader::RawLoaderReader;
pub use types::{BlackLevelTable, DecodedRaw, SensorFrame};
