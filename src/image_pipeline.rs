//! RAW-to-display color pipeline
//!
//! Stage modules (`blc`, `debayer`, `color`) are pure transforms over in-memory
//! buffers. `raw` and `output` hold the decoder and encoder boundaries, and
//! `conversions` orchestrates a run.

pub mod blc;
pub mod color;
pub mod common;
pub mod conversions;
pub mod debayer;
pub mod output;
pub mod raw;

pub use common::{
    ColorEncoding,
    LinearImage,
    PipelineError,
    PipelineTimings,
    Result,
};

pub use raw::{
    BayerPattern,
    BlackLevelTable,
    DecodedRaw,
    ExposureSettings,
    RawImageReader,
    RawLoaderReader,
    SensorFrame,
};

pub use blc::BlackLevelCorrector;
pub use debayer::{DemosaicMode, Demosaicer};

pub use color::{
    ColorTransformConfig,
    DisplayColorSpace,
    DisplayTransformConfig,
    PolynomialCoefficients,
    PolynomialOrder,
    RgbToXyzTransform,
    XyzToRgbTransform,
};

pub use output::{
    HdrFormat,
    HdrTransfer,
    ImageWriter,
    OutputMode,
    OutputSettings,
    StandardTiffWriter,
    TiffCompression,
};

pub use conversions::{
    ColorMethod,
    ColorPipeline,
    PipelineConfig,
    PipelineConfigBuilder,
    PipelineParams,
    PipelineState,
    RunReport,
    Stage,
    StagePlan,
};
