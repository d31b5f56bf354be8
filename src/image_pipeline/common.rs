//! Common utilities module
//!
//! This module contains shared types and utilities used across the image pipeline.

pub mod error;
pub mod image;
pub mod timing;

pub use error::{PipelineError, Result};
pub use image::{ColorEncoding, LinearImage};
pub use timing::{PipelineTimings, StepTiming, Timer};
