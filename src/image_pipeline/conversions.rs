//! Pipeline orchestration
//!
//! Holds the configuration bundle, the named stage plan and the orchestrator
//! that threads one image through black-level correction, demosaicing, color
//! conversion and encoding.

pub mod config;
mod raw_to_display;
pub mod stage;


pub use config::{ColorMethod, PipelineConfig, PipelineConfigBuilder, PipelineParams};
pub use raw_to_display::{ColorPipeline, PipelineState, RunReport};
pub use stage::{Stage, StagePlan};
