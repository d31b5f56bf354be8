//! Named pipeline stages and validated stage plans

use std::fmt;
use std::str::FromStr;

use crate::image_pipeline::common::error::{PipelineError, Result};

/// One step of the RAW-to-display pipeline, in data-flow order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Stage {
    ReadRawData,
    ApplyBlc,
    ConvertRawToRgb,
    ConvertRgbToXyz,
    ConvertXyzToRgb,
    SaveImage,
}

impl Stage {
    pub const ALL: [Stage; 6] = [
        Stage::ReadRawData,
        Stage::ApplyBlc,
        Stage::ConvertRawToRgb,
        Stage::ConvertRgbToXyz,
        Stage::ConvertXyzToRgb,
        Stage::SaveImage,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Stage::ReadRawData => "read_raw_data",
            Stage::ApplyBlc => "apply_blc",
            Stage::ConvertRawToRgb => "convert_raw_to_rgb",
            Stage::ConvertRgbToXyz => "convert_rgb_to_xyz",
            Stage::ConvertXyzToRgb => "convert_xyz_to_rgb",
            Stage::SaveImage => "save_image",
        }
    }

    /// The stage whose output this one consumes.
    pub fn requires(self) -> Option<Stage> {
        match self {
            Stage::ReadRawData => None,
            Stage::ApplyBlc => Some(Stage::ReadRawData),
            Stage::ConvertRawToRgb => Some(Stage::ApplyBlc),
            Stage::ConvertRgbToXyz => Some(Stage::ConvertRawToRgb),
            Stage::ConvertXyzToRgb => Some(Stage::ConvertRgbToXyz),
            Stage::SaveImage => Some(Stage::ConvertXyzToRgb),
        }
    }
}

impl FromStr for Stage {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self> {
        Stage::ALL
            .into_iter()
            .find(|stage| stage.name() == s)
            .ok_or_else(|| PipelineError::UnknownStage(s.to_string()))
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Ordered list of stages to execute.
///
/// Names are resolved when the plan is built, so a plan that exists can always
/// be dispatched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagePlan {
    stages: Vec<Stage>,
}

impl StagePlan {
    pub fn new(stages: Vec<Stage>) -> Self {
        Self { stages }
    }

    /// Every stage, read to save.
    pub fn full() -> Self {
        Self::new(Stage::ALL.to_vec())
    }

    /// Every stage up to and including `last`.
    pub fn through(last: Stage) -> Self {
        Self::new(Stage::ALL.into_iter().filter(|s| *s <= last).collect())
    }

    pub fn parse<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let stages = names
            .into_iter()
            .map(|name| name.as_ref().trim().parse())
            .collect::<Result<Vec<Stage>>>()?;
        Ok(Self::new(stages))
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

impl Default for StagePlan {
    fn default() -> Self {
        Self::full()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for stage in Stage::ALL {
            assert_eq!(stage.name().parse::<Stage>().unwrap(), stage);
        }
    }

    #[test]
    fn test_unknown_stage_name() {
        let err = StagePlan::parse(["read_raw_data", "sharpen"]).unwrap_err();
        assert!(matches!(err, PipelineError::UnknownStage(ref name) if name == "sharpen"));
    }

    #[test]
    fn test_empty_plan() {
        let plan = StagePlan::parse(Vec::<String>::new()).unwrap();
        assert!(plan.is_empty());
        assert!(!StagePlan::full().is_empty());
    }

    #[test]
    fn test_through_stops_at_stage() {
        let plan = StagePlan::through(Stage::ConvertRawToRgb);
        assert_eq!(
            plan.stages(),
            &[Stage::ReadRawData, Stage::ApplyBlc, Stage::ConvertRawToRgb]
        );
    }

    #[test]
    fn test_dependencies_form_a_chain() {
        assert_eq!(Stage::ReadRawData.requires(), None);
        for pair in Stage::ALL.windows(2) {
            assert_eq!(pair[1].requires(), Some(pair[0]));
        }
    }
}
