use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, error, info, instrument, warn};

use crate::image_pipeline::{
    blc::BlackLevelCorrector,
    color::{DisplayTransformConfig, RgbToXyzTransform, XyzToRgbTransform},
    common::{
        error::{PipelineError, Result},
        image::LinearImage,
        timing::{PipelineTimings, Timer},
    },
    conversions::{
        config::{ColorMethod, PipelineConfig},
        stage::{Stage, StagePlan},
    },
    debayer::Demosaicer,
    output::{ImageWriter, OutputSettings, StandardTiffWriter},
    raw::{BlackLevelTable, DecodedRaw, RawImageReader, RawLoaderReader, SensorFrame},
};

/// Buffers produced so far, one slot per stage output.
///
/// Re-running a stage clears every slot downstream of it, so a populated slot
/// always derives from the slots before it.
#[derive(Debug, Default, Clone)]
pub struct PipelineState {
    pub raw: Option<SensorFrame>,
    pub black_levels: Option<BlackLevelTable>,
    pub blc: Option<SensorFrame>,
    pub camera_rgb: Option<LinearImage>,
    pub xyz: Option<LinearImage>,
    pub display_rgb: Option<LinearImage>,
    pub saved_to: Option<PathBuf>,
    /// Stage that returned the error of the last failed run
    pub failed_stage: Option<Stage>,
}

impl PipelineState {
    /// Drops the output of `stage` and of every stage after it.
    fn clear_from(&mut self, stage: Stage) {
        if stage <= Stage::ReadRawData {
            self.raw = None;
            self.black_levels = None;
        }
        if stage <= Stage::ApplyBlc {
            self.blc = None;
        }
        if stage <= Stage::ConvertRawToRgb {
            self.camera_rgb = None;
        }
        if stage <= Stage::ConvertRgbToXyz {
            self.xyz = None;
        }
        if stage <= Stage::ConvertXyzToRgb {
            self.display_rgb = None;
        }
        self.saved_to = None;
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_none()
    }
}

/// Outcome of a successful run
#[derive(Debug, Clone)]
pub struct RunReport {
    pub stages: Vec<Stage>,
    pub timings: PipelineTimings,
}

fn missing_input(stage: Stage) -> PipelineError {
    PipelineError::MissingStageInput {
        stage: stage.name(),
        requires: stage.requires().map_or("", Stage::name),
    }
}

pub struct ColorPipeline<R: RawImageReader, W: ImageWriter> {
    reader: R,
    writer: W,
    config: PipelineConfig,
    state: PipelineState,
}

impl ColorPipeline<RawLoaderReader, StandardTiffWriter> {
    pub fn new(config: PipelineConfig) -> Self {
        Self::with_custom(RawLoaderReader, StandardTiffWriter, config)
    }
}

impl<R: RawImageReader, W: ImageWriter> ColorPipeline<R, W> {
    pub fn with_custom(reader: R, writer: W, config: PipelineConfig) -> Self {
        Self {
            reader,
            writer,
            config,
            state: PipelineState::default(),
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut PipelineConfig {
        &mut self.config
    }

    pub fn set_config(&mut self, config: PipelineConfig) {
        self.config = config;
    }

    pub fn set_color_method(&mut self, method: ColorMethod) {
        self.config.color_method = method;
    }

    pub fn set_display(&mut self, display: DisplayTransformConfig) {
        self.config.display = display;
    }

    pub fn set_output(&mut self, output: OutputSettings) {
        self.config.output = output;
    }

    pub fn state(&self) -> &PipelineState {
        &self.state
    }

    /// Seeds the pipeline with an already decoded frame, as `read_raw_data`
    /// would after decoding the configured file.
    pub fn load_frame(&mut self, decoded: DecodedRaw) -> Result<()> {
        let DecodedRaw {
            mut frame,
            mut black_levels,
        } = decoded;

        if let Some(bit_depth) = self.config.bit_depth {
            debug!(from = frame.bit_depth, to = bit_depth, "Overriding bit depth");
            frame = SensorFrame::new(frame.width, frame.height, frame.data, frame.pattern, bit_depth)?;
        }
        if let Some(table) = self.config.black_levels {
            debug!(?table, "Overriding black levels");
            black_levels = table;
        }

        if self.config.validate_dimensions {
            let _span = tracing::info_span!(
                "validate_dimensions",
                width = frame.width,
                height = frame.height
            )
            .entered();
            frame.validate_dimensions()?;
        }

        debug!(
            width = frame.width,
            height = frame.height,
            pattern = %frame.pattern,
            bit_depth = frame.bit_depth,
            "Loaded sensor frame"
        );

        self.state.clear_from(Stage::ReadRawData);
        self.state.failed_stage = None;
        self.state.raw = Some(frame);
        self.state.black_levels = Some(black_levels);
        Ok(())
    }

    /// Runs the stages of the configured plan.
    pub fn run_all(&mut self) -> Result<RunReport> {
        let plan = self.config.steps.clone();
        self.run(&plan)
    }

    #[instrument(skip(self, plan), fields(stages = plan.stages().len()))]
    pub fn run(&mut self, plan: &StagePlan) -> Result<RunReport> {
        info!("Starting color pipeline");
        self.state.failed_stage = None;

        let mut timings = PipelineTimings::new();
        for &stage in plan.stages() {
            let _span = tracing::info_span!("stage", name = stage.name()).entered();
            let timer = Timer::start(stage.name());
            if let Err(e) = self.run_stage(stage) {
                error!(stage = stage.name(), "Stage failed: {}", e);
                self.state.failed_stage = Some(stage);
                return Err(e);
            }
            let (name, duration) = timer.stop();
            timings.add_step(name, duration);
        }

        timings.log_summary();
        info!("Color pipeline complete");
        Ok(RunReport {
            stages: plan.stages().to_vec(),
            timings,
        })
    }

    pub fn run_stage(&mut self, stage: Stage) -> Result<()> {
        match stage {
            Stage::ReadRawData => self.read_raw_data(),
            Stage::ApplyBlc => self.apply_blc(),
            Stage::ConvertRawToRgb => self.convert_raw_to_rgb(),
            Stage::ConvertRgbToXyz => self.convert_rgb_to_xyz(),
            Stage::ConvertXyzToRgb => self.convert_xyz_to_rgb(),
            Stage::SaveImage => self.save_image(),
        }
    }

    fn read_raw_data(&mut self) -> Result<()> {
        let path = self
            .config
            .raw_file_path
            .clone()
            .ok_or_else(|| PipelineError::InvalidConfig("rawFilePath is not set".to_string()))?;

        let input_data = std::fs::read(&path)
            .map_err(|e| PipelineError::InputReadError(format!("{}: {}", path.display(), e)))?;
        debug!(path = %path.display(), bytes = input_data.len(), "Read RAW file");

        let decoded = self.reader.read_raw(&input_data)?;
        self.load_frame(decoded)
    }

    fn apply_blc(&mut self) -> Result<()> {
        let corrected = {
            let (Some(raw), Some(table)) = (&self.state.raw, self.state.black_levels) else {
                return Err(missing_input(Stage::ApplyBlc));
            };
            BlackLevelCorrector::new(raw.pattern, table).process(raw)?
        };

        self.state.clear_from(Stage::ApplyBlc);
        self.state.blc = Some(corrected);
        Ok(())
    }

    fn convert_raw_to_rgb(&mut self) -> Result<()> {
        let rgb = {
            let frame = self
                .state
                .blc
                .as_ref()
                .ok_or_else(|| missing_input(Stage::ConvertRawToRgb))?;
            Demosaicer::new(frame.pattern, self.config.demosaic, frame.bit_depth).process(frame)?
        };
        log_buffer("camera_rgb", &rgb);

        self.state.clear_from(Stage::ConvertRawToRgb);
        self.state.camera_rgb = Some(rgb);
        Ok(())
    }

    fn convert_rgb_to_xyz(&mut self) -> Result<()> {
        let xyz = {
            let (Some(frame), Some(rgb)) = (&self.state.blc, &self.state.camera_rgb) else {
                return Err(missing_input(Stage::ConvertRgbToXyz));
            };
            let config = self.config.color_method.resolve(frame.bit_depth);
            debug!(method = ?config.method(), "Converting camera RGB to XYZ");
            RgbToXyzTransform::new(config).process(rgb)?
        };
        log_buffer("xyz", &xyz);

        self.state.clear_from(Stage::ConvertRgbToXyz);
        self.state.xyz = Some(xyz);
        Ok(())
    }

    fn convert_xyz_to_rgb(&mut self) -> Result<()> {
        let display = {
            let xyz = self
                .state
                .xyz
                .as_ref()
                .ok_or_else(|| missing_input(Stage::ConvertXyzToRgb))?;
            XyzToRgbTransform::new(self.config.display.clone()).process(xyz)?
        };
        log_buffer("display_rgb", &display);

        self.state.clear_from(Stage::ConvertXyzToRgb);
        self.state.display_rgb = Some(display);
        Ok(())
    }

    fn save_image(&mut self) -> Result<()> {
        let image = self
            .state
            .display_rgb
            .as_ref()
            .ok_or_else(|| missing_input(Stage::SaveImage))?;
        let path = self
            .config
            .output_path
            .clone()
            .ok_or_else(|| PipelineError::InvalidConfig("outputPath is not set".to_string()))?;

        let mut encoded = Vec::new();
        {
            let _span = tracing::info_span!("encode_image", mode = %self.config.output.mode).entered();
            self.writer.write_image(image, &mut encoded, &self.config.output)?;
        }
        if encoded.is_empty() {
            warn!("Encoder produced no data");
        }

        write_atomically(&path, &encoded)?;
        info!(output = %path.display(), bytes = encoded.len(), "Image saved");

        self.state.saved_to = Some(path);
        Ok(())
    }

    /// Decodes `input_path` and writes the display image to `output_path` with
    /// every stage of the pipeline.
    #[instrument(skip(self, input_path, output_path))]
    pub fn convert_file<P: AsRef<Path>, Q: AsRef<Path>>(
        &mut self,
        input_path: P,
        output_path: Q,
    ) -> Result<RunReport> {
        let input_path = input_path.as_ref();
        let output_path = output_path.as_ref();

        info!(
            input = %input_path.display(),
            output = %output_path.display(),
            "Converting file"
        );

        self.config.raw_file_path = Some(input_path.to_path_buf());
        self.config.output_path = Some(output_path.to_path_buf());
        self.run(&StagePlan::full())
    }
}

/// Writes `bytes` to a temporary file next to `path` and renames it into place,
/// so `path` is either untouched or complete.
fn write_atomically(path: &Path, bytes: &[u8]) -> Result<()> {
    let write_error = |e: std::io::Error| PipelineError::OutputWriteError(format!("{}: {}", path.display(), e));

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut staged = tempfile::NamedTempFile::new_in(dir).map_err(write_error)?;
    staged.write_all(bytes).map_err(write_error)?;
    staged.as_file().sync_all().map_err(write_error)?;
    staged.persist(path).map_err(|e| write_error(e.error))?;
    Ok(())
}

fn log_buffer(name: &'static str, image: &LinearImage) {
    let (min, max) = image.min_max();
    debug!(
        buffer = name,
        width = image.width,
        height = image.height,
        encoding = %image.encoding,
        min,
        max,
        "Stage output"
    );
}
