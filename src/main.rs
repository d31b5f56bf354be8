use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use raw_color_pipeline::image_pipeline::{ColorPipeline, PipelineConfig, StagePlan};
use raw_color_pipeline::logger;

#[derive(Parser)]
#[command(name = "raw_color_pipeline")]
#[command(about = "Convert camera RAW files into display-referred images")]
struct Cli {
    /// JSON parameter file
    #[arg(short, long)]
    config: PathBuf,

    /// Comma-separated stage names to run instead of the configured ones
    #[arg(short, long, value_delimiter = ',')]
    steps: Option<Vec<String>>,

    /// RAW file, overrides rawFilePath
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output file, overrides outputPath
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    logger::init();
    let cli = Cli::parse();

    let mut config = PipelineConfig::from_file(&cli.config)
        .with_context(|| format!("failed to load parameters from {}", cli.config.display()))?;
    if let Some(input) = cli.input {
        config.raw_file_path = Some(input);
    }
    if let Some(output) = cli.output {
        config.output_path = Some(output);
    }
    if let Some(steps) = cli.steps {
        config.steps = StagePlan::parse(&steps).context("invalid --steps")?;
    }
    if config.steps.is_empty() {
        anyhow::bail!("no stages to run");
    }

    info!(
        demosaic = ?config.demosaic,
        method = ?config.color_method.method(),
        mode = %config.output.mode,
        "Color pipeline configured"
    );

    let mut pipeline = ColorPipeline::new(config);
    let report = pipeline.run_all().with_context(|| match pipeline.state().failed_stage {
        Some(stage) => format!("pipeline failed in stage {stage}"),
        None => "pipeline failed".to_string(),
    })?;

    if let Some(path) = &pipeline.state().saved_to {
        info!(output = %path.display(), "Done");
    }
    info!(
        stages = report.stages.len(),
        total_ms = report.timings.total_duration().as_secs_f64() * 1000.0,
        "Run complete"
    );
    Ok(())
}
