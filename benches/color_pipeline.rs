use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use raw_color_pipeline::image_pipeline::{
    BayerPattern, BlackLevelTable, ColorPipeline, DecodedRaw, DemosaicMode, Demosaicer,
    PipelineConfig, SensorFrame, Stage, StagePlan, StandardTiffWriter, ImageWriter,
    OutputMode, OutputSettings,
};
use std::io::Cursor;

fn generate_mock_frame(width: usize, height: usize) -> SensorFrame {
    let data = (0..height)
        .flat_map(|y| (0..width).map(move |x| (((x * 31 + y * 17) % 1024) + 64) as u16))
        .collect();
    SensorFrame::new(width, height, data, BayerPattern::Rggb, 12.0)
        .unwrap_or_else(|e| panic!("mock frame: {e}"))
}

fn benchmark_demosaic_modes(c: &mut Criterion) {
    let mut group = c.benchmark_group("demosaic_modes");
    let frame = generate_mock_frame(1000, 1000);

    for (mode, label) in [
        (DemosaicMode::Subsample, "subsample"),
        (DemosaicMode::Bilinear, "bilinear"),
    ] {
        group.bench_with_input(BenchmarkId::from_parameter(label), &frame, |b, frame| {
            let demosaicer = Demosaicer::new(frame.pattern, mode, frame.bit_depth);
            b.iter(|| demosaicer.process(black_box(frame)));
        });
    }

    group.finish();
}

fn benchmark_pipeline_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline_by_size");
    let plan = StagePlan::through(Stage::ConvertXyzToRgb);

    for (width, height, label) in [
        (100, 100, "100x100"),
        (500, 500, "500x500"),
        (1000, 1000, "1000x1000"),
    ] {
        let decoded = DecodedRaw {
            frame: generate_mock_frame(width, height),
            black_levels: BlackLevelTable::uniform(64),
        };

        group.bench_with_input(BenchmarkId::from_parameter(label), &decoded, |b, decoded| {
            let config = PipelineConfig::builder().demosaic(true).build();
            let mut pipeline = ColorPipeline::new(config);

            b.iter(|| {
                let _ = pipeline.load_frame(black_box(decoded.clone()));
                let _ = pipeline.run(&plan);
            });
        });
    }

    group.finish();
}

fn benchmark_output_modes(c: &mut Criterion) {
    let mut group = c.benchmark_group("output_modes");

    let mut pipeline = ColorPipeline::new(PipelineConfig::default());
    let decoded = DecodedRaw {
        frame: generate_mock_frame(1000, 1000),
        black_levels: BlackLevelTable::uniform(64),
    };
    if pipeline.load_frame(decoded).is_err()
        || pipeline.run(&StagePlan::new(Stage::ALL[1..5].to_vec())).is_err()
    {
        panic!("mock pipeline run failed");
    }
    let Some(image) = pipeline.state().display_rgb.clone() else {
        panic!("no display image");
    };

    for (mode, label) in [(OutputMode::Sdr, "sdr"), (OutputMode::Hdr, "hdr")] {
        let settings = OutputSettings {
            mode,
            ..OutputSettings::default()
        };
        group.bench_function(label, |b| {
            b.iter(|| {
                let mut output = Cursor::new(Vec::new());
                let _ = StandardTiffWriter.write_image(black_box(&image), &mut output, &settings);
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_demosaic_modes,
    benchmark_pipeline_sizes,
    benchmark_output_modes
);
criterion_main!(benches);
