//! Benchmarks for frame reduction and whole-file series building.
//!
//! Run with: cargo bench
//! Run with all features: cargo bench --all-features
//!
//! The decode benchmarks need fixture files from
//! `tests/fixtures/generate_fixtures.sh` and are skipped without them.

use std::{hint::black_box, path::Path};

use criterion::{BenchmarkId, Criterion};
use lightscan::{
    FfmpegLogLevel, FfmpegSource, Frame, Percentile, PixelFormat, ScanOptions, SeriesBuilder,
    VideoFileRef, percentile_of, reduce,
};

const SAMPLE_VIDEO: &str = "tests/fixtures/sample_video.mp4";

/// 1080p RGB frame of deterministic noise.
fn noisy_frame() -> Frame {
    let (width, height) = (1920u32, 1080u32);
    let mut state = 0x2545_f491u32;
    let samples = (0..width as usize * height as usize * 3)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            (state >> 24) as u8
        })
        .collect();
    Frame::new(width, height, 3, samples).unwrap()
}

fn benchmark_frame_reduction(criterion: &mut Criterion) {
    let frame = noisy_frame();
    let mut group = criterion.benchmark_group("reduce 1080p rgb frame");
    for percent in [0, 50, 95] {
        let percentile = Percentile::new(percent).unwrap();
        group.bench_with_input(BenchmarkId::new("histogram", percent), &percentile, |bencher, &percentile| {
            bencher.iter(|| reduce(black_box(&frame), percentile).unwrap());
        });
    }
    group.finish();
}

fn benchmark_float_selection(criterion: &mut Criterion) {
    let samples: Vec<f64> = noisy_frame().samples().iter().map(|&sample| f64::from(sample)).collect();

    criterion.bench_function("select 95th of 1080p float samples", |bencher| {
        bencher.iter_batched(
            || samples.clone(),
            |mut samples| percentile_of(&mut samples, Percentile::DEFAULT).unwrap(),
            criterion::BatchSize::LargeInput,
        );
    });
}

fn benchmark_series_building(criterion: &mut Criterion) {
    lightscan::set_ffmpeg_log_level(FfmpegLogLevel::Error);

    if !Path::new(SAMPLE_VIDEO).exists() {
        eprintln!("Skipping benchmark: fixture not found");
        return;
    }

    let video = VideoFileRef::new(SAMPLE_VIDEO);
    let options = ScanOptions::new();

    for format in [PixelFormat::Rgb8, PixelFormat::Gray8] {
        let source = FfmpegSource::new(format);
        criterion.bench_function(&format!("build series ({format:?})"), |bencher| {
            bencher.iter(|| {
                SeriesBuilder::new(&source, &options).build(&video).unwrap();
            });
        });
    }
}

criterion::criterion_group!(
    benches,
    benchmark_frame_reduction,
    benchmark_float_selection,
    benchmark_series_building,
);
criterion::criterion_main!(benches);
