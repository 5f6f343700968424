//! Benchmarks for dstretch-rs operations.
//!
//! Run with: `cargo bench`

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use dstretch::{DecorrelationStretch, Pipeline, Preset};
use dstretch_color::ColorspaceRegistry;
use dstretch_core::RgbImage;
use dstretch_math::ColorStatistics;
use dstretch_ops::{ProcessorKind, ProcessorParams};

fn test_image(size: u32) -> RgbImage {
    RgbImage::from_fn(size, size, |x, y| {
        [
            (80 + (x * 7 + y * 3) % 90) as u8,
            (70 + (x * 3 + y * 11) % 80) as u8,
            (60 + (x * 13 + y * 5) % 70) as u8,
        ]
    })
}

/// Colorspace conversion there and back.
fn bench_colorspace(c: &mut Criterion) {
    let mut group = c.benchmark_group("colorspace");
    let registry = ColorspaceRegistry::with_builtins();
    let img = test_image(512);
    group.throughput(Throughput::Elements(img.pixel_count() as u64));

    for name in ["RGB", "YDS", "LAB", "LDS"] {
        let Ok(cs) = registry.get(name) else { continue };
        group.bench_with_input(BenchmarkId::new("round_trip", name), &img, |b, img| {
            b.iter(|| cs.from_space(&cs.to_space(black_box(img))))
        });
    }

    group.finish();
}

/// Mean and covariance accumulation.
fn bench_statistics(c: &mut Criterion) {
    let mut group = c.benchmark_group("statistics");

    for size in [256u32, 1024] {
        let float = test_image(size).to_normalized();
        group.throughput(Throughput::Elements((size * size) as u64));
        group.bench_with_input(BenchmarkId::new("covariance", size), &float, |b, f| {
            b.iter(|| ColorStatistics::compute(black_box(f), None))
        });
    }

    group.finish();
}

/// Full stretch on both routes.
fn bench_decorrelate(c: &mut Criterion) {
    let mut group = c.benchmark_group("decorrelate");
    let engine = DecorrelationStretch::new();

    for size in [256u32, 1024] {
        let img = test_image(size);
        group.throughput(Throughput::Elements((size * size) as u64));
        for cs in ["YDS", "LRE", "CRGB"] {
            group.bench_with_input(BenchmarkId::new(cs, size), &img, |b, img| {
                b.iter(|| engine.process(black_box(img), cs, 15.0, None))
            });
        }
    }

    group.finish();
}

/// Each processor with default options.
fn bench_processors(c: &mut Criterion) {
    let mut group = c.benchmark_group("processors");
    let img = test_image(512);
    group.throughput(Throughput::Elements(img.pixel_count() as u64));

    for kind in ProcessorKind::ALL {
        let params = ProcessorParams::default_for(kind);
        group.bench_with_input(BenchmarkId::new(kind.name(), 512), &img, |b, img| {
            b.iter(|| params.apply(black_box(img)))
        });
    }

    group.finish();
}

/// Presets end to end.
fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");
    group.sample_size(20);
    let pipeline = Pipeline::new();
    let img = test_image(512);

    for preset in Preset::ALL {
        let config = preset.config();
        group.bench_with_input(BenchmarkId::new(preset.name(), 512), &img, |b, img| {
            b.iter(|| {
                pipeline.process_complete(
                    black_box(img),
                    &config,
                    preset.colorspace(),
                    preset.scale(),
                )
            })
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_colorspace,
    bench_statistics,
    bench_decorrelate,
    bench_processors,
    bench_pipeline,
);
criterion_main!(benches);
