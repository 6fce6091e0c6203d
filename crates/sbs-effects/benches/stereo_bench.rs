//! Benchmarks for the per-frame stereo path.
//!
//! Run with: cargo bench -p sbs-effects

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use sbs_core::{ColorAdjustment, ConversionOptions, Frame};
use sbs_effects::{adjust_rgba_in_place, synthesize_sbs, StereoPipeline};

fn bench_synthesize(c: &mut Criterion) {
    let frame = Frame::test_pattern(1920, 1080, 0.0);

    c.bench_function("synthesize_sbs_1080p", |bencher| {
        bencher.iter(|| synthesize_sbs(black_box(&frame), black_box(3.25)));
    });
}

fn bench_color_adjust(c: &mut Criterion) {
    let frame = Frame::test_pattern(1920, 1080, 0.0);
    let adj = ColorAdjustment::new(1.1, 1.2, 0.9);

    c.bench_function("color_adjust_1080p", |bencher| {
        bencher.iter_batched(
            || frame.data().to_vec(),
            |mut data| adjust_rgba_in_place(&mut data, 1920, black_box(&adj)),
            criterion::BatchSize::LargeInput,
        );
    });
}

fn bench_pipeline(c: &mut Criterion) {
    let frame = Frame::test_pattern(1920, 1080, 0.0);
    let pipeline = StereoPipeline::new(
        &ConversionOptions::default(),
        ColorAdjustment::new(1.1, 1.2, 0.9),
    );

    c.bench_function("pipeline_1080p", |bencher| {
        bencher.iter(|| pipeline.process(black_box(&frame)));
    });
}

criterion_group!(benches, bench_synthesize, bench_color_adjust, bench_pipeline);
criterion_main!(benches);
