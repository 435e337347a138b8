use criterion::{Criterion, black_box, criterion_group, criterion_main};
use strip_reader::detector::edges::EdgeDetector;
use strip_reader::detector::sobel::SobelDetector;
use strip_reader::detector::threshold::AdaptiveThresholdDetector;

mod common;

fn bench_sobel_medium(c: &mut Criterion) {
    let image = common::synthetic_strip(640, 480);
    let detector = SobelDetector::new();
    c.bench_function("sobel_640x480", |b| {
        b.iter(|| detector.detect(black_box(&image)))
    });
}

fn bench_sobel_large(c: &mut Criterion) {
    let image = common::synthetic_strip(1920, 1080);
    let detector = SobelDetector::new();
    c.bench_function("sobel_1920x1080", |b| {
        b.iter(|| detector.detect(black_box(&image)))
    });
}

fn bench_adaptive_medium(c: &mut Criterion) {
    let image = common::synthetic_strip(640, 480);
    let detector = AdaptiveThresholdDetector::new();
    c.bench_function("adaptive_640x480", |b| {
        b.iter(|| detector.detect(black_box(&image)))
    });
}

fn bench_adaptive_large(c: &mut Criterion) {
    let image = common::synthetic_strip(1920, 1080);
    let detector = AdaptiveThresholdDetector::new();
    c.bench_function("adaptive_1920x1080", |b| {
        b.iter(|| detector.detect(black_box(&image)))
    });
}

criterion_group!(
    benches,
    bench_sobel_medium,
    bench_sobel_large,
    bench_adaptive_medium,
    bench_adaptive_large
);
criterion_main!(benches);
