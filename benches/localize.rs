use criterion::{Criterion, black_box, criterion_group, criterion_main};
use marker_relay::detector::contour::{RetrievalMode, find_contours};
use marker_relay::tools::{bar_pattern_frame, outline_frame};
use marker_relay::{AxisRect, GradientLocalizer, RectangleLocalizer};

fn bench_gradient_locate(c: &mut Criterion) {
    let localizer = GradientLocalizer::default();
    for (w, h) in [(320, 240), (640, 480)] {
        let frame = bar_pattern_frame(w, h, AxisRect::new(w / 3, h / 3, w / 3, h / 4), 3, 3);
        c.bench_function(&format!("gradient_locate_{w}x{h}"), |b| {
            b.iter(|| localizer.locate(black_box(&frame)))
        });
    }
}

fn bench_rectangle_locate(c: &mut Criterion) {
    let localizer = RectangleLocalizer::default();
    let frame = outline_frame(
        320,
        240,
        &[AxisRect::new(40, 30, 240, 180), AxisRect::new(110, 80, 100, 80)],
        4,
    );
    c.bench_function("rectangle_locate_320x240", |b| {
        b.iter(|| localizer.locate(black_box(&frame)))
    });
}

fn bench_find_contours(c: &mut Criterion) {
    let frame = outline_frame(
        640,
        480,
        &[AxisRect::new(40, 30, 560, 420), AxisRect::new(200, 150, 240, 180)],
        4,
    );
    let mask = RectangleLocalizer::default().mask(&frame);
    c.bench_function("find_contours_tree_640x480", |b| {
        b.iter(|| find_contours(black_box(&mask), RetrievalMode::Tree))
    });
}

criterion_group!(
    benches,
    bench_gradient_locate,
    bench_rectangle_locate,
    bench_find_contours
);
criterion_main!(benches);
