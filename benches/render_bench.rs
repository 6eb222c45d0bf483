use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use fancytext::*;
use std::{hint::black_box, time::Duration};

const SIZE: Size = Size::new(512, 512);

const COLORS: [RGBA; 3] = [
    RGBA::new(255, 0, 0, 255),
    RGBA::new(0, 255, 0, 128),
    RGBA::new(0, 0, 255, 255),
];

/// Solid block glyphs, keeps the benchmark independent of installed fonts
struct Blocks;

impl Typeface for Blocks {
    fn line_metrics(&self, size: Scalar) -> LineMetrics {
        LineMetrics {
            ascent: 0.75 * size,
            descent: 0.25 * size,
            height: size,
        }
    }

    fn advance(&self, _ch: char, size: Scalar) -> Scalar {
        size / 2.0
    }

    fn glyph(&self, _ch: char, size: Scalar) -> Glyph {
        let ascent = (0.75 * size) as usize;
        Glyph {
            left: 0,
            top: -(ascent as i64),
            mask: AlphaMask::new_with(Size::new((size / 2.0) as usize, ascent), |_, _| 1.0),
        }
    }
}

fn checkerboard(size: Size) -> PixelBuffer {
    PixelBuffer::new_with(size, |row, col| {
        if (row / 16 + col / 16) % 2 == 0 {
            RGBA::WHITE
        } else {
            RGBA::new(30, 60, 90, 200)
        }
    })
}

fn gradient_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("gradient");
    group.throughput(Throughput::Elements((SIZE.width * SIZE.height) as u64));
    for direction in [
        GradientDirection::Horizontal,
        GradientDirection::Vertical,
        GradientDirection::ForwardDiagonal,
        GradientDirection::BackwardDiagonal,
    ] {
        let bounds = Rect::from_size(SIZE);
        let grad = GradLinear::fit(&COLORS[..], bounds, direction);
        group.bench_with_input(BenchmarkId::new("fill", direction), &grad, |b, grad| {
            b.iter_with_large_drop(|| {
                let mut comp = Compositor::new(SIZE);
                comp.fill(bounds, black_box(grad));
                comp.finish()
            })
        });
    }
    group.finish();
}

fn compositor_benchmark(c: &mut Criterion) {
    let source = checkerboard(Size::new(300, 200));
    let mask = cutout_mask(&luma_threshold(&source, 0.5), false);
    let placement = Placement {
        mode: ScalingMode::Height,
        scale: [1.0, 1.0],
        offset: [0.5, 0.5],
    };
    let dest = placement.place(source.size(), Rect::from_size(SIZE));

    let mut group = c.benchmark_group("compositor");
    group
        .throughput(Throughput::Elements((SIZE.width * SIZE.height) as u64))
        .bench_function("draw image", |b| {
            b.iter_with_large_drop(|| {
                let mut comp = Compositor::new(SIZE);
                comp.draw_image(black_box(&source), dest, 0.7);
                comp.finish()
            })
        })
        .bench_function("threshold", |b| {
            b.iter_with_large_drop(|| luma_threshold(black_box(&source), 0.5))
        })
        .bench_function("cut out", |b| {
            b.iter_with_large_drop(|| {
                let mut comp = Compositor::from_image(source.clone());
                comp.cut_out(black_box(&mask));
                comp.finish()
            })
        });
    group.finish();
}

fn text_benchmark(c: &mut Criterion) {
    let shaper = TextShaper::from_typeface(Box::new(Blocks), 48.0, TextStyle::Underline);
    let text = "Placeholder Text\nsecond line";
    let size = shaper.measure(text).padded(Size::new(16, 16));
    let grad = GradLinear::fit(&COLORS[..], Rect::from_size(size), GradientDirection::Vertical);

    let mut group = c.benchmark_group("text");
    group
        .bench_function("rasterize", |b| {
            b.iter_with_large_drop(|| {
                shaper.rasterize(black_box(text), TextAlignment::Center, size, Size::new(16, 16))
            })
        })
        .bench_function("fill", |b| {
            let mask = shaper.rasterize(text, TextAlignment::Center, size, Size::new(16, 16));
            b.iter_with_large_drop(|| {
                let mut comp = Compositor::new(size);
                comp.fill_masked(black_box(&mask), &grad);
                comp.finish()
            })
        });
    group.finish();
}

criterion_group!(
    name = render;
    config = Criterion::default().sample_size(20).warm_up_time(Duration::new(1, 0));
    targets = gradient_benchmark, compositor_benchmark, text_benchmark
);
criterion_main!(render);
