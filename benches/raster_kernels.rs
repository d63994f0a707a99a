use criterion::{criterion_group, criterion_main, Criterion};

use trama::{Canvas, Color, PixelFormat};

fn bench_rect_fill(c: &mut Criterion) {
    let mut group = c.benchmark_group("rect_fill");
    for format in [PixelFormat::Rgb565, PixelFormat::Argb8888, PixelFormat::Grey4] {
        let mut canvas = Canvas::new(320, 240, format).unwrap();
        group.bench_function(format!("{format:?}"), |b| {
            b.iter(|| {
                canvas.simple_rect(Color::rgb(200, 60, 20), 10.0, 10.0, 300.0, 220.0);
                std::hint::black_box(canvas.bytes().first());
            })
        });
    }
    group.finish();
}

fn bench_tri_fill(c: &mut Criterion) {
    let mut group = c.benchmark_group("tri_fill");
    for format in [PixelFormat::Rgb565, PixelFormat::Argb8888] {
        let mut canvas = Canvas::new(320, 240, format).unwrap();
        group.bench_function(format!("{format:?}"), |b| {
            b.iter(|| {
                canvas.simple_tri(Color::rgb(20, 60, 200), 10.0, 10.0, 310.0, 40.0, 80.0, 230.0);
                std::hint::black_box(canvas.bytes().first());
            })
        });
    }
    group.finish();
}

fn bench_blended_rect(c: &mut Criterion) {
    let mut canvas = Canvas::new(320, 240, PixelFormat::Rgb565).unwrap();
    c.bench_function("rect_fill_blended", |b| {
        b.iter(|| {
            canvas.simple_rect(Color::argb(96, 255, 255, 255), 10.0, 10.0, 300.0, 220.0);
            std::hint::black_box(canvas.bytes().first());
        })
    });
}

criterion_group!(benches, bench_rect_fill, bench_tri_fill, bench_blended_rect);
criterion_main!(benches);
