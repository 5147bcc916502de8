//! Palette extraction benchmarks.
//!
//! Run with: cargo bench (add `--features rayon` for the parallel histogram)

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use imgref::ImgVec;
use zenpalette::{PaletteConfig, get_color, get_palette};

/// Smooth two-axis gradient with a diagonal blue ramp.
fn generate_gradient(width: usize, height: usize) -> ImgVec<rgb::RGB<u8>> {
    let mut pixels = Vec::with_capacity(width * height);
    for y in 0..height {
        for x in 0..width {
            pixels.push(rgb::RGB {
                r: (x * 255 / width) as u8,
                g: (y * 255 / height) as u8,
                b: ((x + y) * 255 / (width + height)) as u8,
            });
        }
    }
    ImgVec::new(pixels, width, height)
}

fn bench_palette_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("get_palette");

    for size in [256usize, 512, 1024] {
        let img = generate_gradient(size, size);
        group.throughput(Throughput::Elements((size * size) as u64));

        for colors in [8u32, 64] {
            let config = PaletteConfig::new().color_count(colors);
            group.bench_with_input(
                BenchmarkId::new(format!("{colors}_colors"), format!("{size}x{size}")),
                &img,
                |b, img| b.iter(|| get_palette(black_box(img), black_box(&config))),
            );
        }
    }

    group.finish();
}

fn bench_quality(c: &mut Criterion) {
    let mut group = c.benchmark_group("quality");
    let img = generate_gradient(1024, 1024);

    for quality in [1u32, 5, 10, 50] {
        let config = PaletteConfig::new().quality(quality);
        group.bench_with_input(BenchmarkId::from_parameter(quality), &config, |b, config| {
            b.iter(|| get_palette(black_box(&img), config))
        });
    }

    group.finish();
}

fn bench_dominant_color(c: &mut Criterion) {
    let img = generate_gradient(512, 512);
    let config = PaletteConfig::new();
    c.bench_function("get_color_512x512", |b| {
        b.iter(|| get_color(black_box(&img), &config))
    });
}

criterion_group!(benches, bench_palette_sizes, bench_quality, bench_dominant_color);
criterion_main!(benches);
