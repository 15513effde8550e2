//! Tile sampling and lookup throughput.
//! Run: cargo bench -p at-ascii

use std::hint::black_box;
use std::sync::Arc;

use at_ascii::glyph::BuiltinGlyphs;
use at_ascii::{CharBrightnessTable, RenderPipeline};
use at_core::charset::CHARSET_STANDARD;
use at_core::frame::PixelBuffer;
use criterion::{Criterion, criterion_group, criterion_main};

fn gradient(width: u32, height: u32) -> PixelBuffer {
    let mut img = PixelBuffer::new(width, height);
    for row in 0..height {
        for col in 0..width {
            let v = ((row + col) % 256) as u8;
            img.set_pixel(row, col, (v, v / 2, 255 - v));
        }
    }
    img
}

fn bench_pipeline(c: &mut Criterion) {
    let image = Arc::new(gradient(1000, 600));
    let table = CharBrightnessTable::new(CHARSET_STANDARD.chars(), &BuiltinGlyphs)
        .expect("standard charset");

    let mut group = c.benchmark_group("pipeline");
    group.sample_size(30);

    for resolution in [64, 256] {
        group.bench_function(format!("cold_res{resolution}"), |b| {
            b.iter(|| {
                let mut p = RenderPipeline::new(Arc::clone(&image), resolution, table.clone());
                black_box(p.run().expect("render"))
            });
        });
    }

    let mut warm = RenderPipeline::new(Arc::clone(&image), 256, table.clone());
    warm.run().expect("warm-up");
    group.bench_function("cached_res256", |b| {
        b.iter(|| black_box(warm.run().expect("render")));
    });

    group.bench_function("table_build", |b| {
        b.iter(|| {
            black_box(
                CharBrightnessTable::new(CHARSET_STANDARD.chars(), &BuiltinGlyphs)
                    .expect("standard charset"),
            )
        });
    });

    group.finish();
}

criterion_group!(benches, bench_pipeline);
criterion_main!(benches);
