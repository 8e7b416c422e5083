//! Benchmarks for frame ordering, resizing, and a small end-to-end run.
//!
//! Run with: cargo bench

use std::path::PathBuf;

use criterion::Criterion;
use ffmpeg_next::util::log::Level as LogLevel;
use framereel::{
    AssembleOptions, FrameAssembler, FrameSequence, MalformedNamePolicy, ResizeFilter, VideoCodec,
    resize_frame,
};
use image::{DynamicImage, Rgb, RgbImage};

fn benchmark_sequence_sort(criterion: &mut Criterion) {
    let paths: Vec<PathBuf> = (0..10_000u32)
        .rev()
        .map(|index| PathBuf::from(format!("frames/{index}.png")))
        .collect();

    criterion.bench_function("sort 10k frame names", |bencher| {
        bencher.iter(|| {
            let sequence =
                FrameSequence::from_paths(paths.clone(), MalformedNamePolicy::Reject).unwrap();
            assert_eq!(sequence.len(), 10_000);
        });
    });
}

fn benchmark_resize(criterion: &mut Criterion) {
    let source = DynamicImage::ImageRgb8(RgbImage::from_fn(640, 480, |x, y| {
        Rgb([x as u8, y as u8, (x ^ y) as u8])
    }));

    let mut group = criterion.benchmark_group("resize 640x480 -> 1000x1000");
    for (name, filter) in [
        ("nearest", ResizeFilter::Nearest),
        ("triangle", ResizeFilter::Triangle),
        ("lanczos3", ResizeFilter::Lanczos3),
    ] {
        group.bench_function(name, |bencher| {
            bencher.iter(|| resize_frame(&source, 1000, 1000, filter));
        });
    }
    group.finish();
}

fn benchmark_assembly(criterion: &mut Criterion) {
    ffmpeg_next::util::log::set_level(LogLevel::Error);

    let directory = tempfile::tempdir().unwrap();
    for index in 0..25u8 {
        RgbImage::from_pixel(320, 240, Rgb([index * 10, 0, 255 - index * 10]))
            .save(directory.path().join(format!("{index}.png")))
            .unwrap();
    }
    let options = AssembleOptions::new()
        .resolution(320, 240)
        .codec(VideoCodec::Mpeg4);
    let assembler = FrameAssembler::new(options);

    if assembler.run(directory.path()).is_err() {
        eprintln!("Skipping benchmark: MPEG-4 encoder not available");
        return;
    }

    criterion.bench_function("assemble 25 frames (mpeg4, 320x240)", |bencher| {
        bencher.iter(|| assembler.run(directory.path()).unwrap());
    });
}

criterion::criterion_group!(
    benches,
    benchmark_sequence_sort,
    benchmark_resize,
    benchmark_assembly,
);
criterion::criterion_main!(benches);
