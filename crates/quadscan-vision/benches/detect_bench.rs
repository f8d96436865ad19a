// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for the quadscan-vision crate. Covers the edge detector
// on its own and the full detection pipeline on a synthetic photo.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use image::{Rgb, RgbImage};

use quadscan_core::{ChannelOrder, DetectionConfig, SourceImage};
use quadscan_vision::raster::{normalize, to_grayscale};
use quadscan_vision::{EdgeDetector, QuadDetector};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// A 320x240 dark scene with a light sheet from (60, 40) to (260, 200).
fn sheet_scene() -> SourceImage {
    let (width, height) = (320u32, 240u32);
    let rgb = RgbImage::from_fn(width, height, |x, y| {
        if (60..260).contains(&x) && (40..200).contains(&y) {
            Rgb([235, 230, 220])
        } else {
            Rgb([40, 45, 60])
        }
    });
    SourceImage::new(width, height, ChannelOrder::Bgr, rgb.into_raw())
}

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

fn bench_edge_detection(c: &mut Criterion) {
    let source = sheet_scene();
    let gray = match normalize(&source) {
        Ok(rgb) => to_grayscale(&rgb),
        Err(err) => panic!("fixture rejected: {err}"),
    };
    let detector = EdgeDetector::default();

    c.bench_function("canny (320x240)", |b| {
        b.iter(|| black_box(detector.detect(black_box(&gray))));
    });
}

/// Full pipeline, including overlay rendering and the conversion back to BGR.
fn bench_detect(c: &mut Criterion) {
    let source = sheet_scene();
    let detector = QuadDetector::new(DetectionConfig::default());

    c.bench_function("detect (320x240)", |b| {
        b.iter(|| black_box(detector.detect(black_box(&source))));
    });
}

criterion_group!(benches, bench_edge_detection, bench_detect);
criterion_main!(benches);
