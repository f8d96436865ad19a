// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// quadscan-vision — Quadrilateral detection for Quadscan.
//
// Provides raster helpers (channel-order normalization, grayscale, decode and
// encode at the file boundary) and the detection pipeline (Canny edges,
// border following, Douglas-Peucker approximation, quadrilateral selection,
// overlay rendering).

pub mod raster;
pub mod scan;

// Re-export the primary entry points so callers can use `quadscan_vision::QuadDetector` etc.
pub use scan::detector::{Analysis, QuadDetector, detect_quadrilateral};
pub use scan::edges::{EdgeDetector, EdgeMap};
