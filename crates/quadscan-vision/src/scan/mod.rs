// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Detection pipeline — Canny edges, external contour tracing, polygon
// approximation, quadrilateral selection, and overlay rendering.

pub mod approx;
pub mod contours;
pub mod detector;
pub mod edges;
pub mod overlay;
pub mod select;

pub use approx::{approximate, douglas_peucker, epsilon_for};
pub use contours::find_external_contours;
pub use detector::{Analysis, QuadDetector, detect_quadrilateral};
pub use edges::{EDGE, EdgeDetector, EdgeMap};
pub use overlay::{draw_closed_outline, render_overlay};
pub use select::select_quadrilateral;
