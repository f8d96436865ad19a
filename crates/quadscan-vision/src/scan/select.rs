// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Quadrilateral selection — largest contour first, first four-vertex
// approximation wins.

use quadscan_core::{Contour, Polygon};
use tracing::debug;

use super::approx::approximate;

/// Pick the quadrilateral outlining the largest candidate contour.
///
/// Contours are ranked by enclosed area, largest first; equal areas keep
/// their extraction order. The first one whose approximation has exactly
/// four vertices is returned. No convexity or size check is applied.
pub fn select_quadrilateral(contours: &[Contour], epsilon_ratio: f64) -> Option<Polygon> {
    let mut ranked: Vec<(f64, &Contour)> = contours.iter().map(|c| (c.area(), c)).collect();
    // `sort_by` is stable, which keeps ties in extraction order.
    ranked.sort_by(|a, b| b.0.total_cmp(&a.0));

    for (rank, (area, contour)) in ranked.into_iter().enumerate() {
        let polygon = approximate(contour, epsilon_ratio, true);
        if polygon.is_quadrilateral() {
            debug!(rank, area, "Selected quadrilateral");
            return Some(polygon);
        }
        debug!(rank, area, vertices = polygon.len(), "Skipped candidate");
    }
    None
}
