// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for Quadscan: source images, contours, polygons, results.

use serde::{Deserialize, Serialize};

use crate::error::{QuadscanError, Result};

/// An integer pixel coordinate. `x` grows to the right, `y` grows downwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance(self, other: Self) -> f64 {
        let dx = f64::from(other.x - self.x);
        let dy = f64::from(other.y - self.y);
        dx.hypot(dy)
    }
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Enclosed area of a closed point sequence via the shoelace formula.
///
/// Cross products are accumulated in `i64`, so integer inputs give an exact
/// result. The sign of the traversal is discarded.
pub fn shoelace_area(points: &[Point]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut twice_area: i64 = 0;
    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        twice_area += i64::from(a.x) * i64::from(b.y) - i64::from(b.x) * i64::from(a.y);
    }
    twice_area.abs() as f64 / 2.0
}

/// Length of a point sequence; `closed` adds the segment from last to first.
pub fn arc_length(points: &[Point], closed: bool) -> f64 {
    let mut length: f64 = points.windows(2).map(|w| w[0].distance(w[1])).sum();
    if closed && points.len() > 1 {
        length += points[points.len() - 1].distance(points[0]);
    }
    length
}

/// A traced boundary of a connected edge region.
///
/// Always closed (the last point is adjacent to the first) and never empty.
/// Straight runs may be compressed to their end points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contour(Vec<Point>);

impl Contour {
    pub fn new(points: Vec<Point>) -> Self {
        debug_assert!(!points.is_empty(), "a contour needs at least one point");
        Self(points)
    }

    pub fn points(&self) -> &[Point] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Shoelace area of the raw contour points.
    pub fn area(&self) -> f64 {
        shoelace_area(&self.0)
    }

    /// Closed perimeter.
    pub fn perimeter(&self) -> f64 {
        arc_length(&self.0, true)
    }
}

/// A simplified contour: an ordered subset of a contour's points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Polygon(Vec<Point>);

impl Polygon {
    pub fn new(vertices: Vec<Point>) -> Self {
        Self(vertices)
    }

    pub fn vertices(&self) -> &[Point] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn is_quadrilateral(&self) -> bool {
        self.0.len() == 4
    }

    pub fn area(&self) -> f64 {
        shoelace_area(&self.0)
    }
}

/// Channel order of a 3-channel, 8-bit interleaved pixel buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ChannelOrder {
    /// Canonical order used inside the pipeline.
    #[default]
    Rgb,
    /// Reversed order, as produced by many camera and bitmap bridges.
    Bgr,
}

/// A decoded raster image as handed over by the acquisition layer.
///
/// Three interleaved 8-bit channels, row-major, no row padding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceImage {
    pub width: u32,
    pub height: u32,
    pub order: ChannelOrder,
    pub data: Vec<u8>,
}

impl SourceImage {
    pub const CHANNELS: usize = 3;

    pub fn new(width: u32, height: u32, order: ChannelOrder, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            order,
            data,
        }
    }

    /// Number of bytes a buffer of these dimensions must hold.
    pub fn expected_len(&self) -> usize {
        self.width as usize * self.height as usize * Self::CHANNELS
    }

    /// Check dimensions and buffer length before any processing happens.
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(QuadscanError::InvalidImage(format!(
                "image has zero size ({}x{})",
                self.width, self.height
            )));
        }
        if self.data.len() != self.expected_len() {
            return Err(QuadscanError::InvalidImage(format!(
                "buffer holds {} bytes, {}x{}x{} needs {}",
                self.data.len(),
                self.width,
                self.height,
                Self::CHANNELS,
                self.expected_len()
            )));
        }
        Ok(())
    }
}

/// Outcome of one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectionResult {
    /// The selected quadrilateral, if any contour approximated to four vertices.
    pub quad: Option<Polygon>,
    /// Output image in the caller's channel order, annotated when `quad` is set.
    pub image: SourceImage,
}

impl DetectionResult {
    pub fn found(&self) -> bool {
        self.quad.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(x: i32, y: i32, w: i32, h: i32) -> Vec<Point> {
        vec![
            Point::new(x, y),
            Point::new(x + w, y),
            Point::new(x + w, y + h),
            Point::new(x, y + h),
        ]
    }

    #[test]
    fn rectangle_area_is_exact() {
        assert_eq!(shoelace_area(&rect(3, 7, 40, 25)), 1000.0);
        // Same rectangle traversed the other way round.
        let mut reversed = rect(3, 7, 40, 25);
        reversed.reverse();
        assert_eq!(shoelace_area(&reversed), 1000.0);
    }

    #[test]
    fn degenerate_areas_are_zero() {
        assert_eq!(shoelace_area(&[]), 0.0);
        assert_eq!(shoelace_area(&[Point::new(1, 1)]), 0.0);
        assert_eq!(shoelace_area(&[Point::new(0, 0), Point::new(5, 5)]), 0.0);
    }

    #[test]
    fn closed_perimeter_includes_closing_segment() {
        let points = rect(0, 0, 3, 4);
        assert_eq!(arc_length(&points, false), 10.0);
        assert_eq!(arc_length(&points, true), 14.0);
        assert_eq!(Contour::new(points).perimeter(), 14.0);
    }

    #[test]
    fn source_image_validation() {
        let ok = SourceImage::new(2, 2, ChannelOrder::Bgr, vec![0; 12]);
        assert!(ok.validate().is_ok());

        let empty = SourceImage::new(0, 4, ChannelOrder::Rgb, Vec::new());
        assert!(matches!(empty.validate(), Err(QuadscanError::InvalidImage(_))));

        let short = SourceImage::new(2, 2, ChannelOrder::Rgb, vec![0; 11]);
        assert!(matches!(short.validate(), Err(QuadscanError::InvalidImage(_))));
    }

    #[test]
    fn polygon_serializes_as_vertex_list() {
        let polygon = Polygon::new(rect(0, 0, 2, 2));
        let json = serde_json::to_string(&polygon).unwrap();
        assert_eq!(
            json,
            r#"[{"x":0,"y":0},{"x":2,"y":0},{"x":2,"y":2},{"x":0,"y":2}]"#
        );
        assert!(polygon.is_quadrilateral());
    }
}
