// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Overlay rendering — outline the selected quadrilateral on the photo and hand
// the result back in the caller's channel order.

use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_line_segment_mut, draw_polygon_mut};
use imageproc::point::Point as ImagePoint;
use quadscan_core::{ChannelOrder, Point, Polygon, SourceImage};
use tracing::{debug, instrument};

use crate::raster::to_source_order;

/// Draw `polygon` as a closed outline onto a copy of `rgb` and convert the
/// copy to `order`.
///
/// Without a polygon the copy is returned unmodified. Drawing is clipped to
/// the image bounds.
#[instrument(skip_all, fields(drawn = polygon.is_some(), thickness = thickness))]
pub fn render_overlay(
    rgb: &RgbImage,
    polygon: Option<&Polygon>,
    color: [u8; 3],
    thickness: u32,
    order: ChannelOrder,
) -> SourceImage {
    let mut canvas = rgb.clone();
    if let Some(polygon) = polygon {
        draw_closed_outline(&mut canvas, polygon, Rgb(color), thickness);
        debug!(vertices = polygon.len(), "Outline drawn");
    }
    to_source_order(canvas, order)
}

/// Stroke every edge of `polygon`, including the closing one, with a square
/// brush `thickness` pixels wide.
///
/// Each edge is filled once as the convex region the brush sweeps, so the cost
/// follows the painted area. Brushes wider than the canvas are narrowed to a
/// width that already covers it.
pub fn draw_closed_outline(canvas: &mut RgbImage, polygon: &Polygon, color: Rgb<u8>, thickness: u32) {
    let vertices = polygon.vertices();
    if vertices.is_empty() {
        return;
    }
    let (lo, hi) = brush_extent(thickness, canvas.width().max(canvas.height()));

    for (i, &start) in vertices.iter().enumerate() {
        let end = vertices[(i + 1) % vertices.len()];
        let hull = swept_square(start, end, lo, hi);
        match hull.as_slice() {
            [] => {}
            [only] => draw_line_segment_mut(canvas, as_f32(*only), as_f32(*only), color),
            [a, b] => draw_line_segment_mut(canvas, as_f32(*a), as_f32(*b), color),
            _ => draw_polygon_mut(canvas, &hull, color),
        }
    }
}

/// Brush offsets `lo..=hi` around a vertex, `thickness` values wide, capped at
/// twice the largest canvas side.
fn brush_extent(thickness: u32, canvas_side: u32) -> (i32, i32) {
    let cap = canvas_side.saturating_mul(2).clamp(1, i32::MAX as u32 / 4);
    let thickness = thickness.clamp(1, cap) as i32;
    (-(thickness - 1) / 2, thickness / 2)
}

/// Convex hull of the square brush `[lo, hi]²` placed at both ends of a segment.
///
/// Corners come back counter-clockwise in image coordinates with no repeated
/// closing point.
fn swept_square(start: Point, end: Point, lo: i32, hi: i32) -> Vec<ImagePoint<i32>> {
    let mut corners: Vec<(i64, i64)> = Vec::with_capacity(8);
    for centre in [start, end] {
        for dy in [lo, hi] {
            for dx in [lo, hi] {
                corners.push((
                    i64::from(centre.x) + i64::from(dx),
                    i64::from(centre.y) + i64::from(dy),
                ));
            }
        }
    }
    corners.sort_unstable();
    corners.dedup();

    convex_hull(&corners)
        .into_iter()
        .map(|(x, y)| ImagePoint::new(x as i32, y as i32))
        .collect()
}

/// Andrew's monotone chain over sorted, distinct points; collinear points are
/// dropped.
fn convex_hull(sorted: &[(i64, i64)]) -> Vec<(i64, i64)> {
    if sorted.len() < 3 {
        return sorted.to_vec();
    }
    let cross = |o: (i64, i64), a: (i64, i64), b: (i64, i64)| {
        (a.0 - o.0) * (b.1 - o.1) - (a.1 - o.1) * (b.0 - o.0)
    };

    let mut hull: Vec<(i64, i64)> = Vec::with_capacity(sorted.len() * 2);
    for pass in [sorted.to_vec(), sorted.iter().rev().copied().collect()] {
        let floor = hull.len();
        for p in pass {
            while hull.len() >= floor + 2
                && cross(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0
            {
                hull.pop();
            }
            hull.push(p);
        }
        // The last point of each chain starts the next one.
        hull.pop();
    }
    if hull.len() < 3 {
        // All points on one line: keep its two ends.
        return vec![sorted[0], sorted[sorted.len() - 1]];
    }
    hull
}

fn as_f32(p: ImagePoint<i32>) -> (f32, f32) {
    (p.x as f32, p.y as f32)
}

#[cfg(test)]
mod tests {
    use super::*;

    const GREEN: [u8; 3] = [0, 255, 0];

    fn background() -> RgbImage {
        RgbImage::from_pixel(40, 30, Rgb([90, 60, 30]))
    }

    fn quad() -> Polygon {
        Polygon::new(vec![
            Point::new(5, 5),
            Point::new(30, 5),
            Point::new(30, 20),
            Point::new(5, 20),
        ])
    }

    #[test]
    fn no_polygon_leaves_pixels_untouched() {
        let rgb = background();
        let out = render_overlay(&rgb, None, GREEN, 3, ChannelOrder::Rgb);
        assert_eq!(out.data, rgb.into_raw());
    }

    #[test]
    fn outline_is_painted_with_thickness() {
        let out = render_overlay(&background(), Some(&quad()), GREEN, 3, ChannelOrder::Rgb);
        assert_eq!((out.width, out.height), (40, 30));

        let pixel = |x: usize, y: usize| {
            let i = (y * 40 + x) * 3;
            [out.data[i], out.data[i + 1], out.data[i + 2]]
        };
        // Top edge, one pixel either side of the line.
        for y in 4..=6 {
            assert_eq!(pixel(15, y), GREEN, "row {y}");
        }
        assert_eq!(pixel(15, 8), [90, 60, 30]);
        // Closing edge on the left.
        assert_eq!(pixel(5, 12), GREEN);
        // Interior stays as it was.
        assert_eq!(pixel(17, 12), [90, 60, 30]);
    }

    #[test]
    fn bgr_output_stores_green_in_the_middle_and_swaps_the_rest() {
        let out = render_overlay(&background(), Some(&quad()), GREEN, 1, ChannelOrder::Bgr);
        assert_eq!(out.order, ChannelOrder::Bgr);
        let at = |x: usize, y: usize| (y * 40 + x) * 3;
        assert_eq!(&out.data[at(10, 5)..at(10, 5) + 3], &[0, 255, 0]);
        assert_eq!(&out.data[at(0, 0)..at(0, 0) + 3], &[30, 60, 90]);
    }

    #[test]
    fn outline_near_the_border_is_clipped() {
        let edge_quad = Polygon::new(vec![
            Point::new(0, 0),
            Point::new(39, 0),
            Point::new(39, 29),
            Point::new(0, 29),
        ]);
        let out = render_overlay(&background(), Some(&edge_quad), GREEN, 5, ChannelOrder::Rgb);
        assert_eq!(out.data.len(), 40 * 30 * 3);
        assert_eq!(&out.data[0..3], &GREEN);
    }

    #[test]
    fn brush_wider_than_the_image_paints_everything_quickly() {
        for thickness in [2_000, u32::MAX] {
            let out =
                render_overlay(&background(), Some(&quad()), GREEN, thickness, ChannelOrder::Rgb);
            assert_eq!(out.data.len(), 40 * 30 * 3);
            assert!(
                out.data.chunks_exact(3).all(|px| px == &GREEN[..]),
                "thickness {thickness}"
            );
        }
    }

    #[test]
    fn brush_extent_is_centred_and_capped() {
        assert_eq!(brush_extent(1, 40), (0, 0));
        assert_eq!(brush_extent(3, 40), (-1, 1));
        assert_eq!(brush_extent(4, 40), (-1, 2));
        assert_eq!(brush_extent(0, 40), (0, 0));
        assert_eq!(brush_extent(u32::MAX, 40), (-39, 40));
    }

    #[test]
    fn swept_square_of_a_diagonal_is_a_hexagon() {
        let hull = swept_square(Point::new(0, 0), Point::new(10, 10), -1, 1);
        assert_eq!(hull.len(), 6);
        // Single-pixel brush on a point degenerates to that point.
        let dot = swept_square(Point::new(3, 4), Point::new(3, 4), 0, 0);
        assert_eq!(dot, vec![ImagePoint::new(3, 4)]);
        // Single-pixel brush on a segment is the segment.
        let line = swept_square(Point::new(0, 0), Point::new(5, 0), 0, 0);
        assert_eq!(line, vec![ImagePoint::new(0, 0), ImagePoint::new(5, 0)]);
    }
}
