// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Polygon approximation — Douglas-Peucker simplification with a tolerance
// proportional to the contour perimeter.

use quadscan_core::{Contour, Point, Polygon, arc_length};

/// Number of far-point jumps used to pick the two anchors of a closed curve.
const ANCHOR_ITERATIONS: usize = 3;

/// Tolerance for a contour: `ratio` times its perimeter.
pub fn epsilon_for(contour: &Contour, ratio: f64, closed: bool) -> f64 {
    ratio * arc_length(contour.points(), closed)
}

/// Approximate a contour with a polygon whose edges stay within
/// `ratio × perimeter` of every dropped point.
///
/// Contours of one or two points come back unchanged.
pub fn approximate(contour: &Contour, ratio: f64, closed: bool) -> Polygon {
    let points = contour.points();
    if points.len() <= 2 {
        return Polygon::new(points.to_vec());
    }
    let epsilon = epsilon_for(contour, ratio, closed);
    Polygon::new(douglas_peucker(points, epsilon, closed))
}

/// Douglas-Peucker simplification with an absolute tolerance.
///
/// Closed curves are split at two far-apart anchors and both arcs are
/// simplified. A last pass drops vertices that ended up within `epsilon` of
/// the chord between their neighbours.
pub fn douglas_peucker(points: &[Point], epsilon: f64, closed: bool) -> Vec<Point> {
    let n = points.len();
    if n <= 2 {
        return points.to_vec();
    }

    let mut keep = vec![false; n];
    if closed {
        let (a, b) = anchors(points);
        if points[a].distance(points[b]) <= epsilon {
            // The whole curve fits inside the tolerance around one point.
            return vec![points[a]];
        }
        keep[a] = true;
        keep[b] = true;
        simplify_arc(points, a, b, epsilon, &mut keep);
        simplify_arc(points, b, a, epsilon, &mut keep);
    } else {
        keep[0] = true;
        keep[n - 1] = true;
        simplify_arc(points, 0, n - 1, epsilon, &mut keep);
    }

    let mut vertices: Vec<Point> = points
        .iter()
        .zip(&keep)
        .filter_map(|(&p, &k)| k.then_some(p))
        .collect();
    drop_near_collinear(&mut vertices, epsilon, closed);
    vertices
}

/// Two far-apart indices: start at 0 and jump to the farthest point a few
/// times.
fn anchors(points: &[Point]) -> (usize, usize) {
    let mut anchor = 0;
    let mut far = farthest_from(points, anchor);
    for _ in 1..ANCHOR_ITERATIONS {
        let next = farthest_from(points, far);
        if next == anchor {
            break;
        }
        anchor = far;
        far = next;
    }
    (anchor, far)
}

fn farthest_from(points: &[Point], from: usize) -> usize {
    let origin = points[from];
    let mut best = from;
    let mut best_dist = 0.0;
    for (i, &p) in points.iter().enumerate() {
        let d = origin.distance(p);
        if d > best_dist {
            best = i;
            best_dist = d;
        }
    }
    best
}

/// Mark the vertices to keep on the arc from `start` to `end`, walking
/// forward cyclically.
fn simplify_arc(points: &[Point], start: usize, end: usize, epsilon: f64, keep: &mut [bool]) {
    let n = points.len();
    let mut pending = vec![(start, end)];

    while let Some((start, end)) = pending.pop() {
        let span = (end + n - start) % n;
        if span < 2 {
            continue;
        }

        let (a, b) = (points[start], points[end]);
        let (mut split, mut max_dist) = (start, 0.0);
        for offset in 1..span {
            let i = (start + offset) % n;
            let d = distance_to_line(points[i], a, b);
            if d > max_dist {
                split = i;
                max_dist = d;
            }
        }

        if max_dist > epsilon {
            keep[split] = true;
            pending.push((split, end));
            pending.push((start, split));
        }
    }
}

/// Remove vertices lying within `epsilon` of the line through their
/// neighbours, never going below three vertices.
fn drop_near_collinear(vertices: &mut Vec<Point>, epsilon: f64, closed: bool) {
    let first = if closed { 0 } else { 1 };
    let mut i = first;
    loop {
        let n = vertices.len();
        let last = if closed { n } else { n.saturating_sub(1) };
        if n <= 3 || i >= last {
            break;
        }
        let prev = vertices[(i + n - 1) % n];
        let next = vertices[(i + 1) % n];
        if distance_to_line(vertices[i], prev, next) <= epsilon {
            vertices.remove(i);
            i = i.saturating_sub(1).max(first);
        } else {
            i += 1;
        }
    }
}

/// Perpendicular distance from `p` to the line through `a` and `b`, or the
/// plain distance to `a` when the two coincide.
fn distance_to_line(p: Point, a: Point, b: Point) -> f64 {
    let (dx, dy) = (f64::from(b.x - a.x), f64::from(b.y - a.y));
    let length = dx.hypot(dy);
    if length == 0.0 {
        return p.distance(a);
    }
    let cross = dx * f64::from(p.y - a.y) - dy * f64::from(p.x - a.x);
    cross.abs() / length
}
