// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Contour extraction — Suzuki-Abe border following over a binary edge map,
// keeping only outermost borders, with straight runs compressed to their ends.

use quadscan_core::{Contour, Point};
use tracing::{debug, instrument};

use super::edges::EdgeMap;

/// Neighbour offsets `(dx, dy)` in clockwise order (y grows downwards),
/// starting east.
const NEIGHBOURS: [(isize, isize); 8] = [
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
];

const EAST: usize = 0;
const WEST: usize = 4;

/// Border number of the image frame.
const FRAME: i32 = 1;

/// A followed border: whether it bounds a hole, and its enclosing border.
#[derive(Debug, Clone, Copy)]
struct Border {
    hole: bool,
    parent: i32,
}

/// Trace the external borders of all 8-connected edge regions.
///
/// Contours come back in raster order of their first pixel. Borders nested
/// inside another region (holes and everything within them) are dropped.
#[instrument(skip_all, fields(width = edges.width(), height = edges.height()))]
pub fn find_external_contours(edges: &EdgeMap) -> Vec<Contour> {
    let mut grid = LabelGrid::from_edges(edges);
    let stride = grid.stride;

    // Index 0 is unused so that border numbers index the table directly.
    let mut borders = vec![
        Border {
            hole: true,
            parent: 0,
        };
        2
    ];
    let mut next_border = FRAME;
    let mut contours = Vec::new();

    for y in 1..grid.rows - 1 {
        let mut last_border = FRAME;
        for x in 1..stride - 1 {
            let idx = y * stride + x;
            let value = grid.labels[idx];
            if value == 0 {
                continue;
            }

            let start = if value == 1 && grid.labels[idx - 1] == 0 {
                Some((false, WEST))
            } else if value >= 1 && grid.labels[idx + 1] == 0 {
                if value > 1 {
                    last_border = value;
                }
                Some((true, EAST))
            } else {
                None
            };

            if let Some((hole, from)) = start {
                next_border += 1;
                let previous = borders[last_border as usize];
                let parent = if hole == previous.hole {
                    previous.parent
                } else {
                    last_border
                };
                borders.push(Border { hole, parent });

                let points = grid.follow(idx, from, next_border);
                if !hole && parent == FRAME {
                    contours.push(Contour::new(compress_runs(points)));
                }
            }

            let value = grid.labels[idx];
            if value != 1 {
                last_border = value.abs();
            }
        }
    }

    debug!(
        borders = next_border - FRAME,
        external = contours.len(),
        "Border following complete"
    );
    contours
}

/// Zero-padded label image used while following borders.
///
/// 0 is background, 1 an unvisited edge pixel, `n > 1` a pixel on border `n`,
/// and `-n` the right-most pixel of a run on border `n`.
struct LabelGrid {
    labels: Vec<i32>,
    stride: usize,
    rows: usize,
}

impl LabelGrid {
    fn from_edges(edges: &EdgeMap) -> Self {
        let stride = edges.width() as usize + 2;
        let rows = edges.height() as usize + 2;
        let mut labels = vec![0; stride * rows];
        for (x, y, pixel) in edges.as_gray().enumerate_pixels() {
            if pixel.0[0] != 0 {
                labels[(y as usize + 1) * stride + x as usize + 1] = 1;
            }
        }
        Self {
            labels,
            stride,
            rows,
        }
    }

    fn step(&self, idx: usize, dir: usize) -> usize {
        let (dx, dy) = NEIGHBOURS[dir];
        (idx as isize + dy * self.stride as isize + dx) as usize
    }

    fn point(&self, idx: usize) -> Point {
        Point::new(
            (idx % self.stride) as i32 - 1,
            (idx / self.stride) as i32 - 1,
        )
    }

    /// Follow one border starting at `start`, entered from direction `from`.
    fn follow(&mut self, start: usize, from: usize, border: i32) -> Vec<Point> {
        // Clockwise search for the first non-zero neighbour.
        let Some(first_dir) = (0..8)
            .map(|k| (from + k) % 8)
            .find(|&dir| self.labels[self.step(start, dir)] != 0)
        else {
            self.labels[start] = -border;
            return vec![self.point(start)];
        };

        let first = self.step(start, first_dir);
        let mut current = start;
        // Direction from `current` back to the pixel we came from.
        let mut back_dir = first_dir;
        let mut points = Vec::new();

        loop {
            points.push(self.point(current));

            // Counter-clockwise search, starting just after the previous pixel.
            let mut east_is_background = false;
            let mut next_dir = back_dir;
            for k in 1..=8 {
                let dir = (back_dir + 8 - k) % 8;
                if self.labels[self.step(current, dir)] != 0 {
                    next_dir = dir;
                    break;
                }
                if dir == EAST {
                    east_is_background = true;
                }
            }

            if east_is_background {
                self.labels[current] = -border;
            } else if self.labels[current] == 1 {
                self.labels[current] = border;
            }

            let next = self.step(current, next_dir);
            if next == start && current == first {
                break;
            }
            current = next;
            back_dir = (next_dir + 4) % 8;
        }

        points
    }
}

/// Drop points that continue a straight chain-code run.
///
/// Consecutive traced points are 8-neighbours, so a point whose incoming and
/// outgoing steps are equal lies in the middle of a horizontal, vertical or
/// diagonal run.
fn compress_runs(points: Vec<Point>) -> Vec<Point> {
    let n = points.len();
    if n <= 2 {
        return points;
    }
    let step = |a: Point, b: Point| (b.x - a.x, b.y - a.y);
    (0..n)
        .filter(|&i| {
            let prev = points[(i + n - 1) % n];
            let next = points[(i + 1) % n];
            step(prev, points[i]) != step(points[i], next)
        })
        .map(|i| points[i])
        .collect()
}
