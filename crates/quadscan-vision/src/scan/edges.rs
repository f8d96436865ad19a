// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Canny edge detection — smoothing, Sobel gradients, non-maximum suppression,
// and double-threshold hysteresis.

use image::{GrayImage, Luma};
use quadscan_core::DetectionConfig;
use quadscan_core::config::SUPPORTED_APERTURES;
use tracing::{debug, instrument, warn};

/// Pixel value marking an edge in an [`EdgeMap`].
pub const EDGE: u8 = 255;

/// tan(22.5°), the sector boundary between axis-aligned and diagonal gradients.
const TAN_22_5: f32 = 0.414_213_57;
/// tan(67.5°).
const TAN_67_5: f32 = 2.414_213_6;

/// Binary edge image: every pixel is either 0 or [`EDGE`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeMap(GrayImage);

impl EdgeMap {
    /// Wrap a single-channel image, mapping every non-zero pixel to [`EDGE`].
    pub fn from_binary(mut gray: GrayImage) -> Self {
        for pixel in gray.pixels_mut() {
            if pixel.0[0] != 0 {
                pixel.0[0] = EDGE;
            }
        }
        Self(gray)
    }

    pub fn width(&self) -> u32 {
        self.0.width()
    }

    pub fn height(&self) -> u32 {
        self.0.height()
    }

    pub fn is_edge(&self, x: u32, y: u32) -> bool {
        self.0.get_pixel(x, y).0[0] == EDGE
    }

    pub fn edge_count(&self) -> usize {
        self.0.as_raw().iter().filter(|&&v| v == EDGE).count()
    }

    pub fn as_gray(&self) -> &GrayImage {
        &self.0
    }
}

/// Canny-style edge detector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeDetector {
    low_threshold: f32,
    high_threshold: f32,
    aperture: usize,
    l2_gradient: bool,
}

impl EdgeDetector {
    /// Build a detector, repairing parameters instead of rejecting them.
    ///
    /// A low threshold above the high threshold is clamped down to it. An
    /// unsupported aperture is replaced by the nearest supported size.
    pub fn new(low_threshold: f32, high_threshold: f32, aperture: u32) -> Self {
        let low_threshold = if low_threshold > high_threshold {
            warn!(
                low_threshold,
                high_threshold, "Low threshold exceeds high threshold; clamping"
            );
            high_threshold
        } else {
            low_threshold
        };

        Self {
            low_threshold,
            high_threshold,
            aperture: supported_aperture(aperture),
            l2_gradient: false,
        }
    }

    pub fn from_config(config: &DetectionConfig) -> Self {
        Self::new(
            config.edge_low_threshold,
            config.edge_high_threshold,
            config.gradient_aperture,
        )
        .with_l2_gradient(config.l2_gradient)
    }

    pub fn with_l2_gradient(mut self, l2_gradient: bool) -> Self {
        self.l2_gradient = l2_gradient;
        self
    }

    pub fn low_threshold(&self) -> f32 {
        self.low_threshold
    }

    pub fn high_threshold(&self) -> f32 {
        self.high_threshold
    }

    pub fn aperture(&self) -> usize {
        self.aperture
    }

    /// Run the full Canny pipeline on a grayscale image.
    #[instrument(skip_all, fields(
        width = gray.width(),
        height = gray.height(),
        low = self.low_threshold,
        high = self.high_threshold,
        aperture = self.aperture
    ))]
    pub fn detect(&self, gray: &GrayImage) -> EdgeMap {
        let (width, height) = (gray.width() as usize, gray.height() as usize);
        if width == 0 || height == 0 {
            return EdgeMap(GrayImage::new(gray.width(), gray.height()));
        }

        let samples: Vec<f32> = gray.as_raw().iter().map(|&v| f32::from(v)).collect();
        let smoothed = {
            let blur = [0.25, 0.5, 0.25];
            let rows = convolve_rows(&samples, width, height, &blur);
            convolve_cols(&rows, width, height, &blur)
        };

        let (derivative, smoothing) = sobel_kernels(self.aperture);
        let gx = convolve_cols(
            &convolve_rows(&smoothed, width, height, &derivative),
            width,
            height,
            &smoothing,
        );
        let gy = convolve_rows(
            &convolve_cols(&smoothed, width, height, &derivative),
            width,
            height,
            &smoothing,
        );

        let magnitude: Vec<f32> = gx
            .iter()
            .zip(&gy)
            .map(|(&dx, &dy)| {
                if self.l2_gradient {
                    dx.hypot(dy)
                } else {
                    dx.abs() + dy.abs()
                }
            })
            .collect();

        let thinned = non_max_suppression(&magnitude, &gx, &gy, width, height);
        let labels = hysteresis(
            &thinned,
            width,
            height,
            self.low_threshold,
            self.high_threshold,
        );

        let edges = EdgeMap(GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
            Luma([labels[y as usize * width + x as usize]])
        }));
        debug!(edge_pixels = edges.edge_count(), "Canny edge detection complete");
        edges
    }
}

impl Default for EdgeDetector {
    fn default() -> Self {
        Self::from_config(&DetectionConfig::default())
    }
}

/// Map a requested aperture onto a supported Sobel size.
fn supported_aperture(requested: u32) -> usize {
    if SUPPORTED_APERTURES.contains(&requested) {
        return requested as usize;
    }
    let nearest = SUPPORTED_APERTURES
        .iter()
        .copied()
        .min_by_key(|size| size.abs_diff(requested))
        .unwrap_or(3);
    warn!(requested, nearest, "Unsupported gradient aperture; using nearest");
    nearest as usize
}

/// Binomial row `[1, n-1 choose 1, ..., 1]` of length `n`.
fn binomial(n: usize) -> Vec<f32> {
    let mut row = vec![1.0f32];
    for _ in 1..n {
        let mut next = vec![0.0; row.len() + 1];
        for (i, &v) in row.iter().enumerate() {
            next[i] += v;
            next[i + 1] += v;
        }
        row = next;
    }
    row
}

/// Separable Sobel kernels of the given (odd) size: (derivative, smoothing).
///
/// Size 3 yields `[-1, 0, 1]` and `[1, 2, 1]`.
fn sobel_kernels(aperture: usize) -> (Vec<f32>, Vec<f32>) {
    let smoothing = binomial(aperture);
    let base = binomial(aperture - 2);
    let mut derivative = vec![0.0; aperture];
    for (i, &v) in base.iter().enumerate() {
        derivative[i] -= v;
        derivative[i + 2] += v;
    }
    (derivative, smoothing)
}

/// Correlate each row with `kernel`, replicating border samples.
fn convolve_rows(src: &[f32], width: usize, height: usize, kernel: &[f32]) -> Vec<f32> {
    let radius = kernel.len() / 2;
    let mut out = vec![0.0f32; src.len()];
    for y in 0..height {
        let row = &src[y * width..(y + 1) * width];
        for x in 0..width {
            out[y * width + x] = kernel
                .iter()
                .enumerate()
                .map(|(k, &weight)| weight * row[(x + k).saturating_sub(radius).min(width - 1)])
                .sum::<f32>();
        }
    }
    out
}

/// Correlate each column with `kernel`, replicating border samples.
fn convolve_cols(src: &[f32], width: usize, height: usize, kernel: &[f32]) -> Vec<f32> {
    let radius = kernel.len() / 2;
    let mut out = vec![0.0f32; src.len()];
    for y in 0..height {
        for x in 0..width {
            out[y * width + x] = kernel
                .iter()
                .enumerate()
                .map(|(k, &weight)| {
                    let sy = (y + k).saturating_sub(radius).min(height - 1);
                    weight * src[sy * width + x]
                })
                .sum::<f32>();
        }
    }
    out
}

/// Keep only magnitudes that are local maxima along the gradient direction.
///
/// The direction is quantized to 0°, 45°, 90° or 135°. On axis-aligned
/// plateaus the pixel must beat its backward neighbour strictly and match its
/// forward one, which keeps exactly one pixel of a two-pixel ridge.
fn non_max_suppression(
    magnitude: &[f32],
    gx: &[f32],
    gy: &[f32],
    width: usize,
    height: usize,
) -> Vec<f32> {
    let at = |x: isize, y: isize| -> f32 {
        if x < 0 || y < 0 || x >= width as isize || y >= height as isize {
            0.0
        } else {
            magnitude[y as usize * width + x as usize]
        }
    };

    let mut out = vec![0.0; magnitude.len()];
    for y in 0..height {
        for x in 0..width {
            let idx = y * width + x;
            let m = magnitude[idx];
            if m <= 0.0 {
                continue;
            }
            let (xi, yi) = (x as isize, y as isize);
            let (ax, ay) = (gx[idx].abs(), gy[idx].abs());

            let is_max = if ay <= ax * TAN_22_5 {
                m > at(xi - 1, yi) && m >= at(xi + 1, yi)
            } else if ay >= ax * TAN_67_5 {
                m > at(xi, yi - 1) && m >= at(xi, yi + 1)
            } else if (gx[idx] > 0.0) == (gy[idx] > 0.0) {
                m > at(xi - 1, yi - 1) && m > at(xi + 1, yi + 1)
            } else {
                m > at(xi + 1, yi - 1) && m > at(xi - 1, yi + 1)
            };

            if is_max {
                out[idx] = m;
            }
        }
    }
    out
}

/// Double-threshold hysteresis over suppressed magnitudes.
///
/// Returns one byte per pixel, `EDGE` or 0.
fn hysteresis(thinned: &[f32], width: usize, height: usize, low: f32, high: f32) -> Vec<u8> {
    const NONE: u8 = 0;
    const WEAK: u8 = 1;
    const STRONG: u8 = 2;

    let mut state = vec![NONE; thinned.len()];
    let mut stack = Vec::new();
    for (idx, &m) in thinned.iter().enumerate() {
        if m <= 0.0 {
            continue;
        }
        if m >= high {
            state[idx] = STRONG;
            stack.push(idx);
        } else if m >= low {
            state[idx] = WEAK;
        }
    }

    while let Some(idx) = stack.pop() {
        let (x, y) = ((idx % width) as isize, (idx / width) as isize);
        for dy in -1..=1 {
            for dx in -1..=1 {
                let (nx, ny) = (x + dx, y + dy);
                if nx < 0 || ny < 0 || nx >= width as isize || ny >= height as isize {
                    continue;
                }
                let n = ny as usize * width + nx as usize;
                if state[n] == WEAK {
                    state[n] = STRONG;
                    stack.push(n);
                }
            }
        }
    }

    state
        .into_iter()
        .map(|s| if s == STRONG { EDGE } else { 0 })
        .collect()
}
