// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Quadrilateral detector — runs the full pipeline from a raw source buffer to
// an annotated copy of it.

use image::{GrayImage, RgbImage};
use quadscan_core::error::Result;
use quadscan_core::{Contour, DetectionConfig, DetectionResult, Polygon, SourceImage};
use tracing::{debug, info, instrument};

use super::contours::find_external_contours;
use super::edges::{EdgeDetector, EdgeMap};
use super::overlay::render_overlay;
use super::select::select_quadrilateral;
use crate::raster::{normalize, to_grayscale};

/// Finds the dominant quadrilateral in a photo and outlines it.
///
/// Stateless apart from its configuration: every call owns its intermediate
/// buffers, so the same input always produces byte-identical output.
#[derive(Debug, Clone, Default)]
pub struct QuadDetector {
    config: DetectionConfig,
}

/// Every intermediate product of one detection run.
#[derive(Debug, Clone)]
pub struct Analysis {
    /// The source in canonical RGB order.
    pub rgb: RgbImage,
    pub gray: GrayImage,
    pub edges: EdgeMap,
    /// External contours in raster order of their first pixel.
    pub contours: Vec<Contour>,
    pub quad: Option<Polygon>,
}

impl QuadDetector {
    pub fn new(config: DetectionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    /// Detect the quadrilateral and render the overlay.
    ///
    /// Fails with `InvalidConfig` when the configuration does not pass
    /// [`DetectionConfig::validate`], and with `InvalidImage` when the buffer
    /// does not describe a non-empty image. Finding nothing is not an error:
    /// the result then carries `quad: None` and an unmodified copy of the
    /// source.
    #[instrument(skip_all, fields(width = source.width, height = source.height, order = ?source.order))]
    pub fn detect(&self, source: &SourceImage) -> Result<DetectionResult> {
        let analysis = self.analyse(source)?;
        let image = render_overlay(
            &analysis.rgb,
            analysis.quad.as_ref(),
            self.config.overlay_color,
            self.config.overlay_thickness,
            source.order,
        );

        match &analysis.quad {
            Some(quad) => info!(area = quad.area(), "Quadrilateral detected"),
            None => info!(
                contours = analysis.contours.len(),
                "No quadrilateral found"
            ),
        }

        Ok(DetectionResult {
            quad: analysis.quad,
            image,
        })
    }

    /// Run every stage up to selection and keep the intermediates.
    pub fn analyse(&self, source: &SourceImage) -> Result<Analysis> {
        self.config.validate()?;
        let rgb = normalize(source)?;
        let gray = to_grayscale(&rgb);
        let edges = EdgeDetector::from_config(&self.config).detect(&gray);
        let contours = find_external_contours(&edges);
        debug!(contours = contours.len(), "Contours extracted");
        let quad = select_quadrilateral(&contours, self.config.approximation_epsilon_ratio);

        Ok(Analysis {
            rgb,
            gray,
            edges,
            contours,
            quad,
        })
    }
}

/// Detect the largest quadrilateral in `source` with the given configuration.
pub fn detect_quadrilateral(
    source: &SourceImage,
    config: &DetectionConfig,
) -> Result<DetectionResult> {
    QuadDetector::new(config.clone()).detect(source)
}
