// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Detection configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{QuadscanError, Result};

/// Sobel aperture sizes the edge detector knows how to build.
pub const SUPPORTED_APERTURES: [u32; 3] = [3, 5, 7];

/// Tunable parameters of the quadrilateral detection pipeline.
///
/// None of these switch behaviour on or off. They only move thresholds and
/// drawing attributes, so a partially specified JSON file is filled in from
/// [`Default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Hysteresis low threshold. Weak edge pixels at or above this magnitude
    /// survive only when connected to a strong pixel.
    pub edge_low_threshold: f32,
    /// Hysteresis high threshold. Pixels at or above this magnitude are
    /// definite edges.
    pub edge_high_threshold: f32,
    /// Sobel kernel size (3, 5 or 7).
    pub gradient_aperture: u32,
    /// Use the L2 norm for the gradient magnitude instead of `|gx| + |gy|`.
    pub l2_gradient: bool,
    /// Douglas-Peucker tolerance as a fraction of the contour perimeter.
    pub approximation_epsilon_ratio: f64,
    /// Outline colour, in canonical R, G, B order.
    pub overlay_color: [u8; 3],
    /// Outline stroke width in pixels.
    pub overlay_thickness: u32,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            edge_low_threshold: 10.0,
            edge_high_threshold: 30.0,
            gradient_aperture: 3,
            l2_gradient: false,
            approximation_epsilon_ratio: 0.02,
            overlay_color: [0, 255, 0],
            overlay_thickness: 3,
        }
    }
}

impl DetectionConfig {
    /// Reject values the pipeline cannot make sense of.
    ///
    /// `edge_low_threshold > edge_high_threshold` is accepted: the edge
    /// detector clamps the low threshold instead of failing.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("edge_low_threshold", self.edge_low_threshold),
            ("edge_high_threshold", self.edge_high_threshold),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(QuadscanError::InvalidConfig(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }

        if !SUPPORTED_APERTURES.contains(&self.gradient_aperture) {
            return Err(QuadscanError::InvalidConfig(format!(
                "gradient_aperture must be one of {SUPPORTED_APERTURES:?}, got {}",
                self.gradient_aperture
            )));
        }

        let ratio = self.approximation_epsilon_ratio;
        if !ratio.is_finite() || ratio <= 0.0 || ratio >= 1.0 {
            return Err(QuadscanError::InvalidConfig(format!(
                "approximation_epsilon_ratio must lie in (0, 1), got {ratio}"
            )));
        }

        if self.overlay_thickness == 0 {
            return Err(QuadscanError::InvalidConfig(
                "overlay_thickness must be at least 1".into(),
            ));
        }

        Ok(())
    }

    /// Load a configuration from a JSON file and validate it.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&data)?;
        config.validate()?;
        Ok(config)
    }

    /// Write the configuration as pretty-printed JSON.
    pub fn save_json_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = DetectionConfig::default();
        assert_eq!(config.edge_low_threshold, 10.0);
        assert_eq!(config.edge_high_threshold, 30.0);
        assert_eq!(config.gradient_aperture, 3);
        assert!(!config.l2_gradient);
        assert_eq!(config.approximation_epsilon_ratio, 0.02);
        assert_eq!(config.overlay_color, [0, 255, 0]);
        assert_eq!(config.overlay_thickness, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn inverted_thresholds_are_accepted() {
        let config = DetectionConfig {
            edge_low_threshold: 50.0,
            edge_high_threshold: 20.0,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn even_aperture_is_rejected() {
        let config = DetectionConfig {
            gradient_aperture: 4,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(QuadscanError::InvalidConfig(_))
        ));
    }

    #[test]
    fn out_of_range_ratio_is_rejected() {
        for ratio in [0.0, -0.1, 1.0, f64::NAN] {
            let config = DetectionConfig {
                approximation_epsilon_ratio: ratio,
                ..Default::default()
            };
            assert!(config.validate().is_err(), "ratio {ratio} accepted");
        }
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config: DetectionConfig =
            serde_json::from_str(r#"{ "edge_high_threshold": 80.0 }"#).unwrap();
        assert_eq!(config.edge_high_threshold, 80.0);
        assert_eq!(config.edge_low_threshold, 10.0);
        assert_eq!(config.overlay_thickness, 3);
    }

    #[test]
    fn json_file_load_validates() {
        let dir = tempfile::tempdir().unwrap();

        let good = dir.path().join("good.json");
        let config = DetectionConfig {
            overlay_color: [255, 0, 0],
            ..Default::default()
        };
        config.save_json_file(&good).unwrap();
        assert_eq!(DetectionConfig::from_json_file(&good).unwrap(), config);

        let bad = dir.path().join("bad.json");
        std::fs::write(&bad, r#"{ "overlay_thickness": 0 }"#).unwrap();
        assert!(matches!(
            DetectionConfig::from_json_file(&bad),
            Err(QuadscanError::InvalidConfig(_))
        ));

        let missing = dir.path().join("missing.json");
        assert!(matches!(
            DetectionConfig::from_json_file(&missing),
            Err(QuadscanError::Io(_))
        ));
    }
}
