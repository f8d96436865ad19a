// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Viewer session — the photo currently being looked at, the settings applied
// to it, and the results already computed.

use std::path::{Path, PathBuf};

use quadscan_core::error::Result;
use quadscan_core::{DetectionConfig, DetectionResult, SourceImage};
use quadscan_vision::raster::open_source;
use tracing::info;

use crate::services::detection_cache::{DetectionCache, source_fingerprint};

/// The photo a session is showing.
#[derive(Debug, Clone)]
pub struct CurrentSource {
    pub path: PathBuf,
    /// SHA-256 of the decoded pixels, channel order and dimensions.
    pub fingerprint: String,
    pub image: SourceImage,
}

/// Explicit presentation state: nothing here is global.
#[derive(Debug)]
pub struct ViewerSession {
    config: DetectionConfig,
    current: Option<CurrentSource>,
    cache: DetectionCache,
}

#[allow(dead_code)]
impl ViewerSession {
    /// Start a session with a validated configuration.
    pub fn new(config: DetectionConfig, cache_capacity: usize) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            current: None,
            cache: DetectionCache::new(cache_capacity),
        })
    }

    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    pub fn current(&self) -> Option<&CurrentSource> {
        self.current.as_ref()
    }

    pub fn cache(&self) -> &DetectionCache {
        &self.cache
    }

    /// Decode `path` and show it.
    pub fn open(&mut self, path: impl AsRef<Path>) -> Result<&DetectionResult> {
        let path = path.as_ref();
        let image = open_source(path)?;
        self.present(path, image)
    }

    /// Make `image` the current source and return its detection result.
    ///
    /// Presenting the same pixels again is answered from the cache.
    pub fn present(&mut self, path: &Path, image: SourceImage) -> Result<&DetectionResult> {
        let fingerprint = source_fingerprint(&image);
        let unchanged = self
            .current
            .as_ref()
            .is_some_and(|current| current.fingerprint == fingerprint);
        if !unchanged {
            info!(path = %path.display(), fingerprint = %&fingerprint[..12], "Presenting new source");
        }
        self.current = Some(CurrentSource {
            path: path.to_path_buf(),
            fingerprint,
            image,
        });
        self.refresh()
    }

    /// Swap the configuration and return the current source's result under it,
    /// if there is a current source.
    pub fn set_config(&mut self, config: DetectionConfig) -> Result<Option<&DetectionResult>> {
        config.validate()?;
        self.config = config;
        if self.current.is_none() {
            return Ok(None);
        }
        self.refresh().map(Some)
    }

    fn refresh(&mut self) -> Result<&DetectionResult> {
        let Some(current) = self.current.as_ref() else {
            return Err(quadscan_core::QuadscanError::InvalidImage(
                "no source is being shown".into(),
            ));
        };
        self.cache.get_or_detect(&current.image, &self.config)
    }
}
