// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Detection cache — content-keyed memoization of detection results.
//
// Keys are SHA-256 fingerprints of the source pixels and the detection
// configuration, so re-presenting the same photo with the same settings never
// re-runs the pipeline. Capacity is bounded; the oldest entry goes first.

use std::collections::{HashMap, VecDeque};

use quadscan_core::error::Result;
use quadscan_core::{ChannelOrder, DetectionConfig, DetectionResult, SourceImage};
use quadscan_vision::detect_quadrilateral;
use sha2::{Digest, Sha256};
use tracing::debug;

/// Default number of results kept.
pub const DEFAULT_CAPACITY: usize = 16;

/// Compute the SHA-256 hash of `data` and return it as a lowercase hex string.
pub fn hash_bytes(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Fingerprint of a source image: dimensions, channel order, and pixels.
pub fn source_fingerprint(source: &SourceImage) -> String {
    let mut hasher = Sha256::new();
    hasher.update(source.width.to_le_bytes());
    hasher.update(source.height.to_le_bytes());
    hasher.update([match source.order {
        ChannelOrder::Rgb => 0u8,
        ChannelOrder::Bgr => 1u8,
    }]);
    hasher.update(&source.data);
    hex::encode(hasher.finalize())
}

/// Cache key for running `config` over the source with fingerprint `source`.
pub fn detection_key(source: &str, config: &DetectionConfig) -> Result<String> {
    let mut material = source.as_bytes().to_vec();
    material.extend(serde_json::to_vec(config)?);
    Ok(hash_bytes(&material))
}

/// Bounded map from detection key to result.
#[derive(Debug)]
pub struct DetectionCache {
    capacity: usize,
    entries: HashMap<String, DetectionResult>,
    // Insertion order, oldest at the front.
    order: VecDeque<String>,
    hits: u64,
    misses: u64,
}

impl Default for DetectionCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[allow(dead_code)]
impl DetectionCache {
    /// Create a cache holding at most `capacity` results (at least one).
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: HashMap::new(),
            order: VecDeque::new(),
            hits: 0,
            misses: 0,
        }
    }

    /// Return the cached result for `source` under `config`, running the
    /// detector only when nothing is cached yet.
    pub fn get_or_detect(
        &mut self,
        source: &SourceImage,
        config: &DetectionConfig,
    ) -> Result<&DetectionResult> {
        let key = detection_key(&source_fingerprint(source), config)?;
        if self.entries.contains_key(&key) {
            self.hits += 1;
            debug!(key = %&key[..12], "Detection cache hit");
        } else {
            self.misses += 1;
            let result = detect_quadrilateral(source, config)?;
            self.insert(key.clone(), result);
        }
        Ok(&self.entries[&key])
    }

    pub fn get(&self, key: &str) -> Option<&DetectionResult> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// `(hits, misses)` since creation.
    pub fn stats(&self) -> (u64, u64) {
        (self.hits, self.misses)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    fn insert(&mut self, key: String, result: DetectionResult) {
        while self.entries.len() >= self.capacity {
            let Some(oldest) = self.order.pop_front() else {
                break;
            };
            self.entries.remove(&oldest);
            debug!(key = %&oldest[..12], "Evicted detection result");
        }
        self.order.push_back(key.clone());
        self.entries.insert(key, result);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// SHA-256 of the empty byte slice (well-known constant).
    const EMPTY_SHA256: &str = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

    fn flat(width: u32, height: u32, value: u8) -> SourceImage {
        SourceImage::new(
            width,
            height,
            ChannelOrder::Rgb,
            vec![value; (width * height * 3) as usize],
        )
    }

    #[test]
    fn hash_empty_input() {
        assert_eq!(hash_bytes(b""), EMPTY_SHA256);
    }

    #[test]
    fn fingerprint_depends_on_order_and_shape() {
        let a = flat(4, 2, 9);
        let mut b = a.clone();
        b.order = ChannelOrder::Bgr;
        let c = flat(2, 4, 9);
        assert_eq!(source_fingerprint(&a), source_fingerprint(&a.clone()));
        assert_ne!(source_fingerprint(&a), source_fingerprint(&b));
        assert_ne!(source_fingerprint(&a), source_fingerprint(&c));
    }

    #[test]
    fn key_changes_with_config() {
        let fp = source_fingerprint(&flat(4, 4, 0));
        let default = DetectionConfig::default();
        let thicker = DetectionConfig {
            overlay_thickness: 5,
            ..DetectionConfig::default()
        };
        assert_eq!(
            detection_key(&fp, &default).unwrap(),
            detection_key(&fp, &default).unwrap()
        );
        assert_ne!(
            detection_key(&fp, &default).unwrap(),
            detection_key(&fp, &thicker).unwrap()
        );
    }

    #[test]
    fn second_request_is_a_hit() {
        let mut cache = DetectionCache::default();
        let source = flat(16, 16, 80);
        let config = DetectionConfig::default();

        let first = cache.get_or_detect(&source, &config).unwrap().clone();
        let second = cache.get_or_detect(&source, &config).unwrap();
        assert_eq!(&first, second);
        assert_eq!(cache.stats(), (1, 1));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn oldest_entry_is_evicted_first() {
        let mut cache = DetectionCache::new(2);
        let config = DetectionConfig::default();
        let (a, b, c) = (flat(8, 8, 1), flat(8, 8, 2), flat(8, 8, 3));

        cache.get_or_detect(&a, &config).unwrap();
        cache.get_or_detect(&b, &config).unwrap();
        cache.get_or_detect(&c, &config).unwrap();
        assert_eq!(cache.len(), 2);

        let key_a = detection_key(&source_fingerprint(&a), &config).unwrap();
        let key_c = detection_key(&source_fingerprint(&c), &config).unwrap();
        assert!(cache.get(&key_a).is_none());
        assert!(cache.get(&key_c).is_some());
    }

    #[test]
    fn invalid_source_is_not_cached() {
        let mut cache = DetectionCache::default();
        let broken = SourceImage::new(4, 4, ChannelOrder::Rgb, vec![0; 5]);
        assert!(cache.get_or_detect(&broken, &DetectionConfig::default()).is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn zero_capacity_still_holds_one() {
        let mut cache = DetectionCache::new(0);
        assert_eq!(cache.capacity(), 1);
        cache.get_or_detect(&flat(4, 4, 1), &DetectionConfig::default()).unwrap();
        cache.clear();
        assert!(cache.is_empty());
    }
}
