// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Raster module — channel-order normalization, grayscale conversion, and
// bridging between `SourceImage` buffers and the `image` crate.

pub mod color;

use std::path::Path;

use image::{DynamicImage, RgbImage};
use quadscan_core::error::{QuadscanError, Result};
use quadscan_core::{ChannelOrder, SourceImage};
use tracing::{info, instrument};

pub use color::{normalize, swap_red_blue, to_grayscale, to_source_order};

/// Wrap a decoded `DynamicImage` as an RGB-ordered `SourceImage`.
///
/// Alpha is dropped; colour types wider than 8 bits are narrowed.
pub fn from_dynamic(image: &DynamicImage) -> SourceImage {
    let rgb = image.to_rgb8();
    let (width, height) = rgb.dimensions();
    SourceImage::new(width, height, ChannelOrder::Rgb, rgb.into_raw())
}

/// Turn a `SourceImage` back into a `DynamicImage` for encoding.
pub fn to_dynamic(source: &SourceImage) -> Result<DynamicImage> {
    let rgb: RgbImage = normalize(source)?;
    Ok(DynamicImage::ImageRgb8(rgb))
}

/// Decode an image file (JPEG, PNG, TIFF, etc.) into an RGB-ordered source.
#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn open_source(path: impl AsRef<Path>) -> Result<SourceImage> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("{} does not exist", path.display()),
        )
        .into());
    }
    let image = image::open(path).map_err(|err| {
        QuadscanError::ImageError(format!(
            "failed to decode image {}: {}",
            path.display(),
            err
        ))
    })?;
    info!(width = image.width(), height = image.height(), "Image loaded");
    Ok(from_dynamic(&image))
}

/// Decode an image held in memory.
pub fn decode_source(data: &[u8]) -> Result<SourceImage> {
    let image = image::load_from_memory(data)
        .map_err(|err| QuadscanError::ImageError(format!("failed to decode image: {}", err)))?;
    Ok(from_dynamic(&image))
}

/// Encode a source to `path`; the format follows the file extension.
#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn save_source(source: &SourceImage, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    to_dynamic(source)?.save(path).map_err(|err| {
        QuadscanError::ImageError(format!("failed to write image {}: {}", path.display(), err))
    })
}

/// Convert a `SourceImage` into an `RgbImage` without touching channel order.
pub(crate) fn into_buffer(source: &SourceImage) -> Result<RgbImage> {
    source.validate()?;
    RgbImage::from_raw(source.width, source.height, source.data.clone()).ok_or_else(|| {
        QuadscanError::InvalidImage(format!(
            "{}x{} buffer rejected by the image backend",
            source.width, source.height
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn dynamic_round_trip_keeps_pixels() {
        let mut rgb = RgbImage::new(3, 2);
        rgb.put_pixel(2, 1, Rgb([10, 20, 30]));
        let source = from_dynamic(&DynamicImage::ImageRgb8(rgb.clone()));
        assert_eq!(source.order, ChannelOrder::Rgb);
        assert_eq!(to_dynamic(&source).unwrap().to_rgb8(), rgb);
    }

    #[test]
    fn garbage_bytes_are_a_decode_error() {
        let err = decode_source(b"not an image").unwrap_err();
        assert!(matches!(err, QuadscanError::ImageError(ref d) if d.contains("decode")));
    }

    #[test]
    fn saved_png_decodes_to_the_same_pixels() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scene.png");
        let source = SourceImage::new(2, 1, ChannelOrder::Bgr, vec![1, 2, 3, 4, 5, 6]);
        save_source(&source, &path).unwrap();

        let loaded = open_source(&path).unwrap();
        assert_eq!(loaded.order, ChannelOrder::Rgb);
        assert_eq!(loaded.data, vec![3, 2, 1, 6, 5, 4]);
    }

    #[test]
    fn unknown_extension_is_a_write_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = SourceImage::new(1, 1, ChannelOrder::Rgb, vec![1, 2, 3]);
        let err = save_source(&source, dir.path().join("out.xyz")).unwrap_err();
        assert!(matches!(err, QuadscanError::ImageError(ref d) if d.starts_with("failed to write")));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = open_source("/nonexistent/quadscan/photo.png").unwrap_err();
        assert!(matches!(err, QuadscanError::Io(_)));
    }

    #[test]
    fn bgr_source_is_reordered_for_encoding() {
        let source = SourceImage::new(1, 1, ChannelOrder::Bgr, vec![1, 2, 3]);
        let dynamic = to_dynamic(&source).unwrap();
        assert_eq!(dynamic.to_rgb8().get_pixel(0, 0), &Rgb([3, 2, 1]));
    }
}
