// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Colour handling — channel-order permutation and luma conversion.

use image::{GrayImage, Luma, Rgb, RgbImage};
use quadscan_core::error::Result;
use quadscan_core::{ChannelOrder, SourceImage};
use tracing::{debug, instrument};

use super::into_buffer;

/// ITU-R BT.601 luma weights for R, G, B.
const LUMA_WEIGHTS: [f32; 3] = [0.299, 0.587, 0.114];

/// Bring a source buffer into canonical R, G, B order.
///
/// Fails only if the buffer does not match its declared dimensions.
#[instrument(skip_all, fields(width = source.width, height = source.height, order = ?source.order))]
pub fn normalize(source: &SourceImage) -> Result<RgbImage> {
    let buffer = into_buffer(source)?;
    Ok(match source.order {
        ChannelOrder::Rgb => buffer,
        ChannelOrder::Bgr => {
            debug!("Swapping red and blue channels");
            swap_red_blue(&buffer)
        }
    })
}

/// Convert a canonical RGB image back into the caller's channel order.
pub fn to_source_order(rgb: RgbImage, order: ChannelOrder) -> SourceImage {
    let rgb = match order {
        ChannelOrder::Rgb => rgb,
        ChannelOrder::Bgr => swap_red_blue(&rgb),
    };
    let (width, height) = rgb.dimensions();
    SourceImage::new(width, height, order, rgb.into_raw())
}

/// Exchange the first and third channel of every pixel. Self-inverse.
pub fn swap_red_blue(image: &RgbImage) -> RgbImage {
    RgbImage::from_fn(image.width(), image.height(), |x, y| {
        let Rgb([a, b, c]) = *image.get_pixel(x, y);
        Rgb([c, b, a])
    })
}

/// Reduce an RGB image to a single luma channel.
#[instrument(skip_all, fields(width = rgb.width(), height = rgb.height()))]
pub fn to_grayscale(rgb: &RgbImage) -> GrayImage {
    let [wr, wg, wb] = LUMA_WEIGHTS;
    GrayImage::from_fn(rgb.width(), rgb.height(), |x, y| {
        let Rgb([r, g, b]) = *rgb.get_pixel(x, y);
        let luma = wr * f32::from(r) + wg * f32::from(g) + wb * f32::from(b);
        Luma([luma.round().clamp(0.0, 255.0) as u8])
    })
}
