// SPDX-License-Identifier: GPL-3.0-or-later
use std::fmt;

use image::{imageops, RgbImage};
use serde::Deserialize;
use tracing::debug;

/// Different resizing methods

#[derive(Copy, Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub(crate) enum Method {
    /// Nearest neighbor sampling.
    Nearest,

    /// Triangle (aka linear) sampling.
    #[serde(alias = "linear")]
    Triangle,

    /// Catmull-Rom (aka bicubic) sampling.
    #[serde(alias = "bicubic")]
    CatmullRom,

    /// Lanczos sampling with a window size of 3.
    #[serde(alias = "lanczos")]
    Lanczos3,
}

impl Default for Method {
    fn default() -> Self {
        Self::CatmullRom
    }
}

pub(crate) trait Resizer: fmt::Debug {
    /// Enlarge an image by an integer factor.
    fn enlarge(&self, colors: RgbImage, scale: u32) -> RgbImage;
}

/// A resize implementation that can only do nearest neighbor, but it's pretty fast at that.
#[derive(Clone, Copy, Debug)]
pub(crate) struct PointResize;

impl Resizer for PointResize {
    /// Each input pixel is copied into a `scale` pixel square.
    fn enlarge(&self, colors: RgbImage, scale: u32) -> RgbImage {
        if scale == 1 {
            return colors;
        }
        let mut full_image = RgbImage::new(colors.width() * scale, colors.height() * scale);
        for (x, y, pixel) in colors.enumerate_pixels() {
            let tile = image::flat::FlatSamples::with_monocolor(pixel, scale, scale);
            if let Ok(tile_view) = tile.as_view() {
                imageops::replace(&mut full_image, &tile_view, x * scale, y * scale);
            }
        }
        full_image
    }
}

/// A resizer that uses [`image::imageops`].
#[derive(Clone, Debug)]
pub(crate) struct ImageResize {
    filter_type: imageops::FilterType,
}

impl Resizer for ImageResize {
    fn enlarge(&self, colors: RgbImage, scale: u32) -> RgbImage {
        if scale == 1 {
            return colors;
        }
        let new_width = colors.width() * scale;
        let new_height = colors.height() * scale;
        imageops::resize(&colors, new_width, new_height, self.filter_type)
    }
}

pub(crate) fn preferred_resizer(method: Method) -> Box<dyn Resizer> {
    let filter_type = match method {
        Method::Nearest => {
            debug!(?method, "Using custom point scaling");
            return Box::new(PointResize);
        }
        Method::Triangle => imageops::Triangle,
        Method::CatmullRom => imageops::CatmullRom,
        Method::Lanczos3 => imageops::Lanczos3,
    };
    debug!(?method, "Using image::imageops for resizing");
    Box::new(ImageResize { filter_type })
}
