// SPDX-License-Identifier: GPL-3.0-or-later
use std::fmt;
use std::path::PathBuf;

use image::RgbImage;
use serde::Deserialize;

use super::color::Color;

/// Text height in pixels at a font scale of 1.0 and a display scale of 1.
pub(crate) const BASE_FONT_SIZE: f32 = 8.0;

/// A TrueType face the overlay text can be drawn with.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub(crate) struct FontFace {
    pub(crate) name: String,
    pub(crate) path: PathBuf,
}

impl FontFace {
    pub(crate) fn new<N: Into<String>, P: Into<PathBuf>>(name: N, path: P) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }
}

impl fmt::Display for FontFace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// The DejaVu faces shipped by most Linux distributions.
pub(crate) fn default_faces() -> Vec<FontFace> {
    const DEJA_VU: &str = "/usr/share/fonts/truetype/dejavu";
    vec![
        FontFace::new("sans", format!("{}/DejaVuSans.ttf", DEJA_VU)),
        FontFace::new("mono", format!("{}/DejaVuSansMono.ttf", DEJA_VU)),
        FontFace::new("serif", format!("{}/DejaVuSerif.ttf", DEJA_VU)),
    ]
}

/// Pixel height for overlay text.
pub(crate) fn pixel_size(font_scale: f64, scale: u32) -> f32 {
    BASE_FONT_SIZE * font_scale as f32 * scale as f32
}

/// How a run of text is drawn.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct TextStyle {
    /// Index into the list of faces the renderer was created with.
    pub(crate) font: usize,
    pub(crate) size: f32,
    pub(crate) color: Color,
    pub(crate) thickness: u32,
}

pub(crate) trait FontRenderer: fmt::Debug {
    /// Draw `text` onto `image` with its baseline starting at `origin`.
    ///
    /// Text falling outside of the image is clipped. Faces that could not be loaded draw nothing.
    fn draw_text(&mut self, image: &mut RgbImage, text: &str, origin: (i32, i32), style: TextStyle);
}

#[cfg(test)]
mod test {
    use float_cmp::approx_eq;

    use super::{default_faces, pixel_size, FontFace, BASE_FONT_SIZE};

    #[test]
    fn size_follows_both_scales() {
        assert!(approx_eq!(f32, pixel_size(1.0, 1), BASE_FONT_SIZE));
        assert!(approx_eq!(f32, pixel_size(1.5, 2), BASE_FONT_SIZE * 3.0, ulps = 2));
    }

    #[test]
    fn parse_face() {
        let face: FontFace =
            toml::from_str("name = \"mono\"\npath = \"/tmp/mono.ttf\"").expect("valid face");
        assert_eq!(face, FontFace::new("mono", "/tmp/mono.ttf"));
        assert_eq!(face.to_string(), "mono");
    }

    #[test]
    fn defaults_are_named() {
        let faces = default_faces();
        assert_eq!(faces.len(), 3);
        assert!(faces.iter().all(|face| !face.name.is_empty()));
    }
}
