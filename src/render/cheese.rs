// SPDX-License-Identifier: GPL-3.0-or-later
//! Overlay text rasterised with [fontdue]. Glyph coverage maps are kept in a small LRU cache, and
//! strokes wider than one pixel are built by stamping each glyph at offsets into a shared mask.
use std::fmt;
use std::fs;

use anyhow::{anyhow, Context as _};
use fontdue::{Font, FontSettings};
use image::{GrayImage, RgbImage};
use lru::LruCache;
use tracing::{debug, trace, warn};

use super::font::{FontFace, FontRenderer, TextStyle};

// Digits, a sign, a decimal point and a unit letter in a few sizes and faces.
const GLYPH_CACHE_SIZE: usize = 256;

/// Face index, character, and pixel size (as bits, since f32 isn't `Hash`).
type GlyphKey = (usize, char, u32);

#[derive(Clone)]
struct Glyph {
    xmin: i32,
    ymin: i32,
    width: usize,
    height: usize,
    advance: f32,
    coverage: Vec<u8>,
}

pub(crate) struct FontdueRenderer {
    faces: Vec<(String, Option<Font>)>,
    cache: LruCache<GlyphKey, Glyph>,
}

fn load_face(face: &FontFace) -> anyhow::Result<Font> {
    let data = fs::read(&face.path)
        .with_context(|| format!("Unable to read font file {}", face.path.display()))?;
    Font::from_bytes(data, FontSettings::default())
        .map_err(|err| anyhow!("Unable to parse font {}: {}", face.path.display(), err))
}

impl FontdueRenderer {
    /// Load every face in `faces`, in order. Faces that fail to load are kept as placeholders so
    /// the indices still line up, and will not draw anything.
    pub(crate) fn new(faces: &[FontFace]) -> Self {
        let faces = faces
            .iter()
            .map(|face| match load_face(face) {
                Ok(font) => {
                    debug!(name = %face.name, path = %face.path.display(), "loaded font");
                    (face.name.clone(), Some(font))
                }
                Err(err) => {
                    warn!(name = %face.name, "{:#}", err);
                    (face.name.clone(), None)
                }
            })
            .collect();
        Self {
            faces,
            cache: LruCache::new(GLYPH_CACHE_SIZE),
        }
    }

    fn glyph(&mut self, font: usize, character: char, size: f32) -> Option<Glyph> {
        let key = (font, character, size.to_bits());
        if let Some(glyph) = self.cache.get(&key) {
            return Some(glyph.clone());
        }
        trace!(font, ?character, size, "glyph cache miss");
        let face = self.faces.get(font)?.1.as_ref()?;
        let (metrics, coverage) = face.rasterize(character, size);
        let glyph = Glyph {
            xmin: metrics.xmin,
            ymin: metrics.ymin,
            width: metrics.width,
            height: metrics.height,
            advance: metrics.advance_width,
            coverage,
        };
        self.cache.put(key, glyph.clone());
        Some(glyph)
    }

    /// Lay out `text`, returning each glyph with the position of its top left corner.
    fn layout(&mut self, text: &str, origin: (i32, i32), style: &TextStyle) -> Vec<(i32, i32, Glyph)> {
        let mut pen = origin.0 as f32;
        let mut placed = Vec::with_capacity(text.len());
        for character in text.chars() {
            let glyph = match self.glyph(style.font, character, style.size) {
                Some(glyph) => glyph,
                None => return Vec::new(),
            };
            let left = pen.round() as i32 + glyph.xmin;
            let top = origin.1 - (glyph.height as i32 + glyph.ymin);
            pen += glyph.advance;
            placed.push((left, top, glyph));
        }
        placed
    }
}

impl fmt::Debug for FontdueRenderer {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        let faces: Vec<(&str, bool)> = self
            .faces
            .iter()
            .map(|(name, font)| (name.as_str(), font.is_some()))
            .collect();
        fmt.debug_struct("FontdueRenderer")
            .field("faces", &faces)
            .field("cached_glyphs", &self.cache.len())
            .finish()
    }
}

impl FontRenderer for FontdueRenderer {
    fn draw_text(&mut self, image: &mut RgbImage, text: &str, origin: (i32, i32), style: TextStyle) {
        let placed = self.layout(text, origin, &style);
        if placed.is_empty() {
            return;
        }
        // Stamping the glyphs at every offset within the stroke width thickens them. The stamps
        // are merged into one mask first so overlapping stamps don't darken each other.
        let spread = style.thickness.max(1) as i32 - 1;
        let left = placed.iter().map(|(x, _, _)| *x).min().unwrap_or(0) - spread;
        let top = placed.iter().map(|(_, y, _)| *y).min().unwrap_or(0) - spread;
        let right = placed
            .iter()
            .map(|(x, _, glyph)| x + glyph.width as i32)
            .max()
            .unwrap_or(0)
            + spread;
        let bottom = placed
            .iter()
            .map(|(_, y, glyph)| y + glyph.height as i32)
            .max()
            .unwrap_or(0)
            + spread;
        if right <= left || bottom <= top {
            return;
        }
        let mut mask = GrayImage::new((right - left) as u32, (bottom - top) as u32);
        for (glyph_x, glyph_y, glyph) in placed.iter() {
            for dy in -spread..=spread {
                for dx in -spread..=spread {
                    for (index, coverage) in glyph.coverage.iter().enumerate() {
                        if *coverage == 0 {
                            continue;
                        }
                        let x = (glyph_x + dx - left) as u32 + (index % glyph.width) as u32;
                        let y = (glyph_y + dy - top) as u32 + (index / glyph.width) as u32;
                        let pixel = mask.get_pixel_mut(x, y);
                        pixel.0[0] = pixel.0[0].max(*coverage);
                    }
                }
            }
        }
        let (width, height) = image.dimensions();
        for (x, y, coverage) in mask.enumerate_pixels() {
            let image_x = left + x as i32;
            let image_y = top + y as i32;
            if coverage.0[0] == 0
                || image_x < 0
                || image_y < 0
                || image_x >= width as i32
                || image_y >= height as i32
            {
                continue;
            }
            let pixel = image.get_pixel_mut(image_x as u32, image_y as u32);
            pixel.0 = style.color.blend_over(pixel.0, coverage.0[0]);
        }
    }
}

#[cfg(test)]
mod test {
    use image::{Rgb, RgbImage};

    use super::FontdueRenderer;
    use crate::render::color::Color;
    use crate::render::font::{default_faces, FontFace, FontRenderer, TextStyle};

    fn style(font: usize, thickness: u32) -> TextStyle {
        TextStyle {
            font,
            size: 16.0,
            color: Color::WHITE,
            thickness,
        }
    }

    fn lit_pixels(image: &RgbImage) -> usize {
        image.pixels().filter(|Rgb(p)| p[0] > 0).count()
    }

    /// The first default face that is actually installed, if any.
    fn installed_renderer() -> Option<FontdueRenderer> {
        let faces: Vec<FontFace> = default_faces()
            .into_iter()
            .filter(|face| face.path.exists())
            .collect();
        if faces.is_empty() {
            None
        } else {
            Some(FontdueRenderer::new(&faces))
        }
    }

    #[test]
    fn missing_face_draws_nothing() {
        let mut renderer = FontdueRenderer::new(&[FontFace::new("gone", "/nonexistent/font.ttf")]);
        let mut image = RgbImage::new(64, 32);
        renderer.draw_text(&mut image, "12.50 C", (2, 20), style(0, 1));
        renderer.draw_text(&mut image, "12.50 C", (2, 20), style(7, 1));
        assert_eq!(lit_pixels(&image), 0);
    }

    #[test]
    fn thicker_stroke_covers_more() {
        let mut renderer = match installed_renderer() {
            Some(renderer) => renderer,
            None => return,
        };
        let mut thin = RgbImage::new(96, 32);
        let mut thick = RgbImage::new(96, 32);
        renderer.draw_text(&mut thin, "37.25 C", (4, 22), style(0, 1));
        renderer.draw_text(&mut thick, "37.25 C", (4, 22), style(0, 2));
        assert!(lit_pixels(&thin) > 0);
        assert!(lit_pixels(&thick) > lit_pixels(&thin));
    }

    #[test]
    fn installed_faces_load() {
        let faces: Vec<FontFace> = default_faces()
            .into_iter()
            .filter(|face| face.path.exists())
            .collect();
        let mut renderer = FontdueRenderer::new(&faces);
        assert!(renderer.faces.iter().all(|(_, font)| font.is_some()));
        for index in 0..faces.len() {
            let glyph = renderer.glyph(index, '8', 16.0).unwrap();
            assert!(glyph.width > 0 && glyph.height > 0);
            assert!(glyph.coverage.iter().any(|c| *c > 0));
        }
    }

    #[test]
    fn clipped_at_edges() {
        let mut renderer = match installed_renderer() {
            Some(renderer) => renderer,
            None => return,
        };
        let mut image = RgbImage::new(16, 16);
        // Mostly off the canvas in every direction; must not panic.
        renderer.draw_text(&mut image, "REC:00:00:01", (-40, 4), style(0, 2));
        renderer.draw_text(&mut image, "REC:00:00:01", (10, 40), style(0, 2));
    }
}
