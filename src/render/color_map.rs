// SPDX-License-Identifier: GPL-3.0-or-later
use std::fmt;

use image::RgbImage;
use tracing::{debug, trace, warn};

use crate::frame::VisiblePlane;

use super::gradient::NamedGradient;

/// Turn the visible plane into a color image.
pub(crate) trait ColorMapper: fmt::Debug {
    fn render(&mut self, visible: &VisiblePlane<'_>, colormap: &NamedGradient) -> RgbImage;
}

/// A color mapper that maps the luma of each pixel through a [`colorous`] gradient.
///
/// The gradient is sampled once into a lookup table, and resampled only when the colormap
/// changes.
pub(crate) struct LumaColorMap {
    table: Option<(NamedGradient, [[u8; 3]; 256])>,
}

impl LumaColorMap {
    pub(crate) fn new() -> Self {
        Self { table: None }
    }

    fn lookup_table(&mut self, colormap: &NamedGradient) -> &[[u8; 3]; 256] {
        if matches!(&self.table, Some((cached, _)) if cached != colormap) {
            self.table = None;
        }
        let (_, table) = self.table.get_or_insert_with(|| {
            debug!(%colormap, "sampling colormap");
            (*colormap, sample(colormap))
        });
        table
    }
}

fn sample(colormap: &NamedGradient) -> [[u8; 3]; 256] {
    let gradient = colormap.gradient();
    let mut table = [[0u8; 3]; 256];
    for (luma, entry) in table.iter_mut().enumerate() {
        let color = gradient.eval_rational(luma, 256);
        *entry = [color.r, color.g, color.b];
    }
    table
}

impl Default for LumaColorMap {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for LumaColorMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LumaColorMap")
            .field("colormap", &self.table.as_ref().map(|(name, _)| name))
            .finish()
    }
}

impl ColorMapper for LumaColorMap {
    fn render(&mut self, visible: &VisiblePlane<'_>, colormap: &NamedGradient) -> RgbImage {
        let (rows, columns) = visible.dim();
        let table = *self.lookup_table(colormap);
        let mut colors = RgbImage::new(columns as u32, rows as u32);
        let mut mapped = 0usize;
        for (luma, dest) in visible.lumas().zip(colors.pixels_mut()) {
            dest.0 = table[luma as usize];
            mapped += 1;
        }
        if mapped != rows * columns {
            warn!(mapped, expected = rows * columns, "visible plane was short");
        }
        trace!(width = columns, height = rows, "mapped lumas to colors");
        colors
    }
}

#[cfg(test)]
mod test {
    use std::convert::TryFrom;

    use image::Rgb;
    use ndarray::Array2;

    use super::{sample, ColorMapper, LumaColorMap};
    use crate::frame::VisiblePlane;
    use crate::render::gradient::NamedGradient;

    #[test]
    fn greys_follow_luma() {
        // Chroma in the high byte must be ignored.
        let samples = Array2::from_shape_vec((1, 3), vec![0xAB00, 0x1280, 0x00FF]).unwrap();
        let greys = NamedGradient::try_from("greys").unwrap();
        let mut mapper = LumaColorMap::new();
        let image = mapper.render(&VisiblePlane::new(samples.view()), &greys);
        assert_eq!(image.dimensions(), (3, 1));
        let brightness: Vec<u8> = image.pixels().map(|Rgb(p)| p[0]).collect();
        // colorous' greys runs from light to dark
        assert!(brightness[0] > brightness[1]);
        assert!(brightness[1] > brightness[2]);
    }

    #[test]
    fn table_follows_colormap() {
        let samples = Array2::from_elem((2, 2), 0x0080u16);
        let plane = VisiblePlane::new(samples.view());
        let mut mapper = LumaColorMap::new();
        let turbo = NamedGradient::try_from("turbo").unwrap();
        let greys = NamedGradient::try_from("greys").unwrap();
        let first = mapper.render(&plane, &turbo);
        let second = mapper.render(&plane, &greys);
        let third = mapper.render(&plane, &turbo);
        assert_ne!(first, second);
        assert_eq!(first, third);
        let expected = turbo.gradient().eval_rational(0x80, 256);
        assert_eq!(first.get_pixel(1, 1).0, [expected.r, expected.g, expected.b]);
    }

    #[test]
    fn table_cached_per_colormap() {
        let mut mapper = LumaColorMap::new();
        let turbo = NamedGradient::try_from("turbo").unwrap();
        let greys = NamedGradient::try_from("greys").unwrap();
        assert_eq!(mapper.lookup_table(&turbo)[0], sample(&turbo)[0]);
        assert_eq!(mapper.table.as_ref().map(|(name, _)| *name), Some(turbo));
        assert_eq!(mapper.lookup_table(&greys)[255], sample(&greys)[255]);
        assert_eq!(mapper.table.as_ref().map(|(name, _)| *name), Some(greys));
    }
}
