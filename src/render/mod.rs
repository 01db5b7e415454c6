// SPDX-License-Identifier: GPL-3.0-or-later
//! Turning planes into display images: colorizing, enlarging, and drawing overlays.
mod canvas;
mod cheese;
mod color;
mod color_map;
pub(crate) mod font;
pub(crate) mod gradient;
mod resize;

pub(crate) use canvas::Canvas;
pub(crate) use cheese::FontdueRenderer;
pub(crate) use color::Color;
pub(crate) use color_map::{ColorMapper, LumaColorMap};
pub(crate) use font::FontFace;
pub(crate) use gradient::NamedGradient;
pub(crate) use resize::{preferred_resizer, Method, Resizer};
