// SPDX-License-Identifier: GPL-3.0-or-later
use std::fmt;

use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_circle_mut, draw_line_segment_mut};
use tracing::trace;

use super::font::{FontRenderer, TextStyle};
use crate::overlay::{DrawDirective, Position, Shape};

/// Carries out [`DrawDirective`]s on a display image.
pub(crate) struct Canvas {
    fonts: Box<dyn FontRenderer>,
}

/// The offsets covered by a stroke `thickness` pixels wide, centered on zero.
fn stroke_offsets(thickness: u32) -> std::ops::RangeInclusive<i32> {
    let thickness = thickness.max(1) as i32;
    let before = (thickness - 1) / 2;
    -before..=(thickness - 1 - before)
}

fn as_point(position: Position) -> (f32, f32) {
    (position.x as f32, position.y as f32)
}

impl Canvas {
    pub(crate) fn new(fonts: Box<dyn FontRenderer>) -> Self {
        Self { fonts }
    }

    /// Draw `directives` in order, so later ones cover earlier ones.
    pub(crate) fn draw(&mut self, image: &mut RgbImage, directives: &[DrawDirective]) {
        for directive in directives {
            let color = Rgb::from(directive.color);
            match &directive.shape {
                Shape::Line { from, to } => {
                    let (start, end) = (as_point(*from), as_point(*to));
                    for dy in stroke_offsets(directive.thickness) {
                        for dx in stroke_offsets(directive.thickness) {
                            let (dx, dy) = (dx as f32, dy as f32);
                            draw_line_segment_mut(
                                image,
                                (start.0 + dx, start.1 + dy),
                                (end.0 + dx, end.1 + dy),
                                color,
                            );
                        }
                    }
                }
                Shape::Circle { center, radius } => {
                    for offset in stroke_offsets(directive.thickness) {
                        let radius = radius + offset;
                        if radius > 0 {
                            draw_hollow_circle_mut(image, (center.x, center.y), radius, color);
                        }
                    }
                }
                Shape::Text {
                    text,
                    origin,
                    font,
                    size,
                } => {
                    let style = TextStyle {
                        font: *font,
                        size: *size,
                        color: directive.color,
                        thickness: directive.thickness,
                    };
                    self.fonts
                        .draw_text(image, text, (origin.x, origin.y), style);
                }
            }
        }
        trace!(count = directives.len(), "drew overlay");
    }
}

impl fmt::Debug for Canvas {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Canvas").field("fonts", &self.fonts).finish()
    }
}
