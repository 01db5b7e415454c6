// SPDX-License-Identifier: GPL-3.0-or-later
//! Planning of everything drawn over the colorized frame.
//!
//! [`plan`] only decides *what* to draw; [`crate::render::Canvas`] does the drawing.
use std::time::Duration;

use crate::frame::{Extremum, ExtremumResult, FrameGeometry, Point};
use crate::render::{font, Color};
use crate::state::PresentationState;
use crate::temperature::{decode, RawCount, TemperatureUnit};

/// A location on the display image. May lie outside of it; drawing clips.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Position {
    pub(crate) x: i32,
    pub(crate) y: i32,
}

impl Position {
    pub(crate) fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Map a point on a plane to the display image enlarged by `scale`.
    fn scaled(point: Point, scale: u32) -> Self {
        Self::new((point.x as u32 * scale) as i32, (point.y as u32 * scale) as i32)
    }

    fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Shape {
    Line {
        from: Position,
        to: Position,
    },
    Circle {
        center: Position,
        radius: i32,
    },
    Text {
        text: String,
        /// Left end of the baseline.
        origin: Position,
        font: usize,
        size: f32,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct DrawDirective {
    pub(crate) shape: Shape,
    pub(crate) color: Color,
    pub(crate) thickness: u32,
}

/// Stroke width of the black outline drawn under every label.
pub(crate) const SHADOW_THICKNESS: u32 = 2;

/// Stroke width of the colored text drawn over the outline.
pub(crate) const LABEL_THICKNESS: u32 = 1;

/// A raw sample and where it was read from.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Reading {
    pub(crate) point: Point,
    pub(crate) count: RawCount,
}

/// The per-frame values the overlay is built from.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct FrameReadings {
    /// The sample under the crosshair.
    pub(crate) center: Option<Reading>,
    /// Present only when the high/low scan ran for this frame.
    pub(crate) extremes: Option<ExtremumResult>,
    /// Time since the current recording started.
    pub(crate) recording: Option<Duration>,
}

/// Format an elapsed time as `HH:MM:SS`. Hours keep counting past 99.
pub(crate) fn format_elapsed(elapsed: Duration) -> String {
    let seconds = elapsed.as_secs();
    format!(
        "{:02}:{:02}:{:02}",
        seconds / 3600,
        (seconds / 60) % 60,
        seconds % 60
    )
}

fn temperature_label(count: RawCount, unit: TemperatureUnit) -> String {
    format!("{:.2} {}", decode(count, unit), unit)
}

struct Planner<'a> {
    state: &'a PresentationState,
    directives: Vec<DrawDirective>,
    font: usize,
    size: f32,
}

impl<'a> Planner<'a> {
    fn line_height(&self) -> i32 {
        (self.size * 1.25).ceil() as i32
    }

    fn push(&mut self, shape: Shape, color: Color, thickness: u32) {
        self.directives.push(DrawDirective {
            shape,
            color,
            thickness,
        });
    }

    /// Every label is drawn twice at the same origin: a black outline, then the highlight color.
    fn push_label(&mut self, text: String, origin: Position) {
        let highlight = *self.state.highlight();
        let shadow = Shape::Text {
            text,
            origin,
            font: self.font,
            size: self.size,
        };
        let label = shadow.clone();
        self.push(shadow, Color::BLACK, SHADOW_THICKNESS);
        self.push(label, highlight, LABEL_THICKNESS);
    }

    fn crosshair(&mut self, center: Position, reading: Option<Reading>) {
        let arm = (self.state.crosshair_size() * self.state.scale()) as i32;
        let highlight = *self.state.highlight();
        self.push(
            Shape::Line {
                from: center.offset(-arm, 0),
                to: center.offset(arm, 0),
            },
            highlight,
            LABEL_THICKNESS,
        );
        self.push(
            Shape::Line {
                from: center.offset(0, -arm),
                to: center.offset(0, arm),
            },
            highlight,
            LABEL_THICKNESS,
        );
        if let Some(reading) = reading {
            let gap = arm / 2 + 2;
            self.push_label(
                temperature_label(reading.count, self.state.unit()),
                center.offset(gap, -gap),
            );
        }
    }

    fn marker(&mut self, extremum: Option<Extremum>, color: Color) {
        let extremum = match extremum {
            Some(extremum) => extremum,
            None => return,
        };
        let scale = self.state.scale();
        let center = Position::scaled(extremum.point, scale);
        let radius = (self.state.crosshair_size() * scale / 2).max(2) as i32;
        self.push(Shape::Circle { center, radius }, color, SHADOW_THICKNESS);
        self.push_label(
            temperature_label(extremum.count, self.state.unit()),
            center.offset(radius + 2, -radius),
        );
    }

    fn info_panel(&mut self, extremes: Option<&ExtremumResult>) {
        let state = self.state;
        let unit = state.unit();
        let mut lines = vec![
            format!("map: {}", state.colormap()),
            format!("unit: {}", unit),
            format!("scale: {}x", state.scale()),
            format!("padding: {}", state.padding()),
            format!("font: {} {:.1}", state.font(), state.font_scale()),
        ];
        if let Some(extremes) = extremes {
            if let Some(highest) = extremes.highest {
                lines.push(format!("high: {}", temperature_label(highest.count, unit)));
            }
            if let Some(lowest) = extremes.lowest {
                lines.push(format!("low: {}", temperature_label(lowest.count, unit)));
            }
        }
        let line_height = self.line_height();
        for (row, line) in lines.into_iter().enumerate() {
            let origin = Position::new(4, line_height * (row as i32 + 1));
            self.push_label(line, origin);
        }
    }

    fn recording_indicator(&mut self, elapsed: Duration, display_width: u32) {
        let text = format!("REC:{}", format_elapsed(elapsed));
        // Glyph widths are unknown here; assume an average advance of 0.6 em.
        let estimated_width = (text.chars().count() as f32 * self.size * 0.6).ceil() as i32;
        let origin = Position::new(
            (display_width as i32 - estimated_width - 4).max(0),
            self.line_height(),
        );
        self.push_label(text, origin);
    }
}

/// Decide what to draw over the display image for one frame.
///
/// The directives are in drawing order: crosshair, high/low markers, info panel, then the
/// recording indicator.
pub(crate) fn plan(
    state: &PresentationState,
    geometry: FrameGeometry,
    readings: &FrameReadings,
) -> Vec<DrawDirective> {
    let mut planner = Planner {
        state,
        directives: Vec::new(),
        font: state.font_index(),
        size: font::pixel_size(state.font_scale(), state.scale()),
    };
    if state.crosshair() {
        let center = Position::scaled(geometry.center(), state.scale());
        planner.crosshair(center, readings.center);
    }
    if state.high_low() {
        if let Some(extremes) = readings.extremes {
            planner.marker(extremes.highest, Color::HOT);
            planner.marker(extremes.lowest, Color::COLD);
        }
    }
    if state.info() {
        planner.info_panel(readings.extremes.as_ref());
    }
    if let Some(elapsed) = readings.recording {
        let (display_width, _) = geometry.scaled(state.scale());
        planner.recording_indicator(elapsed, display_width);
    }
    planner.directives
}
