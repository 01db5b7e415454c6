// SPDX-License-Identifier: GPL-3.0-or-later
//! Everything the viewer lets a user change while it runs.
use std::convert::TryFrom;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::bail;
use image::RgbImage;
use tracing::warn;

use crate::media::VideoSink;
use crate::render::{Color, FontFace, NamedGradient};
use crate::settings::RenderSettings;
use crate::temperature::TemperatureUnit;
use crate::util::Cycle;

pub(crate) const MIN_SCALE: u32 = 1;
/// Larger scales make images too big to encode at any useful frame rate.
pub(crate) const MAX_SCALE: u32 = 16;
pub(crate) const MIN_PADDING: usize = 2;
pub(crate) const MAX_PADDING: usize = 80;
/// Font scale is kept in tenths so repeated steps don't accumulate rounding error.
const MIN_FONT_SCALE_TENTHS: u32 = 7;

/// An open video file, and when it was started.
pub(crate) struct RecordingSession {
    path: PathBuf,
    started: Instant,
    sink: Box<dyn VideoSink>,
}

impl RecordingSession {
    pub(crate) fn new(path: PathBuf, sink: Box<dyn VideoSink>) -> Self {
        Self {
            path,
            started: Instant::now(),
            sink,
        }
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub(crate) fn write_frame(&mut self, frame: &RgbImage) -> anyhow::Result<()> {
        self.sink.write_frame(frame)
    }

    /// Finish the video file. The session is gone afterwards whether or not this succeeds.
    pub(crate) fn close(self) -> anyhow::Result<()> {
        self.sink.close()
    }
}

impl fmt::Debug for RecordingSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordingSession")
            .field("path", &self.path)
            .field("elapsed", &self.elapsed())
            .field("sink", &self.sink)
            .finish()
    }
}

#[derive(Debug)]
pub(crate) enum Recording {
    Idle,
    Active(RecordingSession),
}

impl Default for Recording {
    fn default() -> Self {
        Self::Idle
    }
}

/// The view and recording state of the viewer.
///
/// The only thing that changes this (outside of setup) is [`crate::command::Dispatcher`].
#[derive(Debug)]
pub(crate) struct PresentationState {
    colormaps: Cycle<NamedGradient>,
    unit: TemperatureUnit,
    crosshair: bool,
    high_low: bool,
    info: bool,
    crosshair_size: u32,
    scale: u32,
    padding: usize,
    fonts: Cycle<FontFace>,
    font_scale_tenths: u32,
    highlights: Cycle<Color>,
    recording: Recording,
}

impl TryFrom<&RenderSettings> for PresentationState {
    type Error = anyhow::Error;

    fn try_from(settings: &RenderSettings) -> anyhow::Result<Self> {
        let colormaps = match Cycle::new(settings.colormaps.clone()) {
            Some(colormaps) => colormaps,
            None => bail!("At least one colormap must be configured"),
        };
        let fonts = match Cycle::new(settings.fonts.clone()) {
            Some(fonts) => fonts,
            None => bail!("At least one font must be configured"),
        };
        let highlights = match Cycle::new(settings.highlight_colors.clone()) {
            Some(highlights) => highlights,
            None => bail!("At least one highlight color must be configured"),
        };
        let scale = settings.scale.max(MIN_SCALE).min(MAX_SCALE);
        if scale != settings.scale {
            warn!(requested = settings.scale, scale, "display scale out of range, clamping");
        }
        let padding = settings.padding.max(MIN_PADDING).min(MAX_PADDING);
        if padding != settings.padding {
            warn!(requested = settings.padding, padding, "padding out of range, clamping");
        }
        let font_scale_tenths = if settings.font_scale.is_finite() {
            (settings.font_scale * 10.0).round().max(0.0) as u32
        } else {
            0
        };
        let font_scale_tenths = font_scale_tenths.max(MIN_FONT_SCALE_TENTHS);
        if (f64::from(font_scale_tenths) / 10.0 - settings.font_scale).abs() > 0.05 {
            warn!(
                requested = settings.font_scale,
                font_scale = f64::from(font_scale_tenths) / 10.0,
                "font scale out of range, clamping"
            );
        }
        Ok(Self {
            colormaps,
            unit: settings.units,
            crosshair: settings.crosshair,
            high_low: settings.high_low,
            info: settings.info,
            crosshair_size: settings.crosshair_size,
            scale,
            padding,
            fonts,
            font_scale_tenths,
            highlights,
            recording: Recording::Idle,
        })
    }
}

impl PresentationState {
    pub(crate) fn colormap(&self) -> &NamedGradient {
        self.colormaps.current()
    }

    pub(crate) fn colormap_index(&self) -> usize {
        self.colormaps.index()
    }

    pub(crate) fn colormap_count(&self) -> usize {
        self.colormaps.len()
    }

    pub(crate) fn cycle_colormap(&mut self) -> &NamedGradient {
        self.colormaps.advance()
    }

    pub(crate) fn unit(&self) -> TemperatureUnit {
        self.unit
    }

    pub(crate) fn toggle_unit(&mut self) -> TemperatureUnit {
        self.unit = self.unit.toggled();
        self.unit
    }

    pub(crate) fn crosshair(&self) -> bool {
        self.crosshair
    }

    pub(crate) fn toggle_crosshair(&mut self) -> bool {
        self.crosshair = !self.crosshair;
        self.crosshair
    }

    pub(crate) fn high_low(&self) -> bool {
        self.high_low
    }

    pub(crate) fn toggle_high_low(&mut self) -> bool {
        self.high_low = !self.high_low;
        self.high_low
    }

    pub(crate) fn info(&self) -> bool {
        self.info
    }

    pub(crate) fn toggle_info(&mut self) -> bool {
        self.info = !self.info;
        self.info
    }

    pub(crate) fn crosshair_size(&self) -> u32 {
        self.crosshair_size
    }

    pub(crate) fn scale(&self) -> u32 {
        self.scale
    }

    /// Returns `false` if the scale was left alone, either because it is already at the largest
    /// scale or because a recording is running.
    pub(crate) fn scale_up(&mut self) -> bool {
        if self.is_recording() || self.scale >= MAX_SCALE {
            return false;
        }
        self.scale += 1;
        true
    }

    /// Returns `false` if the scale was left alone, either because it is already at the smallest
    /// scale or because a recording is running.
    pub(crate) fn scale_down(&mut self) -> bool {
        if self.is_recording() || self.scale <= MIN_SCALE {
            return false;
        }
        self.scale -= 1;
        true
    }

    pub(crate) fn padding(&self) -> usize {
        self.padding
    }

    pub(crate) fn padding_up(&mut self) -> usize {
        self.padding = (self.padding + 1).min(MAX_PADDING);
        self.padding
    }

    pub(crate) fn padding_down(&mut self) -> usize {
        self.padding = self.padding.saturating_sub(1).max(MIN_PADDING);
        self.padding
    }

    pub(crate) fn font(&self) -> &FontFace {
        self.fonts.current()
    }

    /// Position of the active font in the configured list of fonts.
    pub(crate) fn font_index(&self) -> usize {
        self.fonts.index()
    }

    pub(crate) fn cycle_font(&mut self) -> &FontFace {
        self.fonts.advance()
    }

    pub(crate) fn font_scale(&self) -> f64 {
        f64::from(self.font_scale_tenths) / 10.0
    }

    pub(crate) fn font_scale_up(&mut self) -> f64 {
        self.font_scale_tenths = self.font_scale_tenths.saturating_add(1);
        self.font_scale()
    }

    pub(crate) fn font_scale_down(&mut self) -> f64 {
        self.font_scale_tenths = self
            .font_scale_tenths
            .saturating_sub(1)
            .max(MIN_FONT_SCALE_TENTHS);
        self.font_scale()
    }

    pub(crate) fn highlight(&self) -> &Color {
        self.highlights.current()
    }

    pub(crate) fn cycle_highlight(&mut self) -> &Color {
        self.highlights.advance()
    }

    pub(crate) fn is_recording(&self) -> bool {
        matches!(self.recording, Recording::Active(_))
    }

    /// Start tracking `session`. If a session is already running, `session` is handed back.
    pub(crate) fn begin_recording(
        &mut self,
        session: RecordingSession,
    ) -> Result<(), RecordingSession> {
        match self.recording {
            Recording::Active(_) => Err(session),
            Recording::Idle => {
                self.recording = Recording::Active(session);
                Ok(())
            }
        }
    }

    /// Stop tracking the current session (if any), leaving the state idle.
    pub(crate) fn take_recording(&mut self) -> Option<RecordingSession> {
        match std::mem::take(&mut self.recording) {
            Recording::Active(session) => Some(session),
            Recording::Idle => None,
        }
    }

    pub(crate) fn recording_mut(&mut self) -> Option<&mut RecordingSession> {
        match &mut self.recording {
            Recording::Active(session) => Some(session),
            Recording::Idle => None,
        }
    }

    pub(crate) fn recording_elapsed(&self) -> Option<Duration> {
        match &self.recording {
            Recording::Active(session) => Some(session.elapsed()),
            Recording::Idle => None,
        }
    }
}
