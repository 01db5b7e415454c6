// SPDX-License-Identifier: GPL-3.0-or-later
//! The frame pump: capture, decode, render, record, display, then handle a key.
use std::time::Instant;

use anyhow::{bail, Context as _};
use image::RgbImage;
use tracing::{debug, error, trace, warn};

use crate::camera::FrameSource;
use crate::command::{stop_recording, Control, Dispatcher};
use crate::display::Display;
use crate::frame::{scan, FrameGeometry, Planes, SearchRegion};
use crate::media::MediaSinks;
use crate::overlay::{self, FrameReadings, Reading};
use crate::render::{Canvas, ColorMapper, Resizer};
use crate::state::PresentationState;

/// Turns the planes of a frame into the finished, annotated display image.
#[derive(Debug)]
pub(crate) struct FrameRenderer {
    color_map: Box<dyn ColorMapper>,
    resizer: Box<dyn Resizer>,
    canvas: Canvas,
}

impl FrameRenderer {
    pub(crate) fn new(
        color_map: Box<dyn ColorMapper>,
        resizer: Box<dyn Resizer>,
        canvas: Canvas,
    ) -> Self {
        Self {
            color_map,
            resizer,
            canvas,
        }
    }

    fn render(
        &mut self,
        planes: &Planes<'_>,
        state: &PresentationState,
        geometry: FrameGeometry,
    ) -> RgbImage {
        let colors = self.color_map.render(&planes.visible, state.colormap());
        let mut image = self.resizer.enlarge(colors, state.scale());
        let readings = measure(planes, state, geometry);
        let directives = overlay::plan(state, geometry, &readings);
        self.canvas.draw(&mut image, &directives);
        image
    }
}

/// Read the temperatures the overlay needs from the radiometric plane.
fn measure(
    planes: &Planes<'_>,
    state: &PresentationState,
    geometry: FrameGeometry,
) -> FrameReadings {
    let center = geometry.center();
    let extremes = if state.high_low() {
        let region = SearchRegion::padded(planes.radiometric.dim(), state.padding());
        Some(scan(&planes.radiometric, region))
    } else {
        None
    };
    FrameReadings {
        center: planes
            .radiometric
            .count(center)
            .map(|count| Reading {
                point: center,
                count,
            }),
        extremes,
        recording: state.recording_elapsed(),
    }
}

#[derive(Debug)]
pub(crate) struct Viewer<S: MediaSinks> {
    source: Box<dyn FrameSource>,
    geometry: FrameGeometry,
    state: PresentationState,
    dispatcher: Dispatcher<S>,
    renderer: FrameRenderer,
    display: Box<dyn Display>,
    last_frame: Option<RgbImage>,
}

impl<S: MediaSinks> Viewer<S> {
    pub(crate) fn new(
        source: Box<dyn FrameSource>,
        geometry: FrameGeometry,
        state: PresentationState,
        dispatcher: Dispatcher<S>,
        renderer: FrameRenderer,
        display: Box<dyn Display>,
    ) -> Self {
        Self {
            source,
            geometry,
            state,
            dispatcher,
            renderer,
            display,
            last_frame: None,
        }
    }

    /// Pump frames until asked to quit, or the display is closed.
    ///
    /// A closed or failed capture source is an error. Any recording is closed before returning
    /// either way.
    pub(crate) fn run(&mut self) -> anyhow::Result<()> {
        loop {
            match self.tick() {
                Ok(Control::Continue) => (),
                Ok(Control::Quit) => {
                    debug!("quitting");
                    return Ok(());
                }
                Err(err) => {
                    stop_recording(&mut self.state);
                    return Err(err);
                }
            }
        }
    }

    fn tick(&mut self) -> anyhow::Result<Control> {
        let start = Instant::now();
        let raw = match self.source.read_frame().context("Unable to read frame")? {
            Some(raw) => raw,
            None => bail!("Capture source closed"),
        };
        let captured = start.elapsed();
        let planes = match raw.split(self.geometry) {
            Ok(planes) => planes,
            Err(err) => {
                warn!(%err, "Skipping frame");
                return Ok(Control::Continue);
            }
        };
        let image = self.renderer.render(&planes, &self.state, self.geometry);
        let rendered = start.elapsed();
        self.record(&image);
        let key = self.display.show(&image)?;
        self.last_frame = Some(image);
        if !self.display.is_open() {
            debug!("display closed");
            stop_recording(&mut self.state);
            return Ok(Control::Quit);
        }
        let control = match key {
            Some(key) => self
                .dispatcher
                .dispatch(key, &mut self.state, self.last_frame.as_ref()),
            None => Control::Continue,
        };
        trace!(?captured, ?rendered, total = ?start.elapsed(), "frame timings");
        Ok(control)
    }

    fn record(&mut self, image: &RgbImage) {
        let failure = match self.state.recording_mut() {
            Some(session) => session.write_frame(image).err(),
            None => None,
        };
        if let Some(err) = failure {
            error!("Unable to write video frame: {:#}", err);
            stop_recording(&mut self.state);
        }
    }
}
