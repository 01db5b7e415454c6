// SPDX-License-Identifier: GPL-3.0-or-later
use std::convert::TryFrom;

use structopt::StructOpt;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod camera;
mod command;
mod display;
mod error;
mod frame;
mod media;
mod overlay;
mod render;
mod settings;
mod state;
mod temperature;
mod util;
mod viewer;

use crate::command::{Dispatcher, Keymap};
use crate::media::FileSinks;
use crate::render::{preferred_resizer, Canvas, FontdueRenderer, LumaColorMap};
use crate::settings::{Args, Settings};
use crate::state::PresentationState;
use crate::viewer::{FrameRenderer, Viewer};

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn run(settings: Settings) -> anyhow::Result<()> {
    let geometry = settings.camera.geometry();
    let state = PresentationState::try_from(&settings.render)?;
    let keymap = Keymap::with_overrides(&settings.keys);
    info!("{}", keymap);
    let sinks = FileSinks::new(
        &settings.recording.directory,
        settings.recording.jpeg_quality,
    );
    let dispatcher = Dispatcher::new(
        sinks,
        keymap,
        geometry,
        settings.recording.fourcc,
        settings.recording.frame_rate,
    );
    let renderer = FrameRenderer::new(
        Box::new(LumaColorMap::new()),
        preferred_resizer(settings.render.scaling_method),
        Canvas::new(Box::new(FontdueRenderer::new(&settings.render.fonts))),
    );
    let source = settings.camera.create_source()?;
    let display = settings.display.create_display()?;
    let mut viewer = Viewer::new(source, geometry, state, dispatcher, renderer, display);
    viewer.run()
}

fn main() {
    init_logging();
    let args = Args::from_args();
    let result = Settings::load(&args).and_then(run);
    if let Err(err) = result {
        error!("{:#}", err);
        std::process::exit(1);
    }
}
