// SPDX-License-Identifier: GPL-3.0-or-later
//! Keyboard commands, and applying them to the presentation state.
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use chrono::Local;
use image::RgbImage;
use serde::Deserialize;
use tracing::{debug, error, info, warn};

use crate::frame::FrameGeometry;
use crate::media::{timestamped_name, FourCc, MediaSinks, VideoFormat};
use crate::state::{PresentationState, RecordingSession};

#[derive(Clone, Copy, Debug, Deserialize, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "kebab-case")]
pub(crate) enum Command {
    Quit,
    CycleColormap,
    ToggleHighLow,
    ScaleUp,
    ScaleDown,
    SaveSnapshot,
    StartRecording,
    StopRecording,
    ToggleUnit,
    ToggleCrosshair,
    ToggleInfo,
    CycleHighlight,
    PaddingUp,
    PaddingDown,
    FontScaleUp,
    FontScaleDown,
    CycleFont,
}

impl Command {
    fn description(&self) -> &'static str {
        match self {
            Self::Quit => "quit",
            Self::CycleColormap => "cycle through colormaps",
            Self::ToggleHighLow => "toggle high/low markers",
            Self::ScaleUp => "scale image up",
            Self::ScaleDown => "scale image down",
            Self::SaveSnapshot => "save frame to file",
            Self::StartRecording => "start recording",
            Self::StopRecording => "stop recording",
            Self::ToggleUnit => "toggle Celsius/Fahrenheit",
            Self::ToggleCrosshair => "toggle crosshair",
            Self::ToggleInfo => "toggle info panel",
            Self::CycleHighlight => "cycle label color",
            Self::PaddingUp => "grow search padding",
            Self::PaddingDown => "shrink search padding",
            Self::FontScaleUp => "larger text",
            Self::FontScaleDown => "smaller text",
            Self::CycleFont => "cycle through fonts",
        }
    }
}

/// Which key triggers which command.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Keymap(HashMap<char, Command>);

impl Default for Keymap {
    fn default() -> Self {
        let bindings = [
            ('q', Command::Quit),
            ('m', Command::CycleColormap),
            ('h', Command::ToggleInfo),
            ('=', Command::ScaleUp),
            ('+', Command::ScaleUp),
            ('-', Command::ScaleDown),
            ('p', Command::SaveSnapshot),
            ('r', Command::StartRecording),
            ('t', Command::StopRecording),
            ('c', Command::ToggleUnit),
            ('x', Command::ToggleHighLow),
            ('k', Command::ToggleCrosshair),
            ('o', Command::CycleHighlight),
            (']', Command::PaddingUp),
            ('[', Command::PaddingDown),
            ('.', Command::FontScaleUp),
            (',', Command::FontScaleDown),
            ('f', Command::CycleFont),
        ];
        Self(bindings.iter().copied().collect())
    }
}

impl Keymap {
    /// The default bindings, with `overrides` replacing (or adding to) them.
    pub(crate) fn with_overrides(overrides: &HashMap<char, Command>) -> Self {
        let mut keymap = Self::default();
        keymap.0.extend(overrides.iter().map(|(k, c)| (*k, *c)));
        keymap
    }

    pub(crate) fn lookup(&self, key: char) -> Option<Command> {
        self.0.get(&key).copied()
    }
}

impl fmt::Display for Keymap {
    /// One line per command, listing every key bound to it.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut by_command: BTreeMap<Command, Vec<char>> = BTreeMap::new();
        for (key, command) in self.0.iter() {
            by_command.entry(*command).or_default().push(*key);
        }
        writeln!(f, "keymap:")?;
        for (command, mut keys) in by_command {
            keys.sort_unstable();
            let keys: Vec<String> = keys.iter().map(char::to_string).collect();
            writeln!(f, "  {:>5} | {}", keys.join(" "), command.description())?;
        }
        Ok(())
    }
}

/// Whether the viewer should keep going after a key press.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Control {
    Continue,
    Quit,
}

/// Applies key presses to a [`PresentationState`].
#[derive(Debug)]
pub(crate) struct Dispatcher<S: MediaSinks> {
    sinks: S,
    keymap: Keymap,
    geometry: FrameGeometry,
    fourcc: FourCc,
    frame_rate: u32,
}

impl<S: MediaSinks> Dispatcher<S> {
    pub(crate) fn new(
        sinks: S,
        keymap: Keymap,
        geometry: FrameGeometry,
        fourcc: FourCc,
        frame_rate: u32,
    ) -> Self {
        Self {
            sinks,
            keymap,
            geometry,
            fourcc,
            frame_rate,
        }
    }

    /// Handle one key press. `frame` is the most recently displayed image, used for snapshots.
    ///
    /// Unknown keys are reported and otherwise ignored.
    pub(crate) fn dispatch(
        &mut self,
        key: char,
        state: &mut PresentationState,
        frame: Option<&RgbImage>,
    ) -> Control {
        match self.keymap.lookup(key) {
            Some(command) => {
                debug!(?key, ?command, "dispatching command");
                self.apply(command, state, frame)
            }
            None => {
                warn!(?key, "Invalid key");
                Control::Continue
            }
        }
    }

    pub(crate) fn apply(
        &mut self,
        command: Command,
        state: &mut PresentationState,
        frame: Option<&RgbImage>,
    ) -> Control {
        match command {
            Command::Quit => {
                stop_recording(state);
                return Control::Quit;
            }
            Command::CycleColormap => {
                let colormap = state.cycle_colormap().to_string();
                debug!(
                    %colormap,
                    index = state.colormap_index(),
                    count = state.colormap_count(),
                    "changed colormap"
                );
            }
            Command::ToggleHighLow => {
                state.toggle_high_low();
            }
            Command::ScaleUp => {
                if !state.scale_up() {
                    info!(scale = state.scale(), "scale unchanged");
                }
            }
            Command::ScaleDown => {
                if !state.scale_down() {
                    info!(scale = state.scale(), "scale unchanged");
                }
            }
            Command::SaveSnapshot => self.save_snapshot(frame),
            Command::StartRecording => self.start_recording(state),
            Command::StopRecording => stop_recording(state),
            Command::ToggleUnit => {
                state.toggle_unit();
            }
            Command::ToggleCrosshair => {
                state.toggle_crosshair();
            }
            Command::ToggleInfo => {
                state.toggle_info();
            }
            Command::CycleHighlight => {
                state.cycle_highlight();
            }
            Command::PaddingUp => {
                state.padding_up();
            }
            Command::PaddingDown => {
                state.padding_down();
            }
            Command::FontScaleUp => {
                state.font_scale_up();
            }
            Command::FontScaleDown => {
                state.font_scale_down();
            }
            Command::CycleFont => {
                let font = state.cycle_font();
                debug!(%font, "changed font");
            }
        }
        Control::Continue
    }

    fn save_snapshot(&mut self, frame: Option<&RgbImage>) {
        let frame = match frame {
            Some(frame) => frame,
            None => {
                warn!("No frame has been displayed yet, not saving a snapshot");
                return;
            }
        };
        let name = timestamped_name("png", Local::now().naive_local());
        match self.sinks.save_snapshot(frame, &name) {
            Ok(path) => info!(path = %path.display(), "Saved image"),
            Err(err) => error!("{:#}", err),
        }
    }

    fn start_recording(&mut self, state: &mut PresentationState) {
        if state.is_recording() {
            debug!("already recording");
            return;
        }
        let (width, height) = self.geometry.scaled(state.scale());
        let format = VideoFormat {
            fourcc: self.fourcc,
            frame_rate: self.frame_rate,
            width,
            height,
        };
        let name = timestamped_name("avi", Local::now().naive_local());
        match self.sinks.open_video(&name, format) {
            Ok((path, sink)) => {
                info!(path = %path.display(), width, height, "Started recording");
                let session = RecordingSession::new(path, sink);
                if let Err(session) = state.begin_recording(session) {
                    close_session(session);
                }
            }
            Err(err) => error!("Unable to start recording: {:#}", err),
        }
    }
}

/// Close `session`, reporting (and otherwise swallowing) any failure.
pub(crate) fn close_session(session: RecordingSession) {
    let path = session.path().to_path_buf();
    let elapsed = session.elapsed();
    match session.close() {
        Ok(()) => info!(path = %path.display(), ?elapsed, "Stopped recording"),
        Err(err) => error!(path = %path.display(), "Error closing video: {:#}", err),
    }
}

/// End any running recording. The state is idle afterwards even if closing fails.
pub(crate) fn stop_recording(state: &mut PresentationState) {
    match state.take_recording() {
        Some(session) => close_session(session),
        None => debug!("not recording"),
    }
}
