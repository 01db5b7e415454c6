// SPDX-License-Identifier: GPL-3.0-or-later
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::Context as _;
use serde::Deserialize;
use tracing::debug;

mod cli;
mod recording;
mod render;

use crate::camera::CameraSettings;
use crate::command::Command;
use crate::display::{DisplayKind, DisplaySettings};
pub(crate) use cli::Args;
pub(crate) use recording::RecordingSettings;
pub(crate) use render::RenderSettings;

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub(crate) struct Settings {
    /// Where frames come from.
    #[serde(default)]
    pub(crate) camera: CameraSettings,

    /// How frames are displayed when the viewer starts.
    #[serde(default)]
    pub(crate) render: RenderSettings,

    /// Where finished frames are shown.
    #[serde(default)]
    pub(crate) display: DisplaySettings,

    /// Where and how snapshots and videos are written.
    #[serde(default)]
    pub(crate) recording: RecordingSettings,

    /// Key bindings replacing the defaults.
    #[serde(default)]
    pub(crate) keys: HashMap<char, Command>,
}

impl Settings {
    fn from_file(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Unable to read config file {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("Unable to parse config file {}", path.display()))
    }

    /// Load the config file named on the command line (if any), then layer the command line
    /// overrides on top.
    pub(crate) fn load(args: &Args) -> anyhow::Result<Self> {
        let mut settings = match &args.config_path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        settings.apply_args(args);
        debug!(?settings, "loaded settings");
        Ok(settings)
    }

    fn apply_args(&mut self, args: &Args) {
        if let Some(index) = args.device {
            self.camera = self.camera.clone().with_device(index);
        }
        if let Some(units) = args.units {
            self.render.units = units;
        }
        if let Some(scale) = args.scale {
            self.render.scale = scale;
        }
        if args.headless {
            self.display.kind = DisplayKind::Headless;
        }
    }
}

#[cfg(test)]
mod test {
    use std::io::Write;
    use std::path::PathBuf;

    use super::{Args, Settings};
    use crate::camera::CameraSettings;
    use crate::command::Command;
use crate::display::{DisplayKind, DisplaySettings};
    use crate::frame::FrameGeometry;
    use crate::temperature::TemperatureUnit;

    #[test]
    fn empty_config() {
        let parsed: Settings = toml::from_str("").unwrap();
        assert_eq!(parsed, Settings::default());
        assert!(parsed.keys.is_empty());
    }

    #[test]
    fn full_config() {
        let source = r##"
            [camera]
            kind = "recorded"
            path = "frames.raw"
            repeat = "none"
            width = 160
            height = 120

            [render]
            colormaps = ["turbo", "Inferno"]
            units = "fahrenheit"
            scale = 3
            highlight_colors = ["#ff0000"]

            [display]
            kind = "headless"

            [recording]
            directory = "/tmp/captures"
            frame_rate = 15

            [keys]
            q = "save-snapshot"
            Q = "quit"
        "##;
        let parsed: Settings = toml::from_str(source).unwrap();
        assert!(matches!(parsed.camera, CameraSettings::Recorded { .. }));
        assert_eq!(parsed.camera.geometry(), FrameGeometry::new(160, 120));
        assert_eq!(parsed.render.colormaps.len(), 2);
        assert_eq!(parsed.render.units, TemperatureUnit::Fahrenheit);
        assert_eq!(parsed.render.scale, 3);
        assert_eq!(parsed.display.kind, DisplayKind::Headless);
        assert_eq!(parsed.recording.directory, PathBuf::from("/tmp/captures"));
        assert_eq!(parsed.recording.frame_rate, 15);
        assert_eq!(parsed.keys.get(&'q'), Some(&Command::SaveSnapshot));
        assert_eq!(parsed.keys.get(&'Q'), Some(&Command::Quit));
    }

    #[test]
    fn unknown_command() {
        assert!(toml::from_str::<Settings>("[keys]\nq = \"explode\"").is_err());
    }

    #[test]
    fn load_without_file() {
        let settings = Settings::load(&Args::default()).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn load_missing_file() {
        let args = Args {
            config_path: Some(PathBuf::from("/nonexistent/thermal-hud.toml")),
            ..Args::default()
        };
        assert!(Settings::load(&args).is_err());
    }

    #[test]
    fn arguments_override_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[camera]\nkind = \"recorded\"\npath = \"frames.raw\"\n[render]\nscale = 5\nunits = \"celsius\""
        )
        .unwrap();
        file.flush().unwrap();
        let args = Args {
            config_path: Some(file.path().to_path_buf()),
            device: Some(1),
            units: Some(TemperatureUnit::Fahrenheit),
            scale: Some(2),
            headless: true,
        };
        let settings = Settings::load(&args).unwrap();
        assert!(matches!(settings.camera, CameraSettings::Device { index: 1, .. }));
        assert_eq!(settings.render.units, TemperatureUnit::Fahrenheit);
        assert_eq!(settings.render.scale, 2);
        assert_eq!(settings.display.kind, DisplayKind::Headless);
    }
}
