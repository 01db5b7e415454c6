// SPDX-License-Identifier: GPL-3.0-or-later
use std::path::PathBuf;

use serde::Deserialize;

use super::{DeviceSource, FrameSource, RecordedSource, RepeatMode};
use crate::frame::FrameGeometry;

fn default_width() -> usize {
    256
}

fn default_height() -> usize {
    192
}

fn default_frame_rate() -> f32 {
    25.0
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub(crate) struct CommonCameraSettings {
    /// Width of one plane, in pixels.
    #[serde(default = "default_width")]
    width: usize,

    /// Height of one plane, in pixels. Raw frames are twice this.
    #[serde(default = "default_height")]
    height: usize,

    #[serde(default = "default_frame_rate")]
    frame_rate: f32,
}

impl Default for CommonCameraSettings {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            frame_rate: default_frame_rate(),
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase", tag = "kind")]
pub(crate) enum CameraSettings {
    /// A V4L2 device node delivering raw frames.
    Device {
        #[serde(default)]
        index: u32,

        #[serde(flatten)]
        common: CommonCameraSettings,
    },
    /// A file of raw frames captured earlier.
    Recorded {
        path: PathBuf,

        #[serde(default)]
        repeat: RepeatMode,

        #[serde(flatten)]
        common: CommonCameraSettings,
    },
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self::Device {
            index: 0,
            common: CommonCameraSettings::default(),
        }
    }
}

impl CameraSettings {
    /// Convenience method for accessing common camera settings.
    fn common(&self) -> &CommonCameraSettings {
        match self {
            Self::Device { common, .. } => common,
            Self::Recorded { common, .. } => common,
        }
    }

    pub(crate) fn geometry(&self) -> FrameGeometry {
        let common = self.common();
        FrameGeometry::new(common.width, common.height)
    }

    pub(crate) fn frame_rate(&self) -> f32 {
        self.common().frame_rate
    }

    /// Capture from device `index` instead, keeping the frame settings.
    pub(crate) fn with_device(self, index: u32) -> Self {
        let common = match self {
            Self::Device { common, .. } => common,
            Self::Recorded { common, .. } => common,
        };
        Self::Device { index, common }
    }

    pub(crate) fn create_source(&self) -> anyhow::Result<Box<dyn FrameSource>> {
        Ok(match self {
            Self::Device { index, .. } => Box::new(DeviceSource::open(
                *index,
                self.geometry(),
                self.frame_rate(),
            )?),
            Self::Recorded { path, repeat, .. } => Box::new(RecordedSource::open(
                path,
                self.geometry(),
                *repeat,
                self.frame_rate(),
            )?),
        })
    }
}

#[cfg(test)]
mod de_tests {
    use std::path::PathBuf;

    use super::{CameraSettings, CommonCameraSettings};
    use crate::camera::RepeatMode;
    use crate::frame::FrameGeometry;

    #[test]
    fn device_defaults() {
        let parsed: CameraSettings = toml::from_str("kind = \"device\"").unwrap();
        assert_eq!(parsed, CameraSettings::default());
        assert_eq!(parsed.geometry(), FrameGeometry::new(256, 192));
        assert!((parsed.frame_rate() - 25.0).abs() < f32::EPSILON);
    }

    #[test]
    fn device_full() {
        let parsed: CameraSettings =
            toml::from_str("kind = \"device\"\nindex = 3\nwidth = 160\nheight = 120\nframe_rate = 9")
                .unwrap();
        assert_eq!(
            parsed,
            CameraSettings::Device {
                index: 3,
                common: CommonCameraSettings {
                    width: 160,
                    height: 120,
                    frame_rate: 9.0,
                }
            }
        );
    }

    #[test]
    fn recorded() {
        let parsed: CameraSettings =
            toml::from_str("kind = \"recorded\"\npath = \"capture.raw\"\nrepeat = \"bounce\"")
                .unwrap();
        assert_eq!(
            parsed,
            CameraSettings::Recorded {
                path: PathBuf::from("capture.raw"),
                repeat: RepeatMode::Bounce,
                common: CommonCameraSettings::default(),
            }
        );
    }

    #[test]
    fn recorded_needs_path() {
        assert!(toml::from_str::<CameraSettings>("kind = \"recorded\"").is_err());
    }

    #[test]
    fn unknown_kind() {
        let err = toml::from_str::<CameraSettings>("kind = \"webcam\"").unwrap_err();
        for kind in ["device", "recorded"].iter() {
            assert!(err.to_string().contains(kind), "{} missing from {}", kind, err);
        }
    }

    #[test]
    fn device_override_keeps_geometry() {
        let settings = CameraSettings::Recorded {
            path: PathBuf::from("capture.raw"),
            repeat: RepeatMode::Loop,
            common: CommonCameraSettings {
                width: 32,
                height: 24,
                frame_rate: 8.0,
            },
        };
        let settings = settings.with_device(2);
        assert!(matches!(settings, CameraSettings::Device { index: 2, .. }));
        assert_eq!(settings.geometry(), FrameGeometry::new(32, 24));
    }
}
