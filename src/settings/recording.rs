// SPDX-License-Identifier: GPL-3.0-or-later
use std::path::PathBuf;

use serde::Deserialize;

use crate::media::{FourCc, DEFAULT_VIDEO_QUALITY};

fn default_directory() -> PathBuf {
    PathBuf::from(".")
}

fn default_frame_rate() -> u32 {
    25
}

fn default_jpeg_quality() -> u8 {
    DEFAULT_VIDEO_QUALITY
}

/// Where and how snapshots and videos are saved.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub(crate) struct RecordingSettings {
    #[serde(default = "default_directory")]
    pub(crate) directory: PathBuf,

    /// Codec to record with: `MJPG`, `XVID`, `FMP4`, `H264` or `FFV1`.
    #[serde(default)]
    pub(crate) fourcc: FourCc,

    /// Frame rate written into video headers.
    #[serde(default = "default_frame_rate")]
    pub(crate) frame_rate: u32,

    /// Quality (1-100) of each video frame, for the `MJPG`, `XVID` and `FMP4` codecs.
    #[serde(default = "default_jpeg_quality")]
    pub(crate) jpeg_quality: u8,
}

impl Default for RecordingSettings {
    fn default() -> Self {
        Self {
            directory: default_directory(),
            fourcc: FourCc::default(),
            frame_rate: default_frame_rate(),
            jpeg_quality: default_jpeg_quality(),
        }
    }
}
