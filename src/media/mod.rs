// SPDX-License-Identifier: GPL-3.0-or-later
//! Where snapshots and recordings end up.
use std::fmt;
use std::path::PathBuf;

use anyhow::{bail, Context as _};
use chrono::NaiveDateTime;
use image::{ImageFormat, RgbImage};
use tracing::debug;

mod ffmpeg;

use ffmpeg::FfmpegVideo;
pub(crate) use ffmpeg::{FourCc, DEFAULT_QUALITY as DEFAULT_VIDEO_QUALITY};

/// Parameters a video sink is opened with. Fixed for the life of the sink.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct VideoFormat {
    pub(crate) fourcc: FourCc,
    pub(crate) frame_rate: u32,
    pub(crate) width: u32,
    pub(crate) height: u32,
}

/// An open video file.
pub(crate) trait VideoSink: fmt::Debug {
    /// Append a frame. Frames must match the size the sink was opened with.
    fn write_frame(&mut self, frame: &RgbImage) -> anyhow::Result<()>;

    /// Finish encoding and finalize the container.
    fn close(self: Box<Self>) -> anyhow::Result<()>;
}

/// Persists snapshots and opens videos.
pub(crate) trait MediaSinks: fmt::Debug {
    /// Save `image` as a still image named `name`, returning where it was written.
    fn save_snapshot(&mut self, image: &RgbImage, name: &str) -> anyhow::Result<PathBuf>;

    fn open_video(
        &mut self,
        name: &str,
        format: VideoFormat,
    ) -> anyhow::Result<(PathBuf, Box<dyn VideoSink>)>;
}

/// Build a `Thermal-<timestamp>.<extension>` file name with no spaces in it.
pub(crate) fn timestamped_name(extension: &str, time: NaiveDateTime) -> String {
    let stamp = time.format("%b %e %H:%M:%S").to_string().replace(' ', "_");
    format!("Thermal-{}.{}", stamp, extension)
}

/// Writes PNG snapshots and ffmpeg-encoded AVI videos into a directory.
#[derive(Clone, Debug)]
pub(crate) struct FileSinks {
    directory: PathBuf,
    video_quality: u8,
}

impl FileSinks {
    pub(crate) fn new<P: Into<PathBuf>>(directory: P, video_quality: u8) -> Self {
        Self {
            directory: directory.into(),
            video_quality,
        }
    }
}

impl MediaSinks for FileSinks {
    fn save_snapshot(&mut self, image: &RgbImage, name: &str) -> anyhow::Result<PathBuf> {
        let path = self.directory.join(name);
        image
            .save_with_format(&path, ImageFormat::Png)
            .with_context(|| format!("Unable to save snapshot to {}", path.display()))?;
        debug!(path = %path.display(), "saved snapshot");
        Ok(path)
    }

    fn open_video(
        &mut self,
        name: &str,
        format: VideoFormat,
    ) -> anyhow::Result<(PathBuf, Box<dyn VideoSink>)> {
        let path = self.directory.join(name);
        if !self.directory.is_dir() {
            bail!("Unable to create video file {}", path.display());
        }
        let writer: Box<dyn VideoSink> =
            Box::new(FfmpegVideo::spawn(path.clone(), format, self.video_quality)?);
        Ok((path, writer))
    }
}
