// SPDX-License-Identifier: GPL-3.0-or-later
//! Video recording by piping raw RGB frames into an `ffmpeg` child process.
//!
//! The container is always AVI, and the configured fourcc picks both the encoder and the codec
//! tag written into the stream header.
use std::convert::TryFrom;
use std::fmt;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Stdio};
use std::thread;

use anyhow::{anyhow, bail, Context as _};
use ffmpeg_sidecar::command::FfmpegCommand;
use image::RgbImage;
use serde::de::{self, Deserialize, Deserializer};
use tracing::{debug, trace, warn};

use super::{VideoFormat, VideoSink};

pub(crate) const DEFAULT_QUALITY: u8 = 75;

/// The codecs that can be recorded: fourcc, ffmpeg encoder, output pixel format.
const ENCODERS: &[([u8; 4], &str, &str)] = &[
    (*b"MJPG", "mjpeg", "yuvj420p"),
    (*b"XVID", "mpeg4", "yuv420p"),
    (*b"FMP4", "mpeg4", "yuv420p"),
    (*b"H264", "libx264", "yuv420p"),
    (*b"FFV1", "ffv1", "yuv420p"),
];

/// A four character code naming the recorded codec, like `MJPG`.
#[derive(Clone, Copy, PartialEq, Eq)]
pub(crate) struct FourCc {
    code: [u8; 4],
    encoder: &'static str,
    pixel_format: &'static str,
}

impl FourCc {
    pub(crate) const MJPG: Self = Self {
        code: *b"MJPG",
        encoder: "mjpeg",
        pixel_format: "yuvj420p",
    };

    pub(crate) fn as_bytes(&self) -> &[u8; 4] {
        &self.code
    }

    /// Whether the encoder takes a `-q:v` quantizer.
    fn quantized(&self) -> bool {
        matches!(self.encoder, "mjpeg" | "mpeg4")
    }
}

impl Default for FourCc {
    fn default() -> Self {
        Self::MJPG
    }
}

impl TryFrom<&str> for FourCc {
    type Error = String;

    fn try_from(code: &str) -> Result<Self, Self::Error> {
        ENCODERS
            .iter()
            .find(|(known, _, _)| known.eq_ignore_ascii_case(code.as_bytes()))
            .map(|&(code, encoder, pixel_format)| Self {
                code,
                encoder,
                pixel_format,
            })
            .ok_or_else(|| {
                let known: Vec<String> = ENCODERS
                    .iter()
                    .map(|(code, _, _)| String::from_utf8_lossy(code).into_owned())
                    .collect();
                format!(
                    "\"{}\" is not a supported fourcc (one of {})",
                    code,
                    known.join(", ")
                )
            })
    }
}

impl TryFrom<String> for FourCc {
    type Error = String;

    fn try_from(code: String) -> Result<Self, Self::Error> {
        Self::try_from(code.as_str())
    }
}

impl<'de> Deserialize<'de> for FourCc {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let code = String::deserialize(deserializer)?;
        FourCc::try_from(code).map_err(de::Error::custom)
    }
}

impl fmt::Display for FourCc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.code))
    }
}

impl fmt::Debug for FourCc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FourCc").field(&self.to_string()).finish()
    }
}

/// Map a 1-100 quality onto ffmpeg's 2-31 quantizer scale, where lower is better.
fn quantizer(quality: u8) -> u8 {
    let quality = u32::from(quality.max(1).min(100));
    (2 + (100 - quality) * 29 / 99) as u8
}

/// The arguments for an ffmpeg process reading raw RGB frames on stdin and writing `path`.
pub(crate) fn ffmpeg_args(format: &VideoFormat, quality: u8, path: &Path) -> Vec<String> {
    let mut args: Vec<String> = vec![
        "-hide_banner".into(),
        "-loglevel".into(),
        "error".into(),
        "-f".into(),
        "rawvideo".into(),
        "-pix_fmt".into(),
        "rgb24".into(),
        "-s".into(),
        format!("{}x{}", format.width, format.height),
        "-r".into(),
        format.frame_rate.max(1).to_string(),
        "-i".into(),
        "-".into(),
        "-c:v".into(),
        format.fourcc.encoder.into(),
    ];
    if format.fourcc.quantized() {
        args.push("-q:v".into());
        args.push(quantizer(quality).to_string());
    } else if format.fourcc.encoder == "libx264" {
        args.extend(["-preset", "ultrafast", "-crf", "23"].iter().map(|a| a.to_string()));
    }
    let tag = format.fourcc.to_string();
    args.extend(
        [
            "-pix_fmt",
            format.fourcc.pixel_format,
            "-vtag",
            tag.as_str(),
            "-f",
            "avi",
            "-y",
        ]
        .iter()
        .map(|a| a.to_string()),
    );
    args.push(path.to_string_lossy().into_owned());
    args
}

/// A running ffmpeg encoder writing one video file.
#[derive(Debug)]
pub(crate) struct FfmpegVideo {
    path: PathBuf,
    format: VideoFormat,
    stdin: Option<ChildStdin>,
    child: Child,
    log_thread: Option<thread::JoinHandle<()>>,
    frame_count: u64,
}

impl FfmpegVideo {
    pub(crate) fn spawn(path: PathBuf, format: VideoFormat, quality: u8) -> anyhow::Result<Self> {
        let mut command = FfmpegCommand::new();
        command.args(ffmpeg_args(&format, quality, &path));
        let inner = command.as_inner_mut();
        inner.stdin(Stdio::piped());
        inner.stdout(Stdio::null());
        inner.stderr(Stdio::piped());
        let mut child = inner
            .spawn()
            .context("Unable to start ffmpeg, is it installed?")?;
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| anyhow!("ffmpeg has no stdin"))?;
        let log_thread = match child.stderr.take() {
            Some(stderr) => Some(
                thread::Builder::new()
                    .name("ffmpeg-log".to_string())
                    .spawn(move || {
                        for line in BufReader::new(stderr).lines().map_while(Result::ok) {
                            warn!(%line, "ffmpeg");
                        }
                    })?,
            ),
            None => None,
        };
        debug!(path = %path.display(), fourcc = %format.fourcc, "started video encoder");
        Ok(Self {
            path,
            format,
            stdin: Some(stdin),
            child,
            log_thread,
            frame_count: 0,
        })
    }
}

impl VideoSink for FfmpegVideo {
    fn write_frame(&mut self, frame: &RgbImage) -> anyhow::Result<()> {
        let expected = (self.format.width, self.format.height);
        if frame.dimensions() != expected {
            bail!(
                "Frame is {:?}, but the video was opened for {:?}",
                frame.dimensions(),
                expected
            );
        }
        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| anyhow!("Video encoder already closed"))?;
        stdin
            .write_all(frame.as_raw())
            .with_context(|| format!("Unable to write frame to {}", self.path.display()))?;
        self.frame_count += 1;
        trace!(frames = self.frame_count, "wrote video frame");
        Ok(())
    }

    fn close(mut self: Box<Self>) -> anyhow::Result<()> {
        // Closing stdin tells ffmpeg to finish the file.
        drop(self.stdin.take());
        let status = self
            .child
            .wait()
            .context("Unable to wait for ffmpeg to finish")?;
        if let Some(log_thread) = self.log_thread.take() {
            if log_thread.join().is_err() {
                warn!("ffmpeg log reader panicked");
            }
        }
        if !status.success() {
            bail!(
                "ffmpeg failed to finish {} ({})",
                self.path.display(),
                status
            );
        }
        debug!(
            path = %self.path.display(),
            frames = self.frame_count,
            "finished video"
        );
        Ok(())
    }
}
