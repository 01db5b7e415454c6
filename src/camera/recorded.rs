// SPDX-License-Identifier: GPL-3.0-or-later
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Context as _;
use serde::de::{Deserialize, IntoDeserializer};
use tracing::{debug, trace, warn};

use super::FrameSource;
use crate::frame::{FrameGeometry, RawFrame};

/// Controls how frames are repeated by [`RecordedSource`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum RepeatMode {
    /// Don't repeat.
    ///
    /// Once the end of the recording has been reached, the stream ends.
    None,

    /// Loop over the frames.
    ///
    /// Once the end of the recording has been reached, playback restarts from the beginning.
    /// This is the default mode.
    Loop,

    /// Alternate between forward and reverse playback.
    ///
    /// Once the end of the recording has been reached, playback continues backwards. Once the
    /// beginning has been reached, playback continues forwards. The frames at either end of
    /// the recording are *not* repeated.
    Bounce,
}

impl Default for RepeatMode {
    fn default() -> Self {
        Self::Loop
    }
}

impl FromStr for RepeatMode {
    type Err = serde::de::value::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RepeatMode::deserialize(s.into_deserializer())
    }
}

impl fmt::Display for RepeatMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RepeatMode::None => "none",
            RepeatMode::Loop => "loop",
            RepeatMode::Bounce => "bounce",
        };
        write!(f, "{}", s)
    }
}

/// Plays back frames captured earlier, as if they were coming from a camera.
pub(crate) struct RecordedSource {
    frames: Vec<RawFrame>,
    index: Box<dyn Iterator<Item = usize>>,
    repeat: RepeatMode,
    frame_interval: Option<Duration>,
    last_frame: Option<Instant>,
}

impl RecordedSource {
    /// Create a source from frames already in memory. With a `frame_interval`, [`read_frame`]
    /// sleeps so that frames are handed out no faster than one per interval.
    ///
    /// [`read_frame`]: FrameSource::read_frame
    pub(crate) fn new(
        frames: Vec<RawFrame>,
        repeat: RepeatMode,
        frame_interval: Option<Duration>,
    ) -> Self {
        let num_frames = frames.len();
        let index: Box<dyn Iterator<Item = usize>> = match repeat {
            RepeatMode::None => Box::new(0..num_frames),
            RepeatMode::Loop => Box::new((0..num_frames).cycle()),
            // Bouncing needs at least two frames to have a way back.
            RepeatMode::Bounce if num_frames < 2 => Box::new((0..num_frames).cycle()),
            RepeatMode::Bounce => {
                let forwards = 0..num_frames;
                let backwards = (1..(num_frames - 1)).rev();
                Box::new(forwards.chain(backwards).cycle())
            }
        };
        Self {
            frames,
            index,
            repeat,
            frame_interval,
            last_frame: None,
        }
    }

    /// Load a raw capture file: a sequence of frames, each `2 * height` rows of `width`
    /// little-endian 16-bit samples. A trailing partial frame is ignored.
    pub(crate) fn open(
        path: &Path,
        geometry: FrameGeometry,
        repeat: RepeatMode,
        frame_rate: f32,
    ) -> anyhow::Result<Self> {
        let data = fs::read(path)
            .with_context(|| format!("Unable to read recorded frames from {}", path.display()))?;
        let (rows, columns) = geometry.raw_shape();
        let frame_bytes = geometry.raw_len() * 2;
        anyhow::ensure!(frame_bytes > 0, "Frame geometry must not be empty");
        let chunks = data.chunks_exact(frame_bytes);
        if !chunks.remainder().is_empty() {
            warn!(
                path = %path.display(),
                extra_bytes = chunks.remainder().len(),
                "recording ends with a partial frame, ignoring it"
            );
        }
        let frames: Vec<RawFrame> = chunks
            .filter_map(|chunk| RawFrame::from_le_bytes(rows, columns, chunk))
            .collect();
        debug!(path = %path.display(), frames = frames.len(), %repeat, "loaded recorded frames");
        let frame_interval = if frame_rate.is_finite() && frame_rate > 0.0 {
            Some(Duration::from_secs_f32(1.0 / frame_rate))
        } else {
            None
        };
        Ok(Self::new(frames, repeat, frame_interval))
    }

    fn pace(&mut self) {
        if let (Some(interval), Some(last)) = (self.frame_interval, self.last_frame) {
            let elapsed = last.elapsed();
            if elapsed < interval {
                let delay = interval - elapsed;
                trace!(?delay, "waiting for next frame");
                thread::sleep(delay);
            }
        }
        self.last_frame = Some(Instant::now());
    }
}

impl fmt::Debug for RecordedSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordedSource")
            .field("frames", &self.frames.len())
            .field("repeat", &self.repeat)
            .field("frame_interval", &self.frame_interval)
            .finish()
    }
}

impl FrameSource for RecordedSource {
    fn read_frame(&mut self) -> anyhow::Result<Option<RawFrame>> {
        let index = match self.index.next() {
            Some(index) => index,
            None => return Ok(None),
        };
        self.pace();
        Ok(self.frames.get(index).cloned())
    }
}
