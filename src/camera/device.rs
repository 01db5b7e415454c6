// SPDX-License-Identifier: GPL-3.0-or-later
use std::fmt;

use anyhow::Context as _;
use ndarray::Array2;
use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{
    CameraFormat, CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType, Resolution,
};
use nokhwa::Camera;
use tracing::{debug, info, trace, warn};

use super::FrameSource;
use crate::frame::{FrameGeometry, RawFrame};

/// A capture stream handing over undecoded frame buffers.
pub(crate) trait RawStream {
    /// Block until the next buffer is ready.
    ///
    /// `Ok(None)` means the stream has been closed.
    fn next_buffer(&mut self) -> anyhow::Result<Option<Vec<u8>>>;
}

/// A capture device opened through [nokhwa], streaming raw YUYV buffers.
pub(crate) struct NokhwaStream {
    camera: Camera,
}

impl NokhwaStream {
    /// Open device `index`, asking for exactly the raw frame size and rate.
    ///
    /// The camera stacks both planes in one image, so the requested resolution is twice as tall
    /// as `geometry`.
    pub(crate) fn open(index: u32, geometry: FrameGeometry, frame_rate: f32) -> anyhow::Result<Self> {
        let (rows, columns) = geometry.raw_shape();
        let format = CameraFormat::new(
            Resolution::new(columns as u32, rows as u32),
            FrameFormat::YUYV,
            frame_rate.round().max(1.0) as u32,
        );
        let requested = RequestedFormat::new::<RgbFormat>(RequestedFormatType::Exact(format));
        let mut camera = Camera::new(CameraIndex::Index(index), requested)
            .with_context(|| format!("Unable to open video capture device {}", index))?;
        camera
            .open_stream()
            .with_context(|| format!("Unable to start streaming from capture device {}", index))?;
        info!(
            index,
            name = %camera.info().human_name(),
            format = %camera.camera_format(),
            "opened capture device"
        );
        Ok(Self { camera })
    }
}

impl RawStream for NokhwaStream {
    fn next_buffer(&mut self) -> anyhow::Result<Option<Vec<u8>>> {
        if !self.camera.is_stream_open() {
            return Ok(None);
        }
        let buffer = self
            .camera
            .frame()
            .context("Unable to read from capture device")?;
        // The YUYV bytes are passed through as-is; the second plane is not an image at all.
        Ok(Some(buffer.buffer().to_vec()))
    }
}

impl fmt::Debug for NokhwaStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NokhwaStream")
            .field("index", self.camera.index())
            .field("format", &self.camera.camera_format())
            .finish()
    }
}

impl Drop for NokhwaStream {
    fn drop(&mut self) {
        if let Err(err) = self.camera.stop_stream() {
            warn!(%err, "unable to stop capture stream");
        }
    }
}

/// Reads raw, unconverted frames from a capture device.
///
/// Each read blocks until the device hands over a complete frame.
#[derive(Debug)]
pub(crate) struct DeviceSource<S: RawStream = NokhwaStream> {
    stream: S,
    geometry: FrameGeometry,
}

impl DeviceSource<NokhwaStream> {
    pub(crate) fn open(index: u32, geometry: FrameGeometry, frame_rate: f32) -> anyhow::Result<Self> {
        Ok(Self::new(
            NokhwaStream::open(index, geometry, frame_rate)?,
            geometry,
        ))
    }
}

impl<S: RawStream> DeviceSource<S> {
    pub(crate) fn new(stream: S, geometry: FrameGeometry) -> Self {
        Self { stream, geometry }
    }
}

impl<S: RawStream + fmt::Debug> FrameSource for DeviceSource<S> {
    fn read_frame(&mut self) -> anyhow::Result<Option<RawFrame>> {
        let bytes = match self.stream.next_buffer()? {
            Some(bytes) => bytes,
            None => {
                debug!("capture stream closed");
                return Ok(None);
            }
        };
        trace!(bytes = bytes.len(), "read raw frame");
        let (rows, columns) = self.geometry.raw_shape();
        Ok(Some(
            RawFrame::from_le_bytes(rows, columns, &bytes).unwrap_or_else(|| {
                warn!(
                    expected = self.geometry.raw_len() * 2,
                    actual = bytes.len(),
                    "capture buffer is the wrong size"
                );
                // An empty frame, which is skipped further on.
                RawFrame::new(Array2::zeros((0, columns)))
            }),
        ))
    }
}
