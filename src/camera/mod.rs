// SPDX-License-Identifier: GPL-3.0-or-later
use std::fmt;

use crate::frame::RawFrame;

mod device;
mod recorded;
mod settings;

pub(crate) use device::DeviceSource;
pub(crate) use recorded::{RecordedSource, RepeatMode};
pub(crate) use settings::CameraSettings;

/// Something that produces raw frames.
pub(crate) trait FrameSource: fmt::Debug {
    /// Block until the next frame is available.
    ///
    /// `Ok(None)` means the source has closed and no more frames will come.
    fn read_frame(&mut self) -> anyhow::Result<Option<RawFrame>>;
}
