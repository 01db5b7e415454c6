// SPDX-License-Identifier: GPL-3.0-or-later
//! Raw frames from the camera, and the two image planes inside them.
//!
//! The camera delivers a single buffer of 16-bit samples twice as tall as the sensor. The top
//! half is a packed YUYV image (each sample holds one luma byte and one chroma byte), the bottom
//! half holds a raw radiometric count for each pixel.
use ndarray::{s, Array2, ArrayView2};
use serde::Deserialize;

use crate::error::FrameError;
use crate::temperature::RawCount;

mod extremum;

pub(crate) use extremum::{scan, Extremum, ExtremumResult, SearchRegion};

/// A pixel location, with `x` increasing to the right and `y` increasing downwards.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub(crate) struct Point {
    pub(crate) x: usize,
    pub(crate) y: usize,
}

impl Point {
    pub(crate) fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

/// The size of a single plane, in pixels.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
pub(crate) struct FrameGeometry {
    pub(crate) width: usize,
    pub(crate) height: usize,
}

impl FrameGeometry {
    pub(crate) fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    /// The `(rows, columns)` of a full raw frame with both planes stacked.
    pub(crate) fn raw_shape(&self) -> (usize, usize) {
        (self.height * 2, self.width)
    }

    /// Number of samples in a full raw frame.
    pub(crate) fn raw_len(&self) -> usize {
        self.height * 2 * self.width
    }

    /// The size of the displayed image at the given scale.
    pub(crate) fn scaled(&self, scale: u32) -> (u32, u32) {
        (self.width as u32 * scale, self.height as u32 * scale)
    }

    pub(crate) fn center(&self) -> Point {
        Point::new(self.width / 2, self.height / 2)
    }
}

impl Default for FrameGeometry {
    fn default() -> Self {
        Self::new(256, 192)
    }
}

/// One capture from the camera, as a grid of `(rows, columns)` samples.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct RawFrame {
    samples: Array2<u16>,
}

impl RawFrame {
    pub(crate) fn new(samples: Array2<u16>) -> Self {
        Self { samples }
    }

    /// Build a frame from little-endian sample bytes.
    ///
    /// Returns `None` if `bytes` does not hold exactly `rows * columns` samples.
    pub(crate) fn from_le_bytes(rows: usize, columns: usize, bytes: &[u8]) -> Option<Self> {
        if bytes.len() != rows * columns * 2 {
            return None;
        }
        let samples: Vec<u16> = bytes
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        Array2::from_shape_vec((rows, columns), samples)
            .ok()
            .map(Self::new)
    }

    #[cfg(test)]
    pub(crate) fn dim(&self) -> (usize, usize) {
        self.samples.dim()
    }

    /// Split the frame into its visible and radiometric planes.
    ///
    /// The planes borrow from the frame; no samples are copied.
    pub(crate) fn split(&self, geometry: FrameGeometry) -> Result<Planes<'_>, FrameError> {
        if self.samples.is_empty() {
            return Err(FrameError::Empty);
        }
        let expected = geometry.raw_shape();
        let actual = self.samples.dim();
        if actual != expected {
            return Err(FrameError::ShapeMismatch { expected, actual });
        }
        let height = geometry.height;
        Ok(Planes {
            visible: VisiblePlane(self.samples.slice(s![..height, ..])),
            radiometric: RadiometricPlane(self.samples.slice(s![height.., ..])),
        })
    }
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct Planes<'a> {
    pub(crate) visible: VisiblePlane<'a>,
    pub(crate) radiometric: RadiometricPlane<'a>,
}

/// The YUYV half of a frame.
#[derive(Clone, Copy, Debug)]
pub(crate) struct VisiblePlane<'a>(ArrayView2<'a, u16>);

impl<'a> VisiblePlane<'a> {
    #[cfg(test)]
    pub(crate) fn new(samples: ArrayView2<'a, u16>) -> Self {
        Self(samples)
    }

    /// `(rows, columns)`
    pub(crate) fn dim(&self) -> (usize, usize) {
        self.0.dim()
    }

    /// Luma values in row-major order.
    pub(crate) fn lumas(&self) -> impl Iterator<Item = u8> + 'a {
        self.0.into_iter().map(|sample| (sample & 0xFF) as u8)
    }
}

/// The raw sensor half of a frame.
#[derive(Clone, Copy, Debug)]
pub(crate) struct RadiometricPlane<'a>(ArrayView2<'a, u16>);

impl<'a> RadiometricPlane<'a> {
    #[cfg(test)]
    pub(crate) fn new(samples: ArrayView2<'a, u16>) -> Self {
        Self(samples)
    }

    /// `(rows, columns)`
    pub(crate) fn dim(&self) -> (usize, usize) {
        self.0.dim()
    }

    /// The raw count at a point. Samples are reinterpreted as signed 16-bit values.
    pub(crate) fn count(&self, point: Point) -> Option<RawCount> {
        self.0
            .get((point.y, point.x))
            .map(|sample| *sample as RawCount)
    }

    pub(crate) fn samples(&self) -> ArrayView2<'a, u16> {
        self.0
    }
}

#[cfg(test)]
mod test {
    use ndarray::Array2;

    use super::{FrameGeometry, Point, RawFrame};
    use crate::error::FrameError;

    fn stacked_frame(geometry: FrameGeometry) -> RawFrame {
        let (rows, columns) = geometry.raw_shape();
        // Visible plane samples count up from 0, radiometric ones from 1000.
        let samples = Array2::from_shape_fn((rows, columns), |(row, col)| {
            if row < geometry.height {
                (row * columns + col) as u16
            } else {
                1000 + ((row - geometry.height) * columns + col) as u16
            }
        });
        RawFrame::new(samples)
    }

    #[test]
    fn split_planes() {
        let geometry = FrameGeometry::new(8, 4);
        let frame = stacked_frame(geometry);
        let planes = frame.split(geometry).expect("a well formed frame to split");
        assert_eq!(planes.visible.dim(), (4, 8));
        assert_eq!(planes.radiometric.dim(), (4, 8));
        assert_eq!(planes.radiometric.count(Point::new(0, 0)), Some(1000));
        assert_eq!(planes.radiometric.count(Point::new(3, 2)), Some(1019));
        assert_eq!(planes.radiometric.count(Point::new(8, 0)), None);
        let lumas: Vec<u8> = planes.visible.lumas().take(3).collect();
        assert_eq!(lumas, vec![0, 1, 2]);
    }

    #[test]
    fn luma_is_low_byte() {
        let geometry = FrameGeometry::new(1, 1);
        let frame = RawFrame::new(Array2::from_shape_vec((2, 1), vec![0x80_42, 0]).unwrap());
        let planes = frame.split(geometry).unwrap();
        assert_eq!(planes.visible.lumas().collect::<Vec<_>>(), vec![0x42]);
    }

    #[test]
    fn counts_are_signed() {
        let geometry = FrameGeometry::new(1, 1);
        let frame = RawFrame::new(Array2::from_shape_vec((2, 1), vec![0, 0xFFFF]).unwrap());
        let planes = frame.split(geometry).unwrap();
        assert_eq!(planes.radiometric.count(Point::new(0, 0)), Some(-1));
    }

    #[test]
    fn shape_mismatch() {
        let geometry = FrameGeometry::new(8, 4);
        let frame = stacked_frame(FrameGeometry::new(8, 3));
        assert_eq!(
            frame.split(geometry).unwrap_err(),
            FrameError::ShapeMismatch {
                expected: (8, 8),
                actual: (6, 8)
            }
        );
        // Right number of samples, transposed
        let frame = RawFrame::new(Array2::zeros((8, 8)).reversed_axes());
        assert!(frame.split(FrameGeometry::new(4, 8)).is_err());
    }

    #[test]
    fn empty_frame() {
        let frame = RawFrame::new(Array2::zeros((0, 256)));
        assert_eq!(
            frame.split(FrameGeometry::default()).unwrap_err(),
            FrameError::Empty
        );
    }

    #[test]
    fn from_bytes() {
        let frame = RawFrame::from_le_bytes(2, 1, &[0x34, 0x12, 0xFF, 0x00]).unwrap();
        let planes = frame.split(FrameGeometry::new(1, 1)).unwrap();
        assert_eq!(planes.radiometric.count(Point::new(0, 0)), Some(0xFF));
        assert!(RawFrame::from_le_bytes(2, 1, &[0; 3]).is_none());
    }

    #[test]
    fn geometry() {
        let geometry = FrameGeometry::default();
        assert_eq!(geometry.raw_shape(), (384, 256));
        assert_eq!(geometry.raw_len(), 384 * 256);
        assert_eq!(geometry.scaled(3), (768, 576));
        assert_eq!(geometry.center(), Point::new(128, 96));
    }
}
