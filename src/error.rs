// SPDX-License-Identifier: GPL-3.0-or-later
use std::error::Error as StdError;
use std::fmt;

/// Reasons a captured frame cannot be split into its two planes.
///
/// These are never fatal; the frame is dropped and the next capture is tried.
#[derive(Clone, Copy, PartialEq, Eq)]
pub(crate) enum FrameError {
    /// The capture source handed over a buffer with no samples in it.
    Empty,

    /// The buffer's `(rows, columns)` do not match the configured geometry.
    ShapeMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },
}

impl fmt::Debug for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Empty => f.debug_tuple("Empty").finish(),
            Self::ShapeMismatch { expected, actual } => f
                .debug_struct("ShapeMismatch")
                .field("expected", expected)
                .field("actual", actual)
                .finish(),
        }
    }
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "Frame buffer is empty"),
            Self::ShapeMismatch { expected, actual } => write!(
                f,
                "Frame dimensions should be {}x{} (rows x columns), got {}x{}",
                expected.0, expected.1, actual.0, actual.1
            ),
        }
    }
}

impl StdError for FrameError {}

#[cfg(test)]
mod test {
    use super::FrameError;

    #[test]
    fn display_mismatch() {
        let err = FrameError::ShapeMismatch {
            expected: (384, 256),
            actual: (383, 256),
        };
        assert_eq!(
            err.to_string(),
            "Frame dimensions should be 384x256 (rows x columns), got 383x256"
        );
    }
}
