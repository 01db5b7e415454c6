// SPDX-License-Identifier: GPL-3.0-or-later
use ndarray::s;

use super::{Point, RadiometricPlane};
use crate::temperature::RawCount;

/// The part of a plane searched for extremes: the whole plane shrunk by `padding` on every side.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct SearchRegion {
    top: usize,
    left: usize,
    // Exclusive
    bottom: usize,
    right: usize,
}

impl SearchRegion {
    /// Shrink a `(rows, columns)` plane by `padding` on all four sides.
    ///
    /// If the padding consumes either dimension the region is empty.
    pub(crate) fn padded(dim: (usize, usize), padding: usize) -> Self {
        let (rows, columns) = dim;
        if padding.saturating_mul(2) >= rows || padding.saturating_mul(2) >= columns {
            return Self::empty();
        }
        Self {
            top: padding,
            left: padding,
            bottom: rows - padding,
            right: columns - padding,
        }
    }

    fn empty() -> Self {
        Self {
            top: 0,
            left: 0,
            bottom: 0,
            right: 0,
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.top >= self.bottom || self.left >= self.right
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Extremum {
    pub(crate) point: Point,
    pub(crate) count: RawCount,
}

/// The coldest and hottest samples in a search region.
///
/// Either side is `None` when no sample in the region beat the starting value for that side
/// (`RawCount::MAX` for the lowest, zero for the highest), or when the region is empty.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct ExtremumResult {
    pub(crate) lowest: Option<Extremum>,
    pub(crate) highest: Option<Extremum>,
}

/// Find the lowest and highest counts within `region`.
///
/// Samples are visited in row-major order and only a strictly lower (or higher) value replaces
/// the current one, so the first occurrence of a repeated extreme value wins.
pub(crate) fn scan(plane: &RadiometricPlane<'_>, region: SearchRegion) -> ExtremumResult {
    if region.is_empty() {
        return ExtremumResult::default();
    }
    let (rows, columns) = plane.dim();
    let bottom = region.bottom.min(rows);
    let right = region.right.min(columns);
    if region.top >= bottom || region.left >= right {
        return ExtremumResult::default();
    }
    let window = plane
        .samples()
        .slice_move(s![region.top..bottom, region.left..right]);
    let mut lowest_count = RawCount::MAX;
    let mut highest_count: RawCount = 0;
    let mut result = ExtremumResult::default();
    for ((row, col), sample) in window.indexed_iter() {
        let count = *sample as RawCount;
        let point = Point::new(region.left + col, region.top + row);
        if count < lowest_count {
            lowest_count = count;
            result.lowest = Some(Extremum { point, count });
        }
        if count > highest_count {
            highest_count = count;
            result.highest = Some(Extremum { point, count });
        }
    }
    result
}

#[cfg(test)]
mod test {
    use ndarray::Array2;

    use super::{scan, Extremum, ExtremumResult, SearchRegion};
    use crate::frame::{Point, RadiometricPlane};

    fn filled(size: usize, value: u16) -> Array2<u16> {
        Array2::from_elem((size, size), value)
    }

    #[test]
    fn single_extremes() {
        let mut samples = filled(64, 2000);
        samples[[10, 10]] = 5000;
        samples[[50, 50]] = 100;
        let plane = RadiometricPlane::new(samples.view());
        let result = scan(&plane, SearchRegion::padded(plane.dim(), 10));
        assert_eq!(
            result,
            ExtremumResult {
                lowest: Some(Extremum {
                    point: Point::new(50, 50),
                    count: 100
                }),
                highest: Some(Extremum {
                    point: Point::new(10, 10),
                    count: 5000
                }),
            }
        );
    }

    #[test]
    fn first_maximum_wins() {
        let mut samples = filled(16, 2000);
        samples[[5, 5]] = 9000;
        samples[[5, 6]] = 9000;
        samples[[6, 5]] = 9000;
        let plane = RadiometricPlane::new(samples.view());
        let result = scan(&plane, SearchRegion::padded(plane.dim(), 2));
        assert_eq!(result.highest.unwrap().point, Point::new(5, 5));
    }

    #[test]
    fn first_minimum_wins() {
        let mut samples = filled(16, 2000);
        samples[[9, 3]] = 10;
        samples[[4, 12]] = 10;
        let plane = RadiometricPlane::new(samples.view());
        let result = scan(&plane, SearchRegion::padded(plane.dim(), 2));
        assert_eq!(result.lowest.unwrap().point, Point::new(12, 4));
    }

    #[test]
    fn plateau_picks_region_origin() {
        let samples = filled(16, 3000);
        let plane = RadiometricPlane::new(samples.view());
        let result = scan(&plane, SearchRegion::padded(plane.dim(), 3));
        assert_eq!(result.lowest.unwrap().point, Point::new(3, 3));
        assert_eq!(result.highest.unwrap().point, Point::new(3, 3));
    }

    #[test]
    fn padding_excludes_edges() {
        let mut samples = filled(16, 2000);
        samples[[0, 0]] = 9000;
        samples[[15, 15]] = 1;
        samples[[1, 8]] = 8000;
        let plane = RadiometricPlane::new(samples.view());
        let result = scan(&plane, SearchRegion::padded(plane.dim(), 2));
        assert_eq!(result.highest.unwrap().count, 2000);
        assert_eq!(result.lowest.unwrap().count, 2000);
        let result = scan(&plane, SearchRegion::padded(plane.dim(), 1));
        assert_eq!(result.highest.unwrap().point, Point::new(8, 1));
    }

    #[test]
    fn sentinels() {
        // Nothing is lower than the starting minimum
        let samples = filled(8, i16::MAX as u16);
        let plane = RadiometricPlane::new(samples.view());
        let result = scan(&plane, SearchRegion::padded(plane.dim(), 2));
        assert_eq!(result.lowest, None);
        assert_eq!(result.highest.unwrap().point, Point::new(2, 2));
        // Nothing is higher than the starting maximum
        let samples = filled(8, 0);
        let plane = RadiometricPlane::new(samples.view());
        let result = scan(&plane, SearchRegion::padded(plane.dim(), 2));
        assert_eq!(result.highest, None);
        assert_eq!(result.lowest.unwrap().count, 0);
    }

    #[test]
    fn degenerate_region() {
        let samples = filled(10, 1234);
        let plane = RadiometricPlane::new(samples.view());
        let region = SearchRegion::padded(plane.dim(), 5);
        assert!(region.is_empty());
        assert_eq!(scan(&plane, region), ExtremumResult::default());
        assert!(SearchRegion::padded((10, 40), 30).is_empty());
        assert!(!SearchRegion::padded(plane.dim(), 4).is_empty());
    }
}
