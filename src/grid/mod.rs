//! Grid geometry for tile and ROI partitioning.
//!
//! This module answers the purely geometric questions of the pipeline: how
//! many units (tiles or ROIs) fit into an image along each axis, where each
//! unit starts and ends, and what happens to the pixels left over after the
//! last full stride. The same math is applied twice per image: once at tile
//! granularity over the whole frame, and once at ROI granularity inside each
//! accepted tile.
//!
//! # Design Principles
//!
//! 1. **Remainder absorption**: leftover pixels after the last full stride
//!    are absorbed into the final row/column, so the union of all unit spans
//!    always covers the image exactly. The last unit may therefore be larger
//!    than the nominal unit size.
//!
//! 2. **Truncation, not rejection**: an image smaller than one unit along an
//!    axis still yields one unit, truncated to the image extent. Only
//!    zero-sized inputs are errors.
//!
//! 3. **Deterministic order**: spans are enumerated row-major (outer axis 0,
//!    inner axis 1), so grid coordinates, filenames, and job contents are
//!    reproducible across runs.

mod coord;
mod sequence;

use crate::error::TilebatchError;

pub use coord::GridCoord;
pub use sequence::{tiles, TileIter, TileRecord};

/// Unit counts and remainder offsets for one partitioning of an image.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UnitGrid {
    /// Number of units along each axis (rows, columns).
    pub counts: [usize; 2],

    /// Pixels left over after the last full stride along each axis.
    ///
    /// Absorbed into the final unit of that axis by [`spans`].
    pub offset: [usize; 2],
}

impl UnitGrid {
    /// Total number of units in the grid.
    #[inline]
    pub fn len(&self) -> usize {
        self.counts[0] * self.counts[1]
    }

    /// Returns true if the grid contains no units.
    ///
    /// Cannot happen for grids produced by [`compute_unit_grid`], which
    /// clamps every axis count to at least 1.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Computes how many units of `unit_size`, placed every `unit_separation`
/// pixels, fit into an image of `image_shape`, and the per-axis remainder.
///
/// `counts[axis] = floor((shape - size) / separation) + 1` when the image is
/// at least one unit long along that axis; otherwise the count is 1 and the
/// single unit is truncated to the image extent (`offset` is 0 there, the
/// truncation happens in [`spans`]).
///
/// # Errors
/// Returns [`TilebatchError::InvalidGeometry`] if any dimension of the
/// image, unit size, or separation is zero.
pub fn compute_unit_grid(
    image_shape: [usize; 2],
    unit_size: [usize; 2],
    unit_separation: [usize; 2],
) -> Result<UnitGrid, TilebatchError> {
    validate_dims(image_shape, unit_size, unit_separation)?;

    let mut counts = [1usize; 2];
    let mut offset = [0usize; 2];

    for axis in 0..2 {
        if image_shape[axis] >= unit_size[axis] {
            counts[axis] = (image_shape[axis] - unit_size[axis]) / unit_separation[axis] + 1;
            offset[axis] = image_shape[axis]
                - ((counts[axis] - 1) * unit_separation[axis] + unit_size[axis]);
        }
        // Image shorter than one unit: one truncated unit, no remainder.
    }

    Ok(UnitGrid { counts, offset })
}

/// The pixel extent of one unit within the partition grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TileSpan {
    /// Inclusive start index along (axis 0, axis 1).
    pub start: [usize; 2],

    /// Exclusive end index along (axis 0, axis 1).
    pub end: [usize; 2],

    /// Position of this unit within the grid.
    pub coord: GridCoord,
}

impl TileSpan {
    /// Extent of the span along each axis, in pixels.
    #[inline]
    pub fn shape(&self) -> [usize; 2] {
        [self.end[0] - self.start[0], self.end[1] - self.start[1]]
    }
}

/// Enumerates unit spans row-major over the grid computed by
/// [`compute_unit_grid`].
///
/// The sequence is finite (`counts[0] * counts[1]` spans) and each call
/// produces a fresh iterator. Start indices are `coord * separation`; the
/// end index is `start + size` except along the final row/column, where the
/// remainder is absorbed so the end reaches exactly the image extent.
pub fn spans(
    image_shape: [usize; 2],
    unit_size: [usize; 2],
    unit_separation: [usize; 2],
) -> Result<SpanIter, TilebatchError> {
    let grid = compute_unit_grid(image_shape, unit_size, unit_separation)?;

    Ok(SpanIter {
        image_shape,
        unit_size,
        unit_separation,
        counts: grid.counts,
        next: 0,
        total: grid.len(),
    })
}

/// Iterator over [`TileSpan`]s, returned by [`spans`].
#[derive(Clone, Debug)]
pub struct SpanIter {
    image_shape: [usize; 2],
    unit_size: [usize; 2],
    unit_separation: [usize; 2],
    counts: [usize; 2],
    next: usize,
    total: usize,
}

impl SpanIter {
    fn span_at(&self, i: usize, j: usize) -> TileSpan {
        let idx = [i, j];
        let mut start = [0usize; 2];
        let mut end = [0usize; 2];

        for axis in 0..2 {
            start[axis] = idx[axis] * self.unit_separation[axis];
            end[axis] = if idx[axis] + 1 == self.counts[axis] {
                // Final unit along this axis absorbs the remainder (or is
                // truncated when the image is shorter than one unit).
                self.image_shape[axis]
            } else {
                start[axis] + self.unit_size[axis]
            };
        }

        TileSpan {
            start,
            end,
            coord: GridCoord::new(i, j),
        }
    }
}

impl Iterator for SpanIter {
    type Item = TileSpan;

    fn next(&mut self) -> Option<TileSpan> {
        if self.next >= self.total {
            return None;
        }
        let i = self.next / self.counts[1];
        let j = self.next % self.counts[1];
        self.next += 1;
        Some(self.span_at(i, j))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.total - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for SpanIter {}

fn validate_dims(
    image_shape: [usize; 2],
    unit_size: [usize; 2],
    unit_separation: [usize; 2],
) -> Result<(), TilebatchError> {
    for axis in 0..2 {
        if image_shape[axis] == 0 {
            return Err(TilebatchError::geometry(format!(
                "image shape has zero extent along axis {axis}"
            )));
        }
        if unit_size[axis] == 0 {
            return Err(TilebatchError::geometry(format!(
                "unit size is zero along axis {axis}"
            )));
        }
        if unit_separation[axis] == 0 {
            return Err(TilebatchError::geometry(format!(
                "unit separation is zero along axis {axis}"
            )));
        }
    }
    Ok(())
}
