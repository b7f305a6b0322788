//! Grid coordinate newtype.
//!
//! A tile or ROI is identified within its partition grid by a pair of
//! non-negative indices. The coordinate is unique per unit within one image
//! but not guaranteed contiguous once content filtering has discarded tiles.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Position of a tile or ROI within its partition grid.
///
/// `i` indexes axis 0 (rows), `j` indexes axis 1 (columns). The `Display`
/// form `{i}x-{j}y` is the token embedded in output filenames.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GridCoord {
    pub i: usize,
    pub j: usize,
}

impl GridCoord {
    /// Creates a new grid coordinate.
    #[inline]
    pub fn new(i: usize, j: usize) -> Self {
        Self { i, j }
    }
}

impl fmt::Debug for GridCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GridCoord({}, {})", self.i, self.j)
    }
}

impl fmt::Display for GridCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x-{}y", self.i, self.j)
    }
}

impl From<(usize, usize)> for GridCoord {
    fn from((i, j): (usize, usize)) -> Self {
        Self::new(i, j)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_filename_token() {
        assert_eq!(GridCoord::new(3, 7).to_string(), "3x-7y");
    }

    #[test]
    fn ordering_is_row_major() {
        let mut coords = vec![GridCoord::new(1, 0), GridCoord::new(0, 2), GridCoord::new(0, 1)];
        coords.sort();
        assert_eq!(
            coords,
            vec![GridCoord::new(0, 1), GridCoord::new(0, 2), GridCoord::new(1, 0)]
        );
    }
}
