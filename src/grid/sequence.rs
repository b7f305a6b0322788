//! Lazy tile sequence over a source image.
//!
//! [`tiles`] walks the spans produced by the grid geometry and materializes
//! one tile's pixel block per iteration step. The iterator never holds more
//! than one tile at a time, so peak memory stays at one source image plus
//! one tile regardless of image size.

use ndarray::{s, Array2, ArrayView2};

use super::{spans, SpanIter, TileSpan};
use crate::error::TilebatchError;

/// One tile produced by the sequence: an owned pixel block plus its span.
#[derive(Clone, Debug)]
pub struct TileRecord {
    /// Exclusively owned copy of the tile's pixels.
    pub pixels: Array2<u16>,

    /// Where the tile sits in the source image and in the grid.
    pub span: TileSpan,
}

/// Returns a lazy, finite sequence of tiles over `image`.
///
/// Iteration order is row-major over grid coordinates. Each call produces a
/// fresh sequence; a consumed iterator is not restartable. Tiles may overlap
/// in content when `unit_separation < unit_size`, but no two tiles share a
/// start index.
///
/// # Errors
/// Returns [`TilebatchError::InvalidGeometry`] for zero-sized dimensions.
pub fn tiles<'a>(
    image: ArrayView2<'a, u16>,
    unit_size: [usize; 2],
    unit_separation: [usize; 2],
) -> Result<TileIter<'a>, TilebatchError> {
    let (rows, cols) = image.dim();
    let spans = spans([rows, cols], unit_size, unit_separation)?;

    Ok(TileIter { image, spans })
}

/// Iterator over [`TileRecord`]s, returned by [`tiles`].
#[derive(Debug)]
pub struct TileIter<'a> {
    image: ArrayView2<'a, u16>,
    spans: SpanIter,
}

impl Iterator for TileIter<'_> {
    type Item = TileRecord;

    fn next(&mut self) -> Option<TileRecord> {
        let span = self.spans.next()?;
        let pixels = self
            .image
            .slice(s![span.start[0]..span.end[0], span.start[1]..span.end[1]])
            .to_owned();

        Some(TileRecord { pixels, span })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.spans.size_hint()
    }
}

impl ExactSizeIterator for TileIter<'_> {}
