//! Content-based tile filtering.
//!
//! Tiles that are mostly background waste downstream compute, so each tile
//! is checked against a coverage heuristic before any ROI work happens: it
//! must contain enough pixels brighter than a cutoff derived from the global
//! maximum of the parent image. Judging every tile against the same global
//! maximum keeps the decision consistent across the image.

use ndarray::ArrayView2;

/// Returns true if `tile` has enough bright pixels to be worth processing.
///
/// `intensity_threshold` is a percentage of `reference_max` (the global
/// maximum intensity of the parent image); pixels strictly brighter than
/// `reference_max * intensity_threshold / 100` are counted, and the tile
/// passes iff at least `count_threshold` such pixels exist.
///
/// An all-zero tile never passes, whatever the count threshold.
pub fn passes_threshold(
    tile: ArrayView2<'_, u16>,
    intensity_threshold: f64,
    count_threshold: usize,
    reference_max: u16,
) -> bool {
    if tile.iter().all(|&px| px == 0) {
        return false;
    }

    let cutoff = f64::from(reference_max) * intensity_threshold / 100.0;
    let bright = tile.iter().filter(|&&px| f64::from(px) > cutoff).count();

    bright >= count_threshold
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    #[test]
    fn all_zero_tile_always_fails() {
        let tile = Array2::<u16>::zeros((16, 16));
        assert!(!passes_threshold(tile.view(), 1.0, 1, 0));
        assert!(!passes_threshold(tile.view(), 0.0, 1, 65535));
    }

    #[test]
    fn exactly_count_threshold_bright_pixels_pass() {
        let mut tile = Array2::<u16>::zeros((16, 16));
        for j in 0..10 {
            tile[[0, j]] = 65535;
        }
        assert!(passes_threshold(tile.view(), 1.0, 10, 65535));
        assert!(!passes_threshold(tile.view(), 1.0, 11, 65535));
    }

    #[test]
    fn cutoff_scales_with_reference_max() {
        let mut tile = Array2::<u16>::zeros((4, 4));
        tile[[0, 0]] = 100;

        // 100 clears 1% of 1000 but not 1% of 65535.
        assert!(passes_threshold(tile.view(), 1.0, 1, 1000));
        assert!(!passes_threshold(tile.view(), 1.0, 1, 65535));
    }

    #[test]
    fn pixels_at_cutoff_do_not_count() {
        let mut tile = Array2::<u16>::zeros((4, 4));
        tile[[0, 0]] = 100;

        // Cutoff is exactly 100; the comparison is strict.
        assert!(!passes_threshold(tile.view(), 10.0, 1, 1000));
    }

    #[test]
    fn zero_count_threshold_rejects_only_all_zero_tiles() {
        let zeros = Array2::<u16>::zeros((4, 4));
        assert!(!passes_threshold(zeros.view(), 1.0, 0, 65535));

        // A dim but non-zero tile clears a zero count threshold even when
        // no pixel beats the cutoff.
        let mut dim = Array2::<u16>::zeros((4, 4));
        dim[[0, 0]] = 1;
        assert!(passes_threshold(dim.view(), 1.0, 0, 65535));
    }
}
