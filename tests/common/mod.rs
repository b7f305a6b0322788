use std::path::Path;

use ndarray::Array2;

/// Writes a 16-bit TIFF where every pixel carries `value`.
pub fn write_flat_tif(path: &Path, rows: usize, cols: usize, value: u16) {
    let pixels = Array2::<u16>::from_elem((rows, cols), value);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create parent dir");
    }
    tilebatch::codec::write_image(path, pixels.view()).expect("write tif file");
}

/// Writes a 16-bit TIFF with a value ramp, so every tile has bright content.
pub fn write_ramp_tif(path: &Path, rows: usize, cols: usize) {
    let pixels = Array2::<u16>::from_shape_fn((rows, cols), |(r, c)| ((r + c) * 7 + 100) as u16);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create parent dir");
    }
    tilebatch::codec::write_image(path, pixels.view()).expect("write tif file");
}
