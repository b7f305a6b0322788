//! Image codec seam: 16-bit grayscale files to and from pixel arrays.
//!
//! The partitioning core works on `ndarray` arrays and never touches
//! encoding; this module is the single place where the `image` crate is
//! used. Coordinate systems differ between the two worlds: ndarray indexes
//! `[row, col]` with `(height, width)` dimensions, the image crate indexes
//! `(x, y)` with `(width, height)` dimensions, so conversions swap axes.

use std::path::Path;

use image::{DynamicImage, ImageBuffer, Luma};
use ndarray::{Array2, ArrayView2};

use crate::error::TilebatchError;

type Gray16Image = ImageBuffer<Luma<u16>, Vec<u16>>;

/// Reads an image file into a 16-bit grayscale pixel array.
///
/// Non-16-bit inputs are widened/converted through the image crate's
/// grayscale conversion, so 8-bit sources remain readable.
pub fn read_image(path: &Path) -> Result<Array2<u16>, TilebatchError> {
    let img = image::open(path).map_err(|source| TilebatchError::ImageRead {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(gray16_to_array(&img.into_luma16()))
}

/// Writes a 16-bit grayscale pixel array to `path`; the format is inferred
/// from the extension.
pub fn write_image(path: &Path, pixels: ArrayView2<'_, u16>) -> Result<(), TilebatchError> {
    let img = DynamicImage::ImageLuma16(array_to_gray16(pixels));

    img.save(path).map_err(|source| TilebatchError::ImageWrite {
        path: path.to_path_buf(),
        source,
    })
}

/// Converts an image-crate buffer to an ndarray array, mapping pixel (x, y)
/// to array index [y, x].
fn gray16_to_array(img: &Gray16Image) -> Array2<u16> {
    let (width, height) = img.dimensions();
    Array2::from_shape_fn((height as usize, width as usize), |(y, x)| {
        img.get_pixel(x as u32, y as u32)[0]
    })
}

/// Converts an ndarray array to an image-crate buffer, mapping array index
/// [y, x] to pixel (x, y).
fn array_to_gray16(arr: ArrayView2<'_, u16>) -> Gray16Image {
    let (height, width) = arr.dim();
    let mut img = Gray16Image::new(width as u32, height as u32);

    for y in 0..height {
        for x in 0..width {
            img.put_pixel(x as u32, y as u32, Luma([arr[[y, x]]]));
        }
    }

    img
}

/// Maximum pixel intensity of an array; 0 for an all-zero image.
pub fn max_intensity(pixels: ArrayView2<'_, u16>) -> u16 {
    pixels.iter().copied().max().unwrap_or(0)
}
