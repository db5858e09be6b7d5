//! Raster export: foreground masks and intensity grids as grayscale images.
//!
//! Foreground renders black (`0`) and background white (`255`), so the
//! mask reads like ink on paper.

use image::{GrayImage, Luma};
use tracer_pipeline::{BooleanMask, IntensityGrid};

use crate::ExportError;

/// Render a mask: `true -> 0` (black), `false -> 255` (white).
#[must_use = "returns the rendered mask image"]
pub fn mask_to_image(mask: &BooleanMask) -> GrayImage {
    GrayImage::from_fn(mask.width(), mask.height(), |x, y| {
        Luma([if mask.get(x, y) { 0 } else { 255 }])
    })
}

/// Copy an intensity grid into a grayscale image.
#[must_use = "returns the grayscale image"]
pub fn intensity_to_image(grid: &IntensityGrid) -> GrayImage {
    GrayImage::from_fn(grid.width(), grid.height(), |x, y| Luma([grid.get(x, y)]))
}

/// Encode a grayscale image as PNG bytes.
///
/// # Errors
///
/// Returns [`ExportError::Png`] if the encoder rejects the image.
pub fn to_png(image: &GrayImage) -> Result<Vec<u8>, ExportError> {
    let mut buf = Vec::new();
    let encoder = image::codecs::png::PngEncoder::new(&mut buf);
    image::ImageEncoder::write_image(
        encoder,
        image.as_raw(),
        image.width(),
        image.height(),
        image::ExtendedColorType::L8,
    )?;
    Ok(buf)
}
