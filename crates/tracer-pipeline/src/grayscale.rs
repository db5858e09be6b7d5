//! Image decoding and luma conversion.
//!
//! Accepts raw image bytes (PNG, JPEG, BMP, WebP) and produces the
//! single-channel [`IntensityGrid`] the threshold rules operate on.
//!
//! This is the first step in the pipeline: raw bytes in, grid out.

use image::{DynamicImage, RgbaImage};

use crate::grid::IntensityGrid;
use crate::types::PipelineError;

/// Decode raw image bytes into RGBA.
///
/// # Errors
///
/// Returns [`PipelineError::EmptyInput`] if `bytes` is empty.
/// Returns [`PipelineError::ImageDecode`] if the image format is
/// unrecognized or the data is corrupt.
pub fn decode(bytes: &[u8]) -> Result<RgbaImage, PipelineError> {
    if bytes.is_empty() {
        return Err(PipelineError::EmptyInput);
    }

    let img: DynamicImage = image::load_from_memory(bytes)?;
    Ok(img.to_rgba8())
}

/// Luma of one RGB triple: `trunc(0.299 R + 0.587 G + 0.114 B)`.
///
/// Alpha is ignored.
#[must_use]
#[allow(
    clippy::suboptimal_flops,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn luma(r: u8, g: u8, b: u8) -> u8 {
    // Plain multiply-add (no FMA) keeps pure white at exactly 255.0.
    let y = 0.299 * f64::from(r) + 0.587 * f64::from(g) + 0.114 * f64::from(b);
    y.clamp(0.0, 255.0) as u8
}

/// Convert a decoded RGBA image into an intensity grid.
///
/// # Errors
///
/// Returns [`PipelineError::InvalidDimensions`] for a zero-sized image.
pub fn to_intensity(image: &RgbaImage) -> Result<IntensityGrid, PipelineError> {
    let samples = image
        .pixels()
        .map(|p| {
            let [r, g, b, _] = p.0;
            luma(r, g, b)
        })
        .collect();
    IntensityGrid::new(image.width(), image.height(), samples)
}

/// Decode raw image bytes straight to an intensity grid.
///
/// # Errors
///
/// See [`decode`] and [`to_intensity`].
pub fn decode_to_intensity(bytes: &[u8]) -> Result<IntensityGrid, PipelineError> {
    to_intensity(&decode(bytes)?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    /// Helper: encode an RGBA image as a PNG byte buffer.
    fn encode_png(img: &RgbaImage) -> Vec<u8> {
        let mut buf = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(&mut buf);
        image::ImageEncoder::write_image(
            encoder,
            img.as_raw(),
            img.width(),
            img.height(),
            image::ExtendedColorType::Rgba8,
        )
        .unwrap();
        buf
    }

    #[test]
    fn empty_input_returns_error() {
        assert!(matches!(decode(&[]), Err(PipelineError::EmptyInput)));
    }

    #[test]
    fn corrupt_bytes_returns_image_decode_error() {
        let result = decode(&[0xFF, 0xFE, 0x00, 0x01]);
        assert!(matches!(result, Err(PipelineError::ImageDecode(_))));
    }

    #[test]
    fn luma_weights() {
        assert_eq!(luma(0, 0, 0), 0);
        assert_eq!(luma(255, 255, 255), 255);
        // 0.299 * 255 = 76.2
        assert_eq!(luma(255, 0, 0), 76);
        // 0.587 * 255 = 149.7
        assert_eq!(luma(0, 255, 0), 149);
        // 0.114 * 255 = 29.07
        assert_eq!(luma(0, 0, 255), 29);
    }

    #[test]
    fn output_dimensions_match_input() {
        let img = RgbaImage::from_fn(17, 31, |_, _| image::Rgba([128, 64, 32, 255]));
        let grid = decode_to_intensity(&encode_png(&img)).unwrap();
        assert_eq!(grid.width(), 17);
        assert_eq!(grid.height(), 31);
    }

    #[test]
    fn decoded_grid_uses_weighted_luma() {
        let img = RgbaImage::from_fn(3, 1, |x, _| match x {
            0 => image::Rgba([255, 0, 0, 255]),
            1 => image::Rgba([0, 255, 0, 255]),
            _ => image::Rgba([0, 0, 255, 0]),
        });
        let grid = decode_to_intensity(&encode_png(&img)).unwrap();
        assert_eq!(grid.row(0), &[76, 149, 29]);
    }
}
