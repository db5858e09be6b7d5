//! Dense row-major grids: luma intensities in, foreground mask out.
//!
//! Both grids are flattened `width * height` buffers indexed by
//! `y * width + x`. Dimensions are checked once at construction so the
//! rest of the pipeline can index without re-validating.

use serde::{Deserialize, Serialize};

use crate::types::{Dimensions, GrayImage, PipelineError};

/// Single-channel 8-bit intensity samples, immutable after construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "GridParts<u8>")]
pub struct IntensityGrid {
    width: u32,
    height: u32,
    samples: Vec<u8>,
}

/// Boolean foreground mask (`true` = foreground).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "GridParts<bool>")]
pub struct BooleanMask {
    width: u32,
    height: u32,
    cells: Vec<bool>,
}

/// Unvalidated wire form shared by both grids.
#[derive(Deserialize)]
struct GridParts<T> {
    width: u32,
    height: u32,
    #[serde(alias = "samples", alias = "cells")]
    data: Vec<T>,
}

impl TryFrom<GridParts<u8>> for IntensityGrid {
    type Error = PipelineError;

    fn try_from(parts: GridParts<u8>) -> Result<Self, Self::Error> {
        Self::new(parts.width, parts.height, parts.data)
    }
}

impl TryFrom<GridParts<bool>> for BooleanMask {
    type Error = PipelineError;

    fn try_from(parts: GridParts<bool>) -> Result<Self, Self::Error> {
        Self::new(parts.width, parts.height, parts.data)
    }
}

/// Check that a flat buffer matches non-zero `width * height`.
fn check_dimensions(width: u32, height: u32, len: usize) -> Result<(), PipelineError> {
    if width == 0 || height == 0 {
        return Err(PipelineError::InvalidDimensions(format!(
            "grid must be at least 1x1, got {width}x{height}"
        )));
    }
    let expected = u64::from(width) * u64::from(height);
    if u64::try_from(len).ok() != Some(expected) {
        return Err(PipelineError::InvalidDimensions(format!(
            "{width}x{height} grid needs {expected} cells, got {len}"
        )));
    }
    Ok(())
}

/// Flatten rows into a row-major buffer, rejecting ragged or empty input.
fn flatten_rows<T: Copy, R: AsRef<[T]>>(rows: &[R]) -> Result<(u32, u32, Vec<T>), PipelineError> {
    let first = rows
        .first()
        .ok_or_else(|| PipelineError::InvalidDimensions("grid has no rows".to_string()))?;
    let width = first.as_ref().len();

    let mut data = Vec::with_capacity(width * rows.len());
    for (y, row) in rows.iter().enumerate() {
        let row = row.as_ref();
        if row.len() != width {
            return Err(PipelineError::InvalidDimensions(format!(
                "row {y} has {} cells, expected {width}",
                row.len()
            )));
        }
        data.extend_from_slice(row);
    }

    let width = u32::try_from(width)
        .map_err(|_| PipelineError::InvalidDimensions(format!("width {width} overflows u32")))?;
    let height = u32::try_from(rows.len()).map_err(|_| {
        PipelineError::InvalidDimensions(format!("height {} overflows u32", rows.len()))
    })?;
    check_dimensions(width, height, data.len())?;
    Ok((width, height, data))
}

impl IntensityGrid {
    /// Wrap a row-major sample buffer.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidDimensions`] if either side is zero
    /// or `samples.len() != width * height`.
    pub fn new(width: u32, height: u32, samples: Vec<u8>) -> Result<Self, PipelineError> {
        check_dimensions(width, height, samples.len())?;
        Ok(Self {
            width,
            height,
            samples,
        })
    }

    /// Build a grid from equal-length rows.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidDimensions`] if there are no rows,
    /// the rows are empty, or any row differs in length from the first.
    pub fn from_rows<R: AsRef<[u8]>>(rows: &[R]) -> Result<Self, PipelineError> {
        let (width, height, samples) = flatten_rows(rows)?;
        Ok(Self {
            width,
            height,
            samples,
        })
    }

    /// Adopt a decoded luma image.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidDimensions`] for a zero-sized image.
    pub fn from_gray_image(image: &GrayImage) -> Result<Self, PipelineError> {
        Self::new(image.width(), image.height(), image.as_raw().clone())
    }

    /// Width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Width and height together.
    #[must_use]
    pub const fn dimensions(&self) -> Dimensions {
        Dimensions {
            width: self.width,
            height: self.height,
        }
    }

    /// Sample at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` lies outside the grid.
    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> u8 {
        debug_assert!(x < self.width && y < self.height, "({x}, {y}) out of bounds");
        self.samples[y as usize * self.width as usize + x as usize]
    }

    /// One row of samples.
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    #[must_use]
    pub fn row(&self, y: u32) -> &[u8] {
        let start = y as usize * self.width as usize;
        &self.samples[start..start + self.width as usize]
    }

    /// The flat row-major sample buffer.
    #[must_use]
    pub fn as_raw(&self) -> &[u8] {
        &self.samples
    }
}

impl BooleanMask {
    /// Wrap a row-major cell buffer.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidDimensions`] if either side is zero
    /// or `cells.len() != width * height`.
    pub fn new(width: u32, height: u32, cells: Vec<bool>) -> Result<Self, PipelineError> {
        check_dimensions(width, height, cells.len())?;
        Ok(Self {
            width,
            height,
            cells,
        })
    }

    /// Build a mask from equal-length rows.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidDimensions`] if there are no rows,
    /// the rows are empty, or any row differs in length from the first.
    pub fn from_rows<R: AsRef<[bool]>>(rows: &[R]) -> Result<Self, PipelineError> {
        let (width, height, cells) = flatten_rows(rows)?;
        Ok(Self {
            width,
            height,
            cells,
        })
    }

    /// A mask with every cell set to `value`.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidDimensions`] if either side is zero.
    pub fn filled(width: u32, height: u32, value: bool) -> Result<Self, PipelineError> {
        let len = usize::try_from(u64::from(width) * u64::from(height)).map_err(|_| {
            PipelineError::InvalidDimensions(format!("{width}x{height} exceeds addressable memory"))
        })?;
        Self::new(width, height, vec![value; len])
    }

    /// Width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Width and height together.
    #[must_use]
    pub const fn dimensions(&self) -> Dimensions {
        Dimensions {
            width: self.width,
            height: self.height,
        }
    }

    /// Cell at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` lies outside the mask.
    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> bool {
        debug_assert!(x < self.width && y < self.height, "({x}, {y}) out of bounds");
        self.cells[y as usize * self.width as usize + x as usize]
    }

    /// The flat row-major cell buffer.
    #[must_use]
    pub fn as_raw(&self) -> &[bool] {
        &self.cells
    }

    /// Copy the mask out as nested rows.
    #[must_use]
    pub fn to_rows(&self) -> Vec<Vec<bool>> {
        self.cells
            .chunks_exact(self.width as usize)
            .map(<[bool]>::to_vec)
            .collect()
    }

    /// Number of foreground (`true`) cells.
    #[must_use]
    pub fn count_foreground(&self) -> u64 {
        self.cells.iter().map(|&c| u64::from(c)).sum()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn from_rows_is_row_major() {
        let grid = IntensityGrid::from_rows(&[[1, 2, 3], [4, 5, 6]]).unwrap();
        assert_eq!(grid.width(), 3);
        assert_eq!(grid.height(), 2);
        assert_eq!(grid.get(2, 0), 3);
        assert_eq!(grid.get(0, 1), 4);
        assert_eq!(grid.row(1), &[4, 5, 6]);
        assert_eq!(grid.as_raw(), &[1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let rows: Vec<Vec<u8>> = vec![vec![1, 2], vec![3]];
        let err = IntensityGrid::from_rows(&rows).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidDimensions(_)));
    }

    #[test]
    fn empty_rows_are_rejected() {
        let none: [[u8; 0]; 0] = [];
        assert!(matches!(
            IntensityGrid::from_rows(&none),
            Err(PipelineError::InvalidDimensions(_))
        ));
        let zero_width: Vec<Vec<bool>> = vec![vec![], vec![]];
        assert!(matches!(
            BooleanMask::from_rows(&zero_width),
            Err(PipelineError::InvalidDimensions(_))
        ));
    }

    #[test]
    fn new_checks_buffer_length() {
        assert!(IntensityGrid::new(2, 2, vec![0; 4]).is_ok());
        assert!(matches!(
            IntensityGrid::new(2, 2, vec![0; 5]),
            Err(PipelineError::InvalidDimensions(_))
        ));
        assert!(matches!(
            BooleanMask::new(0, 3, vec![]),
            Err(PipelineError::InvalidDimensions(_))
        ));
    }

    #[test]
    fn from_gray_image_copies_samples() {
        let img = GrayImage::from_fn(3, 2, |x, y| image::Luma([u8::try_from(x + 10 * y).unwrap()]));
        let grid = IntensityGrid::from_gray_image(&img).unwrap();
        assert_eq!(grid.dimensions(), Dimensions { width: 3, height: 2 });
        assert_eq!(grid.get(2, 1), 12);
    }

    #[test]
    fn mask_round_trips_rows() {
        let rows = vec![vec![true, false], vec![false, true], vec![true, true]];
        let mask = BooleanMask::from_rows(&rows).unwrap();
        assert_eq!(mask.to_rows(), rows);
        assert_eq!(mask.count_foreground(), 4);
        assert!(mask.get(1, 1));
        assert!(!mask.get(1, 0));
    }

    #[test]
    fn filled_mask() {
        let mask = BooleanMask::filled(4, 3, true).unwrap();
        assert_eq!(mask.count_foreground(), 12);
        assert!(BooleanMask::filled(0, 3, true).is_err());
    }

    #[test]
    fn deserialize_validates_dimensions() {
        let ok: IntensityGrid =
            serde_json::from_str(r#"{"width":2,"height":1,"samples":[7,9]}"#).unwrap();
        assert_eq!(ok.get(1, 0), 9);
        let bad = serde_json::from_str::<BooleanMask>(r#"{"width":2,"height":2,"cells":[true]}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn serialize_then_deserialize_mask() {
        let mask = BooleanMask::from_rows(&[[true, false, true]]).unwrap();
        let json = serde_json::to_string(&mask).unwrap();
        let back: BooleanMask = serde_json::from_str(&json).unwrap();
        assert_eq!(mask, back);
    }
}
