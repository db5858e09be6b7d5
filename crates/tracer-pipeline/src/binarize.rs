//! Binarization: apply a threshold rule to every pixel.
//!
//! Each pixel is decided independently from the immutable intensity grid,
//! so the output does not depend on visiting order.

use crate::grid::{BooleanMask, IntensityGrid};
use crate::threshold::{Threshold, ThresholdKind};
use crate::types::PipelineError;

/// Produce a foreground mask with the same dimensions as `grid`.
///
/// # Errors
///
/// Propagates [`PipelineError::DegenerateSample`] from neighborhood-based
/// rules. No partial mask is returned.
pub fn binarize(grid: &IntensityGrid, threshold: &ThresholdKind) -> Result<BooleanMask, PipelineError> {
    threshold.check_against(grid.dimensions());

    let mut cells = Vec::with_capacity(grid.as_raw().len());
    for y in 0..grid.height() {
        for x in 0..grid.width() {
            cells.push(threshold.evaluate(grid, x, y)?);
        }
    }
    let mask = BooleanMask::new(grid.width(), grid.height(), cells)?;

    log::debug!(
        "binarized {}x{} grid with {} threshold: {} foreground pixels",
        grid.width(),
        grid.height(),
        threshold.name(),
        mask.count_foreground(),
    );
    Ok(mask)
}
