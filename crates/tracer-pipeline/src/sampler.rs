//! Neighborhood sampling: rectangular and disk-shaped windows around a
//! pixel, clipped to the grid.
//!
//! Pixels near the border get a smaller, asymmetric sample set. There is
//! no padding, reflection, or wraparound.

use crate::grid::IntensityGrid;
use crate::types::{Dimensions, PipelineError};

/// A clipped, half-open rectangle `[x0, x1) x [y0, y1)` of grid cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    /// First column (inclusive).
    pub x0: u32,
    /// Last column (exclusive).
    pub x1: u32,
    /// First row (inclusive).
    pub y0: u32,
    /// Last row (exclusive).
    pub y1: u32,
}

impl Window {
    /// The square `[x - r, x + r] x [y - r, y + r]` clipped to `dimensions`.
    #[must_use]
    pub fn around(dimensions: Dimensions, x: u32, y: u32, radius: u32) -> Self {
        Self {
            x0: x.saturating_sub(radius),
            x1: x.saturating_add(radius).saturating_add(1).min(dimensions.width),
            y0: y.saturating_sub(radius),
            y1: y.saturating_add(radius).saturating_add(1).min(dimensions.height),
        }
    }

    /// Number of cells covered.
    #[must_use]
    pub const fn area(&self) -> u64 {
        (self.x1.saturating_sub(self.x0)) as u64 * (self.y1.saturating_sub(self.y0)) as u64
    }

    /// Whether the window covers no cells.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.x0 >= self.x1 || self.y0 >= self.y1
    }
}

/// Cells inside `window` as `(x, y, sample)`, in row-major order.
fn window_cells(grid: &IntensityGrid, window: Window) -> impl Iterator<Item = (u32, u32, u8)> + '_ {
    let x_end = window.x1.min(grid.width());
    let y_end = window.y1.min(grid.height());
    let x_start = window.x0.min(x_end);
    (window.y0..y_end).flat_map(move |y| {
        grid.row(y)[x_start as usize..x_end as usize]
            .iter()
            .zip(x_start..)
            .map(move |(&v, x)| (x, y, v))
    })
}

/// All samples inside `window`, in row-major order.
pub fn sample_rect(grid: &IntensityGrid, window: Window) -> impl Iterator<Item = u8> + '_ {
    window_cells(grid, window).map(|(_, _, v)| v)
}

/// Samples within Euclidean radius `radius` of `(x, y)`, in row-major order.
///
/// A cell at offset `(dx, dy)` is included iff
/// `floor(sqrt(dx^2 + dy^2)) <= radius`, i.e. `dx^2 + dy^2 < (radius + 1)^2`.
pub fn sample_disk(
    grid: &IntensityGrid,
    x: u32,
    y: u32,
    radius: u32,
) -> impl Iterator<Item = u8> + '_ {
    let window = Window::around(grid.dimensions(), x, y, radius);
    let limit = (i64::from(radius) + 1).pow(2);
    window_cells(grid, window).filter_map(move |(sx, sy, v)| {
        let dx = i64::from(sx) - i64::from(x);
        let dy = i64::from(sy) - i64::from(y);
        (dx * dx + dy * dy < limit).then_some(v)
    })
}

/// Truncated arithmetic mean of the disk around `(x, y)`.
///
/// # Errors
///
/// Returns [`PipelineError::DegenerateSample`] if the disk holds no
/// samples.
pub fn disk_mean(grid: &IntensityGrid, x: u32, y: u32, radius: u32) -> Result<u8, PipelineError> {
    let (sum, count) = sample_disk(grid, x, y, radius)
        .fold((0_u64, 0_u64), |(sum, count), v| {
            (sum + u64::from(v), count + 1)
        });
    if count == 0 {
        return Err(PipelineError::DegenerateSample { x, y });
    }
    // Integer division truncates exactly like the float mean cast to u8.
    Ok(u8::try_from(sum / count).unwrap_or(u8::MAX))
}
