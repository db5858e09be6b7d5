//! Threshold strategies: decide per pixel whether it is foreground.
//!
//! This module defines the [`Threshold`] trait for per-pixel decisions and
//! the [`ThresholdKind`] enum for selecting a rule at runtime.
//!
//! # Strategy pattern
//!
//! The set of rules is closed: every variant is known at compile time and
//! dispatched through a single `match`, so adding a rule means adding a
//! variant and the compiler points at every place that must handle it.

use serde::{Deserialize, Serialize};

use crate::grid::IntensityGrid;
use crate::sampler;
use crate::types::{Dimensions, PipelineError};

/// Selects which thresholding rule to apply.
///
/// Serialized with an explicit `kind` tag, e.g.
/// `{"kind": "absolute", "less_or_equal": 128}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ThresholdKind {
    /// Foreground iff the pixel's intensity is at most `less_or_equal`.
    Absolute {
        /// Inclusive upper bound on foreground intensity.
        less_or_equal: u8,
    },

    /// Foreground iff the pixel is dark enough *and* stands out from its
    /// local neighborhood.
    ///
    /// The neighborhood is the disk of `radius` around the pixel, clipped
    /// to the image. A pixel qualifies when its intensity is at most
    /// `less_or_equal` and differs from the disk's truncated mean by at
    /// least `greater_diff`. This suppresses large uniform dark regions
    /// while keeping edges and fine detail.
    ///
    /// Evaluation costs `O(radius^2)` per pixel.
    RelativeArea {
        /// Inclusive upper bound on foreground intensity.
        less_or_equal: u8,
        /// Minimum absolute difference from the local mean.
        greater_diff: u8,
        /// Disk radius in pixels.
        radius: u32,
    },
}

impl Default for ThresholdKind {
    fn default() -> Self {
        crate::PipelineConfig::DEFAULT_THRESHOLD
    }
}

impl ThresholdKind {
    /// Short human-readable name used in logs and diagnostics.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Absolute { .. } => "absolute",
            Self::RelativeArea { .. } => "relative_area",
        }
    }

    /// Warn when parameters exceed what the image can give them.
    ///
    /// A radius larger than the image still works: every window simply
    /// clips to the whole grid, so the rule degrades toward a global mean.
    pub fn check_against(&self, dimensions: Dimensions) {
        if let Self::RelativeArea { radius, .. } = *self
            && radius >= dimensions.max_side()
        {
            log::warn!(
                "relative_area radius {radius} covers the whole {}x{} image; \
                 the local mean degrades to a clipped global mean",
                dimensions.width,
                dimensions.height,
            );
        }
    }
}

/// Trait for per-pixel thresholding rules.
///
/// Input: the full intensity grid and a coordinate inside it.
/// Output: whether that pixel belongs to the foreground.
pub trait Threshold {
    /// Evaluate the rule at `(x, y)`. Pure: the grid is never modified.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::DegenerateSample`] if a neighborhood-based
    /// rule has no samples to average.
    fn evaluate(&self, grid: &IntensityGrid, x: u32, y: u32) -> Result<bool, PipelineError>;
}

impl Threshold for ThresholdKind {
    fn evaluate(&self, grid: &IntensityGrid, x: u32, y: u32) -> Result<bool, PipelineError> {
        let value = grid.get(x, y);
        match *self {
            Self::Absolute { less_or_equal } => Ok(value <= less_or_equal),
            Self::RelativeArea {
                less_or_equal,
                greater_diff,
                radius,
            } => {
                if value > less_or_equal {
                    return Ok(false);
                }
                let mean = sampler::disk_mean(grid, x, y, radius)?;
                Ok(mean.abs_diff(value) >= greater_diff)
            }
        }
    }
}
