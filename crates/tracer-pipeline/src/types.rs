//! Shared types for the tracer binarization and clustering pipeline.

use serde::{Deserialize, Serialize};

use crate::grid::{BooleanMask, IntensityGrid};
use crate::threshold::ThresholdKind;

/// Re-export `GrayImage` so downstream crates can hand decoded luma
/// buffers to the pipeline without depending on `image` directly.
pub use image::GrayImage;

/// An integer pixel coordinate.
///
/// Serialized as a two-element `[x, y]` array so a list of clusters
/// encodes as a plain array of arrays of pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "[u32; 2]", into = "[u32; 2]")]
pub struct Point {
    /// Column (pixels from left edge).
    pub x: u32,
    /// Row (pixels from top edge).
    pub y: u32,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Chebyshev (chessboard) distance to another point.
    #[must_use]
    pub const fn chebyshev_distance(self, other: Self) -> u32 {
        let dx = self.x.abs_diff(other.x);
        let dy = self.y.abs_diff(other.y);
        if dx > dy { dx } else { dy }
    }
}

impl From<[u32; 2]> for Point {
    fn from([x, y]: [u32; 2]) -> Self {
        Self { x, y }
    }
}

impl From<Point> for [u32; 2] {
    fn from(p: Point) -> Self {
        [p.x, p.y]
    }
}

/// A group of foreground pixels discovered by one flood fill.
///
/// Points are kept in discovery order: the first point is the seed found
/// by the row-major scan, the rest follow breadth-first dequeue order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cluster(Vec<Point>);

impl Cluster {
    /// Create a cluster from points in discovery order.
    #[must_use]
    pub const fn new(points: Vec<Point>) -> Self {
        Self(points)
    }

    /// Returns `true` if the cluster has no points.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of pixels in the cluster.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// The seed pixel that started the flood fill, if any.
    #[must_use]
    pub fn seed(&self) -> Option<&Point> {
        self.0.first()
    }

    /// Returns a slice of all points in discovery order.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.0
    }

    /// Consumes the cluster and returns the underlying vector of points.
    #[must_use]
    pub fn into_points(self) -> Vec<Point> {
        self.0
    }
}

/// Image dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Dimensions {
    /// Total number of pixels (`width * height`).
    #[must_use]
    pub const fn pixel_count(self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// The larger of the two sides.
    #[must_use]
    pub const fn max_side(self) -> u32 {
        if self.width > self.height {
            self.width
        } else {
            self.height
        }
    }
}

/// Configuration for the binarization and clustering pipeline.
///
/// Missing fields fall back to their defaults when deserialized, so a
/// config JSON may specify only the threshold or only `max_distance`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Rule deciding whether a pixel belongs to the foreground.
    pub threshold: ThresholdKind,

    /// Chebyshev ring radius within which two foreground pixels join
    /// the same cluster. Must be at least 1.
    ///
    /// Clustering costs `O(F * max_distance^2)` for `F` foreground
    /// pixels: larger values bridge wider gaps at a quadratic price.
    pub max_distance: u32,
}

impl PipelineConfig {
    /// Default threshold: adaptive local-contrast rule.
    pub const DEFAULT_THRESHOLD: ThresholdKind = ThresholdKind::RelativeArea {
        less_or_equal: 135,
        greater_diff: 20,
        radius: 13,
    };

    /// Default clustering radius: 8-connected neighbors.
    pub const DEFAULT_MAX_DISTANCE: u32 = 1;

    /// Check invariants that do not depend on the input image.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConfig`] if `max_distance` is zero.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.max_distance == 0 {
            return Err(PipelineError::InvalidConfig(
                "max_distance must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            threshold: Self::DEFAULT_THRESHOLD,
            max_distance: Self::DEFAULT_MAX_DISTANCE,
        }
    }
}

/// Result of running the full pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessResult {
    /// Foreground clusters in seed scan order.
    pub clusters: Vec<Cluster>,

    /// Dimensions of the source image in pixels.
    pub dimensions: Dimensions,
}

/// Result of running the pipeline with every intermediate preserved.
///
/// Lets callers render the intensity grid and binary mask alongside the
/// clusters (e.g. writing the mask as a PNG for inspection).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StagedResult {
    /// Stage 1: luma intensity grid.
    pub intensity: IntensityGrid,
    /// Stage 2: foreground mask produced by the threshold.
    pub mask: BooleanMask,
    /// Stage 3: foreground clusters.
    pub clusters: Vec<Cluster>,
    /// Source image dimensions in pixels.
    pub dimensions: Dimensions,
}

impl StagedResult {
    /// Drop the raster intermediates, keeping only clusters and dimensions.
    #[must_use]
    pub fn into_process_result(self) -> ProcessResult {
        ProcessResult {
            clusters: self.clusters,
            dimensions: self.dimensions,
        }
    }
}

/// Errors that can occur during pipeline processing.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Failed to decode the input image.
    #[error("failed to decode image: {0}")]
    ImageDecode(#[from] image::ImageError),

    /// The input image bytes were empty.
    #[error("input image data is empty")]
    EmptyInput,

    /// A grid has a zero side or rows of unequal length.
    #[error("invalid grid dimensions: {0}")]
    InvalidDimensions(String),

    /// Pipeline configuration is invalid.
    #[error("invalid pipeline configuration: {0}")]
    InvalidConfig(String),

    /// The neighborhood sampler returned no samples, so no mean exists.
    #[error("empty neighborhood sample around ({x}, {y})")]
    DegenerateSample {
        /// Column of the pixel being evaluated.
        x: u32,
        /// Row of the pixel being evaluated.
        y: u32,
    },
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn point_chebyshev_distance() {
        let a = Point::new(0, 0);
        assert_eq!(a.chebyshev_distance(Point::new(2, 1)), 2);
        assert_eq!(a.chebyshev_distance(Point::new(1, 3)), 3);
        assert_eq!(Point::new(4, 4).chebyshev_distance(Point::new(1, 2)), 3);
        assert_eq!(a.chebyshev_distance(a), 0);
    }

    #[test]
    fn point_serializes_as_pair() {
        let json = serde_json::to_string(&Point::new(3, 7)).unwrap();
        assert_eq!(json, "[3,7]");
        let back: Point = serde_json::from_str("[3,7]").unwrap();
        assert_eq!(back, Point::new(3, 7));
    }

    #[test]
    fn clusters_serialize_as_nested_arrays() {
        let clusters = vec![
            Cluster::new(vec![Point::new(0, 0), Point::new(1, 1)]),
            Cluster::new(vec![Point::new(4, 2)]),
        ];
        let json = serde_json::to_string(&clusters).unwrap();
        assert_eq!(json, "[[[0,0],[1,1]],[[4,2]]]");
    }

    #[test]
    fn cluster_seed_is_first_point() {
        let c = Cluster::new(vec![Point::new(5, 1), Point::new(4, 2)]);
        assert_eq!(c.seed(), Some(&Point::new(5, 1)));
        assert_eq!(c.len(), 2);
        assert!(!c.is_empty());
        assert!(Cluster::new(vec![]).seed().is_none());
    }

    #[test]
    fn dimensions_sizes() {
        let d = Dimensions {
            width: 3,
            height: 2,
        };
        assert_eq!(d.pixel_count(), 6);
        assert_eq!(d.max_side(), 3);
    }

    #[test]
    fn pipeline_config_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(
            config.threshold,
            ThresholdKind::RelativeArea {
                less_or_equal: 135,
                greater_diff: 20,
                radius: 13,
            }
        );
        assert_eq!(config.max_distance, 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn pipeline_config_rejects_zero_max_distance() {
        let config = PipelineConfig {
            max_distance: 0,
            ..PipelineConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(PipelineError::InvalidConfig(_))
        ));
    }

    #[test]
    fn pipeline_config_partial_json_uses_defaults() {
        let config: PipelineConfig = serde_json::from_str(r#"{"max_distance": 4}"#).unwrap();
        assert_eq!(config.max_distance, 4);
        assert_eq!(config.threshold, PipelineConfig::DEFAULT_THRESHOLD);

        let config: PipelineConfig =
            serde_json::from_str(r#"{"threshold": {"kind": "absolute", "less_or_equal": 90}}"#)
                .unwrap();
        assert_eq!(
            config.threshold,
            ThresholdKind::Absolute { less_or_equal: 90 }
        );
        assert_eq!(config.max_distance, PipelineConfig::DEFAULT_MAX_DISTANCE);
    }

    #[test]
    fn error_display() {
        assert_eq!(
            PipelineError::EmptyInput.to_string(),
            "input image data is empty"
        );
        assert_eq!(
            PipelineError::DegenerateSample { x: 2, y: 5 }.to_string(),
            "empty neighborhood sample around (2, 5)"
        );
        assert_eq!(
            PipelineError::InvalidConfig("max_distance must be at least 1".to_string())
                .to_string(),
            "invalid pipeline configuration: max_distance must be at least 1"
        );
    }
}
