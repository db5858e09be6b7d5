//! tracer-export: Pure format serializers (sans-IO).
//!
//! Renders pipeline outputs into interchange formats: the foreground mask
//! as a grayscale PNG, clusters as JSON, and clusters as an SVG overlay.
//! Every function returns bytes or a string; writing them is the
//! caller's job.

pub mod json;
pub mod raster;
pub mod svg;

pub use json::{clusters_from_json, clusters_to_json};
pub use raster::{intensity_to_image, mask_to_image, to_png};
pub use svg::{CLUSTER_COLORS, SvgMetadata, clusters_to_svg};

/// Errors that can occur while serializing pipeline outputs.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// PNG encoding failed.
    #[error("failed to encode PNG: {0}")]
    Png(#[from] image::ImageError),

    /// JSON serialization or parsing failed.
    #[error("cluster JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
