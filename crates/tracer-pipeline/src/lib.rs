//! tracer-pipeline: Pure binarization and clustering pipeline (sans-IO).
//!
//! Converts raster images into groups of foreground pixels through:
//! decode -> luma -> threshold -> binary mask -> ring-distance clustering.
//!
//! This crate has **no I/O dependencies** -- it operates on in-memory
//! byte slices and grids and returns structured data. Filesystem access
//! and output encoding live in the `tracer` binary and `tracer-export`.

pub mod binarize;
pub mod cluster;
pub mod diagnostics;
pub mod grayscale;
pub mod grid;
pub mod pipeline;
pub mod sampler;
pub mod threshold;
pub mod types;

pub use binarize::binarize;
pub use cluster::clusterize;
pub use grid::{BooleanMask, IntensityGrid};
pub use pipeline::{Binarized, Clustered, Decoded, Pending, Pipeline};
pub use threshold::{Threshold, ThresholdKind};
pub use types::{
    Cluster, Dimensions, PipelineConfig, PipelineError, Point, ProcessResult, StagedResult,
};

/// Run the full pipeline, keeping only clusters and dimensions.
///
/// # Pipeline steps
///
/// 1. Decode image and convert to luma
/// 2. Threshold every pixel into a foreground mask
/// 3. Cluster foreground pixels by Chebyshev ring distance
///
/// # Errors
///
/// Returns [`PipelineError::InvalidConfig`] if the config is invalid.
/// Returns [`PipelineError::EmptyInput`] if `image_bytes` is empty.
/// Returns [`PipelineError::ImageDecode`] if the image format is unrecognized.
/// Returns [`PipelineError::DegenerateSample`] if a neighborhood mean
/// cannot be formed.
pub fn process(image_bytes: &[u8], config: &PipelineConfig) -> Result<ProcessResult, PipelineError> {
    process_staged(image_bytes, config).map(StagedResult::into_process_result)
}

/// Run the full pipeline, keeping every intermediate.
///
/// # Errors
///
/// Same as [`process`].
pub fn process_staged(
    image_bytes: &[u8],
    config: &PipelineConfig,
) -> Result<StagedResult, PipelineError> {
    Ok(Pipeline::new(image_bytes.to_vec(), config.clone())
        .decode()?
        .binarize()?
        .clusterize()?
        .into_result())
}

/// Run threshold and clustering on an already-converted intensity grid.
///
/// # Errors
///
/// Returns [`PipelineError::InvalidConfig`] if the config is invalid.
/// Returns [`PipelineError::DegenerateSample`] if a neighborhood mean
/// cannot be formed.
pub fn process_intensity(
    intensity: IntensityGrid,
    config: &PipelineConfig,
) -> Result<StagedResult, PipelineError> {
    Ok(Decoded::from_intensity(intensity, config.clone())?
        .binarize()?
        .clusterize()?
        .into_result())
}
