//! Incremental pipeline: advance stage-by-stage, inspecting each
//! intermediate result before continuing.
//!
//! Unlike [`crate::process_staged`] which runs the entire pipeline in one
//! call, [`Pipeline`] lets the caller drive execution one step at a time:
//!
//! ```rust
//! # use tracer_pipeline::{Pipeline, PipelineConfig, PipelineError};
//! # fn run(png: Vec<u8>) -> Result<(), PipelineError> {
//! let config = PipelineConfig::default();
//! let binarized = Pipeline::new(png, config).decode()?.binarize()?;
//! println!("{} foreground pixels", binarized.mask().count_foreground());
//!
//! let staged = binarized.clusterize()?.into_result();
//! # Ok(())
//! # }
//! ```
//!
//! Each stage method consumes `self` and returns the next pipeline state,
//! carrying all previously computed intermediates.

use crate::grid::{BooleanMask, IntensityGrid};
use crate::types::{Cluster, PipelineConfig, PipelineError, StagedResult};

/// Entry point of the incremental pipeline.
pub type Pipeline = Pending;

// ───────────────────────── Stage 0: Pending ──────────────────────────

/// Pipeline state before any processing has occurred.
///
/// Call [`decode`](Self::decode) to advance to the next stage.
#[must_use = "pipeline stages are consumed by advancing; call .decode() to continue"]
pub struct Pending {
    config: PipelineConfig,
    source: Vec<u8>,
}

impl Pending {
    /// Store the source image bytes and config without touching them.
    pub const fn new(source: Vec<u8>, config: PipelineConfig) -> Self {
        Self { config, source }
    }

    /// The raw source image bytes.
    #[must_use]
    pub fn source(&self) -> &[u8] {
        &self.source
    }

    /// Validate the config, decode the source image, and convert it to luma.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConfig`] for an invalid config,
    /// [`PipelineError::EmptyInput`] if the source bytes are empty, and
    /// [`PipelineError::ImageDecode`] if the image cannot be decoded.
    pub fn decode(self) -> Result<Decoded, PipelineError> {
        self.config.validate()?;
        let intensity = crate::grayscale::decode_to_intensity(&self.source)?;
        log::debug!(
            "decoded {} bytes into {}x{} intensity grid",
            self.source.len(),
            intensity.width(),
            intensity.height(),
        );
        Ok(Decoded {
            config: self.config,
            intensity,
        })
    }
}

// ───────────────────────── Stage 1: Decoded ──────────────────────────

/// Pipeline state holding the luma intensity grid.
#[must_use = "pipeline stages are consumed by advancing; call .binarize() to continue"]
pub struct Decoded {
    config: PipelineConfig,
    intensity: IntensityGrid,
}

impl Decoded {
    /// Start the pipeline from an already-converted intensity grid,
    /// skipping image decoding.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConfig`] for an invalid config.
    pub fn from_intensity(
        intensity: IntensityGrid,
        config: PipelineConfig,
    ) -> Result<Self, PipelineError> {
        config.validate()?;
        Ok(Self { config, intensity })
    }

    /// The luma intensity grid.
    #[must_use]
    pub const fn intensity(&self) -> &IntensityGrid {
        &self.intensity
    }

    /// Apply the configured threshold to every pixel.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::DegenerateSample`] if a neighborhood
    /// average cannot be formed.
    pub fn binarize(self) -> Result<Binarized, PipelineError> {
        let mask = crate::binarize::binarize(&self.intensity, &self.config.threshold)?;
        Ok(Binarized {
            config: self.config,
            intensity: self.intensity,
            mask,
        })
    }
}

// ───────────────────────── Stage 2: Binarized ────────────────────────

/// Pipeline state holding the foreground mask.
#[must_use = "pipeline stages are consumed by advancing; call .clusterize() to continue"]
pub struct Binarized {
    config: PipelineConfig,
    intensity: IntensityGrid,
    mask: BooleanMask,
}

impl Binarized {
    /// The luma intensity grid.
    #[must_use]
    pub const fn intensity(&self) -> &IntensityGrid {
        &self.intensity
    }

    /// The foreground mask.
    #[must_use]
    pub const fn mask(&self) -> &BooleanMask {
        &self.mask
    }

    /// Group the foreground pixels into clusters.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConfig`] if `max_distance` is zero.
    pub fn clusterize(self) -> Result<Clustered, PipelineError> {
        let clusters = crate::cluster::clusterize(&self.mask, self.config.max_distance)?;
        Ok(Clustered {
            intensity: self.intensity,
            mask: self.mask,
            clusters,
        })
    }
}

// ───────────────────────── Stage 3: Clustered ────────────────────────

/// Final pipeline state.
#[must_use = "call .into_result() to obtain the staged result"]
pub struct Clustered {
    intensity: IntensityGrid,
    mask: BooleanMask,
    clusters: Vec<Cluster>,
}

impl Clustered {
    /// The foreground mask.
    #[must_use]
    pub const fn mask(&self) -> &BooleanMask {
        &self.mask
    }

    /// The foreground clusters in seed scan order.
    #[must_use]
    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    /// Consume the pipeline, returning every intermediate.
    #[must_use]
    pub fn into_result(self) -> StagedResult {
        let dimensions = self.intensity.dimensions();
        StagedResult {
            intensity: self.intensity,
            mask: self.mask,
            clusters: self.clusters,
            dimensions,
        }
    }
}
