//! Pipeline diagnostics: timing, counts, and other metrics for each stage.
//!
//! Diagnostics are permanent instrumentation for threshold and clustering
//! parameter tuning. The core stays sans-IO by taking time from a caller
//! supplied [`Clock`]; native callers back it with `std::time::Instant`,
//! tests can use a fake.
//!
//! Durations are serialized as fractional seconds (`f64`) for JSON
//! compatibility, since `std::time::Duration` does not implement serde
//! traits.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::pipeline::Decoded;
use crate::types::{Cluster, PipelineConfig, PipelineError, StagedResult};

/// Source of monotonic timestamps.
pub trait Clock {
    /// Opaque timestamp type.
    type Instant;

    /// Current timestamp.
    fn now(&self) -> Self::Instant;

    /// Time elapsed since `since`.
    fn elapsed(&self, since: &Self::Instant) -> Duration;
}

/// Serde support for `std::time::Duration` as fractional seconds.
mod duration_serde {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a `Duration` as fractional seconds (`f64`).
    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs_f64().serialize(serializer)
    }

    /// Deserialize a `Duration` from fractional seconds (`f64`).
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(|_| {
            serde::de::Error::custom(
                "duration seconds must be finite, non-negative, and representable as a Duration",
            )
        })
    }
}

/// Diagnostics collected from a single pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineDiagnostics {
    /// Stage 0: image decoding.
    pub decode: StageDiagnostics,
    /// Stage 1: luma conversion.
    pub grayscale: StageDiagnostics,
    /// Stage 2: thresholding into a foreground mask.
    pub binarize: StageDiagnostics,
    /// Stage 3: clustering of foreground pixels.
    pub clusterize: StageDiagnostics,
    /// Total wall-clock duration of the entire pipeline (seconds).
    #[serde(with = "duration_serde")]
    pub total_duration: Duration,
    /// Summary counts across all stages.
    pub summary: PipelineSummary,
}

/// Diagnostics for a single pipeline stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageDiagnostics {
    /// Wall-clock duration of this stage (seconds).
    #[serde(with = "duration_serde")]
    pub duration: Duration,
    /// Stage-specific metrics.
    pub metrics: StageMetrics,
}

/// Stage-specific metrics that vary by pipeline stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StageMetrics {
    /// Image decoding metrics.
    Decode {
        /// Size of the input image bytes.
        input_bytes: usize,
        /// Decoded image width in pixels.
        width: u32,
        /// Decoded image height in pixels.
        height: u32,
        /// Total pixel count (`width * height`).
        pixel_count: u64,
    },
    /// Luma conversion metrics.
    Grayscale {
        /// Mean intensity over the whole grid.
        mean_intensity: f64,
    },
    /// Thresholding metrics.
    Binarize {
        /// Which threshold rule was used.
        threshold: String,
        /// Number of foreground pixels in the mask.
        foreground_pixel_count: u64,
        /// Total pixel count for computing foreground density.
        total_pixel_count: u64,
    },
    /// Clustering metrics.
    Clusterize {
        /// Chebyshev ring radius used.
        max_distance: u32,
        /// Number of clusters found.
        cluster_count: usize,
        /// Clusters holding a single pixel.
        singleton_count: usize,
        /// Smallest cluster size.
        min_cluster_points: usize,
        /// Largest cluster size.
        max_cluster_points: usize,
        /// Mean cluster size.
        mean_cluster_points: f64,
    },
}

/// High-level summary counts for the entire pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSummary {
    /// Source image width in pixels.
    pub image_width: u32,
    /// Source image height in pixels.
    pub image_height: u32,
    /// Total pixel count.
    pub pixel_count: u64,
    /// Foreground pixels after thresholding.
    pub foreground_pixel_count: u64,
    /// Number of clusters found.
    pub cluster_count: usize,
}

/// Run the full pipeline, timing every stage with `clock`.
///
/// # Errors
///
/// Same as [`crate::process_staged`].
pub fn process_staged_with_diagnostics<C: Clock>(
    image_bytes: &[u8],
    config: &PipelineConfig,
    clock: &C,
) -> Result<(StagedResult, PipelineDiagnostics), PipelineError> {
    config.validate()?;
    let start = clock.now();

    let t = clock.now();
    let rgba = crate::grayscale::decode(image_bytes)?;
    let decode = StageDiagnostics {
        duration: clock.elapsed(&t),
        metrics: StageMetrics::Decode {
            input_bytes: image_bytes.len(),
            width: rgba.width(),
            height: rgba.height(),
            pixel_count: u64::from(rgba.width()) * u64::from(rgba.height()),
        },
    };

    let t = clock.now();
    let intensity = crate::grayscale::to_intensity(&rgba)?;
    let grayscale = StageDiagnostics {
        duration: clock.elapsed(&t),
        metrics: StageMetrics::Grayscale {
            mean_intensity: mean_intensity(intensity.as_raw()),
        },
    };
    drop(rgba);

    let t = clock.now();
    let binarized = Decoded::from_intensity(intensity, config.clone())?.binarize()?;
    let foreground_pixel_count = binarized.mask().count_foreground();
    let total_pixel_count = binarized.mask().dimensions().pixel_count();
    let binarize = StageDiagnostics {
        duration: clock.elapsed(&t),
        metrics: StageMetrics::Binarize {
            threshold: config.threshold.name().to_string(),
            foreground_pixel_count,
            total_pixel_count,
        },
    };

    let t = clock.now();
    let staged = binarized.clusterize()?.into_result();
    let stats = cluster_stats(&staged.clusters);
    let clusterize = StageDiagnostics {
        duration: clock.elapsed(&t),
        metrics: StageMetrics::Clusterize {
            max_distance: config.max_distance,
            cluster_count: staged.clusters.len(),
            singleton_count: stats.singletons,
            min_cluster_points: stats.min,
            max_cluster_points: stats.max,
            mean_cluster_points: stats.mean,
        },
    };

    let diagnostics = PipelineDiagnostics {
        decode,
        grayscale,
        binarize,
        clusterize,
        total_duration: clock.elapsed(&start),
        summary: PipelineSummary {
            image_width: staged.dimensions.width,
            image_height: staged.dimensions.height,
            pixel_count: total_pixel_count,
            foreground_pixel_count,
            cluster_count: staged.clusters.len(),
        },
    };
    Ok((staged, diagnostics))
}

impl PipelineDiagnostics {
    /// Format diagnostics as a human-readable report.
    #[must_use]
    pub fn report(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Pipeline Diagnostics Report\n{}", "=".repeat(60)));
        lines.push(format!(
            "Image: {}x{} ({} pixels)",
            self.summary.image_width, self.summary.image_height, self.summary.pixel_count,
        ));
        lines.push(format!(
            "Total duration: {:.3}ms",
            duration_ms(self.total_duration),
        ));
        lines.push(String::new());

        lines.push(format!(
            "{:<16} {:>10} {:>10}  {}",
            "Stage", "Duration", "% Total", "Details"
        ));
        lines.push("-".repeat(80));

        let total_ms = duration_ms(self.total_duration);
        let stages = [
            ("Decode", &self.decode),
            ("Grayscale", &self.grayscale),
            ("Binarize", &self.binarize),
            ("Clusterize", &self.clusterize),
        ];
        for (name, diag) in stages {
            let ms = duration_ms(diag.duration);
            let pct = if total_ms > 0.0 {
                ms / total_ms * 100.0
            } else {
                0.0
            };
            let details = format_metrics(&diag.metrics);
            lines.push(format!("{name:<16} {ms:>8.3}ms {pct:>9.1}%  {details}"));
        }

        lines.push(String::new());
        lines.push(format!(
            "Foreground pixels: {}  |  Clusters: {}",
            self.summary.foreground_pixel_count, self.summary.cluster_count,
        ));

        lines.join("\n")
    }
}

/// Convert a `Duration` to milliseconds as `f64`.
fn duration_ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

/// Format stage metrics into a compact detail string.
fn format_metrics(metrics: &StageMetrics) -> String {
    match metrics {
        StageMetrics::Decode {
            input_bytes,
            width,
            height,
            ..
        } => format!("{input_bytes} bytes -> {width}x{height}"),
        StageMetrics::Grayscale { mean_intensity } => format!("mean={mean_intensity:.1}"),
        StageMetrics::Binarize {
            threshold,
            foreground_pixel_count,
            total_pixel_count,
        } => {
            #[allow(clippy::cast_precision_loss)]
            let density = if *total_pixel_count > 0 {
                *foreground_pixel_count as f64 / *total_pixel_count as f64 * 100.0
            } else {
                0.0
            };
            format!("{threshold} foreground={foreground_pixel_count} ({density:.1}%)")
        }
        StageMetrics::Clusterize {
            max_distance,
            cluster_count,
            singleton_count,
            min_cluster_points,
            max_cluster_points,
            mean_cluster_points,
        } => format!(
            "d={max_distance} {cluster_count} clusters, {singleton_count} singletons (min={min_cluster_points} max={max_cluster_points} mean={mean_cluster_points:.1})",
        ),
    }
}

/// Mean of all samples, `0.0` for an empty slice.
#[allow(clippy::cast_precision_loss)]
fn mean_intensity(samples: &[u8]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum: u64 = samples.iter().map(|&v| u64::from(v)).sum();
    sum as f64 / samples.len() as f64
}

/// Size statistics over a set of clusters.
pub(crate) struct ClusterStats {
    /// Clusters of exactly one point.
    pub singletons: usize,
    /// Minimum cluster size.
    pub min: usize,
    /// Maximum cluster size.
    pub max: usize,
    /// Mean cluster size.
    pub mean: f64,
}

/// Compute size statistics, all zero for no clusters.
pub(crate) fn cluster_stats(clusters: &[Cluster]) -> ClusterStats {
    let total: usize = clusters.iter().map(Cluster::len).sum();
    let min = clusters.iter().map(Cluster::len).min().unwrap_or(0);
    let max = clusters.iter().map(Cluster::len).max().unwrap_or(0);
    let singletons = clusters.iter().filter(|c| c.len() == 1).count();
    #[allow(clippy::cast_precision_loss)]
    let mean = if clusters.is_empty() {
        0.0
    } else {
        total as f64 / clusters.len() as f64
    };
    ClusterStats {
        singletons,
        min,
        max,
        mean,
    }
}
