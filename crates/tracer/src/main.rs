//! tracer: binarize an image and cluster its foreground pixels.
//!
//! Runs the pipeline on a given image file, prints per-stage diagnostics,
//! and optionally writes the foreground mask, the clusters, and an SVG
//! overlay.
//!
//! # Usage
//!
//! ```text
//! cargo run --release --bin tracer -- [OPTIONS] <IMAGE_PATH>
//! ```

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::{Parser, ValueEnum};
use tracer_pipeline::diagnostics::Clock;
use tracer_pipeline::{PipelineConfig, StagedResult, ThresholdKind};

/// Binarize an image and group its foreground pixels into clusters.
///
/// Prints per-stage timing and count diagnostics, and writes any of the
/// requested outputs.
#[derive(Parser)]
#[command(name = "tracer", version)]
struct Cli {
    /// Path to the input image (PNG, JPEG, BMP, WebP).
    image_path: PathBuf,

    /// Threshold rule.
    #[arg(long, value_enum, default_value_t = Rule::RelativeArea)]
    threshold: Rule,

    /// Pixels with luma at or below this value may be foreground.
    #[arg(long, default_value_t = DEFAULT_RULE.0)]
    less_or_equal: u8,

    /// Minimum difference from the neighborhood mean (relative-area only).
    #[arg(long, default_value_t = DEFAULT_RULE.1)]
    greater_diff: u8,

    /// Neighborhood disk radius in pixels (relative-area only).
    #[arg(long, default_value_t = DEFAULT_RULE.2)]
    radius: u32,

    /// Chebyshev distance within which foreground pixels join a cluster.
    #[arg(long, default_value_t = PipelineConfig::DEFAULT_MAX_DISTANCE, value_parser = clap::builder::RangedU64ValueParser::<u32>::new().range(1..))]
    max_distance: u32,

    /// Full pipeline config as a JSON string.
    ///
    /// When provided, all other pipeline parameter flags are ignored.
    /// The JSON must be a valid `PipelineConfig` serialization.
    #[arg(long)]
    config_json: Option<String>,

    /// Write the foreground mask as a PNG (foreground black).
    #[arg(long)]
    mask: Option<PathBuf>,

    /// Write the clusters as JSON.
    #[arg(long)]
    clusters: Option<PathBuf>,

    /// Write an SVG overlay of the clusters.
    #[arg(long)]
    svg: Option<PathBuf>,

    /// Output diagnostics as JSON instead of human-readable report.
    #[arg(long)]
    json: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Threshold rule selection.
#[derive(Clone, Copy, ValueEnum)]
enum Rule {
    /// Fixed cutoff on luma.
    Absolute,
    /// Dark pixels that also stand out from their neighborhood mean.
    RelativeArea,
}

/// `(less_or_equal, greater_diff, radius)` of the default threshold, so
/// the flag defaults cannot drift from [`PipelineConfig::DEFAULT_THRESHOLD`].
const DEFAULT_RULE: (u8, u8, u32) = match PipelineConfig::DEFAULT_THRESHOLD {
    ThresholdKind::RelativeArea {
        less_or_equal,
        greater_diff,
        radius,
    } => (less_or_equal, greater_diff, radius),
    ThresholdKind::Absolute { less_or_equal } => (less_or_equal, 0, 0),
};

/// Build a [`PipelineConfig`] from CLI arguments.
///
/// If `--config-json` is provided, the JSON is parsed directly and all
/// individual parameter flags are ignored.
fn config_from_cli(cli: &Cli) -> Result<PipelineConfig, String> {
    if let Some(ref json) = cli.config_json {
        return serde_json::from_str(json).map_err(|e| format!("Error parsing --config-json: {e}"));
    }

    Ok(PipelineConfig {
        threshold: match cli.threshold {
            Rule::Absolute => ThresholdKind::Absolute {
                less_or_equal: cli.less_or_equal,
            },
            Rule::RelativeArea => ThresholdKind::RelativeArea {
                less_or_equal: cli.less_or_equal,
                greater_diff: cli.greater_diff,
                radius: cli.radius,
            },
        },
        max_distance: cli.max_distance,
    })
}

/// Log level for a `-v` count. `RUST_LOG` still takes precedence.
const fn level_for(verbose: u8) -> log::LevelFilter {
    match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(level_for(cli.verbose))
        .parse_default_env()
        .init();

    let config = match config_from_cli(&cli) {
        Ok(c) => c,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };

    let image_bytes = match std::fs::read(&cli.image_path) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("Error reading {}: {e}", cli.image_path.display());
            return ExitCode::FAILURE;
        }
    };

    log::info!(
        "image: {} ({} bytes)",
        cli.image_path.display(),
        image_bytes.len(),
    );
    log::info!("config: {config:?}");

    let (staged, diagnostics) = match tracer_pipeline::diagnostics::process_staged_with_diagnostics(
        &image_bytes,
        &config,
        &StdClock,
    ) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("Pipeline error: {e}");
            return ExitCode::FAILURE;
        }
    };

    if cli.json {
        match serde_json::to_string_pretty(&diagnostics) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Error serializing diagnostics: {e}");
                return ExitCode::FAILURE;
            }
        }
    } else {
        println!("{}", diagnostics.report());
    }

    match write_outputs(&cli, &config, &staged) {
        Ok(()) => ExitCode::SUCCESS,
        Err(msg) => {
            eprintln!("{msg}");
            ExitCode::FAILURE
        }
    }
}

/// Write every output file the user asked for.
fn write_outputs(cli: &Cli, config: &PipelineConfig, staged: &StagedResult) -> Result<(), String> {
    if let Some(ref path) = cli.mask {
        let image = tracer_export::mask_to_image(&staged.mask);
        let png = tracer_export::to_png(&image).map_err(|e| format!("Error encoding mask: {e}"))?;
        write_file(path, &png, "Mask")?;
    }

    if let Some(ref path) = cli.clusters {
        let json = tracer_export::clusters_to_json(&staged.clusters)
            .map_err(|e| format!("Error serializing clusters: {e}"))?;
        write_file(path, json.as_bytes(), "Clusters")?;
    }

    if let Some(ref path) = cli.svg {
        let title = cli
            .image_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("tracer");
        let desc = format!(
            "{} threshold, max distance {}, {} clusters",
            config.threshold.name(),
            config.max_distance,
            staged.clusters.len(),
        );
        let config_json = serde_json::to_string(config)
            .map_err(|e| format!("Error serializing config for SVG metadata: {e}"))?;
        let metadata = tracer_export::SvgMetadata {
            title: Some(title),
            description: Some(&desc),
            config_json: Some(&config_json),
        };
        let svg = tracer_export::clusters_to_svg(&staged.clusters, staged.dimensions, &metadata);
        write_file(path, svg.as_bytes(), "SVG")?;
    }

    Ok(())
}

fn write_file(path: &Path, bytes: &[u8], what: &str) -> Result<(), String> {
    std::fs::write(path, bytes)
        .map_err(|e| format!("Error writing {what} to {}: {e}", path.display()))?;
    eprintln!("{what} written to {} ({} bytes)", path.display(), bytes.len());
    Ok(())
}

/// [`Clock`] implementation backed by [`std::time::Instant`].
struct StdClock;

impl Clock for StdClock {
    type Instant = Instant;

    fn now(&self) -> Instant {
        Instant::now()
    }

    fn elapsed(&self, since: &Instant) -> Duration {
        since.elapsed()
    }
}
