//! shapesym: classify the shapes in a 2D point cloud.
//!
//! Loads points from a header-less CSV file, rasterizes them, traces the
//! outer contours and reports each contour's shape category, symmetry
//! axes and regularized curve. Optionally renders everything to SVG.
//!
//! # Usage
//!
//! ```text
//! cargo run --release --bin shapesym -- [OPTIONS] <CSV_PATH>
//! ```
//!
//! Logging goes to stderr and honors `RUST_LOG` (default `info`).

#![allow(clippy::print_stdout, clippy::print_stderr)]

mod points;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use shapesym_pipeline::{ChainApproximation, ClassifierConfig, PipelineConfig, ProcessResult};
use tracing_subscriber::EnvFilter;

/// Classify contours in a point cloud and find their symmetry axes.
#[derive(Parser)]
#[command(name = "shapesym", version)]
struct Cli {
    /// Path to the input CSV file (no header row).
    csv_path: PathBuf,

    /// Zero-based column holding x coordinates.
    #[arg(long, default_value_t = 2)]
    x_column: usize,

    /// Zero-based column holding y coordinates.
    #[arg(long, default_value_t = 3)]
    y_column: usize,

    /// Raster canvas width in pixels.
    #[arg(long, default_value_t = PipelineConfig::DEFAULT_WIDTH)]
    width: u32,

    /// Raster canvas height in pixels.
    #[arg(long, default_value_t = PipelineConfig::DEFAULT_HEIGHT)]
    height: u32,

    /// Gaussian blur sigma.
    #[arg(long, default_value_t = PipelineConfig::DEFAULT_BLUR_SIGMA)]
    blur_sigma: f32,

    /// Canny low threshold.
    #[arg(long, default_value_t = PipelineConfig::DEFAULT_CANNY_LOW)]
    canny_low: f32,

    /// Canny high threshold.
    #[arg(long, default_value_t = PipelineConfig::DEFAULT_CANNY_HIGH)]
    canny_high: f32,

    /// Keep every traced border pixel instead of only the endpoints of
    /// straight runs.
    #[arg(long)]
    full_chains: bool,

    /// Polygon approximation tolerance as a fraction of the contour
    /// perimeter.
    #[arg(long, default_value_t = ClassifierConfig::DEFAULT_SIMPLIFY_EPSILON_RATIO)]
    epsilon_ratio: f64,

    /// Samples per regularized curve.
    #[arg(long, default_value_t = PipelineConfig::DEFAULT_SAMPLE_COUNT)]
    samples: usize,

    /// Report star-like contours without overriding their category.
    #[arg(long)]
    keep_primary: bool,

    /// Write SVG output to file.
    #[arg(long)]
    svg: Option<PathBuf>,

    /// Output the analysis as JSON instead of a human-readable report.
    #[arg(long)]
    json: bool,

    /// Full pipeline config as a JSON string.
    ///
    /// When provided, all other pipeline parameter flags are ignored.
    /// Missing fields take their default values.
    #[arg(long)]
    config_json: Option<String>,
}

fn config_from_cli(cli: &Cli) -> Result<PipelineConfig> {
    if let Some(ref json) = cli.config_json {
        return serde_json::from_str(json).context("parsing --config-json");
    }

    Ok(PipelineConfig {
        width: cli.width,
        height: cli.height,
        blur_sigma: cli.blur_sigma,
        canny_low: cli.canny_low,
        canny_high: cli.canny_high,
        chain_approximation: if cli.full_chains {
            ChainApproximation::Full
        } else {
            ChainApproximation::Simple
        },
        classifier: ClassifierConfig {
            simplify_epsilon_ratio: cli.epsilon_ratio,
            star_supersedes: !cli.keep_primary,
            ..ClassifierConfig::default()
        },
        sample_count: cli.samples,
    })
}

fn write_svg(path: &Path, result: &ProcessResult, cli: &Cli, config: &PipelineConfig) -> Result<()> {
    let title = cli
        .csv_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("shapesym");
    let description = format!(
        "blur={}, canny={}/{}, epsilon={}, samples={}",
        config.blur_sigma,
        config.canny_low,
        config.canny_high,
        config.classifier.simplify_epsilon_ratio,
        config.sample_count,
    );
    let config_json = serde_json::to_string(config)?;
    let metadata = shapesym_export::SvgMetadata {
        title: Some(title),
        description: Some(&description),
        config_json: Some(&config_json),
    };

    let svg = shapesym_export::to_svg(&result.analyses, result.dimensions, &metadata);
    std::fs::write(path, &svg).with_context(|| format!("writing {}", path.display()))?;
    tracing::info!(path = %path.display(), bytes = svg.len(), "SVG written");
    Ok(())
}

fn run(cli: &Cli) -> Result<()> {
    let config = config_from_cli(cli)?;
    tracing::debug!(?config, "pipeline configuration");

    let points = points::load_points_csv(&cli.csv_path, cli.x_column, cli.y_column)?;
    let result = shapesym_pipeline::process_points(&points, &config)?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("{}", result.report());
    }

    if let Some(ref svg_path) = cli.svg {
        write_svg(svg_path, &result, cli, &config)?;
    }

    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
