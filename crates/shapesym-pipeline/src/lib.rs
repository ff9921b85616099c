//! shapesym-pipeline: contour shape classification, symmetry axes and
//! curve regularization (sans-IO).
//!
//! Turns a 2D point cloud into analyzed contours through:
//! normalize -> rasterize -> blur -> edge detection -> external contour
//! tracing -> polygon approximation -> classification (with the star
//! discriminator) -> symmetry axes -> spline regularization.
//!
//! The geometric stages are also usable on their own: [`classify`],
//! [`star`], [`symmetry`] and [`regularize`] only need a [`Contour`] and
//! its [`SimplifiedPolygon`].
//!
//! This crate has **no I/O dependencies**: it operates on in-memory
//! points and returns structured data. CSV loading and SVG output live in
//! `shapesym-cli` and `shapesym-export`.

pub mod analyze;
pub mod classify;
pub mod ellipse;
pub mod metrics;
pub mod raster;
pub mod regularize;
pub mod simplify;
pub mod star;
pub mod symmetry;
pub mod trace;
pub mod types;

pub use analyze::{ContourAnalysis, Outcome, PipelineSummary, ProcessResult};
pub use star::StarVerdict;
pub use types::{
    AxisSegment, BoundingBox, ChainApproximation, ClassifiedShape, ClassifierConfig, Contour,
    Dimensions, PipelineConfig, PipelineError, Point, RegularizedCurve, ShapeCategory,
    ShapeError, ShapeMetrics, SimplifiedPolygon, SymmetryAxes,
};

/// Run the full point-cloud pipeline.
///
/// # Pipeline steps
///
/// 1. Min-max normalize the cloud onto the canvas
/// 2. Rasterize (one white pixel per point)
/// 3. Gaussian blur and Canny edge detection
/// 4. External contour tracing, optionally keeping only run endpoints
/// 5. Per-contour simplification, classification, symmetry axes and
///    regularization
///
/// # Errors
///
/// Returns [`PipelineError::EmptyInput`] if `points` is empty.
/// Returns [`PipelineError::InvalidConfig`] if `config` fails validation.
/// Returns [`PipelineError::DegeneratePointCloud`] if the cloud has no
/// extent along an axis.
/// Returns [`PipelineError::NoContours`] if tracing finds no contours.
pub fn process_points(
    points: &[Point],
    config: &PipelineConfig,
) -> Result<ProcessResult, PipelineError> {
    if points.is_empty() {
        return Err(PipelineError::EmptyInput);
    }
    config.validate()?;
    let dimensions = config.dimensions();

    // 1-2. Normalize and rasterize.
    let normalized = raster::normalize_points(points, dimensions)?;
    let image = raster::rasterize(&normalized, dimensions);

    // 3. Blur and edge detection.
    let edges = trace::detect_edges(&image, config.blur_sigma, config.canny_low, config.canny_high);

    // 4. Contour tracing.
    let contours = trace::trace_external_contours(&edges, config.chain_approximation);
    if contours.is_empty() {
        return Err(PipelineError::NoContours);
    }
    tracing::debug!(contours = contours.len(), "traced external contours");

    // 5. Analysis.
    let analyses = analyze::analyze_contours(contours, config);
    let result = ProcessResult::new(dimensions, analyses);

    tracing::info!(
        points = points.len(),
        contours = result.summary.contour_count,
        regularized = result.summary.regularized_count,
        skipped = result.summary.skipped_regularizations,
        "pipeline complete",
    );

    Ok(result)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    /// Two far-apart anchors fix the normalization, the rest fill a
    /// square in the middle of the canvas.
    fn square_cloud() -> Vec<Point> {
        let mut points = vec![Point::new(0.0, 0.0), Point::new(100.0, 100.0)];
        for i in 0..=400 {
            for j in 0..=400 {
                let x = 30.0 + f64::from(i) * 0.1;
                let y = 30.0 + f64::from(j) * 0.1;
                points.push(Point::new(x, y));
            }
        }
        points
    }

    #[test]
    fn empty_input() {
        assert_eq!(
            process_points(&[], &PipelineConfig::default()),
            Err(PipelineError::EmptyInput)
        );
    }

    #[test]
    fn invalid_config_is_rejected_before_work() {
        let config = PipelineConfig {
            sample_count: 0,
            ..PipelineConfig::default()
        };
        assert!(matches!(
            process_points(&[Point::new(0.0, 0.0), Point::new(1.0, 1.0)], &config),
            Err(PipelineError::InvalidConfig(_))
        ));
    }

    #[test]
    fn nan_blur_sigma_is_invalid_config() {
        let config = PipelineConfig {
            blur_sigma: f32::NAN,
            ..PipelineConfig::default()
        };
        assert!(matches!(
            process_points(&square_cloud(), &config),
            Err(PipelineError::InvalidConfig(_))
        ));
    }

    #[test]
    fn collinear_cloud_is_degenerate() {
        let points: Vec<Point> = (0..10).map(|i| Point::new(f64::from(i), 3.0)).collect();
        assert_eq!(
            process_points(&points, &PipelineConfig::default()),
            Err(PipelineError::DegeneratePointCloud {
                axis: "y".to_string()
            })
        );
    }

    #[test]
    fn unreachable_thresholds_find_no_contours() {
        // Sobel magnitudes on 8-bit images stay well below this.
        let config = PipelineConfig {
            canny_low: 10_000.0,
            canny_high: 10_000.0,
            ..PipelineConfig::default()
        };
        assert_eq!(
            process_points(&square_cloud(), &config),
            Err(PipelineError::NoContours)
        );
    }

    #[test]
    fn filled_square_cloud_is_square() {
        let result = process_points(&square_cloud(), &PipelineConfig::default()).unwrap();
        assert!(result.summary.contour_count >= 1);
        assert!(
            result.analyses.iter().any(|a| matches!(
                a.shape.category(),
                ShapeCategory::Square | ShapeCategory::Rectangle
            )),
            "{}",
            result.report()
        );
    }
}
