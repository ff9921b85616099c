//! Per-contour analysis and batch summaries.
//!
//! Each contour is simplified, classified (with the star discriminator),
//! and then handed to the symmetry analyzer and the curve regularizer.
//! Failures of those last two steps are recorded on the contour's
//! [`ContourAnalysis`] as [`Outcome::Skipped`]; they never abort the batch.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::classify;
use crate::regularize;
use crate::simplify;
use crate::symmetry;
use crate::types::{
    ClassifiedShape, Contour, Dimensions, PipelineConfig, RegularizedCurve, ShapeCategory,
    ShapeError, SimplifiedPolygon, SymmetryAxes,
};

/// Result of an optional per-contour step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome<T> {
    /// The step produced a value.
    Ok(T),
    /// The step declined for this contour.
    Skipped(ShapeError),
}

impl<T> Outcome<T> {
    /// Returns `true` for [`Outcome::Ok`].
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        matches!(self, Self::Ok(_))
    }

    /// The produced value, if any.
    #[must_use]
    pub const fn value(&self) -> Option<&T> {
        match self {
            Self::Ok(v) => Some(v),
            Self::Skipped(_) => None,
        }
    }

    /// Why the step was skipped, if it was.
    #[must_use]
    pub const fn skip_reason(&self) -> Option<&ShapeError> {
        match self {
            Self::Ok(_) => None,
            Self::Skipped(e) => Some(e),
        }
    }
}

impl<T> From<Result<T, ShapeError>> for Outcome<T> {
    fn from(result: Result<T, ShapeError>) -> Self {
        match result {
            Ok(v) => Self::Ok(v),
            Err(e) => Self::Skipped(e),
        }
    }
}

/// Everything derived from one traced contour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContourAnalysis {
    /// Position of the contour in tracing order.
    pub index: usize,
    /// Polygon approximation used for classification and regularization.
    pub simplified: SimplifiedPolygon,
    /// Classification, including the star verdict.
    pub shape: ClassifiedShape,
    /// Symmetry axes for the final category.
    pub axes: Outcome<SymmetryAxes>,
    /// Spline-smoothed outline.
    pub curve: Outcome<RegularizedCurve>,
}

/// Analyze a single contour.
#[must_use]
pub fn analyze_contour(index: usize, contour: Contour, config: &PipelineConfig) -> ContourAnalysis {
    let contour = Arc::new(contour);
    let classifier = &config.classifier;

    let epsilon = simplify::epsilon_for(&contour, classifier.simplify_epsilon_ratio);
    let simplified = simplify::approximate_polygon(&contour, epsilon);
    let shape = classify::classify_with_star(&contour, &simplified, classifier);

    let axes = Outcome::from(symmetry::symmetry_axes(&shape));
    if let Some(reason) = axes.skip_reason() {
        tracing::debug!(index, category = %shape.category(), %reason, "no symmetry axes");
    }

    let curve = Outcome::from(regularize::regularize(&simplified, config.sample_count));
    if let Some(reason) = curve.skip_reason() {
        tracing::debug!(index, category = %shape.category(), %reason, "curve not regularized");
    }

    tracing::debug!(
        index,
        points = contour.len(),
        vertices = simplified.vertex_count(),
        category = %shape.category(),
        "analyzed contour",
    );

    ContourAnalysis {
        index,
        simplified,
        shape,
        axes,
        curve,
    }
}

/// Analyze every contour in order.
#[must_use]
pub fn analyze_contours(contours: Vec<Contour>, config: &PipelineConfig) -> Vec<ContourAnalysis> {
    contours
        .into_iter()
        .enumerate()
        .map(|(i, c)| analyze_contour(i, c, config))
        .collect()
}

/// Counts over a batch of analyses.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PipelineSummary {
    /// Number of contours analyzed.
    pub contour_count: usize,
    /// Contours per final category. Categories with no contours are absent.
    pub categories: BTreeMap<ShapeCategory, usize>,
    /// Contours with a regularized curve.
    pub regularized_count: usize,
    /// Contours whose regularization was skipped.
    pub skipped_regularizations: usize,
    /// Contours whose symmetry axes could not be computed.
    pub skipped_axes: usize,
}

impl PipelineSummary {
    /// Tally a batch of analyses.
    #[must_use]
    pub fn from_analyses(analyses: &[ContourAnalysis]) -> Self {
        let mut summary = Self {
            contour_count: analyses.len(),
            ..Self::default()
        };
        for a in analyses {
            *summary.categories.entry(a.shape.category()).or_insert(0) += 1;
            if a.curve.is_ok() {
                summary.regularized_count += 1;
            } else {
                summary.skipped_regularizations += 1;
            }
            if !a.axes.is_ok() {
                summary.skipped_axes += 1;
            }
        }
        summary
    }
}

/// Output of [`process_points`](crate::process_points).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessResult {
    /// Canvas the cloud was rasterized onto.
    pub dimensions: Dimensions,
    /// One entry per traced contour.
    pub analyses: Vec<ContourAnalysis>,
    /// Batch counts.
    pub summary: PipelineSummary,
}

impl ProcessResult {
    /// Bundle analyses with their summary.
    #[must_use]
    pub fn new(dimensions: Dimensions, analyses: Vec<ContourAnalysis>) -> Self {
        let summary = PipelineSummary::from_analyses(&analyses);
        Self {
            dimensions,
            analyses,
            summary,
        }
    }

    /// Format a human-readable report.
    #[must_use]
    pub fn report(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Shape Analysis Report\n{}", "=".repeat(60)));
        lines.push(format!(
            "Canvas: {}x{}  |  Contours: {}",
            self.dimensions.width, self.dimensions.height, self.summary.contour_count,
        ));
        lines.push(String::new());

        lines.push(format!(
            "{:<6} {:<10} {:<10} {:>8} {:>12} {:>6}  {}",
            "#", "Category", "Primary", "Vertices", "Circularity", "Axes", "Curve"
        ));
        lines.push("-".repeat(80));

        for a in &self.analyses {
            let axes = a
                .axes
                .value()
                .map_or_else(|| "-".to_string(), |axes| axes.len().to_string());
            let curve = match &a.curve {
                Outcome::Ok(curve) => format!("{} samples", curve.len()),
                Outcome::Skipped(reason) => format!("skipped: {reason}"),
            };
            lines.push(format!(
                "{:<6} {:<10} {:<10} {:>8} {:>12.4} {:>6}  {}",
                a.index,
                a.shape.category(),
                a.shape.primary_category(),
                a.shape.vertex_count(),
                a.shape.metrics().circularity,
                axes,
                curve,
            ));
        }

        lines.push(String::new());
        let counts: Vec<String> = self
            .summary
            .categories
            .iter()
            .map(|(category, n)| format!("{category}: {n}"))
            .collect();
        lines.push(format!("Categories: {}", counts.join(", ")));
        lines.push(format!(
            "Regularized: {}  |  Skipped: {}",
            self.summary.regularized_count, self.summary.skipped_regularizations,
        ));

        lines.join("\n")
    }
}
