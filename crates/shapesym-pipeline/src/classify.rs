//! Shape classification from a contour and its simplified polygon.
//!
//! The primary category depends only on the simplified vertex count and,
//! for four or more vertices, on the bounding-box aspect ratio or the
//! circularity of the original contour:
//!
//! | vertices | test                                      | category          |
//! |----------|-------------------------------------------|-------------------|
//! | < 3      | none                                      | Polygon           |
//! | 3        | none                                      | Triangle          |
//! | 4        | `min <= aspect <= max` (inclusive)        | Square/Rectangle  |
//! | > 4      | `circularity > threshold` (exclusive)     | Circle/Ellipse    |
//!
//! [`classify_with_star`] additionally runs the star discriminator, whose
//! positive verdict replaces the primary category.

use std::sync::Arc;

use crate::metrics;
use crate::star;
use crate::types::{
    ClassifiedShape, ClassifierConfig, Contour, ShapeCategory, ShapeMetrics, SimplifiedPolygon,
};

/// Pick the primary category from a vertex count and contour metrics.
#[must_use]
pub fn primary_category(
    vertex_count: usize,
    metrics: &ShapeMetrics,
    config: &ClassifierConfig,
) -> ShapeCategory {
    match vertex_count {
        0..=2 => ShapeCategory::Polygon,
        3 => ShapeCategory::Triangle,
        4 => {
            let band = config.square_aspect_min..=config.square_aspect_max;
            if metrics.aspect_ratio.is_some_and(|r| band.contains(&r)) {
                ShapeCategory::Square
            } else {
                ShapeCategory::Rectangle
            }
        }
        _ => {
            if metrics.circularity > config.circle_circularity {
                ShapeCategory::Circle
            } else {
                ShapeCategory::Ellipse
            }
        }
    }
}

/// Classify a contour from its simplified polygon.
///
/// Pure function of its inputs; the star discriminator is not consulted.
#[must_use]
pub fn classify(
    contour: &Arc<Contour>,
    simplified: &SimplifiedPolygon,
    config: &ClassifierConfig,
) -> ClassifiedShape {
    let metrics = metrics::shape_metrics(contour);
    let vertex_count = simplified.vertex_count();
    let primary = primary_category(vertex_count, &metrics, config);

    ClassifiedShape {
        category: primary,
        primary,
        contour: Arc::clone(contour),
        vertex_count,
        metrics,
        star: None,
    }
}

/// Classify a contour and apply the star discriminator.
///
/// With `config.star_supersedes` set, a positive
/// [`StarVerdict`](crate::star::StarVerdict) turns the final category
/// into [`ShapeCategory::Star`]; the primary category is kept on the
/// result either way.
#[must_use]
pub fn classify_with_star(
    contour: &Arc<Contour>,
    simplified: &SimplifiedPolygon,
    config: &ClassifierConfig,
) -> ClassifiedShape {
    let mut shape = classify(contour, simplified, config);
    let verdict = star::evaluate_star(contour, simplified, config);

    if config.star_supersedes && verdict.is_star() {
        shape.category = ShapeCategory::Star;
    }

    tracing::trace!(
        vertices = shape.vertex_count,
        primary = %shape.primary,
        category = %shape.category,
        star = verdict.is_star(),
        "classified contour",
    );

    shape.star = Some(verdict);
    shape
}
