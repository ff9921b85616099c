//! Symmetry axes for classified shapes.
//!
//! | category           | axes                                        |
//! |--------------------|---------------------------------------------|
//! | Circle, Ellipse    | major and minor axis of the fitted ellipse  |
//! | Square, Rectangle  | vertical and horizontal bounding-box bisectors |
//! | Polygon, Star      | spokes from the centroid to every contour point |
//! | Triangle           | none                                        |

use crate::ellipse;
use crate::metrics;
use crate::types::{
    AxisSegment, BoundingBox, ClassifiedShape, Point, ShapeCategory, ShapeError, SymmetryAxes,
};

/// Compute the symmetry axes of a classified shape.
///
/// # Errors
///
/// Returns [`ShapeError::ZeroAreaContour`] when the axes need a centroid
/// or an ellipse fit and the contour encloses no area.
pub fn symmetry_axes(shape: &ClassifiedShape) -> Result<SymmetryAxes, ShapeError> {
    let points = shape.contour().points();
    match shape.category() {
        ShapeCategory::Circle | ShapeCategory::Ellipse => principal_axes(points),
        ShapeCategory::Square | ShapeCategory::Rectangle => {
            Ok(bisectors(&shape.metrics().bounding_box))
        }
        ShapeCategory::Polygon | ShapeCategory::Star => radial_spokes(points),
        ShapeCategory::Triangle => Ok(SymmetryAxes::None),
    }
}

/// Major then minor axis of the ellipse fitted to `points`.
///
/// # Errors
///
/// Returns [`ShapeError::ZeroAreaContour`] if no ellipse can be fitted.
pub fn principal_axes(points: &[Point]) -> Result<SymmetryAxes, ShapeError> {
    let fit = ellipse::fit_ellipse(points)?;
    let (major, minor) = fit.axis_segments();
    Ok(SymmetryAxes::Principal { major, minor })
}

/// Vertical and horizontal lines through the center of `bbox`, each
/// spanning the box.
#[must_use]
pub fn bisectors(bbox: &BoundingBox) -> SymmetryAxes {
    let c = bbox.center();
    SymmetryAxes::Bisectors {
        vertical: AxisSegment::new(Point::new(c.x, bbox.min.y), Point::new(c.x, bbox.max.y)),
        horizontal: AxisSegment::new(Point::new(bbox.min.x, c.y), Point::new(bbox.max.x, c.y)),
    }
}

/// One segment from the centroid to each contour point, in contour order.
///
/// # Errors
///
/// Returns [`ShapeError::ZeroAreaContour`] when the ring has no centroid.
pub fn radial_spokes(points: &[Point]) -> Result<SymmetryAxes, ShapeError> {
    let centroid = metrics::centroid(points)?;
    Ok(SymmetryAxes::Spokes(
        points
            .iter()
            .map(|&p| AxisSegment::new(centroid, p))
            .collect(),
    ))
}
