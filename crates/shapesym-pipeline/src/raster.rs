//! Point-cloud to raster conversion.
//!
//! The cloud is min-max scaled independently per axis so it spans the
//! whole canvas:
//!
//! ```text
//! px = (x − x_min) / (x_max − x_min) × (width − 1)
//! py = (y − y_min) / (y_max − y_min) × (height − 1)
//! ```
//!
//! and every scaled point lights the pixel at its truncated coordinates.
//! The aspect ratio of the cloud is not preserved.

use image::{GrayImage, Luma};

use crate::types::{Dimensions, PipelineError, Point};

/// Pixel value of a rasterized point.
pub const FOREGROUND: u8 = 255;

/// Scale a point cloud onto a `dimensions`-sized canvas.
///
/// Points with a non-finite coordinate are dropped.
///
/// # Errors
///
/// Returns [`PipelineError::EmptyInput`] if no finite point remains, and
/// [`PipelineError::DegeneratePointCloud`] if all remaining points share
/// their x or their y coordinate.
pub fn normalize_points(
    points: &[Point],
    dimensions: Dimensions,
) -> Result<Vec<Point>, PipelineError> {
    let finite: Vec<Point> = points
        .iter()
        .copied()
        .filter(|p| p.x.is_finite() && p.y.is_finite())
        .collect();
    if finite.len() < points.len() {
        tracing::debug!(
            dropped = points.len() - finite.len(),
            "ignoring non-finite points"
        );
    }
    if finite.is_empty() {
        return Err(PipelineError::EmptyInput);
    }

    let (min_x, max_x) = extent(finite.iter().map(|p| p.x));
    let (min_y, max_y) = extent(finite.iter().map(|p| p.y));
    let span_x = max_x - min_x;
    let span_y = max_y - min_y;
    if span_x <= 0.0 {
        return Err(PipelineError::DegeneratePointCloud {
            axis: "x".to_string(),
        });
    }
    if span_y <= 0.0 {
        return Err(PipelineError::DegeneratePointCloud {
            axis: "y".to_string(),
        });
    }

    let scale_x = f64::from(dimensions.width.saturating_sub(1)) / span_x;
    let scale_y = f64::from(dimensions.height.saturating_sub(1)) / span_y;
    Ok(finite
        .into_iter()
        .map(|p| Point::new((p.x - min_x) * scale_x, (p.y - min_y) * scale_y))
        .collect())
}

fn extent(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    })
}

/// Draw already-normalized points onto a black canvas.
///
/// Coordinates are truncated toward zero; points that fall outside the
/// canvas are skipped.
#[must_use = "returns the rasterized image"]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn rasterize(points: &[Point], dimensions: Dimensions) -> GrayImage {
    let mut image = GrayImage::new(dimensions.width, dimensions.height);
    let (w, h) = (f64::from(dimensions.width), f64::from(dimensions.height));
    for p in points {
        let (x, y) = (p.x.trunc(), p.y.trunc());
        if (0.0..w).contains(&x) && (0.0..h).contains(&y) {
            image.put_pixel(x as u32, y as u32, Luma([FOREGROUND]));
        }
    }
    image
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn dims(w: u32, h: u32) -> Dimensions {
        Dimensions {
            width: w,
            height: h,
        }
    }

    #[test]
    fn extremes_map_to_canvas_corners() {
        let pts = vec![
            Point::new(-10.0, 5.0),
            Point::new(30.0, 25.0),
            Point::new(10.0, 15.0),
        ];
        let out = normalize_points(&pts, dims(101, 51)).unwrap();
        assert_eq!(out[0], Point::new(0.0, 0.0));
        assert_eq!(out[1], Point::new(100.0, 50.0));
        assert_eq!(out[2], Point::new(50.0, 25.0));
    }

    #[test]
    fn zero_x_extent_is_degenerate() {
        let pts = vec![Point::new(1.0, 0.0), Point::new(1.0, 5.0)];
        assert_eq!(
            normalize_points(&pts, dims(10, 10)),
            Err(PipelineError::DegeneratePointCloud {
                axis: "x".to_string()
            })
        );
    }

    #[test]
    fn zero_y_extent_is_degenerate() {
        let pts = vec![Point::new(0.0, 2.0), Point::new(4.0, 2.0)];
        assert_eq!(
            normalize_points(&pts, dims(10, 10)),
            Err(PipelineError::DegeneratePointCloud {
                axis: "y".to_string()
            })
        );
    }

    #[test]
    fn empty_and_non_finite_input() {
        assert_eq!(normalize_points(&[], dims(10, 10)), Err(PipelineError::EmptyInput));
        let pts = vec![Point::new(f64::NAN, 1.0), Point::new(2.0, f64::INFINITY)];
        assert_eq!(normalize_points(&pts, dims(10, 10)), Err(PipelineError::EmptyInput));
    }

    #[test]
    fn non_finite_points_are_dropped() {
        let pts = vec![
            Point::new(0.0, 0.0),
            Point::new(f64::NAN, 3.0),
            Point::new(9.0, 9.0),
        ];
        let out = normalize_points(&pts, dims(10, 10)).unwrap();
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn rasterize_truncates_and_clips() {
        let pts = vec![
            Point::new(1.9, 2.7),
            Point::new(9.99, 0.0),
            Point::new(10.0, 3.0),
            Point::new(-0.5, 4.0),
        ];
        let image = rasterize(&pts, dims(10, 10));
        assert_eq!(image.get_pixel(1, 2).0[0], FOREGROUND);
        assert_eq!(image.get_pixel(9, 0).0[0], FOREGROUND);
        // -0.5 truncates to 0 and lands on the canvas.
        assert_eq!(image.get_pixel(0, 4).0[0], FOREGROUND);
        let lit = image.pixels().filter(|p| p.0[0] == FOREGROUND).count();
        assert_eq!(lit, 3);
    }
}
