//! Contour measurements: area, perimeter, bounding box and image moments.
//!
//! Area and bounding box go through the `geo` crate; the polygon moments
//! are evaluated directly with Green's theorem over the closed ring, the
//! same formulas image libraries use for contour moments.

use geo::{Area, BoundingRect, Coord, LineString, Polygon};

use crate::types::{BoundingBox, Contour, Point, ShapeError, ShapeMetrics};

/// Raw and second-order moments of the region enclosed by a ring.
///
/// Signs are normalized so `m00` is non-negative regardless of the ring's
/// orientation. `m00` is exactly zero when the signed area is within
/// rounding error of the cross products it is summed from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Moments {
    /// Zeroth moment (enclosed area).
    pub m00: f64,
    /// First moment about the y axis.
    pub m10: f64,
    /// First moment about the x axis.
    pub m01: f64,
    /// Second moment `∬x²`.
    pub m20: f64,
    /// Mixed second moment `∬xy`.
    pub m11: f64,
    /// Second moment `∬y²`.
    pub m02: f64,
}

impl Moments {
    /// Area-weighted centroid `(m10/m00, m01/m00)`.
    ///
    /// # Errors
    ///
    /// Returns [`ShapeError::ZeroAreaContour`] when `m00` is zero.
    pub fn centroid(&self) -> Result<Point, ShapeError> {
        if self.m00 == 0.0 {
            return Err(ShapeError::ZeroAreaContour);
        }
        Ok(Point::new(self.m10 / self.m00, self.m01 / self.m00))
    }

    /// Central second moments normalized by area: `(mu20, mu11, mu02)`.
    ///
    /// These are the entries of the region's covariance matrix.
    ///
    /// # Errors
    ///
    /// Returns [`ShapeError::ZeroAreaContour`] when `m00` is zero.
    pub fn covariance(&self) -> Result<(f64, f64, f64), ShapeError> {
        let c = self.centroid()?;
        Ok((
            c.x.mul_add(-c.x, self.m20 / self.m00),
            c.x.mul_add(-c.y, self.m11 / self.m00),
            c.y.mul_add(-c.y, self.m02 / self.m00),
        ))
    }
}

/// Relative rounding tolerance for the shoelace sum.
const ZERO_AREA_TOLERANCE: f64 = 8.0 * f64::EPSILON;

/// Compute region moments of a closed ring of points.
#[must_use]
pub fn moments(points: &[Point]) -> Moments {
    let mut m = Moments {
        m00: 0.0,
        m10: 0.0,
        m01: 0.0,
        m20: 0.0,
        m11: 0.0,
        m02: 0.0,
    };
    if points.len() < 3 {
        return m;
    }

    let mut magnitude = 0.0;
    for (i, &p) in points.iter().enumerate() {
        let q = points[(i + 1) % points.len()];
        let cross = p.x.mul_add(q.y, -(q.x * p.y));
        magnitude += (p.x * q.y).abs() + (q.x * p.y).abs();
        m.m00 += cross;
        m.m10 += cross * (p.x + q.x);
        m.m01 += cross * (p.y + q.y);
        m.m20 += cross * p.x.mul_add(p.x, p.x.mul_add(q.x, q.x * q.x));
        m.m02 += cross * p.y.mul_add(p.y, p.y.mul_add(q.y, q.y * q.y));
        m.m11 += cross * (p.x * q.y + 2.0 * p.x * p.y + 2.0 * q.x * q.y + q.x * p.y);
    }

    if m.m00.abs() <= ZERO_AREA_TOLERANCE * magnitude {
        m.m00 = 0.0;
    }
    m.m00 /= 2.0;
    m.m10 /= 6.0;
    m.m01 /= 6.0;
    m.m20 /= 12.0;
    m.m02 /= 12.0;
    m.m11 /= 24.0;

    if m.m00 < 0.0 {
        m.m00 = -m.m00;
        m.m10 = -m.m10;
        m.m01 = -m.m01;
        m.m20 = -m.m20;
        m.m11 = -m.m11;
        m.m02 = -m.m02;
    }
    m
}

/// Area-weighted centroid of the region enclosed by `points`.
///
/// # Errors
///
/// Returns [`ShapeError::ZeroAreaContour`] when the ring encloses no area.
pub fn centroid(points: &[Point]) -> Result<Point, ShapeError> {
    moments(points).centroid()
}

fn to_line_string(points: &[Point]) -> LineString<f64> {
    points.iter().map(|p| Coord { x: p.x, y: p.y }).collect()
}

/// Unsigned enclosed area of a closed ring.
#[must_use]
pub fn area(points: &[Point]) -> f64 {
    Polygon::new(to_line_string(points), vec![]).unsigned_area()
}

/// Closed perimeter, including the edge from the last point back to the
/// first.
#[must_use]
pub fn perimeter(points: &[Point]) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }
    points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .map(|(&a, &b)| a.distance(b))
        .sum()
}

/// Axis-aligned bounding box. Empty input yields a zero box at the origin.
#[must_use]
pub fn bounding_box(points: &[Point]) -> BoundingBox {
    to_line_string(points)
        .bounding_rect()
        .map(|rect| BoundingBox {
            min: Point::new(rect.min().x, rect.min().y),
            max: Point::new(rect.max().x, rect.max().y),
        })
        .unwrap_or_default()
}

/// Circularity `4π·area / perimeter²`; zero for a zero perimeter.
#[must_use]
pub fn circularity(area: f64, perimeter: f64) -> f64 {
    if perimeter <= 0.0 {
        return 0.0;
    }
    4.0 * std::f64::consts::PI * area / (perimeter * perimeter)
}

/// All classification descriptors of a contour.
#[must_use]
pub fn shape_metrics(contour: &Contour) -> ShapeMetrics {
    let points = contour.points();
    let bounding_box = bounding_box(points);
    let area = area(points);
    let perimeter = perimeter(points);
    ShapeMetrics {
        bounding_box,
        aspect_ratio: bounding_box.aspect_ratio(),
        circularity: circularity(area, perimeter),
        area,
        perimeter,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn rect(w: f64, h: f64) -> Vec<Point> {
        vec![
            Point::new(0.0, 0.0),
            Point::new(w, 0.0),
            Point::new(w, h),
            Point::new(0.0, h),
        ]
    }

    #[test]
    fn square_area_and_perimeter() {
        let pts = rect(10.0, 10.0);
        assert!((area(&pts) - 100.0).abs() < 1e-10);
        assert!((perimeter(&pts) - 40.0).abs() < 1e-10);
    }

    #[test]
    fn moments_match_area_and_centroid() {
        let pts = rect(4.0, 2.0);
        let m = moments(&pts);
        assert!((m.m00 - 8.0).abs() < 1e-10);
        let c = m.centroid().unwrap();
        assert!((c.x - 2.0).abs() < 1e-10);
        assert!((c.y - 1.0).abs() < 1e-10);
    }

    #[test]
    fn moments_are_orientation_independent() {
        let mut pts = rect(4.0, 2.0);
        let forward = moments(&pts);
        pts.reverse();
        let backward = moments(&pts);
        assert!((forward.m00 - backward.m00).abs() < 1e-10);
        assert!((forward.m10 - backward.m10).abs() < 1e-10);
        assert!((forward.m11 - backward.m11).abs() < 1e-10);
    }

    #[test]
    fn rectangle_covariance() {
        // A w x h rectangle has variance w²/12 along x and h²/12 along y.
        let pts = rect(6.0, 3.0);
        let (mu20, mu11, mu02) = moments(&pts).covariance().unwrap();
        assert!((mu20 - 3.0).abs() < 1e-10, "mu20 = {mu20}");
        assert!(mu11.abs() < 1e-10, "mu11 = {mu11}");
        assert!((mu02 - 0.75).abs() < 1e-10, "mu02 = {mu02}");
    }

    #[test]
    fn collinear_ring_has_no_centroid() {
        let pts = vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(2.0, 2.0),
        ];
        assert_eq!(centroid(&pts), Err(ShapeError::ZeroAreaContour));
    }

    #[test]
    fn collinear_ring_with_inexact_coordinates_has_no_centroid() {
        let pts = vec![
            Point::new(0.1, 0.3),
            Point::new(0.7, 2.1),
            Point::new(0.3, 0.9),
        ];
        assert_eq!(centroid(&pts), Err(ShapeError::ZeroAreaContour));
    }

    #[test]
    fn tiny_triangle_has_a_centroid() {
        let pts = vec![
            Point::new(0.0, 0.0),
            Point::new(6e-9, 0.0),
            Point::new(0.0, 3e-9),
        ];
        let m = moments(&pts);
        assert!(m.m00 > 0.0);
        let c = m.centroid().unwrap();
        assert!((c.x - 2e-9).abs() < 1e-18);
        assert!((c.y - 1e-9).abs() < 1e-18);
    }

    #[test]
    fn triangle_centroid_is_vertex_mean() {
        let pts = vec![
            Point::new(0.0, 0.0),
            Point::new(6.0, 0.0),
            Point::new(0.0, 3.0),
        ];
        let c = centroid(&pts).unwrap();
        assert!((c.x - 2.0).abs() < 1e-10);
        assert!((c.y - 1.0).abs() < 1e-10);
    }

    #[test]
    fn bounding_box_spans_points() {
        let pts = vec![
            Point::new(3.0, -1.0),
            Point::new(7.0, 4.0),
            Point::new(-2.0, 2.0),
        ];
        let bbox = bounding_box(&pts);
        assert_eq!(bbox.min, Point::new(-2.0, -1.0));
        assert_eq!(bbox.max, Point::new(7.0, 4.0));
    }

    #[test]
    fn circle_circularity_approaches_one() {
        let pts: Vec<Point> = (0..360)
            .map(|i| {
                let t = f64::from(i).to_radians();
                Point::new(50.0 * t.cos(), 50.0 * t.sin())
            })
            .collect();
        let c = circularity(area(&pts), perimeter(&pts));
        assert!(c > 0.999 && c <= 1.0, "circularity = {c}");
    }

    #[test]
    fn zero_perimeter_circularity_is_zero() {
        assert!(circularity(0.0, 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn shape_metrics_of_square() {
        let contour = Contour::new(rect(10.0, 10.0)).unwrap();
        let m = shape_metrics(&contour);
        assert!((m.aspect_ratio.unwrap() - 1.0).abs() < f64::EPSILON);
        assert!((m.area - 100.0).abs() < 1e-10);
        assert!((m.circularity - std::f64::consts::PI / 4.0).abs() < 1e-10);
    }
}
