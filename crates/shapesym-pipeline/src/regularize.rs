//! Curve regularization: a periodic cubic spline through the simplified
//! polygon, resampled uniformly in its parameter.
//!
//! Vertex `i` of an `n`-vertex polygon sits at parameter `i / n`, so the
//! spline wraps from the last vertex back to the first with continuous
//! first and second derivatives. The second derivatives `M` solve the
//! cyclic tridiagonal system
//!
//! ```text
//! M[i-1] + 4·M[i] + M[i+1] = 6·n²·(y[i+1] − 2·y[i] + y[i-1])
//! ```
//!
//! for each coordinate independently.

use nalgebra::DMatrix;

use crate::types::{Point, RegularizedCurve, ShapeError, SimplifiedPolygon};

/// Fewest simplified vertices a curve can be regularized from.
pub const MIN_REGULARIZE_VERTICES: usize = 5;

/// Periodic cubic spline through a closed polygon.
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodicSpline {
    knots: Vec<Point>,
    /// Second derivatives at the knots, per coordinate.
    curvature: Vec<Point>,
}

impl PeriodicSpline {
    /// Fit the spline through `vertices` in order.
    ///
    /// # Errors
    ///
    /// Returns [`ShapeError::NotRegularizable`] for fewer than
    /// [`MIN_REGULARIZE_VERTICES`] vertices, or if the spline system cannot
    /// be solved.
    #[allow(clippy::cast_precision_loss)]
    pub fn fit(vertices: &[Point]) -> Result<Self, ShapeError> {
        let n = vertices.len();
        let not_regularizable = ShapeError::NotRegularizable { vertices: n };
        if n < MIN_REGULARIZE_VERTICES {
            return Err(not_regularizable);
        }

        let mut system = DMatrix::<f64>::zeros(n, n);
        let mut rhs = DMatrix::<f64>::zeros(n, 2);
        let scale = 6.0 * (n * n) as f64;
        for i in 0..n {
            let prev = (i + n - 1) % n;
            let next = (i + 1) % n;
            system[(i, prev)] += 1.0;
            system[(i, i)] += 4.0;
            system[(i, next)] += 1.0;

            let (p, c, q) = (vertices[prev], vertices[i], vertices[next]);
            rhs[(i, 0)] = scale * (2.0f64.mul_add(-c.x, q.x) + p.x);
            rhs[(i, 1)] = scale * (2.0f64.mul_add(-c.y, q.y) + p.y);
        }

        let solution = system.lu().solve(&rhs).ok_or(not_regularizable)?;
        let curvature = (0..n)
            .map(|i| Point::new(solution[(i, 0)], solution[(i, 1)]))
            .collect();

        Ok(Self {
            knots: vertices.to_vec(),
            curvature,
        })
    }

    /// Number of knots.
    #[must_use]
    pub fn knot_count(&self) -> usize {
        self.knots.len()
    }

    /// Evaluate the spline at parameter `t`, taken modulo 1.
    #[must_use]
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    pub fn evaluate(&self, t: f64) -> Point {
        let n = self.knots.len();
        let s = t.rem_euclid(1.0) * n as f64;
        let i = (s.floor() as usize).min(n - 1);
        let j = (i + 1) % n;
        let u = s - i as f64;
        let v = 1.0 - u;

        let h2 = 1.0 / (n * n) as f64 / 6.0;
        let wi = h2 * v.mul_add(v * v, -v);
        let wj = h2 * u.mul_add(u * u, -u);

        let (yi, yj) = (self.knots[i], self.knots[j]);
        let (mi, mj) = (self.curvature[i], self.curvature[j]);
        Point::new(
            wj.mul_add(mj.x, wi.mul_add(mi.x, v.mul_add(yi.x, u * yj.x))),
            wj.mul_add(mj.y, wi.mul_add(mi.y, v.mul_add(yi.y, u * yj.y))),
        )
    }

    /// `count` samples at `t = k / (count − 1)`; the first and last
    /// samples both land on the first knot.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn sample(&self, count: usize) -> Vec<Point> {
        let last = count.saturating_sub(1).max(1) as f64;
        (0..count)
            .map(|k| self.evaluate(k as f64 / last))
            .collect()
    }
}

/// Fit a periodic spline through `simplified` and resample it.
///
/// # Errors
///
/// Returns [`ShapeError::NotRegularizable`] for polygons with fewer than
/// [`MIN_REGULARIZE_VERTICES`] vertices and [`ShapeError::InvalidConfig`]
/// when `sample_count` is below 2.
pub fn regularize(
    simplified: &SimplifiedPolygon,
    sample_count: usize,
) -> Result<RegularizedCurve, ShapeError> {
    if sample_count < 2 {
        return Err(ShapeError::InvalidConfig(format!(
            "sample_count must be at least 2, got {sample_count}"
        )));
    }
    let spline = PeriodicSpline::fit(simplified.vertices())?;
    Ok(RegularizedCurve::new(spline.sample(sample_count)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn regular_polygon(n: u32, radius: f64) -> Vec<Point> {
        (0..n)
            .map(|i| {
                let t = std::f64::consts::TAU * f64::from(i) / f64::from(n);
                Point::new(radius.mul_add(t.cos(), 50.0), radius.mul_add(t.sin(), 50.0))
            })
            .collect()
    }

    #[test]
    fn curve_is_closed() {
        let poly = SimplifiedPolygon::new(regular_polygon(6, 20.0));
        let curve = regularize(&poly, 100).unwrap();
        assert_eq!(curve.len(), 100);
        let pts = curve.points();
        assert_eq!(pts[0], pts[99]);
        assert!(pts[0].distance(poly.vertices()[0]) < 1e-9);
    }

    #[test]
    fn spline_passes_through_vertices() {
        let vertices = vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 2.0),
            Point::new(14.0, 9.0),
            Point::new(6.0, 15.0),
            Point::new(-3.0, 8.0),
            Point::new(-1.0, 3.0),
        ];
        let spline = PeriodicSpline::fit(&vertices).unwrap();
        for (i, v) in (0u32..).zip(&vertices) {
            let p = spline.evaluate(f64::from(i) / 6.0);
            assert!(p.distance(*v) < 1e-9, "vertex {i}: {p:?} vs {v:?}");
        }
    }

    #[test]
    fn evaluate_wraps_parameter() {
        let spline = PeriodicSpline::fit(&regular_polygon(5, 10.0)).unwrap();
        let a = spline.evaluate(0.3);
        let b = spline.evaluate(1.3);
        let c = spline.evaluate(-0.7);
        assert!(a.distance(b) < 1e-9);
        assert!(a.distance(c) < 1e-9);
    }

    #[test]
    fn regular_polygon_spline_stays_near_circle() {
        let curve = regularize(&SimplifiedPolygon::new(regular_polygon(12, 30.0)), 240).unwrap();
        for p in curve.points() {
            let r = p.distance(Point::new(50.0, 50.0));
            assert!((r - 30.0).abs() < 0.5, "radius {r}");
        }
    }

    #[test]
    fn four_vertices_not_regularizable() {
        let poly = SimplifiedPolygon::new(regular_polygon(4, 10.0));
        assert_eq!(
            regularize(&poly, 100),
            Err(ShapeError::NotRegularizable { vertices: 4 })
        );
    }

    #[test]
    fn single_sample_is_invalid() {
        let poly = SimplifiedPolygon::new(regular_polygon(8, 10.0));
        assert!(matches!(
            regularize(&poly, 1),
            Err(ShapeError::InvalidConfig(_))
        ));
    }

    #[test]
    fn two_samples_are_both_the_first_vertex() {
        let vertices = regular_polygon(5, 10.0);
        let curve = regularize(&SimplifiedPolygon::new(vertices.clone()), 2).unwrap();
        for p in curve.points() {
            assert!(p.distance(vertices[0]) < 1e-9);
        }
    }

    proptest! {
        #[test]
        fn regularization_is_deterministic_and_closed(
            raw in prop::collection::vec((-200.0f64..200.0, -200.0f64..200.0), 5..24),
            samples in 2usize..200,
        ) {
            let vertices: Vec<Point> = raw.into_iter().map(|(x, y)| Point::new(x, y)).collect();
            let poly = SimplifiedPolygon::new(vertices.clone());
            let a = regularize(&poly, samples).unwrap();
            let b = regularize(&poly, samples).unwrap();
            prop_assert_eq!(&a, &b);
            prop_assert_eq!(a.len(), samples);
            prop_assert!(a.points()[0].distance(vertices[0]) < 1e-6);
            prop_assert_eq!(a.points()[0], a.points()[samples - 1]);
        }
    }
}
