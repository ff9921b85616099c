//! Least-squares ellipse fitting.
//!
//! Points are centered and scaled to unit RMS radius, then the general
//! conic `a·x² + b·xy + c·y² + d·x + e·y + f = 0` minimizing the algebraic
//! residual under `‖(a..f)‖ = 1` is taken from the eigenvector of the
//! smallest eigenvalue of the 6×6 scatter matrix. When that conic is not a
//! real ellipse (too few points, line pairs, hyperbolas), the ellipse with
//! the same second-order moments as the enclosed region is used instead.

use std::f64::consts::{FRAC_PI_2, PI};

use nalgebra::{Matrix6, SymmetricEigen, Vector6};
use serde::{Deserialize, Serialize};

use crate::metrics;
use crate::types::{AxisSegment, Point, ShapeError};

/// Minimum number of points for the conic fit.
const MIN_CONIC_POINTS: usize = 5;

/// Below this relative size the conic discriminant is treated as zero.
const DEGENERATE_CONIC_TOLERANCE: f64 = 1e-9;

/// Relative eigenvalue gap below which an ellipse counts as a circle and
/// its rotation is reported as zero.
const CIRCLE_TOLERANCE: f64 = 1e-9;

/// Geometric parameters of a fitted ellipse.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EllipseFit {
    /// Ellipse center.
    pub center: Point,
    /// Full length of the major axis.
    pub major_axis: f64,
    /// Full length of the minor axis.
    pub minor_axis: f64,
    /// Direction of the major axis in radians from +x, in `(-π/2, π/2]`.
    pub angle: f64,
}

impl EllipseFit {
    /// Major and minor axis segments through the center, each spanning the
    /// full axis length.
    #[must_use]
    pub fn axis_segments(&self) -> (AxisSegment, AxisSegment) {
        let (sin, cos) = self.angle.sin_cos();
        let half_major = self.major_axis / 2.0;
        let half_minor = self.minor_axis / 2.0;
        let c = self.center;
        let major = AxisSegment::new(
            Point::new(c.x - half_major * cos, c.y - half_major * sin),
            Point::new(c.x + half_major * cos, c.y + half_major * sin),
        );
        let minor = AxisSegment::new(
            Point::new(c.x + half_minor * sin, c.y - half_minor * cos),
            Point::new(c.x - half_minor * sin, c.y + half_minor * cos),
        );
        (major, minor)
    }
}

/// Fit an ellipse to a set of points.
///
/// # Errors
///
/// Returns [`ShapeError::ZeroAreaContour`] when neither the conic fit nor
/// the moment ellipse is defined (for example, collinear points).
pub fn fit_ellipse(points: &[Point]) -> Result<EllipseFit, ShapeError> {
    if points.len() >= MIN_CONIC_POINTS {
        if let Some(fit) = fit_conic(points) {
            return Ok(fit);
        }
        tracing::debug!(
            points = points.len(),
            "conic fit is not an ellipse, falling back to moments"
        );
    }
    moment_ellipse(points)
}

#[allow(clippy::cast_precision_loss)]
fn fit_conic(points: &[Point]) -> Option<EllipseFit> {
    let n = points.len() as f64;
    let mean = Point::new(
        points.iter().map(|p| p.x).sum::<f64>() / n,
        points.iter().map(|p| p.y).sum::<f64>() / n,
    );
    let scale = (points.iter().map(|p| p.distance_squared(mean)).sum::<f64>() / n).sqrt();
    let extent = mean.x.abs().max(mean.y.abs());
    if scale == 0.0 || scale <= f64::EPSILON * extent {
        return None;
    }

    let mut scatter = Matrix6::<f64>::zeros();
    for p in points {
        let u = (p.x - mean.x) / scale;
        let v = (p.y - mean.y) / scale;
        let row = Vector6::new(u * u, u * v, v * v, u, v, 1.0);
        scatter += row * row.transpose();
    }

    let eigen = SymmetricEigen::new(scatter);
    let (smallest, _) = eigen
        .eigenvalues
        .iter()
        .enumerate()
        .min_by(|a, b| a.1.total_cmp(b.1))?;
    let v = eigen.eigenvectors.column(smallest);

    let unit = conic_to_ellipse([v[0], v[1], v[2], v[3], v[4], v[5]])?;
    Some(EllipseFit {
        center: Point::new(
            unit.center.x.mul_add(scale, mean.x),
            unit.center.y.mul_add(scale, mean.y),
        ),
        major_axis: unit.major_axis * scale,
        minor_axis: unit.minor_axis * scale,
        angle: unit.angle,
    })
}

/// Convert general conic coefficients into ellipse parameters.
///
/// Returns `None` unless the conic is a real, non-degenerate ellipse.
fn conic_to_ellipse(coefficients: [f64; 6]) -> Option<EllipseFit> {
    let [mut a, mut b, mut c, mut d, mut e, mut f] = coefficients;
    if a + c < 0.0 {
        a = -a;
        b = -b;
        c = -c;
        d = -d;
        e = -e;
        f = -f;
    }

    let det = 4.0 * a * c - b * b;
    let magnitude = c.mul_add(c, a.mul_add(a, b * b));
    if det <= DEGENERATE_CONIC_TOLERANCE * magnitude {
        return None;
    }

    let x0 = b.mul_add(e, -2.0 * c * d) / det;
    let y0 = b.mul_add(d, -2.0 * a * e) / det;
    let linear = d.mul_add(x0, e.mul_add(y0, f));
    let f0 = (a * x0).mul_add(x0, (b * x0).mul_add(y0, (c * y0).mul_add(y0, linear)));
    if f0 >= 0.0 {
        return None;
    }

    let mid = (a + c) / 2.0;
    let gap = ((a - c) / 2.0).hypot(b / 2.0);
    let steep = mid + gap;
    let shallow = mid - gap;
    if shallow <= 0.0 {
        return None;
    }

    let angle = if gap <= CIRCLE_TOLERANCE * mid {
        0.0
    } else {
        normalize_axis_angle(0.5f64.mul_add(b.atan2(a - c), FRAC_PI_2))
    };

    Some(EllipseFit {
        center: Point::new(x0, y0),
        major_axis: 2.0 * (-f0 / shallow).sqrt(),
        minor_axis: 2.0 * (-f0 / steep).sqrt(),
        angle,
    })
}

/// Ellipse with the same area-normalized second moments as the region
/// enclosed by `points`.
///
/// A uniform elliptical region with semi-axis `s` has variance `s²/4`
/// along that axis, so each full axis is `4·sqrt(λ)`.
///
/// # Errors
///
/// Returns [`ShapeError::ZeroAreaContour`] when the region has no area.
pub fn moment_ellipse(points: &[Point]) -> Result<EllipseFit, ShapeError> {
    let moments = metrics::moments(points);
    let center = moments.centroid()?;
    let (mu20, mu11, mu02) = moments.covariance()?;

    let mid = (mu20 + mu02) / 2.0;
    let gap = ((mu20 - mu02) / 2.0).hypot(mu11);
    let major = (mid + gap).max(0.0);
    let minor = (mid - gap).max(0.0);

    let angle = if gap <= CIRCLE_TOLERANCE * mid {
        0.0
    } else {
        normalize_axis_angle(0.5 * (2.0 * mu11).atan2(mu20 - mu02))
    };

    Ok(EllipseFit {
        center,
        major_axis: 4.0 * major.sqrt(),
        minor_axis: 4.0 * minor.sqrt(),
        angle,
    })
}

/// Map an axis direction onto `(-π/2, π/2]`.
fn normalize_axis_angle(theta: f64) -> f64 {
    let t = theta.rem_euclid(PI);
    if t > FRAC_PI_2 { t - PI } else { t }
}
