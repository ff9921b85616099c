//! Closed-contour polygon approximation (Ramer-Douglas-Peucker).
//!
//! A closed ring has no natural endpoints, so the ring is first split at
//! two far-apart points: the point farthest from the first point, and the
//! point farthest from that one. Both halves are then simplified as open
//! chains and the kept vertices are reported in contour order.
//!
//! The tolerance is proportional to the contour perimeter (see
//! [`epsilon_for`]), so the approximation is scale independent.

use crate::metrics;
use crate::types::{Contour, Point, SimplifiedPolygon};

/// Tolerance for [`approximate_polygon`]: `ratio` × closed perimeter.
#[must_use]
pub fn epsilon_for(contour: &Contour, ratio: f64) -> f64 {
    ratio * metrics::perimeter(contour.points())
}

/// Approximate a closed contour by a polygon within `epsilon` pixels.
///
/// The output never has more vertices than the contour has points, and
/// keeps the contour's point order. A contour whose points all coincide
/// collapses to a single vertex.
#[must_use = "returns the simplified polygon"]
pub fn approximate_polygon(contour: &Contour, epsilon: f64) -> SimplifiedPolygon {
    let points = contour.points();
    let n = points.len();

    let first = farthest_from(points, 0);
    let second = farthest_from(points, first);
    if points[first].distance_squared(points[second]) == 0.0 {
        return SimplifiedPolygon::new(vec![points[first]]);
    }

    let mut kept = vec![false; n];
    for chain in [ring_chain(first, second, n), ring_chain(second, first, n)] {
        let chain_points: Vec<Point> = chain.iter().map(|&i| points[i]).collect();
        let mut chain_kept = vec![false; chain_points.len()];
        chain_kept[0] = true;
        chain_kept[chain_points.len() - 1] = true;
        rdp_recurse(
            &chain_points,
            0,
            chain_points.len() - 1,
            epsilon,
            &mut chain_kept,
        );
        for (&index, keep) in chain.iter().zip(chain_kept) {
            kept[index] |= keep;
        }
    }

    let vertices = points
        .iter()
        .zip(&kept)
        .filter(|&(_, k)| *k)
        .map(|(&p, _)| p)
        .collect();
    SimplifiedPolygon::new(vertices)
}

/// Approximate every contour with a tolerance of `ratio` × its perimeter.
#[must_use = "returns the simplified polygons"]
pub fn approximate_all(contours: &[Contour], ratio: f64) -> Vec<SimplifiedPolygon> {
    contours
        .iter()
        .map(|c| approximate_polygon(c, epsilon_for(c, ratio)))
        .collect()
}

/// Index of the point farthest from `points[from]` (first one on ties).
fn farthest_from(points: &[Point], from: usize) -> usize {
    let origin = points[from];
    let mut best = from;
    let mut best_dist = 0.0;
    for (i, &p) in points.iter().enumerate() {
        let d = p.distance_squared(origin);
        if d > best_dist {
            best_dist = d;
            best = i;
        }
    }
    best
}

/// Indices walking the ring forward from `start` to `end`, inclusive.
fn ring_chain(start: usize, end: usize, n: usize) -> Vec<usize> {
    let span = (end + n - start) % n;
    (0..=span).map(|k| (start + k) % n).collect()
}

/// Recursive step of the Ramer-Douglas-Peucker algorithm.
///
/// Finds the point between `start` and `end` that is farthest from the
/// line segment between them. If that distance exceeds `tolerance`, the
/// point is kept and both sub-segments are processed recursively.
fn rdp_recurse(points: &[Point], start: usize, end: usize, tolerance: f64, kept: &mut [bool]) {
    if end <= start + 1 {
        return;
    }

    let mut max_dist = 0.0;
    let mut max_idx = start;

    for i in (start + 1)..end {
        let d = perpendicular_distance(points[i], points[start], points[end]);
        if d > max_dist {
            max_dist = d;
            max_idx = i;
        }
    }

    if max_dist > tolerance {
        kept[max_idx] = true;
        rdp_recurse(points, start, max_idx, tolerance, kept);
        rdp_recurse(points, max_idx, end, tolerance, kept);
    }
}

/// Perpendicular distance from point `p` to the line defined by `a` and `b`.
///
/// When `a` and `b` coincide, returns the distance from `p` to `a`.
fn perpendicular_distance(p: Point, a: Point, b: Point) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let length_sq = dx.mul_add(dx, dy * dy);

    if length_sq == 0.0 {
        return p.distance(a);
    }

    let cross = dx.mul_add(a.y - p.y, -(dy * (a.x - p.x)));
    cross.abs() / length_sq.sqrt()
}
