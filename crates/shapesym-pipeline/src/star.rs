//! Star discriminator: radial distance statistics around the centroid.
//!
//! The centroid comes from the moments of the original contour, while the
//! radial distances are measured to the simplified polygon's vertices. A
//! contour is flagged when the population variance of those distances is
//! below `star_variance_ratio` times their mean.
//!
//! Distances are Euclidean, `sqrt(dx² + dy²)`.

use serde::{Deserialize, Serialize};

use crate::metrics;
use crate::types::{ClassifierConfig, Contour, Point, SimplifiedPolygon};

/// Summary of the centroid-to-vertex distances.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RadialStats {
    /// Area-weighted centroid of the original contour.
    pub centroid: Point,
    /// Mean distance from the centroid to the simplified vertices.
    pub mean: f64,
    /// Population variance of those distances.
    pub variance: f64,
    /// Number of simplified vertices measured.
    pub vertex_count: usize,
}

/// Outcome of the star discriminator, including why it declined.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum StarVerdict {
    /// Radial distances are uniform enough.
    Star(RadialStats),
    /// Radial distances vary too much.
    NotStar(RadialStats),
    /// The simplified polygon has too few vertices to describe a star.
    TooFewVertices {
        /// Simplified vertex count.
        vertices: usize,
    },
    /// The contour encloses no area, so it has no centroid.
    ZeroArea,
}

impl StarVerdict {
    /// `true` only for [`StarVerdict::Star`].
    #[must_use]
    pub const fn is_star(&self) -> bool {
        matches!(self, Self::Star(_))
    }

    /// Radial statistics, when they were computed.
    #[must_use]
    pub const fn stats(&self) -> Option<&RadialStats> {
        match self {
            Self::Star(stats) | Self::NotStar(stats) => Some(stats),
            Self::TooFewVertices { .. } | Self::ZeroArea => None,
        }
    }
}

/// Compute mean and population variance of centroid-to-vertex distances.
#[allow(clippy::cast_precision_loss)]
fn radial_stats(centroid: Point, vertices: &[Point]) -> RadialStats {
    let distances: Vec<f64> = vertices.iter().map(|&v| v.distance(centroid)).collect();
    let count = distances.len() as f64;
    let mean = distances.iter().sum::<f64>() / count;
    let variance = distances
        .iter()
        .map(|d| (d - mean) * (d - mean))
        .sum::<f64>()
        / count;
    RadialStats {
        centroid,
        mean,
        variance,
        vertex_count: vertices.len(),
    }
}

/// Run the star discriminator and report the full verdict.
#[must_use]
pub fn evaluate_star(
    contour: &Contour,
    simplified: &SimplifiedPolygon,
    config: &ClassifierConfig,
) -> StarVerdict {
    let vertices = simplified.vertex_count();
    if vertices < config.star_min_vertices.max(1) {
        return StarVerdict::TooFewVertices { vertices };
    }

    let Ok(centroid) = metrics::centroid(contour.points()) else {
        return StarVerdict::ZeroArea;
    };

    let stats = radial_stats(centroid, simplified.vertices());
    if stats.variance < config.star_variance_ratio * stats.mean {
        StarVerdict::Star(stats)
    } else {
        StarVerdict::NotStar(stats)
    }
}

/// `true` when the contour is star-like.
///
/// Declines (returns `false`) for fewer than `star_min_vertices`
/// simplified vertices or a zero-area contour; use [`evaluate_star`] to
/// see which.
#[must_use]
pub fn is_star(contour: &Contour, simplified: &SimplifiedPolygon, config: &ClassifierConfig) -> bool {
    evaluate_star(contour, simplified, config).is_star()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn ring(n: u32, radius: impl Fn(u32) -> f64) -> Vec<Point> {
        (0..n)
            .map(|i| {
                let t = std::f64::consts::TAU * f64::from(i) / f64::from(n);
                let r = radius(i);
                Point::new(r.mul_add(t.cos(), 50.0), r.mul_add(t.sin(), 50.0))
            })
            .collect()
    }

    fn as_inputs(points: Vec<Point>) -> (Contour, SimplifiedPolygon) {
        let simplified = SimplifiedPolygon::new(points.clone());
        (Contour::new(points).unwrap(), simplified)
    }

    #[test]
    fn regular_pentagon_is_star() {
        let (contour, simplified) = as_inputs(ring(5, |_| 20.0));
        let verdict = evaluate_star(&contour, &simplified, &ClassifierConfig::default());
        assert!(verdict.is_star(), "verdict = {verdict:?}");
        let stats = verdict.stats().unwrap();
        assert!((stats.mean - 20.0).abs() < 1e-9);
        assert!(stats.variance < 1e-9);
        assert!((stats.centroid.x - 50.0).abs() < 1e-9);
    }

    #[test]
    fn regular_hexagon_is_star() {
        let (contour, simplified) = as_inputs(ring(6, |_| 35.0));
        assert!(is_star(&contour, &simplified, &ClassifierConfig::default()));
    }

    #[test]
    fn spiky_outline_is_not_star() {
        // Alternating radii 40 / 10: mean 25, variance 225 >> 2.5.
        let (contour, simplified) = as_inputs(ring(10, |i| if i % 2 == 0 { 40.0 } else { 10.0 }));
        let verdict = evaluate_star(&contour, &simplified, &ClassifierConfig::default());
        assert!(matches!(verdict, StarVerdict::NotStar(_)), "verdict = {verdict:?}");
        let stats = verdict.stats().unwrap();
        assert!((stats.mean - 25.0).abs() < 1e-9);
        assert!((stats.variance - 225.0).abs() < 1e-6);
    }

    #[test]
    fn four_vertices_decline() {
        let (contour, simplified) = as_inputs(ring(4, |_| 10.0));
        assert_eq!(
            evaluate_star(&contour, &simplified, &ClassifierConfig::default()),
            StarVerdict::TooFewVertices { vertices: 4 },
        );
    }

    #[test]
    fn zero_area_declines() {
        let line: Vec<Point> = (0..6).map(|i| Point::new(f64::from(i), f64::from(i))).collect();
        let (contour, simplified) = as_inputs(line);
        let verdict = evaluate_star(&contour, &simplified, &ClassifierConfig::default());
        assert_eq!(verdict, StarVerdict::ZeroArea);
        assert!(!verdict.is_star());
    }

    #[test]
    fn mean_is_euclidean_radius() {
        // Vertices at exactly radius 30 must report mean 30.
        let (contour, simplified) = as_inputs(ring(8, |_| 30.0));
        let verdict = evaluate_star(&contour, &simplified, &ClassifierConfig::default());
        let stats = verdict.stats().unwrap();
        assert!((stats.mean - 30.0).abs() < 1e-9);
        assert!(stats.mean.is_finite());
    }

    #[test]
    fn variance_ratio_is_tunable() {
        let (contour, simplified) = as_inputs(ring(10, |i| if i % 2 == 0 { 40.0 } else { 10.0 }));
        // variance 225 against ratio * mean 25.
        let config = ClassifierConfig {
            star_variance_ratio: 8.9,
            ..ClassifierConfig::default()
        };
        assert!(!is_star(&contour, &simplified, &config));
        let config = ClassifierConfig {
            star_variance_ratio: 9.1,
            ..ClassifierConfig::default()
        };
        assert!(is_star(&contour, &simplified, &config));
    }
}
