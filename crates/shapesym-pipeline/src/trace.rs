//! Edge detection and external contour tracing.
//!
//! The rasterized cloud is smoothed with a Gaussian blur, passed through
//! the Canny detector and then traced with Suzuki-Abe border following
//! (`imageproc::contours::find_contours`). Only the outermost outer
//! borders are kept; holes and borders nested inside them are discarded.
//!
//! With [`ChainApproximation::Simple`] each traced border is then
//! compressed to the endpoints of its straight 8-connected runs, so a
//! filled rectangle becomes its four corners.

use image::GrayImage;
use imageproc::contours::BorderType;
use imageproc::point::Point as Pixel;

use crate::types::{ChainApproximation, Contour, Point};

/// Minimum allowed Canny threshold.
///
/// A zero low threshold marks every pixel with any gradient as a
/// candidate edge.
pub const MIN_THRESHOLD: f32 = 1.0;
const _: () = assert!(MIN_THRESHOLD > 0.0);

/// Apply a Gaussian blur. A sigma that is not a finite positive number
/// returns the image unchanged, since `imageproc` panics on it.
#[must_use = "returns the blurred image"]
pub fn gaussian_blur(image: &GrayImage, sigma: f32) -> GrayImage {
    if !sigma.is_finite() || sigma <= 0.0 {
        return image.clone();
    }
    imageproc::filter::gaussian_blur_f32(image, sigma)
}

/// Blur and run Canny edge detection.
///
/// Returns a binary image: 255 for edge pixels, 0 elsewhere. Both
/// thresholds are clamped to at least [`MIN_THRESHOLD`] and `low` is
/// clamped to at most `high`.
#[must_use = "returns the binary edge map"]
pub fn detect_edges(image: &GrayImage, sigma: f32, low: f32, high: f32) -> GrayImage {
    let blurred = gaussian_blur(image, sigma);
    let high = high.max(MIN_THRESHOLD);
    let low = low.max(MIN_THRESHOLD).min(high);
    imageproc::edges::canny(&blurred, low, high)
}

/// Drop border pixels that continue a straight run.
///
/// A pixel is kept when the step into it differs from the step out of
/// it, treating the border as a closed ring.
fn compress_runs(pixels: &[Pixel<u32>]) -> Vec<Pixel<u32>> {
    let n = pixels.len();
    if n < 3 {
        return pixels.to_vec();
    }
    let step = |a: Pixel<u32>, b: Pixel<u32>| {
        (
            i64::from(b.x) - i64::from(a.x),
            i64::from(b.y) - i64::from(a.y),
        )
    };
    pixels
        .iter()
        .enumerate()
        .filter(|&(i, &p)| step(pixels[(i + n - 1) % n], p) != step(p, pixels[(i + 1) % n]))
        .map(|(_, &p)| p)
        .collect()
}

/// Trace the outermost contours of a binary edge map.
///
/// Traces with fewer than [`Contour::MIN_POINTS`] points (after
/// approximation) are dropped. Contours are returned in the tracer's scan
/// order (top to bottom, left to right by starting pixel).
#[must_use]
pub fn trace_external_contours(
    edges: &GrayImage,
    approximation: ChainApproximation,
) -> Vec<Contour> {
    let traced: Vec<imageproc::contours::Contour<u32>> =
        imageproc::contours::find_contours(edges);

    traced
        .into_iter()
        .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
        .filter_map(|c| {
            let pixels = match approximation {
                ChainApproximation::Full => c.points,
                ChainApproximation::Simple => compress_runs(&c.points),
            };
            let points = pixels
                .into_iter()
                .map(|p| Point::new(f64::from(p.x), f64::from(p.y)))
                .collect();
            Contour::new(points).ok()
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn filled_square(size: u32, from: u32, to: u32) -> GrayImage {
        GrayImage::from_fn(size, size, |x, y| {
            if (from..to).contains(&x) && (from..to).contains(&y) {
                image::Luma([255])
            } else {
                image::Luma([0])
            }
        })
    }

    #[test]
    fn zero_sigma_is_identity() {
        let img = filled_square(10, 3, 7);
        assert_eq!(gaussian_blur(&img, 0.0), img);
    }

    #[test]
    fn non_finite_sigma_is_identity() {
        let img = filled_square(10, 3, 7);
        assert_eq!(gaussian_blur(&img, f32::NAN), img);
        assert_eq!(gaussian_blur(&img, f32::INFINITY), img);
    }

    #[test]
    fn blank_image_has_no_edges() {
        let img = GrayImage::from_fn(20, 20, |_, _| image::Luma([128]));
        let edges = detect_edges(&img, 1.1, 50.0, 150.0);
        assert_eq!(edges.dimensions(), (20, 20));
        assert!(edges.pixels().all(|p| p.0[0] == 0));
    }

    #[test]
    fn filled_square_has_edges() {
        let edges = detect_edges(&filled_square(40, 10, 30), 1.1, 50.0, 150.0);
        assert!(edges.pixels().any(|p| p.0[0] > 0));
    }

    #[test]
    fn empty_image_has_no_contours() {
        assert!(
            trace_external_contours(&GrayImage::new(10, 10), ChainApproximation::Simple)
                .is_empty()
        );
    }

    #[test]
    fn nested_borders_are_discarded() {
        // A hollow square frame with a filled square inside the hole.
        let img = GrayImage::from_fn(30, 30, |x, y| {
            let frame = (2..28).contains(&x)
                && (2..28).contains(&y)
                && !((5..25).contains(&x) && (5..25).contains(&y));
            let inner = (10..20).contains(&x) && (10..20).contains(&y);
            image::Luma([if frame || inner { 255 } else { 0 }])
        });
        let contours = trace_external_contours(&img, ChainApproximation::Simple);
        assert_eq!(contours.len(), 1);
        let xs: Vec<f64> = contours[0].points().iter().map(|p| p.x).collect();
        assert!(xs.contains(&2.0) && xs.contains(&27.0));
    }

    #[test]
    fn separate_shapes_are_all_traced() {
        let img = GrayImage::from_fn(40, 20, |x, y| {
            let left = (2..10).contains(&x) && (5..15).contains(&y);
            let right = (25..35).contains(&x) && (5..15).contains(&y);
            image::Luma([if left || right { 255 } else { 0 }])
        });
        assert_eq!(
            trace_external_contours(&img, ChainApproximation::Simple).len(),
            2
        );
    }

    #[test]
    fn filled_square_compresses_to_corners() {
        let contours =
            trace_external_contours(&filled_square(40, 10, 30), ChainApproximation::Simple);
        assert_eq!(contours.len(), 1);
        let mut corners: Vec<(f64, f64)> =
            contours[0].points().iter().map(|p| (p.x, p.y)).collect();
        corners.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(
            corners,
            vec![(10.0, 10.0), (10.0, 29.0), (29.0, 10.0), (29.0, 29.0)]
        );
    }

    #[test]
    fn full_chain_keeps_every_border_pixel() {
        let contours =
            trace_external_contours(&filled_square(40, 10, 30), ChainApproximation::Full);
        assert_eq!(contours.len(), 1);
        assert_eq!(contours[0].len(), 4 * 20 - 4);
    }

    #[test]
    fn diagonal_runs_keep_only_endpoints() {
        let px = |x: u32, y: u32| Pixel::new(x, y);
        // Right triangle: down the left edge, along the bottom, back up the
        // hypotenuse.
        let ring = vec![
            px(0, 0),
            px(0, 1),
            px(0, 2),
            px(0, 3),
            px(1, 3),
            px(2, 3),
            px(3, 3),
            px(2, 2),
            px(1, 1),
        ];
        assert_eq!(compress_runs(&ring), vec![px(0, 0), px(0, 3), px(3, 3)]);
    }
}
