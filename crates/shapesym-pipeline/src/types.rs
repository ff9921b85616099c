//! Shared types for the shapesym contour analysis pipeline.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::star::StarVerdict;

/// A 2D point in image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal position (pixels from left edge).
    pub x: f64,
    /// Vertical position (pixels from top edge).
    pub y: f64,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance to another point.
    ///
    /// Avoids the square root for comparison purposes.
    #[must_use]
    pub fn distance_squared(self, other: Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx.mul_add(dx, dy * dy)
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        self.distance_squared(other).sqrt()
    }
}

/// A closed, ordered outline of a detected silhouette.
///
/// The first and last points are adjacent; the closing edge is implicit
/// and the first point is never repeated at the end. A contour always
/// holds at least [`Contour::MIN_POINTS`] points, so every operation
/// downstream can assume a non-degenerate ring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Point>", into = "Vec<Point>")]
pub struct Contour(Vec<Point>);

impl Contour {
    /// Minimum number of points in a contour.
    pub const MIN_POINTS: usize = 3;

    /// Create a contour from an ordered ring of points.
    ///
    /// # Errors
    ///
    /// Returns [`ShapeError::DegenerateContour`] if fewer than
    /// [`Self::MIN_POINTS`] points are given.
    pub fn new(points: Vec<Point>) -> Result<Self, ShapeError> {
        if points.len() < Self::MIN_POINTS {
            return Err(ShapeError::DegenerateContour {
                points: points.len(),
            });
        }
        Ok(Self(points))
    }

    /// Returns the number of points in the contour.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false`: a contour holds at least three points.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns a slice of all points.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.0
    }

    /// Consumes the contour and returns the underlying vector of points.
    #[must_use]
    pub fn into_points(self) -> Vec<Point> {
        self.0
    }
}

impl TryFrom<Vec<Point>> for Contour {
    type Error = ShapeError;

    fn try_from(points: Vec<Point>) -> Result<Self, Self::Error> {
        Self::new(points)
    }
}

impl From<Contour> for Vec<Point> {
    fn from(contour: Contour) -> Self {
        contour.0
    }
}

/// Reduced-vertex approximation of a [`Contour`].
///
/// Produced by [`approximate_polygon`](crate::simplify::approximate_polygon).
/// The vertex count never exceeds the source contour's point count. It may
/// drop below three for a contour whose points all coincide; the classifier
/// maps that case to [`ShapeCategory::Polygon`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimplifiedPolygon(Vec<Point>);

impl SimplifiedPolygon {
    /// Create a simplified polygon from its ordered vertices.
    #[must_use]
    pub const fn new(vertices: Vec<Point>) -> Self {
        Self(vertices)
    }

    /// Number of vertices.
    #[must_use]
    pub const fn vertex_count(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the polygon has no vertices.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns a slice of all vertices.
    #[must_use]
    pub fn vertices(&self) -> &[Point] {
        &self.0
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Top-left corner (minimum x and y).
    pub min: Point,
    /// Bottom-right corner (maximum x and y).
    pub max: Point,
}

impl BoundingBox {
    /// Horizontal extent.
    #[must_use]
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    /// Vertical extent.
    #[must_use]
    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    /// Center of the box.
    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(
            (self.min.x + self.max.x) / 2.0,
            (self.min.y + self.max.y) / 2.0,
        )
    }

    /// Width divided by height, or `None` for a zero-height box.
    #[must_use]
    pub fn aspect_ratio(&self) -> Option<f64> {
        let height = self.height();
        if height == 0.0 {
            return None;
        }
        Some(self.width() / height)
    }
}

/// Geometric shape category assigned to a contour.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum ShapeCategory {
    /// Three simplified vertices.
    Triangle,
    /// Four vertices with a near-unit bounding-box aspect ratio.
    Square,
    /// Four vertices otherwise.
    Rectangle,
    /// More than four vertices with high circularity.
    Circle,
    /// More than four vertices with lower circularity.
    Ellipse,
    /// Radially uniform outline flagged by the star discriminator.
    Star,
    /// Fallback for degenerate approximations.
    Polygon,
}

impl ShapeCategory {
    /// Every category, in declaration order.
    pub const ALL: [Self; 7] = [
        Self::Triangle,
        Self::Square,
        Self::Rectangle,
        Self::Circle,
        Self::Ellipse,
        Self::Star,
        Self::Polygon,
    ];

    /// Human-readable name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Triangle => "Triangle",
            Self::Square => "Square",
            Self::Rectangle => "Rectangle",
            Self::Circle => "Circle",
            Self::Ellipse => "Ellipse",
            Self::Star => "Star",
            Self::Polygon => "Polygon",
        }
    }
}

impl fmt::Display for ShapeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

/// Descriptors computed from the original contour during classification.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShapeMetrics {
    /// Axis-aligned bounding box of the contour.
    pub bounding_box: BoundingBox,
    /// Bounding-box width / height. `None` when the box is flat, which
    /// never counts as square.
    pub aspect_ratio: Option<f64>,
    /// `4π·area / perimeter²` (1.0 for a perfect circle).
    pub circularity: f64,
    /// Enclosed area (shoelace formula, unsigned).
    pub area: f64,
    /// Closed perimeter including the wrap-around edge.
    pub perimeter: f64,
}

/// A contour with its assigned category and derived metrics.
///
/// Created once per contour by [`classify`](crate::classify::classify) or
/// [`classify_with_star`](crate::classify::classify_with_star) and never
/// mutated afterwards. The source contour is shared, not copied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedShape {
    pub(crate) category: ShapeCategory,
    pub(crate) primary: ShapeCategory,
    pub(crate) contour: Arc<Contour>,
    pub(crate) vertex_count: usize,
    pub(crate) metrics: ShapeMetrics,
    pub(crate) star: Option<StarVerdict>,
}

impl ClassifiedShape {
    /// Final category (the star verdict applied, when it was evaluated).
    #[must_use]
    pub const fn category(&self) -> ShapeCategory {
        self.category
    }

    /// Category from vertex count, aspect ratio and circularity alone.
    #[must_use]
    pub const fn primary_category(&self) -> ShapeCategory {
        self.primary
    }

    /// The source contour.
    #[must_use]
    pub fn contour(&self) -> &Contour {
        &self.contour
    }

    /// Shared handle to the source contour.
    #[must_use]
    pub fn shared_contour(&self) -> Arc<Contour> {
        Arc::clone(&self.contour)
    }

    /// Vertex count of the simplified polygon used for classification.
    #[must_use]
    pub const fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    /// Derived metrics.
    #[must_use]
    pub const fn metrics(&self) -> &ShapeMetrics {
        &self.metrics
    }

    /// Star discriminator verdict, if it was evaluated.
    #[must_use]
    pub const fn star_verdict(&self) -> Option<&StarVerdict> {
        self.star.as_ref()
    }
}

/// A line segment between two points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisSegment {
    /// Segment start.
    pub start: Point,
    /// Segment end.
    pub end: Point,
}

impl AxisSegment {
    /// Create a new segment.
    #[must_use]
    pub const fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    /// Segment length.
    #[must_use]
    pub fn length(&self) -> f64 {
        self.start.distance(self.end)
    }

    /// Segment midpoint.
    #[must_use]
    pub fn midpoint(&self) -> Point {
        Point::new(
            (self.start.x + self.end.x) / 2.0,
            (self.start.y + self.end.y) / 2.0,
        )
    }
}

/// Symmetry axes attached to a [`ClassifiedShape`].
///
/// Computed on demand by
/// [`symmetry_axes`](crate::symmetry::symmetry_axes).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SymmetryAxes {
    /// No axes (triangles).
    None,
    /// Major and minor axes of the best-fit ellipse (circles, ellipses).
    Principal {
        /// Segment along the fitted major axis.
        major: AxisSegment,
        /// Segment along the fitted minor axis.
        minor: AxisSegment,
    },
    /// Bounding-box bisectors (squares, rectangles).
    ///
    /// Parallel to the image axes regardless of the shape's rotation, so
    /// a rotated rectangle gets the bisectors of its bounding box rather
    /// than its true mirror lines.
    Bisectors {
        /// Vertical line through the box center.
        vertical: AxisSegment,
        /// Horizontal line through the box center.
        horizontal: AxisSegment,
    },
    /// Radial spokes from the centroid to every contour point (polygons,
    /// stars). A visual aid rather than a mirror line.
    Spokes(Vec<AxisSegment>),
}

impl SymmetryAxes {
    /// All segments in deterministic order.
    #[must_use]
    pub fn segments(&self) -> Vec<AxisSegment> {
        match self {
            Self::None => Vec::new(),
            Self::Principal { major, minor } => vec![*major, *minor],
            Self::Bisectors {
                vertical,
                horizontal,
            } => vec![*vertical, *horizontal],
            Self::Spokes(spokes) => spokes.clone(),
        }
    }

    /// Number of segments.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::None => 0,
            Self::Principal { .. } | Self::Bisectors { .. } => 2,
            Self::Spokes(spokes) => spokes.len(),
        }
    }

    /// Returns `true` when there are no segments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Smooth closed curve resampled from a periodic spline.
///
/// The first and last samples coincide, closing the loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegularizedCurve(Vec<Point>);

impl RegularizedCurve {
    pub(crate) const fn new(points: Vec<Point>) -> Self {
        Self(points)
    }

    /// Number of samples.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if there are no samples.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns a slice of all samples.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.0
    }
}

/// Raster canvas dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// Tunables for classification, star detection and simplification.
///
/// The thresholds are plain fields so callers can adjust them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Polygon approximation tolerance as a fraction of the closed
    /// contour perimeter.
    pub simplify_epsilon_ratio: f64,

    /// Lowest bounding-box aspect ratio still classified as a square
    /// (inclusive).
    pub square_aspect_min: f64,

    /// Highest bounding-box aspect ratio still classified as a square
    /// (inclusive).
    pub square_aspect_max: f64,

    /// Circularity strictly above which a many-sided contour is a circle.
    pub circle_circularity: f64,

    /// Minimum simplified vertex count for the star discriminator.
    pub star_min_vertices: usize,

    /// A contour is a star when the radial distance variance is below
    /// this fraction of the mean radial distance.
    pub star_variance_ratio: f64,

    /// Whether a positive star verdict replaces the primary category.
    pub star_supersedes: bool,
}

impl ClassifierConfig {
    /// Default polygon approximation tolerance ratio.
    pub const DEFAULT_SIMPLIFY_EPSILON_RATIO: f64 = 0.02;
    /// Default lower square aspect bound.
    pub const DEFAULT_SQUARE_ASPECT_MIN: f64 = 0.95;
    /// Default upper square aspect bound.
    pub const DEFAULT_SQUARE_ASPECT_MAX: f64 = 1.05;
    /// Default circularity threshold.
    pub const DEFAULT_CIRCLE_CIRCULARITY: f64 = 0.9;
    /// Default minimum star vertex count.
    pub const DEFAULT_STAR_MIN_VERTICES: usize = 5;
    /// Default star variance ratio.
    pub const DEFAULT_STAR_VARIANCE_RATIO: f64 = 0.1;

    /// Check that every tunable is in range.
    ///
    /// # Errors
    ///
    /// Returns [`ShapeError::InvalidConfig`] naming the first offending
    /// field.
    pub fn validate(&self) -> Result<(), ShapeError> {
        if !(self.simplify_epsilon_ratio.is_finite() && self.simplify_epsilon_ratio >= 0.0) {
            return Err(ShapeError::InvalidConfig(format!(
                "simplify_epsilon_ratio must be finite and non-negative, got {}",
                self.simplify_epsilon_ratio,
            )));
        }
        if !(self.square_aspect_min > 0.0 && self.square_aspect_min <= self.square_aspect_max) {
            return Err(ShapeError::InvalidConfig(format!(
                "square aspect band must satisfy 0 < min <= max, got [{}, {}]",
                self.square_aspect_min, self.square_aspect_max,
            )));
        }
        if !(self.circle_circularity > 0.0 && self.circle_circularity <= 1.0) {
            return Err(ShapeError::InvalidConfig(format!(
                "circle_circularity must be in (0, 1], got {}",
                self.circle_circularity,
            )));
        }
        if self.star_min_vertices < 3 {
            return Err(ShapeError::InvalidConfig(format!(
                "star_min_vertices must be at least 3, got {}",
                self.star_min_vertices,
            )));
        }
        if !(self.star_variance_ratio.is_finite() && self.star_variance_ratio >= 0.0) {
            return Err(ShapeError::InvalidConfig(format!(
                "star_variance_ratio must be finite and non-negative, got {}",
                self.star_variance_ratio,
            )));
        }
        Ok(())
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            simplify_epsilon_ratio: Self::DEFAULT_SIMPLIFY_EPSILON_RATIO,
            square_aspect_min: Self::DEFAULT_SQUARE_ASPECT_MIN,
            square_aspect_max: Self::DEFAULT_SQUARE_ASPECT_MAX,
            circle_circularity: Self::DEFAULT_CIRCLE_CIRCULARITY,
            star_min_vertices: Self::DEFAULT_STAR_MIN_VERTICES,
            star_variance_ratio: Self::DEFAULT_STAR_VARIANCE_RATIO,
            star_supersedes: true,
        }
    }
}

/// How traced border pixels are reduced to contour points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChainApproximation {
    /// Keep every border pixel.
    Full,
    /// Keep only the endpoints of horizontal, vertical and diagonal runs.
    #[default]
    Simple,
}

/// Configuration for the point-cloud pipeline.
///
/// Defaults: a 500×500 canvas, Gaussian blur with σ = 1.1 and Canny
/// thresholds 50/150.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Raster canvas width in pixels.
    pub width: u32,

    /// Raster canvas height in pixels.
    pub height: u32,

    /// Gaussian blur sigma applied before edge detection.
    ///
    /// Must be finite and non-negative. Zero disables the blur.
    pub blur_sigma: f32,

    /// Canny low threshold.
    pub canny_low: f32,

    /// Canny high threshold.
    pub canny_high: f32,

    /// Point reduction applied to traced contours.
    pub chain_approximation: ChainApproximation,

    /// Classification and simplification tunables.
    pub classifier: ClassifierConfig,

    /// Number of samples on each regularized curve.
    pub sample_count: usize,
}

impl PipelineConfig {
    /// Default canvas width.
    pub const DEFAULT_WIDTH: u32 = 500;
    /// Default canvas height.
    pub const DEFAULT_HEIGHT: u32 = 500;
    /// Default blur sigma (what a 5×5 kernel with automatic sigma uses).
    pub const DEFAULT_BLUR_SIGMA: f32 = 1.1;
    /// Default Canny low threshold.
    pub const DEFAULT_CANNY_LOW: f32 = 50.0;
    /// Default Canny high threshold.
    pub const DEFAULT_CANNY_HIGH: f32 = 150.0;
    /// Default regularized curve sample count.
    pub const DEFAULT_SAMPLE_COUNT: usize = 100;

    /// Canvas dimensions.
    #[must_use]
    pub const fn dimensions(&self) -> Dimensions {
        Dimensions {
            width: self.width,
            height: self.height,
        }
    }

    /// Check that every parameter is in range.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConfig`] describing the first
    /// offending parameter.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.width < 2 || self.height < 2 {
            return Err(PipelineError::InvalidConfig(format!(
                "canvas must be at least 2x2 pixels, got {}x{}",
                self.width, self.height,
            )));
        }
        if !self.blur_sigma.is_finite() || self.blur_sigma < 0.0 {
            return Err(PipelineError::InvalidConfig(format!(
                "blur_sigma must be finite and non-negative, got {}",
                self.blur_sigma,
            )));
        }
        if !(self.canny_low.is_finite() && self.canny_high.is_finite())
            || self.canny_low > self.canny_high
        {
            return Err(PipelineError::InvalidConfig(format!(
                "canny thresholds must be finite with low <= high, got {} / {}",
                self.canny_low, self.canny_high,
            )));
        }
        if self.sample_count < 2 {
            return Err(PipelineError::InvalidConfig(format!(
                "sample_count must be at least 2, got {}",
                self.sample_count,
            )));
        }
        self.classifier
            .validate()
            .map_err(|e| PipelineError::InvalidConfig(e.to_string()))
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            width: Self::DEFAULT_WIDTH,
            height: Self::DEFAULT_HEIGHT,
            blur_sigma: Self::DEFAULT_BLUR_SIGMA,
            canny_low: Self::DEFAULT_CANNY_LOW,
            canny_high: Self::DEFAULT_CANNY_HIGH,
            chain_approximation: ChainApproximation::default(),
            classifier: ClassifierConfig::default(),
            sample_count: Self::DEFAULT_SAMPLE_COUNT,
        }
    }
}

/// Per-contour failures.
///
/// None of these abort a batch: the analysis of one contour records its
/// error and processing continues with the next.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
pub enum ShapeError {
    /// Fewer than three points.
    #[error("contour has {points} points, at least 3 are required")]
    DegenerateContour {
        /// Number of points supplied.
        points: usize,
    },

    /// Too few simplified vertices for a periodic spline.
    #[error("simplified polygon has {vertices} vertices, at least 5 are required to regularize")]
    NotRegularizable {
        /// Number of simplified vertices.
        vertices: usize,
    },

    /// The zeroth moment (enclosed area) vanishes.
    #[error("contour encloses zero area")]
    ZeroAreaContour,

    /// A tunable is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Errors from the point-cloud pipeline as a whole.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
pub enum PipelineError {
    /// No input points.
    #[error("input point cloud is empty")]
    EmptyInput,

    /// Every point shares the same x or the same y coordinate, so the
    /// cloud cannot be scaled onto the canvas.
    #[error("point cloud has zero extent along the {axis} axis")]
    DegeneratePointCloud {
        /// `"x"` or `"y"`.
        axis: String,
    },

    /// Pipeline configuration is invalid.
    #[error("invalid pipeline configuration: {0}")]
    InvalidConfig(String),

    /// Edge detection produced no contours.
    #[error("no contours found in the rasterized point cloud")]
    NoContours,
}
