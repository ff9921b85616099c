//! SVG export serializer.
//!
//! Renders analyzed contours into an SVG string using the [`svg`] crate
//! for document construction, XML escaping, and path data formatting.
//!
//! Each contour becomes a `<g>` group holding:
//!
//! - the traced contour as a closed green `<path>`,
//! - its symmetry axes as blue `<line>` elements,
//! - the regularized curve (when there is one) as an orange `<path>`,
//! - the category name as a `<text>` label at the bounding-box corner.
//!
//! Optional [`SvgMetadata`] embeds `<title>`, `<desc>` and the pipeline
//! configuration.
//!
//! This is a pure function with no I/O -- it returns a `String`.

use svg::Document;
use svg::node::element::path::Data;
use svg::node::element::{Description, Element, Group, Line, Path, Title};
use svg::node::{Node, Text, Value};

use shapesym_pipeline::{AxisSegment, ContourAnalysis, Dimensions, Point};

/// Stroke color of traced contours.
pub const CONTOUR_COLOR: &str = "green";
/// Stroke color of symmetry axes.
pub const AXIS_COLOR: &str = "blue";
/// Stroke color of regularized curves.
pub const CURVE_COLOR: &str = "orange";
/// Fill color of category labels.
pub const LABEL_COLOR: &str = "black";

/// Label font size in user units.
const LABEL_FONT_SIZE: u32 = 12;

/// Metadata to embed in the SVG document.
///
/// All fields are optional. Text values are XML-escaped automatically by
/// the `svg` crate.
#[derive(Debug, Clone, Default)]
pub struct SvgMetadata<'a> {
    /// Document title, emitted as `<title>`.
    ///
    /// Typically the input file stem.
    pub title: Option<&'a str>,

    /// Document description, emitted as `<desc>`.
    pub description: Option<&'a str>,

    /// Serialized pipeline configuration, emitted inside `<metadata>` in
    /// a namespaced `<shapesym:config>` element.
    pub config_json: Option<&'a str>,
}

/// Build an SVG path `d` attribute string through `points`.
///
/// Uses `M` for the first point, `L` for the rest and a trailing `z` when
/// `closed`. Returns an empty string for fewer than 2 points.
///
/// # Examples
///
/// ```
/// use shapesym_pipeline::Point;
/// use shapesym_export::build_path_data;
///
/// let d = build_path_data(&[Point::new(10.0, 20.0), Point::new(30.0, 40.0)], false);
/// assert_eq!(d, "M10,20 L30,40");
/// ```
#[must_use]
pub fn build_path_data(points: &[Point], closed: bool) -> String {
    let Some((first, rest)) = points.split_first() else {
        return String::new();
    };
    if rest.is_empty() {
        return String::new();
    }

    let mut data = Data::new().move_to((first.x, first.y));
    for p in rest {
        data = data.line_to((p.x, p.y));
    }
    if closed {
        data = data.close();
    }
    String::from(Value::from(data))
}

fn axis_line(segment: &AxisSegment) -> Line {
    Line::new()
        .set("x1", segment.start.x)
        .set("y1", segment.start.y)
        .set("x2", segment.end.x)
        .set("y2", segment.end.y)
        .set("stroke", AXIS_COLOR)
        .set("stroke-width", 1)
}

fn label(text: &str, at: Point) -> Element {
    let mut el = Element::new("text");
    el.assign("x", at.x);
    el.assign("y", at.y);
    el.assign("fill", LABEL_COLOR);
    el.assign("font-size", LABEL_FONT_SIZE);
    el.assign("font-family", "sans-serif");
    el.append(Text::new(text));
    el
}

fn contour_group(analysis: &ContourAnalysis) -> Group {
    let shape = &analysis.shape;
    let mut group = Group::new()
        .set("id", format!("contour-{}", analysis.index))
        .set("data-category", shape.category().name());

    let d = build_path_data(shape.contour().points(), true);
    if !d.is_empty() {
        group = group.add(
            Path::new()
                .set("d", d)
                .set("fill", "none")
                .set("stroke", CONTOUR_COLOR)
                .set("stroke-width", 2),
        );
    }

    if let Some(axes) = analysis.axes.value() {
        for segment in axes.segments() {
            group = group.add(axis_line(&segment));
        }
    }

    if let Some(curve) = analysis.curve.value() {
        let d = build_path_data(curve.points(), false);
        if !d.is_empty() {
            group = group.add(
                Path::new()
                    .set("d", d)
                    .set("fill", "none")
                    .set("stroke", CURVE_COLOR)
                    .set("stroke-width", 2),
            );
        }
    }

    group.add(label(shape.category().name(), shape.metrics().bounding_box.min))
}

/// Serialize contour analyses into an SVG document string.
///
/// The `viewBox` matches the raster canvas, so coordinates are emitted in
/// pixel units without transformation.
#[must_use]
pub fn to_svg(
    analyses: &[ContourAnalysis],
    dimensions: Dimensions,
    metadata: &SvgMetadata<'_>,
) -> String {
    let w = dimensions.width;
    let h = dimensions.height;
    let mut doc = Document::new()
        .set("width", w)
        .set("height", h)
        .set("viewBox", (0, 0, w, h));

    if let Some(title) = metadata.title {
        doc = doc.add(Title::new(title));
    }

    if let Some(description) = metadata.description {
        doc = doc.add(Description::new().add(Text::new(description)));
    }

    if let Some(config_json) = metadata.config_json {
        let mut config_el = Element::new("shapesym:config");
        config_el.assign("xmlns:shapesym", "urn:shapesym:config");
        config_el.append(Text::new(config_json));
        let mut metadata_el = Element::new("metadata");
        metadata_el.append(config_el);
        doc = doc.add(metadata_el);
    }

    for analysis in analyses {
        doc = doc.add(contour_group(analysis));
    }

    // The svg crate omits the XML declaration, so we prepend it.
    format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{doc}\n")
}
