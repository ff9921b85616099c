//! shapesym-export: SVG rendering of analyzed contours (sans-IO).
//!
//! Draws each contour with its symmetry axes, regularized curve and
//! category label.

pub mod svg;

pub use svg::{SvgMetadata, build_path_data, to_svg};
