//! Point-cloud loading from header-less CSV files.

use std::path::Path;

use anyhow::{Context, Result};
use polars::prelude::*;
use shapesym_pipeline::Point;

/// Read two numeric columns of a header-less CSV as points.
///
/// Columns are zero-based. Values that do not parse as numbers become
/// nulls, and rows with a null in either column are skipped.
pub fn load_points_csv(path: &Path, x_column: usize, y_column: usize) -> Result<Vec<Point>> {
    let x_index = i64::try_from(x_column).context("x column index out of range")?;
    let y_index = i64::try_from(y_column).context("y column index out of range")?;

    let df = LazyCsvReader::new(path)
        .with_has_header(false)
        .finish()
        .with_context(|| format!("opening {}", path.display()))?
        .select([
            nth(x_index).cast(DataType::Float64).alias("x"),
            nth(y_index).cast(DataType::Float64).alias("y"),
        ])
        .collect()
        .with_context(|| {
            format!(
                "reading columns {x_column} and {y_column} from {}",
                path.display()
            )
        })?;

    let xs = df.column("x")?.f64()?;
    let ys = df.column("y")?.f64()?;
    let points: Vec<Point> = xs
        .into_iter()
        .zip(ys)
        .filter_map(|(x, y)| Some(Point::new(x?, y?)))
        .collect();

    let skipped = df.height() - points.len();
    if skipped > 0 {
        tracing::warn!(skipped, "skipped rows without two numeric coordinates");
    }
    tracing::info!(points = points.len(), path = %path.display(), "loaded point cloud");

    Ok(points)
}
