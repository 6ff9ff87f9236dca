//! Planar geometry of paths and centerlines.
//!
//! Two vertex-list types underpin the pipeline:
//!
//! - [`Polyline`]: an ordered list of integer pixel vertices. Used both for
//!   the path a kymograph is built along (vertices on the source stack) and
//!   for trajectories traced on a kymograph (vertices in kymograph pixels,
//!   `[column, row]`).
//! - [`Centerline`]: the dense per-column mapping from kymograph x positions
//!   back to source-stack pixels, produced by resampling. Entry `i` is the
//!   stack pixel under kymograph column `i`.
//!
//! # Centerline persistence format
//!
//! A centerline round-trips through the text property attached to kymograph
//! images:
//!
//! ```text
//! <KymoPathInfo>
//! <x>c0\tc1\t...\t</x>
//! <y>r0\tr1\t...\t</y>
//! </KymoPathInfo>
//! ```
//!
//! Every value carries a trailing tab. Parsing uses the *last* `<x>`/`<y>`
//! pair found in the input, so the block survives being appended to an
//! existing property string.

use nalgebra as na;

use crate::error::{KymoError, Result};

/// Minimum number of vertices a polyline needs.
pub const MIN_PATH_VERTICES: usize = 2;

/// An ordered list of integer pixel vertices, at least two.
///
/// Vertices are `[x, y]` pairs; on a kymograph that reads `[column, row]`.
/// Straight two-point lines are just two-vertex polylines.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Polyline {
    vertices: Vec<[i32; 2]>,
}

impl Polyline {
    /// Create a polyline from its vertices.
    ///
    /// # Errors
    ///
    /// Returns [`KymoError::PathTooShort`] when fewer than
    /// [`MIN_PATH_VERTICES`] vertices are given.
    pub fn new(vertices: Vec<[i32; 2]>) -> Result<Self> {
        if vertices.len() < MIN_PATH_VERTICES {
            return Err(KymoError::path_too_short(
                MIN_PATH_VERTICES,
                vertices.len(),
            ));
        }
        Ok(Self { vertices })
    }

    /// Create a straight two-point line.
    #[must_use]
    pub fn from_line(start: [i32; 2], end: [i32; 2]) -> Self {
        Self {
            vertices: vec![start, end],
        }
    }

    /// The vertices, in order.
    #[must_use]
    pub fn vertices(&self) -> &[[i32; 2]] {
        &self.vertices
    }

    /// Number of vertices.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// First vertex.
    #[must_use]
    pub fn first(&self) -> [i32; 2] {
        self.vertices[0]
    }

    /// Last vertex.
    #[must_use]
    pub fn last(&self) -> [i32; 2] {
        self.vertices[self.vertices.len() - 1]
    }

    /// Total length along the vertices, in pixel units.
    #[must_use]
    pub fn arc_length(&self) -> f64 {
        self.vertices
            .windows(2)
            .map(|w| na::distance(&to_point(w[0]), &to_point(w[1])))
            .sum()
    }

    /// Whether the polyline has zero arclength (all vertices coincide).
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.arc_length() == 0.0
    }

    /// Height of the bounding box over the y coordinates.
    #[must_use]
    pub fn row_extent(&self) -> i32 {
        let rows = self.vertices.iter().map(|v| v[1]);
        let min = rows.clone().min().unwrap_or(0);
        let max = rows.max().unwrap_or(0);
        max - min
    }
}

pub(crate) fn to_point(v: [i32; 2]) -> na::Point2<f64> {
    na::Point2::new(f64::from(v[0]), f64::from(v[1]))
}

/// Dense mapping from kymograph columns to source-stack pixels.
///
/// Index-aligned with the kymograph x axis: `points()[i]` is the stack
/// pixel `[x, y]` that produced kymograph column `i`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Centerline {
    points: Vec<[i32; 2]>,
}

impl Centerline {
    /// Create a centerline from stack pixel coordinates.
    ///
    /// # Errors
    ///
    /// Returns an error when `points` is empty.
    pub fn new(points: Vec<[i32; 2]>) -> Result<Self> {
        if points.is_empty() {
            return Err(KymoError::shape_mismatch(
                "centerline must map at least one column",
            ));
        }
        Ok(Self { points })
    }

    /// The stack pixels, one per kymograph column.
    #[must_use]
    pub fn points(&self) -> &[[i32; 2]] {
        &self.points
    }

    /// Number of kymograph columns mapped.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the centerline maps no columns. Always false for a
    /// constructed centerline; present for completeness.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Map a fractional kymograph column to a stack position.
    ///
    /// Piecewise-linear between the two bracketing entries, with the nearer
    /// neighbor weighted more. Columns outside `[0, len - 1]` clamp to the
    /// ends.
    #[must_use]
    pub fn position_at(&self, column: f64) -> na::Point2<f64> {
        let max = (self.points.len() - 1) as f64;
        let col = if column.is_nan() { 0.0 } else { column.clamp(0.0, max) };
        let ground = col.floor() as usize;
        let roof = (ground + 1).min(self.points.len() - 1);
        let frac = col - ground as f64;
        let g = to_point(self.points[ground]);
        let r = to_point(self.points[roof]);
        na::Point2::new(
            (1.0 - frac) * g.x + frac * r.x,
            (1.0 - frac) * g.y + frac * r.y,
        )
    }

    /// Encode as the `<KymoPathInfo>` property block.
    #[must_use]
    pub fn to_property_string(&self) -> String {
        let mut xs = String::new();
        let mut ys = String::new();
        for p in &self.points {
            xs.push_str(&format!("{}\t", p[0]));
            ys.push_str(&format!("{}\t", p[1]));
        }
        format!("<KymoPathInfo>\n<x>{xs}</x>\n<y>{ys}</y>\n</KymoPathInfo>")
    }

    /// Parse a centerline back out of a property string.
    ///
    /// Uses the last `<x>`/`<y>` pair present, tolerates the trailing tab
    /// after the final value.
    ///
    /// # Errors
    ///
    /// Returns [`KymoError::MalformedPathInfo`] on missing tags,
    /// unparseable coordinates, or x/y length mismatch.
    pub fn parse_property_string(text: &str) -> Result<Self> {
        let xs = parse_axis(text, "<x>", "</x>")?;
        let ys = parse_axis(text, "<y>", "</y>")?;
        if xs.len() != ys.len() {
            return Err(KymoError::malformed_path_info(format!(
                "x/y length mismatch: {} vs {}",
                xs.len(),
                ys.len()
            )));
        }
        if xs.is_empty() {
            return Err(KymoError::malformed_path_info("no coordinates"));
        }
        let points = xs.into_iter().zip(ys).map(|(x, y)| [x, y]).collect();
        Ok(Self { points })
    }
}

/// Extract and parse the last `open`..`close` section of `text`.
fn parse_axis(text: &str, open: &str, close: &str) -> Result<Vec<i32>> {
    let start = text
        .rfind(open)
        .ok_or_else(|| KymoError::malformed_path_info(format!("missing {open} tag")))?
        + open.len();
    let end = text
        .rfind(close)
        .ok_or_else(|| KymoError::malformed_path_info(format!("missing {close} tag")))?;
    if end < start {
        return Err(KymoError::malformed_path_info(format!(
            "unterminated {open} section"
        )));
    }
    text[start..end]
        .split_terminator('\t')
        .map(|token| {
            token.trim().parse::<i32>().map_err(|_| {
                KymoError::malformed_path_info(format!("bad coordinate {token:?}"))
            })
        })
        .collect()
}
