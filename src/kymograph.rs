//! Kymograph product types.
//!
//! All three products of a build carry the same bookkeeping: the raster, the
//! calibration derived for it, the [`Centerline`] mapping columns back to
//! stack pixels, and a display label. They differ in what the raster holds:
//!
//! | Product | Shape | Content |
//! |---|---|---|
//! | [`Kymograph`] | `(frames, length)` | per-column max across the band |
//! | [`KymoStack`] | `(frames, width, length)` | every frame's full band |
//! | [`KymoMontage`] | `(frames * width, length)` | bands stacked vertically |
//!
//! The derived calibration reads the kymograph axes directly: one column is
//! `pixel_width` space units, one row is `frame_interval` time units.

use ndarray::{s, Array2, Array3, ArrayView2, Axis};

use crate::calibration::Calibration;
use crate::geometry::Centerline;

/// Space-time raster: x walks the path, y walks the frames.
///
/// Row `t` holds, per column, the maximum across the band width of frame
/// `t`'s straightened band, so a particle moving along the path traces a
/// diagonal streak.
#[derive(Debug, Clone)]
pub struct Kymograph {
    /// Raster of shape `(frames, length)`.
    pub raster: Array2<f32>,
    /// Derived calibration (x in space units, y in time units).
    pub calibration: Calibration,
    /// Stack pixel behind each column.
    pub centerline: Centerline,
    /// Display label, used in report rows.
    pub label: String,
}

impl Kymograph {
    /// Number of columns along the path.
    #[must_use]
    pub fn length(&self) -> usize {
        self.raster.ncols()
    }

    /// Number of frame rows.
    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.raster.nrows()
    }

    /// Centerline persistence block, ready to attach as an image property.
    #[must_use]
    pub fn info_property(&self) -> String {
        self.centerline.to_property_string()
    }
}

/// Every frame's full straightened band, one slice per frame.
#[derive(Debug, Clone)]
pub struct KymoStack {
    /// Raster of shape `(frames, width, length)`.
    pub raster: Array3<f32>,
    /// Derived calibration (x in space units, y across the band in space
    /// units, time advancing along the slice axis).
    pub calibration: Calibration,
    /// Stack pixel behind each column.
    pub centerline: Centerline,
    /// Display label.
    pub label: String,
}

impl KymoStack {
    /// Number of columns along the path.
    #[must_use]
    pub fn length(&self) -> usize {
        self.raster.len_of(Axis(2))
    }

    /// Band width in pixels.
    #[must_use]
    pub fn band_width(&self) -> usize {
        self.raster.len_of(Axis(1))
    }

    /// Number of frame slices.
    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.raster.len_of(Axis(0))
    }

    /// Frame `t`'s band.
    #[must_use]
    pub fn band(&self, frame: usize) -> ArrayView2<'_, f32> {
        self.raster.index_axis(Axis(0), frame)
    }

    /// Centerline persistence block.
    #[must_use]
    pub fn info_property(&self) -> String {
        self.centerline.to_property_string()
    }
}

/// All bands in one raster: frame `t` occupies the row block
/// `[t * width, (t + 1) * width)`.
#[derive(Debug, Clone)]
pub struct KymoMontage {
    /// Raster of shape `(frames * width, length)`.
    pub raster: Array2<f32>,
    /// Band width in rows; locates the per-frame blocks.
    pub band_width: usize,
    /// Derived calibration (x in space units, one block of rows per frame
    /// interval).
    pub calibration: Calibration,
    /// Stack pixel behind each column.
    pub centerline: Centerline,
    /// Display label.
    pub label: String,
}

impl KymoMontage {
    /// Number of columns along the path.
    #[must_use]
    pub fn length(&self) -> usize {
        self.raster.ncols()
    }

    /// Number of frame blocks.
    #[must_use]
    pub fn frame_count(&self) -> usize {
        if self.band_width == 0 {
            0
        } else {
            self.raster.nrows() / self.band_width
        }
    }

    /// Frame `t`'s band block.
    #[must_use]
    pub fn band(&self, frame: usize) -> ArrayView2<'_, f32> {
        let start = frame * self.band_width;
        self.raster.slice(s![start..start + self.band_width, ..])
    }

    /// Centerline persistence block.
    #[must_use]
    pub fn info_property(&self) -> String {
        self.centerline.to_property_string()
    }
}
