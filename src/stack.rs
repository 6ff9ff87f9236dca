//! Calibrated time-lapse image stacks.
//!
//! [`FrameStack`] is the read interface the builder consumes: a time series
//! of 2D `f32` frames plus a [`Calibration`]. [`ImageStack`] is the owned
//! in-memory implementation over a dense `(frames, height, width)` array;
//! anything that can hand out frame views (a memory-mapped file, a lazy
//! decoder) can implement the trait instead.

use ndarray::{Array3, ArrayView2, Axis};

use crate::calibration::Calibration;
use crate::error::{KymoError, Result};

/// Read access to a calibrated time series of 2D frames.
///
/// Frames are row-major rasters indexed `[row, column]`.
pub trait FrameStack {
    /// Number of frames in the series.
    fn frame_count(&self) -> usize;

    /// Frame width in pixels.
    fn width(&self) -> usize;

    /// Frame height in pixels.
    fn height(&self) -> usize;

    /// Physical calibration of the series.
    fn calibration(&self) -> &Calibration;

    /// Frame `index` as a 2D view.
    ///
    /// # Panics
    ///
    /// Panics when `index >= frame_count()`.
    fn frame(&self, index: usize) -> ArrayView2<'_, f32>;
}

/// Owned stack over a dense `(frames, height, width)` array.
#[derive(Debug, Clone)]
pub struct ImageStack {
    frames: Array3<f32>,
    calibration: Calibration,
}

impl ImageStack {
    /// Wrap an already-shaped `(frames, height, width)` array.
    #[must_use]
    pub fn new(frames: Array3<f32>, calibration: Calibration) -> Self {
        Self { frames, calibration }
    }

    /// Build a stack from a flat pixel buffer in frame-major, row-major
    /// order.
    ///
    /// # Errors
    ///
    /// Returns [`KymoError::ShapeMismatch`] when the buffer length is not
    /// `frames * height * width`.
    pub fn from_raw(
        frames: usize,
        height: usize,
        width: usize,
        data: Vec<f32>,
        calibration: Calibration,
    ) -> Result<Self> {
        let array = Array3::from_shape_vec((frames, height, width), data).map_err(|e| {
            KymoError::shape_mismatch(format!(
                "buffer does not fill {frames}x{height}x{width} frames: {e}"
            ))
        })?;
        Ok(Self::new(array, calibration))
    }

    /// The underlying `(frames, height, width)` array.
    #[must_use]
    pub fn frames(&self) -> &Array3<f32> {
        &self.frames
    }
}

impl FrameStack for ImageStack {
    fn frame_count(&self) -> usize {
        self.frames.len_of(Axis(0))
    }

    fn width(&self) -> usize {
        self.frames.len_of(Axis(2))
    }

    fn height(&self) -> usize {
        self.frames.len_of(Axis(1))
    }

    fn calibration(&self) -> &Calibration {
        &self.calibration
    }

    fn frame(&self, index: usize) -> ArrayView2<'_, f32> {
        self.frames.index_axis(Axis(0), index)
    }
}

/// Sample a frame at a fractional pixel position with bilinear weights.
///
/// Coordinates clamp to the frame edges, so positions slightly outside the
/// raster read the border pixels. An empty frame samples as 0.
#[must_use]
pub fn sample_bilinear(frame: &ArrayView2<'_, f32>, x: f64, y: f64) -> f32 {
    let (h, w) = frame.dim();
    if h == 0 || w == 0 {
        return 0.0;
    }

    let x = x.clamp(0.0, (w - 1) as f64);
    let y = y.clamp(0.0, (h - 1) as f64);

    let x0 = x.floor() as usize;
    let y0 = y.floor() as usize;
    let fx = (x - x0 as f64) as f32;
    let fy = (y - y0 as f64) as f32;

    let x1 = (x0 + 1).min(w - 1);
    let y1 = (y0 + 1).min(h - 1);

    let p00 = frame[[y0, x0]];
    let p10 = frame[[y0, x1]];
    let p01 = frame[[y1, x0]];
    let p11 = frame[[y1, x1]];

    (1.0 - fx) * (1.0 - fy) * p00 + fx * (1.0 - fy) * p10 + (1.0 - fx) * fy * p01 + fx * fy * p11
}
