//! Path straightening: resampling an image band along a polyline.
//!
//! The builder does not care how a band is straightened, only about the
//! contract captured by [`Resampler`]: given a stack, a frame index, a path
//! and a band width, produce a `(width, length)` raster whose columns walk
//! the path at unit arclength steps, plus the [`Centerline`] recording which
//! stack pixel each column came from. The centerline must depend on the
//! path alone, so every frame of a build shares it.
//!
//! [`LinearBandResampler`] is the built-in implementation: a piecewise
//! linear walk along the polyline (no spline fitting), sampling the band
//! across the local path normal with bilinear interpolation. Plug in a
//! different implementation to match another platform's straightening.

use nalgebra as na;
use ndarray::Array2;

use crate::error::{KymoError, Result};
use crate::geometry::{to_point, Centerline, Polyline};
use crate::stack::{sample_bilinear, FrameStack};

/// One straightened band: the resampled raster and its centerline.
#[derive(Debug, Clone)]
pub struct BandSample {
    /// Band raster, shape `(width, length)`: row `k` is one offset across
    /// the path, column `i` is one arclength step along it.
    pub band: Array2<f32>,
    /// Stack pixel behind each band column.
    pub centerline: Centerline,
}

impl BandSample {
    /// Pair a band raster with its centerline.
    ///
    /// # Errors
    ///
    /// Returns [`KymoError::ShapeMismatch`] when the centerline does not
    /// have exactly one entry per band column.
    pub fn new(band: Array2<f32>, centerline: Centerline) -> Result<Self> {
        if band.ncols() != centerline.len() {
            return Err(KymoError::shape_mismatch(format!(
                "band has {} columns but centerline maps {}",
                band.ncols(),
                centerline.len()
            )));
        }
        Ok(Self { band, centerline })
    }

    /// Number of columns along the path.
    #[must_use]
    pub fn length(&self) -> usize {
        self.band.ncols()
    }

    /// Number of rows across the path.
    #[must_use]
    pub fn width(&self) -> usize {
        self.band.nrows()
    }
}

/// Straightens one frame's band along a path.
pub trait Resampler {
    /// Resample `width` pixels across `path` from frame `frame` of `stack`.
    ///
    /// # Errors
    ///
    /// Implementations fail on paths they cannot walk (degenerate paths).
    fn resample(
        &self,
        stack: &dyn FrameStack,
        frame: usize,
        path: &Polyline,
        width: usize,
    ) -> Result<BandSample>;
}

/// Piecewise-linear band resampler.
///
/// Walks the polyline with evenly spaced steps of close to one pixel
/// arclength, including both endpoints. At each step the band is read
/// across the local path normal (central-difference tangent) with bilinear
/// interpolation, clamped at the frame edges. Centerline entries are the
/// walk positions rounded to integer pixels.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearBandResampler;

impl LinearBandResampler {
    /// Walk positions along `path` at close-to-unit arclength steps.
    fn walk(path: &Polyline) -> Vec<na::Point2<f64>> {
        let points: Vec<na::Point2<f64>> =
            path.vertices().iter().map(|&v| to_point(v)).collect();
        let seg_lengths: Vec<f64> = points
            .windows(2)
            .map(|w| na::distance(&w[0], &w[1]))
            .collect();
        let total: f64 = seg_lengths.iter().sum();

        let n_cols = total.round().max(1.0) as usize + 1;
        let step = total / (n_cols - 1) as f64;

        let mut walk = Vec::with_capacity(n_cols);
        let mut seg = 0;
        let mut seg_start = 0.0;
        for i in 0..n_cols {
            let s = step * i as f64;
            // advance to the segment containing arclength s
            while seg + 1 < seg_lengths.len() && s > seg_start + seg_lengths[seg] {
                seg_start += seg_lengths[seg];
                seg += 1;
            }
            let len = seg_lengths[seg];
            let t = if len > 0.0 {
                ((s - seg_start) / len).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let a = points[seg];
            let b = points[seg + 1];
            walk.push(na::Point2::new(
                a.x + t * (b.x - a.x),
                a.y + t * (b.y - a.y),
            ));
        }
        walk
    }

    /// Unit normal to the walk at sample `i`, from a central-difference
    /// tangent (one-sided at the ends).
    fn normal_at(walk: &[na::Point2<f64>], i: usize) -> na::Vector2<f64> {
        let prev = walk[i.saturating_sub(1)];
        let next = walk[(i + 1).min(walk.len() - 1)];
        let tangent = next - prev;
        let norm = tangent.norm();
        if norm > 0.0 {
            na::Vector2::new(-tangent.y / norm, tangent.x / norm)
        } else {
            na::Vector2::new(0.0, 1.0)
        }
    }
}

impl Resampler for LinearBandResampler {
    fn resample(
        &self,
        stack: &dyn FrameStack,
        frame: usize,
        path: &Polyline,
        width: usize,
    ) -> Result<BandSample> {
        if path.is_degenerate() {
            return Err(KymoError::DegeneratePath);
        }
        let width = width.max(1);
        let walk = Self::walk(path);
        let image = stack.frame(frame);

        let mut band = Array2::zeros((width, walk.len()));
        let half = (width - 1) as f64 / 2.0;
        for (i, center) in walk.iter().enumerate() {
            let normal = Self::normal_at(&walk, i);
            for k in 0..width {
                let offset = k as f64 - half;
                let x = center.x + offset * normal.x;
                let y = center.y + offset * normal.y;
                band[[k, i]] = sample_bilinear(&image, x, y);
            }
        }

        let centerline = Centerline::new(
            walk.iter()
                .map(|p| [p.x.round() as i32, p.y.round() as i32])
                .collect(),
        )?;
        BandSample::new(band, centerline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibration::Calibration;
    use crate::stack::ImageStack;
    use ndarray::Array3;

    fn stack_with_bright_row(row: usize) -> ImageStack {
        let mut frames = Array3::zeros((2, 8, 16));
        for x in 0..16 {
            frames[[0, row, x]] = 7.0;
            frames[[1, row, x]] = 7.0;
        }
        ImageStack::new(frames, Calibration::new(0.5, "µm", 2.0, "s"))
    }

    #[test]
    fn test_straight_line_band() {
        let stack = stack_with_bright_row(2);
        let path = Polyline::from_line([0, 2], [10, 2]);
        let sample = LinearBandResampler
            .resample(&stack, 0, &path, 3)
            .unwrap();

        assert_eq!(sample.width(), 3);
        assert_eq!(sample.length(), 11);
        assert_eq!(sample.centerline.len(), 11);
        assert_eq!(sample.centerline.points()[0], [0, 2]);
        assert_eq!(sample.centerline.points()[10], [10, 2]);

        // center band row rides the bright line, the offset rows read zeros
        for i in 0..11 {
            assert_eq!(sample.band[[1, i]], 7.0);
            assert_eq!(sample.band[[0, i]], 0.0);
            assert_eq!(sample.band[[2, i]], 0.0);
        }
    }

    #[test]
    fn test_centerline_is_frame_independent() {
        let stack = stack_with_bright_row(3);
        let path = Polyline::new(vec![[0, 0], [7, 5], [14, 2]]).unwrap();
        let a = LinearBandResampler.resample(&stack, 0, &path, 5).unwrap();
        let b = LinearBandResampler.resample(&stack, 1, &path, 5).unwrap();
        assert_eq!(a.centerline, b.centerline);
    }

    #[test]
    fn test_width_clamped_to_one() {
        let stack = stack_with_bright_row(2);
        let path = Polyline::from_line([0, 2], [10, 2]);
        let sample = LinearBandResampler
            .resample(&stack, 0, &path, 0)
            .unwrap();
        assert_eq!(sample.width(), 1);
        assert_eq!(sample.band[[0, 4]], 7.0);
    }

    #[test]
    fn test_degenerate_path_rejected() {
        let stack = stack_with_bright_row(2);
        let path = Polyline::new(vec![[4, 4], [4, 4]]).unwrap();
        assert!(matches!(
            LinearBandResampler.resample(&stack, 0, &path, 3),
            Err(KymoError::DegeneratePath)
        ));
    }

    #[test]
    fn test_diagonal_walk_length() {
        let stack = stack_with_bright_row(2);
        let path = Polyline::from_line([0, 0], [10, 10]);
        let sample = LinearBandResampler
            .resample(&stack, 0, &path, 1)
            .unwrap();
        // arclength 10*sqrt(2) = 14.14 rounds to 14 steps, 15 samples
        assert_eq!(sample.length(), 15);
        assert_eq!(sample.centerline.points()[0], [0, 0]);
        assert_eq!(sample.centerline.points()[14], [10, 10]);
    }

    #[test]
    fn test_band_centerline_length_mismatch() {
        let band = Array2::zeros((1, 4));
        let centerline = Centerline::new(vec![[0, 0], [1, 0]]).unwrap();
        assert!(matches!(
            BandSample::new(band, centerline),
            Err(KymoError::ShapeMismatch(_))
        ));
    }
}
