//! Kymograph construction.
//!
//! [`KymographBuilder`] ties a stack, a path and a [`Resampler`] together
//! and produces the three products of a build. Preconditions (a real time
//! series, a usable path, a physical calibration) are checked once at
//! construction; each `build_*` call then resamples every frame.
//!
//! The centerline and the kymograph length come from frame 0's band and are
//! reused for all later frames. Resamplers derive the centerline from the
//! path alone, so this is a cache, not an approximation; if a band still
//! comes back with a different size, only the overlapping region is copied.
//!
//! # Example
//!
//! ```
//! use kymograph::{
//!     Calibration, ImageStack, KymographBuilder, LinearBandResampler, Polyline,
//! };
//! use ndarray::Array3;
//!
//! let cal = Calibration::new(0.16, "µm", 2.0, "s");
//! let stack = ImageStack::new(Array3::zeros((5, 32, 64)), cal);
//! let path = Polyline::from_line([4, 16], [60, 16]);
//! let resampler = LinearBandResampler;
//!
//! let builder = KymographBuilder::new(&stack, &path, &resampler)?
//!     .with_label("axon.tif");
//! let kymo = builder.build_kymograph(10)?;
//! assert_eq!(kymo.frame_count(), 5);
//! # Ok::<(), kymograph::KymoError>(())
//! ```

use ndarray::{s, Array2, Array3, ArrayViewMut2, Axis};
use tracing::debug;

use crate::calibration::Calibration;
use crate::error::{KymoError, Result};
use crate::geometry::Polyline;
use crate::kymograph::{KymoMontage, KymoStack, Kymograph};
use crate::resample::{BandSample, Resampler};
use crate::stack::FrameStack;

/// Builds kymographs from a stack along a path.
#[derive(Debug)]
pub struct KymographBuilder<'a, S, R> {
    stack: &'a S,
    path: &'a Polyline,
    resampler: &'a R,
    label: String,
}

impl<'a, S: FrameStack, R: Resampler> KymographBuilder<'a, S, R> {
    /// Create a builder, checking the build preconditions.
    ///
    /// # Errors
    ///
    /// Returns [`KymoError::NotATimeSeries`] for a single-frame stack,
    /// [`KymoError::DegeneratePath`] for a zero-length path, and the
    /// calibration errors of [`Calibration::validate`].
    pub fn new(stack: &'a S, path: &'a Polyline, resampler: &'a R) -> Result<Self> {
        let frames = stack.frame_count();
        if frames < 2 {
            return Err(KymoError::NotATimeSeries { frames });
        }
        stack.calibration().validate()?;
        if path.is_degenerate() {
            return Err(KymoError::DegeneratePath);
        }
        Ok(Self {
            stack,
            path,
            resampler,
            label: String::from("stack"),
        })
    }

    /// Set the source label the products are titled after.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Build the max-projected kymograph.
    ///
    /// Row `t` of the result holds, per column, the maximum across the band
    /// width of frame `t`'s band. `width` is clamped to at least 1.
    ///
    /// # Errors
    ///
    /// Propagates resampling failures.
    pub fn build_kymograph(&self, width: usize) -> Result<Kymograph> {
        let width = width.max(1);
        let frames = self.stack.frame_count();
        let first = self.resample(0, width)?;
        let length = first.length();

        let mut raster = Array2::zeros((frames, length));
        max_project(&mut raster, 0, &first.band);
        for t in 1..frames {
            let sample = self.resample(t, width)?;
            max_project(&mut raster, t, &sample.band);
        }

        debug!(
            "built kymograph: {} frames x {} columns, band width {}",
            frames, length, width
        );
        Ok(Kymograph {
            raster,
            calibration: self.derived_calibration(length),
            centerline: first.centerline,
            label: format!("Kymograph from {}", self.label),
        })
    }

    /// Build the stack of full bands, one slice per frame.
    ///
    /// # Errors
    ///
    /// Propagates resampling failures.
    pub fn build_kymo_stack(&self, width: usize) -> Result<KymoStack> {
        let width = width.max(1);
        let frames = self.stack.frame_count();
        let first = self.resample(0, width)?;
        let length = first.length();

        let mut raster = Array3::zeros((frames, width, length));
        blit_band(&mut raster.index_axis_mut(Axis(0), 0), &first.band);
        for t in 1..frames {
            let sample = self.resample(t, width)?;
            blit_band(&mut raster.index_axis_mut(Axis(0), t), &sample.band);
        }

        Ok(KymoStack {
            raster,
            calibration: self.derived_calibration(length),
            centerline: first.centerline,
            label: format!("KymoStack from {}", self.label),
        })
    }

    /// Build the montage of bands: frame `t` occupies rows
    /// `[t * width, (t + 1) * width)`.
    ///
    /// # Errors
    ///
    /// Propagates resampling failures.
    pub fn build_kymo_montage(&self, width: usize) -> Result<KymoMontage> {
        let width = width.max(1);
        let frames = self.stack.frame_count();
        let first = self.resample(0, width)?;
        let length = first.length();

        let mut raster = Array2::zeros((frames * width, length));
        blit_band(&mut raster.slice_mut(s![0..width, ..]), &first.band);
        for t in 1..frames {
            let start = t * width;
            let sample = self.resample(t, width)?;
            blit_band(
                &mut raster.slice_mut(s![start..start + width, ..]),
                &sample.band,
            );
        }

        Ok(KymoMontage {
            raster,
            band_width: width,
            calibration: self.derived_calibration(length),
            centerline: first.centerline,
            label: format!("KymoMontage from {}", self.label),
        })
    }

    fn resample(&self, frame: usize, width: usize) -> Result<BandSample> {
        self.resampler
            .resample(self.stack, frame, self.path, width)
    }

    /// Calibration of the products: x pixel size is the path's physical
    /// length spread over the kymograph columns, y advances one frame
    /// interval per row (or per band block, for the montage).
    fn derived_calibration(&self, length: usize) -> Calibration {
        let src = self.stack.calibration();
        let physical_length = self.path.arc_length() * src.pixel_width;
        Calibration {
            pixel_width: physical_length / length as f64,
            space_unit: src.space_unit.clone(),
            frame_interval: src.frame_interval,
            time_unit: src.time_unit.clone(),
        }
    }
}

/// Write the per-column band maximum into row `t` of the kymograph raster.
fn max_project(raster: &mut Array2<f32>, t: usize, band: &Array2<f32>) {
    if band.nrows() == 0 {
        return;
    }
    let cols = raster.ncols().min(band.ncols());
    for j in 0..cols {
        let mut best = band[[0, j]];
        for k in 1..band.nrows() {
            best = best.max(band[[k, j]]);
        }
        raster[[t, j]] = best;
    }
}

/// Copy the overlapping region of a band into a target slice.
fn blit_band(target: &mut ArrayViewMut2<'_, f32>, band: &Array2<f32>) {
    let rows = target.nrows().min(band.nrows());
    let cols = target.ncols().min(band.ncols());
    for k in 0..rows {
        for j in 0..cols {
            target[[k, j]] = band[[k, j]];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Centerline;
    use crate::resample::LinearBandResampler;
    use crate::stack::ImageStack;
    use approx::assert_relative_eq;
    use ndarray::Array3;

    /// Hands back a fixed-size blank band regardless of the frame, with a
    /// straight centerline. Lets tests pin the kymograph length exactly.
    struct FixedResampler {
        width: usize,
        length: usize,
    }

    impl Resampler for FixedResampler {
        fn resample(
            &self,
            _stack: &dyn FrameStack,
            frame: usize,
            _path: &Polyline,
            _width: usize,
        ) -> Result<BandSample> {
            let mut band = Array2::zeros((self.width, self.length));
            // mark each frame so projections are distinguishable
            band[[0, 0]] = frame as f32;
            let centerline =
                Centerline::new((0..self.length).map(|i| [i as i32, 0]).collect())?;
            BandSample::new(band, centerline)
        }
    }

    fn calibrated_stack(frames: usize) -> ImageStack {
        ImageStack::new(
            Array3::zeros((frames, 8, 16)),
            Calibration::new(0.5, "µm", 2.0, "s"),
        )
    }

    #[test]
    fn test_preconditions() {
        let resampler = LinearBandResampler;
        let path = Polyline::from_line([0, 2], [10, 2]);

        let single = calibrated_stack(1);
        assert!(matches!(
            KymographBuilder::new(&single, &path, &resampler),
            Err(KymoError::NotATimeSeries { frames: 1 })
        ));

        let uncalibrated = ImageStack::new(
            Array3::zeros((3, 8, 16)),
            Calibration::new(1.0, "pixel", 1.0, "s"),
        );
        assert!(matches!(
            KymographBuilder::new(&uncalibrated, &path, &resampler),
            Err(KymoError::Uncalibrated { .. })
        ));

        let stack = calibrated_stack(3);
        let dot = Polyline::new(vec![[4, 4], [4, 4]]).unwrap();
        assert!(matches!(
            KymographBuilder::new(&stack, &dot, &resampler),
            Err(KymoError::DegeneratePath)
        ));
    }

    #[test]
    fn test_derived_calibration() {
        // pixel arclength 100 at 0.5 µm/px: physical length 50; a fixed
        // 200-column resample gives 0.25 µm columns and 2 s rows
        let stack = calibrated_stack(4);
        let path = Polyline::from_line([0, 2], [100, 2]);
        let resampler = FixedResampler {
            width: 5,
            length: 200,
        };
        let builder = KymographBuilder::new(&stack, &path, &resampler).unwrap();
        let kymo = builder.build_kymograph(5).unwrap();

        assert_relative_eq!(kymo.calibration.pixel_width, 0.25);
        assert_relative_eq!(kymo.calibration.frame_interval, 2.0);
        assert_eq!(kymo.calibration.space_unit, "µm");
        assert_eq!(kymo.calibration.time_unit, "s");
        assert_eq!(kymo.length(), 200);
        assert_eq!(kymo.frame_count(), 4);
    }

    #[test]
    fn test_max_projection_across_band() {
        // bright streak off the path center: the max projection still sees it
        let mut frames = Array3::zeros((3, 8, 16));
        for t in 0..3 {
            frames[[t, 3, 4 + t]] = 9.0; // one row below the path
        }
        let stack = ImageStack::new(frames, Calibration::new(0.5, "µm", 2.0, "s"));
        let path = Polyline::from_line([0, 2], [10, 2]);
        let resampler = LinearBandResampler;
        let builder = KymographBuilder::new(&stack, &path, &resampler).unwrap();

        let kymo = builder.build_kymograph(3).unwrap();
        for t in 0..3 {
            assert_eq!(kymo.raster[[t, 4 + t]], 9.0, "frame {t}");
        }

        // width 1 stays on the path row and misses the streak
        let thin = builder.build_kymograph(1).unwrap();
        assert_eq!(thin.raster[[0, 4]], 0.0);
    }

    #[test]
    fn test_kymo_stack_slices() {
        let stack = calibrated_stack(3);
        let path = Polyline::from_line([0, 2], [10, 2]);
        let resampler = FixedResampler {
            width: 4,
            length: 11,
        };
        let builder = KymographBuilder::new(&stack, &path, &resampler).unwrap();
        let ks = builder.build_kymo_stack(4).unwrap();

        assert_eq!(ks.frame_count(), 3);
        assert_eq!(ks.band_width(), 4);
        assert_eq!(ks.length(), 11);
        for t in 0..3 {
            assert_eq!(ks.band(t)[[0, 0]], t as f32);
        }
    }

    #[test]
    fn test_montage_row_blocks() {
        let stack = calibrated_stack(3);
        let path = Polyline::from_line([0, 2], [10, 2]);
        let resampler = FixedResampler {
            width: 4,
            length: 11,
        };
        let builder = KymographBuilder::new(&stack, &path, &resampler).unwrap();
        let montage = builder.build_kymo_montage(4).unwrap();

        assert_eq!(montage.raster.nrows(), 12);
        for t in 0..3 {
            assert_eq!(montage.raster[[t * 4, 0]], t as f32, "block {t}");
        }
    }

    #[test]
    fn test_width_zero_clamps_to_one() {
        let stack = calibrated_stack(2);
        let path = Polyline::from_line([0, 2], [10, 2]);
        let resampler = LinearBandResampler;
        let builder = KymographBuilder::new(&stack, &path, &resampler).unwrap();
        let ks = builder.build_kymo_stack(0).unwrap();
        assert_eq!(ks.band_width(), 1);
    }

    #[test]
    fn test_product_labels() {
        let stack = calibrated_stack(2);
        let path = Polyline::from_line([0, 2], [10, 2]);
        let resampler = LinearBandResampler;
        let builder = KymographBuilder::new(&stack, &path, &resampler)
            .unwrap()
            .with_label("axon.tif");
        assert_eq!(
            builder.build_kymograph(3).unwrap().label,
            "Kymograph from axon.tif"
        );
        assert_eq!(
            builder.build_kymo_montage(3).unwrap().label,
            "KymoMontage from axon.tif"
        );
    }
}
