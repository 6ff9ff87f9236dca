//! Spatial and temporal calibration of image rasters.
//!
//! A [`Calibration`] travels with every raster in the pipeline. For a source
//! stack, `pixel_width` is the physical size of a pixel and `frame_interval`
//! the time between consecutive frames. For a kymograph the same two fields
//! describe its axes directly: one column along x is `pixel_width` space
//! units, one row along y is `frame_interval` time units.

use crate::error::{KymoError, Result};

/// Unit names that mean "no spatial calibration".
const PLACEHOLDER_UNITS: [&str; 2] = ["pixel", "uncalibrated"];

/// Physical calibration of a raster: pixel size, frame interval, and the
/// names of their units.
///
/// Units are carried verbatim into derived calibrations and report headers,
/// so `"µm"` in, `"µm"` out.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Calibration {
    /// Physical size of one pixel along x, in `space_unit`s.
    pub pixel_width: f64,
    /// Name of the spatial unit (`"µm"`, `"nm"`, ...).
    pub space_unit: String,
    /// Time between consecutive frames, in `time_unit`s.
    pub frame_interval: f64,
    /// Name of the time unit (`"s"`, `"min"`, ...).
    pub time_unit: String,
}

impl Calibration {
    /// Create a calibration.
    #[must_use]
    pub fn new(
        pixel_width: f64,
        space_unit: impl Into<String>,
        frame_interval: f64,
        time_unit: impl Into<String>,
    ) -> Self {
        Self {
            pixel_width,
            space_unit: space_unit.into(),
            frame_interval,
            time_unit: time_unit.into(),
        }
    }

    /// Whether the spatial unit is a real physical unit.
    ///
    /// Empty, `"pixel"`, and `"uncalibrated"` unit names (ASCII
    /// case-insensitive) count as not calibrated.
    #[must_use]
    pub fn is_spatially_calibrated(&self) -> bool {
        !self.space_unit.is_empty()
            && !PLACEHOLDER_UNITS
                .iter()
                .any(|p| self.space_unit.eq_ignore_ascii_case(p))
    }

    /// Validate for use by a core operation.
    ///
    /// # Errors
    ///
    /// Returns [`KymoError::Uncalibrated`] when the spatial unit is a
    /// placeholder and [`KymoError::InvalidFrameInterval`] when the frame
    /// interval is not a finite positive duration.
    pub fn validate(&self) -> Result<()> {
        if !self.is_spatially_calibrated() {
            return Err(KymoError::uncalibrated(self.space_unit.clone()));
        }
        if !self.frame_interval.is_finite() || self.frame_interval <= 0.0 {
            return Err(KymoError::invalid_frame_interval(self.frame_interval));
        }
        Ok(())
    }
}
