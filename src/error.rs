//! Error types for kymograph operations.
//!
//! Every fallible operation in the crate reports through [`KymoError`];
//! undefined *numeric* results (mean speed of an absent motion class,
//! persistence of a zero-displacement track) are NaN values, not errors.

use thiserror::Error;

/// Main error type for kymograph construction and trajectory analysis.
#[derive(Error, Debug)]
pub enum KymoError {
    /// Path has fewer vertices than a polyline needs.
    #[error("Path too short: need at least {min} vertices, got {actual}")]
    PathTooShort { min: usize, actual: usize },

    /// Path has zero arclength, so no band can be resampled along it.
    #[error("Degenerate path: all vertices coincide")]
    DegeneratePath,

    /// Source image is not a time series.
    #[error("Not a time series: got {frames} frame(s), need at least 2")]
    NotATimeSeries { frames: usize },

    /// Spatial calibration is missing or a placeholder unit.
    #[error("Uncalibrated image: spatial unit is {unit:?}")]
    Uncalibrated { unit: String },

    /// Frame interval must be a finite positive duration.
    #[error("Invalid frame interval: {value}")]
    InvalidFrameInterval { value: f64 },

    /// Track occupies a single kymograph row, so elapsed time is zero
    /// everywhere along it.
    #[error("Track has zero row extent: no time elapses along it")]
    ZeroRowExtent,

    /// Track rows decrease after normalization, i.e. time flows backward.
    #[error("Temporal inversion: row decreases at segment {index}")]
    TemporalInversion { index: usize },

    /// Configuration validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Embedded centerline metadata could not be parsed.
    #[error("Malformed path info: {0}")]
    MalformedPathInfo(String),

    /// Raster dimensions disagree with what the operation requires.
    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),
}

/// Result type alias for kymograph operations.
pub type Result<T> = std::result::Result<T, KymoError>;

impl KymoError {
    /// Create a path too short error.
    #[must_use]
    pub const fn path_too_short(min: usize, actual: usize) -> Self {
        Self::PathTooShort { min, actual }
    }

    /// Create an uncalibrated image error.
    #[must_use]
    pub fn uncalibrated(unit: impl Into<String>) -> Self {
        Self::Uncalibrated { unit: unit.into() }
    }

    /// Create an invalid frame interval error.
    #[must_use]
    pub const fn invalid_frame_interval(value: f64) -> Self {
        Self::InvalidFrameInterval { value }
    }

    /// Create a temporal inversion error.
    #[must_use]
    pub const fn temporal_inversion(index: usize) -> Self {
        Self::TemporalInversion { index }
    }

    /// Create an invalid configuration error.
    #[must_use]
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create a malformed path info error.
    #[must_use]
    pub fn malformed_path_info(msg: impl Into<String>) -> Self {
        Self::MalformedPathInfo(msg.into())
    }

    /// Create a shape mismatch error.
    #[must_use]
    pub fn shape_mismatch(msg: impl Into<String>) -> Self {
        Self::ShapeMismatch(msg.into())
    }
}
