//! Configuration for trajectory analysis.
//!
//! This module provides the [`AnalysisConfig`] struct which centralizes the
//! tunable parameters of track classification, plus the closed choices used
//! across the crate ([`Direction`], [`ReportMode`]).
//!
//! # Example
//!
//! ```
//! use kymograph::{AnalysisConfig, Direction};
//!
//! // Defaults: outward runs left to right, every nonzero speed classifies
//! let config = AnalysisConfig::default();
//!
//! // Outward to the left, speeds below 0.05 units/time count as pauses
//! let config = AnalysisConfig::default()
//!     .with_direction(Direction::OutwardRightToLeft)
//!     .with_min_speed(0.05);
//! ```

use crate::error::{KymoError, Result};

/// Configuration for track classification and aggregation.
///
/// `min_speed` is in physical units per time unit of the kymograph's
/// calibration. Segments whose |speed| does not exceed it classify as
/// PAUSE; the comparison is strict, so a speed exactly at the threshold is
/// still a pause.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnalysisConfig {
    /// Which way outward transport runs along the kymograph x axis.
    pub direction: Direction,

    /// Speed threshold below or at which a segment counts as a pause.
    /// Non-negative; 0 means any nonzero speed classifies as motion.
    pub min_speed: f64,
}

/// Orientation of outward transport along the kymograph x axis.
///
/// Kymograph paths are traced from a reference point (a cell body, a
/// nucleus) outward; the direction tells the classifier which way along
/// the x axis "outward" is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    /// Outward motion moves toward increasing x.
    #[default]
    OutwardLeftToRight,
    /// Outward motion moves toward decreasing x.
    OutwardRightToLeft,
}

impl Direction {
    /// Sign applied to raw column displacements before classification.
    #[must_use]
    pub const fn sign(self) -> f64 {
        match self {
            Self::OutwardLeftToRight => -1.0,
            Self::OutwardRightToLeft => 1.0,
        }
    }
}

/// Shape of the results report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ReportMode {
    /// One row per track segment.
    Full,
    /// One aggregate row per track.
    #[default]
    Summary,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            direction: Direction::OutwardLeftToRight,
            min_speed: 0.0,
        }
    }
}

impl AnalysisConfig {
    /// Create a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if `min_speed` is negative or not finite.
    pub fn validate(&self) -> Result<()> {
        if !self.min_speed.is_finite() {
            return Err(KymoError::invalid_config("min_speed must be finite"));
        }
        if self.min_speed < 0.0 {
            return Err(KymoError::invalid_config(
                "min_speed must be non-negative",
            ));
        }
        Ok(())
    }

    /// Set the outward direction.
    #[must_use]
    pub const fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    /// Set the pause speed threshold.
    #[must_use]
    pub const fn with_min_speed(mut self, min_speed: f64) -> Self {
        self.min_speed = min_speed;
        self
    }
}
