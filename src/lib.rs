//! Kymograph Library
//!
//! Kymograph construction and trajectory analysis for time-lapse microscopy.
//!
//! This library turns a calibrated image stack and a traced path into
//! space-time rasters (kymographs), then classifies trajectories drawn on
//! those rasters into inward, outward, and paused motion, reporting
//! per-segment kinematics, per-track aggregates, and per-frame stack
//! coordinates.
//!
//! # Features
//!
//! - **Three raster products**: max-projected kymograph, full-band stack, montage
//! - **Classified kinematics**: signed speeds, pauses, transition frequencies
//! - **Reverse mapping**: kymograph columns back to stack pixels via the centerline
//! - **Tabular reports**: calibrated TSV headers, summary or per-segment rows
//!
//! # Quick Start
//!
//! ```
//! use kymograph::{
//!     AnalysisConfig, Calibration, ImageStack, KymoAnalysis, KymographBuilder,
//!     LinearBandResampler, Polyline, ReportMode,
//! };
//! use ndarray::Array3;
//!
//! let calibration = Calibration::new(0.16, "µm", 2.0, "s");
//! let stack = ImageStack::new(Array3::zeros((30, 64, 128)), calibration);
//! let path = Polyline::from_line([10, 32], [110, 32]);
//!
//! let resampler = LinearBandResampler::default();
//! let builder = KymographBuilder::new(&stack, &path, &resampler)?;
//! let kymo = builder.build_kymograph(10)?;
//!
//! // Trajectories are traced on the kymograph as column/row polylines
//! let traces = vec![Polyline::from_line([5, 0], [45, 20])];
//! let analysis = KymoAnalysis::new(&kymo, &traces, AnalysisConfig::default())?;
//! let report = analysis.results_tsv(ReportMode::Summary);
//! # Ok::<(), kymograph::KymoError>(())
//! ```
//!
//! # Raster Products
//!
//! | Product | Shape | Builder |
//! |---------|-------|---------|
//! | [`Kymograph`] | (frames, length) | [`KymographBuilder::build_kymograph`] |
//! | [`KymoStack`] | (frames, width, length) | [`KymographBuilder::build_kymo_stack`] |
//! | [`KymoMontage`] | (frames * width, length) | [`KymographBuilder::build_kymo_montage`] |
//!
//! # Direction Convention
//!
//! Motion class signs depend on which on-screen direction counts as outward:
//!
//! ```
//! use kymograph::{AnalysisConfig, Direction};
//!
//! let default = AnalysisConfig::default();
//! let flipped = AnalysisConfig::default().with_direction(Direction::OutwardRightToLeft);
//! ```

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::similar_names)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

pub mod analysis;
pub mod builder;
pub mod calibration;
pub mod composite;
pub mod config;
pub mod error;
pub mod geometry;
pub mod kymograph;
pub mod resample;
pub mod stack;
pub mod table;
pub mod track;

// Re-exports for convenient access
pub use analysis::KymoAnalysis;
pub use builder::KymographBuilder;
pub use calibration::Calibration;
pub use composite::{draw_dot, draw_line, to_gray, Composite, StackComposite};
pub use config::{AnalysisConfig, Direction, ReportMode};
pub use error::{KymoError, Result};
pub use geometry::{Centerline, Polyline, MIN_PATH_VERTICES};
pub use kymograph::{KymoMontage, KymoStack, Kymograph};
pub use resample::{BandSample, LinearBandResampler, Resampler};
pub use stack::{sample_bilinear, FrameStack, ImageStack};
pub use table::{
    coordinate_headers, render_tsv, segment_headers, summary_headers, CoordinateRow, SegmentRow,
    SummaryRow, TableRow,
};
pub use track::{FullPathSample, Motion, Segment, Track, TrackStats, TransitionCounts};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default extraction band width, in stack pixels.
pub const DEFAULT_BAND_WIDTH: usize = 10;

/// Default stroke for kymograph overlays, in kymograph pixels.
pub const DEFAULT_STROKE: usize = 2;

/// Default dot diameter for stack overlays, in stack pixels.
pub const DEFAULT_DOT_SIZE: usize = 5;
