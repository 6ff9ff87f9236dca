//! Trajectory analysis bound to a kymograph.
//!
//! [`KymoAnalysis`] ties together the pieces built elsewhere in the crate:
//! it screens hand-traced track candidates against a [`Kymograph`], keeps the
//! per-track kinematics ([`Track`]), and turns them into the three visual and
//! tabular products:
//!
//! | Product | Method |
//! |---|---|
//! | Classified kymograph overlay | [`KymoAnalysis::overlay`] |
//! | Dots mapped back onto the source stack | [`KymoAnalysis::map_onto_stack`] |
//! | Coordinate / results tables (TSV) | [`KymoAnalysis::coordinates_tsv`], [`KymoAnalysis::results_tsv`] |
//!
//! Candidates that fail validation (flat extent, temporal inversion, too few
//! vertices) are logged and skipped rather than aborting the batch, so one
//! bad trace does not cost the whole session.

use nalgebra as na;
use ndarray::{Array2, Axis};
use tracing::{debug, warn};

use crate::composite::{draw_dot, draw_line, to_gray, Composite, StackComposite};
use crate::config::{AnalysisConfig, ReportMode};
use crate::error::Result;
use crate::geometry::Polyline;
use crate::kymograph::Kymograph;
use crate::stack::FrameStack;
use crate::table::{
    coordinate_headers, render_tsv, segment_headers, summary_headers, CoordinateRow, SegmentRow,
    SummaryRow,
};
use crate::track::{Motion, Track};

/// Analysis of a set of track candidates traced on one kymograph.
///
/// Holds only the tracks that survived screening; their report numbering
/// (`Kymo_nb`) is assigned in retained order, starting at 1.
pub struct KymoAnalysis<'a> {
    kymo: &'a Kymograph,
    config: AnalysisConfig,
    tracks: Vec<Track>,
}

impl<'a> KymoAnalysis<'a> {
    /// Screen `candidates` against `kymo` and keep the analyzable ones.
    ///
    /// Each candidate is normalized and validated by [`Track::analyze`];
    /// failures are reported at `warn` level with the candidate's position in
    /// the input slice and then dropped. Errors are returned only for
    /// problems that invalidate the whole analysis: an unusable calibration
    /// or a rejected configuration.
    pub fn new(kymo: &'a Kymograph, candidates: &[Polyline], config: AnalysisConfig) -> Result<Self> {
        kymo.calibration.validate()?;
        config.validate()?;

        let mut tracks = Vec::with_capacity(candidates.len());
        for (index, candidate) in candidates.iter().enumerate() {
            match Track::analyze(candidate, &kymo.calibration, &config) {
                Ok(track) => tracks.push(track),
                Err(err) => warn!("skipping track candidate {}: {}", index, err),
            }
        }
        debug!(
            "retained {} of {} track candidates on {}",
            tracks.len(),
            candidates.len(),
            kymo.label
        );

        Ok(Self { kymo, config, tracks })
    }

    /// Tracks that survived screening, in retained order.
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// The kymograph the tracks were traced on.
    pub fn kymograph(&self) -> &Kymograph {
        self.kymo
    }

    /// The configuration the tracks were classified under.
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Render the classified tracks over a grayscale copy of the kymograph.
    ///
    /// Every track segment is stroked at its motion class level on the
    /// overlay channel. Returns `None` when no candidate survived screening,
    /// matching the convention that an empty analysis produces no images.
    pub fn overlay(&self, stroke: usize) -> Option<Composite> {
        if self.tracks.is_empty() {
            return None;
        }
        let mut overlay = Array2::zeros(self.kymo.raster.dim());
        for track in &self.tracks {
            for segment in track.segments() {
                draw_line(
                    &mut overlay,
                    segment.from,
                    segment.to,
                    segment.motion.overlay_level(),
                    stroke,
                );
            }
        }
        Some(Composite {
            overlay,
            base: to_gray(&self.kymo.raster.view()),
            calibration: self.kymo.calibration.clone(),
        })
    }

    /// Map the tracks back onto the source stack as per-frame dots.
    ///
    /// Builds a fresh grayscale composite from `stack` and marks, on every
    /// frame a track crosses, the stack position of the track at that frame.
    /// Returns `None` when no candidate survived screening.
    pub fn map_onto_stack(&self, stack: &impl FrameStack, dot_size: usize) -> Option<StackComposite> {
        if self.tracks.is_empty() {
            return None;
        }
        let mut composite = StackComposite::from_stack(stack);
        self.map_onto_composite(&mut composite, dot_size);
        Some(composite)
    }

    /// Add track dots to an existing stack composite's overlay channel.
    ///
    /// Each full-path sample becomes one dot: the kymograph column is mapped
    /// back to a stack pixel through the centerline and stamped on the frame
    /// given by the sample's row, at the sample's motion class level. Samples
    /// whose row falls outside the composite are skipped.
    pub fn map_onto_composite(&self, composite: &mut StackComposite, dot_size: usize) {
        let frames = composite.frame_count();
        for track in &self.tracks {
            for sample in track.full_path() {
                if sample.row < 0 || sample.row as usize >= frames {
                    continue;
                }
                let pos = self.kymo.centerline.position_at(sample.column);
                let mut frame = composite.overlay.index_axis_mut(Axis(0), sample.row as usize);
                draw_dot(
                    &mut frame,
                    [pos.x.round() as i32, pos.y.round() as i32],
                    sample.motion.overlay_level(),
                    dot_size,
                );
            }
        }
    }

    /// Per-frame coordinate rows for all retained tracks.
    ///
    /// Positions are stack pixels recovered through the centerline. The
    /// distance column is the calibrated stack-space step from the previous
    /// frame, signed by motion class (inward negative, pause exactly zero);
    /// the first row of each track carries NaN distance and speed.
    pub fn coordinate_rows(&self) -> Vec<CoordinateRow> {
        let cal = &self.kymo.calibration;
        let mut rows = Vec::new();
        for (number, track) in self.tracks.iter().enumerate() {
            let mut prev: Option<na::Point2<f64>> = None;
            for sample in track.full_path() {
                let pos = self.kymo.centerline.position_at(sample.column);
                let distance = match prev {
                    Some(p) => signed_step(cal.pixel_width * na::distance(&p, &pos), sample.motion),
                    None => f64::NAN,
                };
                rows.push(CoordinateRow {
                    label: self.kymo.label.clone(),
                    track: number + 1,
                    time: f64::from(sample.row) * cal.frame_interval,
                    x: pos.x,
                    y: pos.y,
                    distance,
                    speed: distance / cal.frame_interval,
                });
                prev = Some(pos);
            }
        }
        rows
    }

    /// One row per track segment, for the full report mode.
    pub fn segment_rows(&self) -> Vec<SegmentRow> {
        let mut rows = Vec::new();
        for (number, track) in self.tracks.iter().enumerate() {
            for segment in track.segments() {
                rows.push(SegmentRow {
                    label: self.kymo.label.clone(),
                    track: number + 1,
                    elapsed: segment.elapsed,
                    distance: segment.displacement,
                    speed: segment.speed,
                });
            }
        }
        rows
    }

    /// One aggregate row per track, for the summary report mode.
    pub fn summary_rows(&self) -> Vec<SummaryRow> {
        self.tracks
            .iter()
            .enumerate()
            .map(|(number, track)| {
                let stats = track.stats();
                SummaryRow {
                    label: self.kymo.label.clone(),
                    track: number + 1,
                    mean_speed: stats.mean_speed,
                    mean_speed_in: stats.mean_speed_in,
                    mean_speed_out: stats.mean_speed_out,
                    cum_dist: stats.cum_dist,
                    cum_dist_in: stats.cum_dist_in,
                    cum_dist_out: stats.cum_dist_out,
                    straight_line_dist: stats.straight_line_dist,
                    persistence: stats.persistence,
                    frequencies: stats.transition_frequencies(),
                    total_time: stats.total_time,
                    time_in_fraction: stats.time_in_fraction,
                    time_out_fraction: stats.time_out_fraction,
                    time_pause_fraction: stats.time_pause_fraction,
                }
            })
            .collect()
    }

    /// Render the results report in the requested mode.
    ///
    /// Summary mode emits one aggregate row per track; full mode emits one
    /// row per segment. Both are tab-separated with a calibrated header line.
    pub fn results_tsv(&self, mode: ReportMode) -> String {
        let cal = &self.kymo.calibration;
        match mode {
            ReportMode::Full => render_tsv(&segment_headers(cal), &self.segment_rows()),
            ReportMode::Summary => render_tsv(&summary_headers(cal), &self.summary_rows()),
        }
    }

    /// Render the per-frame coordinate report, tab-separated.
    pub fn coordinates_tsv(&self) -> String {
        render_tsv(&coordinate_headers(&self.kymo.calibration), &self.coordinate_rows())
    }
}

/// Sign a nonnegative step by motion class.
///
/// Pauses contribute exactly zero regardless of the sub-pixel step introduced
/// by centerline rounding.
fn signed_step(step: f64, motion: Motion) -> f64 {
    match motion {
        Motion::Pause => 0.0,
        Motion::In => -step.abs(),
        Motion::Out => step.abs(),
    }
}
