//! Track classification and per-track kinematics.
//!
//! A track is a trajectory traced on a kymograph: a [`Polyline`] whose
//! vertices are `[column, row]` kymograph pixels, columns encoding position
//! along the path and rows encoding frames. [`Track::analyze`] runs the
//! whole state machine in one pass:
//!
//! 1. **Normalize**: tracks may be traced bottom-up; if the first vertex
//!    sits on a later row than the last, the vertex order is reversed once.
//! 2. **Validate**: after normalization every consecutive row step must be
//!    non-decreasing. A row decrease means the trace doubles back in time
//!    and the track is rejected outright, as is a track whose rows never
//!    change at all.
//! 3. **Classify**: each vertex pair becomes a [`Segment`] with physical
//!    displacement, elapsed time, speed and a [`Motion`] class.
//! 4. **Aggregate**: distances, times, mean speeds, persistence and
//!    class-transition counts accumulate into [`TrackStats`].
//! 5. **Interpolate**: one [`FullPathSample`] per occupied row, for reverse
//!    mapping and coordinate reports.
//!
//! Aggregates that are undefined for a particular track (the mean inward
//! speed of a track that never moves inward) are NaN, never errors.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::calibration::Calibration;
use crate::config::AnalysisConfig;
use crate::error::{KymoError, Result};
use crate::geometry::Polyline;

/// Motion class of a track segment.
///
/// Sign convention: inward motion has negative displacement and speed,
/// outward motion positive. The boundary cases sit in [`Motion::Pause`]:
/// classification is strict, so a speed exactly at the threshold pauses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Motion {
    /// |speed| at or below the threshold (NaN speeds land here too).
    Pause,
    /// Moving inward, toward the path origin.
    In,
    /// Moving outward, away from the path origin.
    Out,
}

impl Motion {
    /// Classify a signed speed against a pause threshold.
    #[must_use]
    pub fn classify(speed: f64, min_speed: f64) -> Self {
        if speed < -min_speed {
            Self::In
        } else if speed > min_speed {
            Self::Out
        } else {
            Self::Pause
        }
    }

    /// Intensity of this class in overlay channel A.
    ///
    /// Indices into the classic 4-band kymograph palette: black background,
    /// pauses in the blue band, inward runs in the red band, outward runs
    /// in the green band.
    #[must_use]
    pub const fn overlay_level(self) -> u8 {
        match self {
            Self::Pause => 96,
            Self::In => 160,
            Self::Out => 224,
        }
    }
}

/// One classified step between consecutive track vertices.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Segment {
    /// Start vertex `[column, row]`, kymograph pixels.
    pub from: [i32; 2],
    /// End vertex `[column, row]`.
    pub to: [i32; 2],
    /// Signed physical displacement (negative inward).
    pub displacement: f64,
    /// Elapsed time; zero for segments on a single row.
    pub elapsed: f64,
    /// Signed speed. Zero-elapsed segments give +/-inf, or NaN when the
    /// displacement is zero as well.
    pub speed: f64,
    /// Motion class of the step.
    pub motion: Motion,
}

/// One per-row sample of the interpolated full path.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FullPathSample {
    /// Kymograph row, i.e. frame index.
    pub row: i32,
    /// Fractional kymograph column at that row.
    pub column: f64,
    /// Class of the segment the sample lies on (the terminal sample
    /// repeats the class of the sample before it).
    pub motion: Motion,
}

/// Counts of ordered class-pair switches between consecutive segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TransitionCounts {
    pub in_to_out: u32,
    pub in_to_pause: u32,
    pub out_to_in: u32,
    pub out_to_pause: u32,
    pub pause_to_in: u32,
    pub pause_to_out: u32,
}

impl TransitionCounts {
    fn record(&mut self, from: Motion, to: Motion) {
        match (from, to) {
            (Motion::In, Motion::Out) => self.in_to_out += 1,
            (Motion::In, Motion::Pause) => self.in_to_pause += 1,
            (Motion::Out, Motion::In) => self.out_to_in += 1,
            (Motion::Out, Motion::Pause) => self.out_to_pause += 1,
            (Motion::Pause, Motion::In) => self.pause_to_in += 1,
            (Motion::Pause, Motion::Out) => self.pause_to_out += 1,
            _ => {}
        }
    }

    /// Per-time frequencies in report order: In>Out, In>Pause, Out>In,
    /// Out>Pause, Pause>In, Pause>Out.
    #[must_use]
    pub fn frequencies(&self, total_time: f64) -> [f64; 6] {
        [
            f64::from(self.in_to_out) / total_time,
            f64::from(self.in_to_pause) / total_time,
            f64::from(self.out_to_in) / total_time,
            f64::from(self.out_to_pause) / total_time,
            f64::from(self.pause_to_in) / total_time,
            f64::from(self.pause_to_out) / total_time,
        ]
    }
}

/// Per-track aggregates.
///
/// Per-class distances and mean speeds keep the segment sign convention,
/// so `cum_dist_in` and `mean_speed_in` are negative for any track that
/// actually moves inward. Per-class times are accumulated as whole row
/// counts and scaled once, so `time_*_fraction` sum to 1 exactly.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TrackStats {
    /// Total path length, sum of |displacement| over all segments.
    pub cum_dist: f64,
    /// Signed sum of inward displacements.
    pub cum_dist_in: f64,
    /// Signed sum of outward displacements.
    pub cum_dist_out: f64,
    /// |last column - first column| in physical units.
    pub straight_line_dist: f64,
    /// `cum_dist / straight_line_dist`; NaN when the track ends where it
    /// started.
    pub persistence: f64,
    /// `(last row - first row) * frame_interval`.
    pub total_time: f64,
    /// `cum_dist / total_time`.
    pub mean_speed: f64,
    /// `cum_dist_in / time_in`; NaN when the track never moves inward.
    pub mean_speed_in: f64,
    /// `cum_dist_out / time_out`; NaN when the track never moves outward.
    pub mean_speed_out: f64,
    /// Fraction of total time spent inward.
    pub time_in_fraction: f64,
    /// Fraction of total time spent outward.
    pub time_out_fraction: f64,
    /// Fraction of total time spent paused.
    pub time_pause_fraction: f64,
    /// Class-switch counts between consecutive segments.
    pub transitions: TransitionCounts,
}

impl TrackStats {
    /// Transition frequencies over the track's total time, in report order.
    #[must_use]
    pub fn transition_frequencies(&self) -> [f64; 6] {
        self.transitions.frequencies(self.total_time)
    }
}

/// A validated, classified kymograph trajectory.
///
/// Invalid candidates never become `Track` values; [`Track::analyze`]
/// rejects them instead. Once built, a track is immutable.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    vertices: Vec<[i32; 2]>,
    segments: Vec<Segment>,
    full_path: Vec<FullPathSample>,
    stats: TrackStats,
}

impl Track {
    /// Run the classification state machine over a traced trajectory.
    ///
    /// `calibration` is the kymograph's derived calibration; `config`
    /// supplies the outward direction and the pause threshold.
    ///
    /// # Errors
    ///
    /// Returns [`KymoError::ZeroRowExtent`] when the trace never leaves its
    /// first row and [`KymoError::TemporalInversion`] when a row decreases
    /// after normalization. Calibration and configuration are validated
    /// first.
    pub fn analyze(
        path: &Polyline,
        calibration: &Calibration,
        config: &AnalysisConfig,
    ) -> Result<Self> {
        calibration.validate()?;
        config.validate()?;

        if path.row_extent() == 0 {
            return Err(KymoError::ZeroRowExtent);
        }

        let mut vertices = path.vertices().to_vec();
        let n = vertices.len();
        if vertices[0][1] > vertices[n - 1][1] {
            vertices.reverse();
        }
        for i in 0..n - 1 {
            if vertices[i][1] > vertices[i + 1][1] {
                return Err(KymoError::temporal_inversion(i));
            }
        }

        let pw = calibration.pixel_width;
        let fi = calibration.frame_interval;
        let dir = config.direction.sign();

        let mut segments = Vec::with_capacity(n - 1);
        let mut cum_dist = 0.0;
        let mut cum_dist_in = 0.0;
        let mut cum_dist_out = 0.0;
        let mut rows_in: i64 = 0;
        let mut rows_out: i64 = 0;
        let mut rows_pause: i64 = 0;
        let mut transitions = TransitionCounts::default();
        let mut prev_motion: Option<Motion> = None;

        for w in vertices.windows(2) {
            let d_col = f64::from(w[1][0] - w[0][0]);
            let d_rows = w[1][1] - w[0][1];
            let displacement = dir * d_col * pw;
            let elapsed = f64::from(d_rows) * fi;
            let speed = displacement / elapsed;
            let motion = Motion::classify(speed, config.min_speed);

            cum_dist += displacement.abs();
            match motion {
                Motion::In => {
                    cum_dist_in += displacement;
                    rows_in += i64::from(d_rows);
                }
                Motion::Out => {
                    cum_dist_out += displacement;
                    rows_out += i64::from(d_rows);
                }
                Motion::Pause => rows_pause += i64::from(d_rows),
            }
            if let Some(prev) = prev_motion {
                transitions.record(prev, motion);
            }
            prev_motion = Some(motion);

            segments.push(Segment {
                from: w[0],
                to: w[1],
                displacement,
                elapsed,
                speed,
                motion,
            });
        }

        // rows are non-decreasing, so last - first is the full row extent
        let total_rows = i64::from(vertices[n - 1][1] - vertices[0][1]);
        let total_time = total_rows as f64 * fi;
        let time_in = rows_in as f64 * fi;
        let time_out = rows_out as f64 * fi;

        let straight_line_dist = f64::from((vertices[n - 1][0] - vertices[0][0]).abs()) * pw;
        let persistence = if straight_line_dist == 0.0 {
            f64::NAN
        } else {
            cum_dist / straight_line_dist
        };

        let stats = TrackStats {
            cum_dist,
            cum_dist_in,
            cum_dist_out,
            straight_line_dist,
            persistence,
            total_time,
            mean_speed: cum_dist / total_time,
            mean_speed_in: cum_dist_in / time_in,
            mean_speed_out: cum_dist_out / time_out,
            time_in_fraction: rows_in as f64 / total_rows as f64,
            time_out_fraction: rows_out as f64 / total_rows as f64,
            time_pause_fraction: rows_pause as f64 / total_rows as f64,
            transitions,
        };

        let full_path = interpolate_full_path(&vertices, &segments);

        Ok(Self {
            vertices,
            segments,
            full_path,
            stats,
        })
    }

    /// Normalized vertices (rows non-decreasing).
    #[must_use]
    pub fn vertices(&self) -> &[[i32; 2]] {
        &self.vertices
    }

    /// Classified segments, one per vertex pair.
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// One sample per occupied row, first to last inclusive.
    #[must_use]
    pub fn full_path(&self) -> &[FullPathSample] {
        &self.full_path
    }

    /// Aggregate statistics.
    #[must_use]
    pub fn stats(&self) -> &TrackStats {
        &self.stats
    }
}

/// Interpolate one sample per occupied row along the normalized vertices.
///
/// Each segment contributes its rows excluding the upper end (nothing for
/// zero-elapsed segments); the terminal row takes the last vertex's column
/// and the class of the sample before it.
fn interpolate_full_path(vertices: &[[i32; 2]], segments: &[Segment]) -> Vec<FullPathSample> {
    let mut samples = Vec::new();
    for seg in segments {
        let y0 = seg.from[1];
        let y1 = seg.to[1];
        let x0 = f64::from(seg.from[0]);
        let x1 = f64::from(seg.to[0]);
        for row in y0..y1 {
            let t = f64::from(row - y0) / f64::from(y1 - y0);
            samples.push(FullPathSample {
                row,
                column: x0 + t * (x1 - x0),
                motion: seg.motion,
            });
        }
    }

    let terminal_motion = samples
        .last()
        .map(|s| s.motion)
        .or_else(|| segments.last().map(|s| s.motion))
        .unwrap_or(Motion::Pause);
    if let Some(last) = vertices.last() {
        samples.push(FullPathSample {
            row: last[1],
            column: f64::from(last[0]),
            motion: terminal_motion,
        });
    }
    samples
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Direction;
    use approx::assert_relative_eq;

    fn cal() -> Calibration {
        // exactly representable sizes keep the time sums exact
        Calibration::new(0.5, "µm", 2.0, "s")
    }

    fn track(vertices: Vec<[i32; 2]>) -> Result<Track> {
        Track::analyze(
            &Polyline::new(vertices).unwrap(),
            &cal(),
            &AnalysisConfig::default(),
        )
    }

    #[test]
    fn test_classify_boundary_is_pause() {
        assert_eq!(Motion::classify(0.3, 0.3), Motion::Pause);
        assert_eq!(Motion::classify(-0.3, 0.3), Motion::Pause);
        assert_eq!(Motion::classify(0.300001, 0.3), Motion::Out);
        assert_eq!(Motion::classify(-0.300001, 0.3), Motion::In);
        assert_eq!(Motion::classify(f64::NAN, 0.3), Motion::Pause);
    }

    #[test]
    fn test_overlay_levels() {
        assert_eq!(Motion::Pause.overlay_level(), 96);
        assert_eq!(Motion::In.overlay_level(), 160);
        assert_eq!(Motion::Out.overlay_level(), 224);
    }

    #[test]
    fn test_reversed_trace_normalizes() {
        let t = track(vec![[0, 10], [5, 3], [2, 0]]).unwrap();
        assert_eq!(t.vertices(), &[[2, 0], [5, 3], [0, 10]]);
        assert_eq!(t.segments().len(), 2);
    }

    #[test]
    fn test_temporal_inversion_rejected() {
        let err = track(vec![[0, 0], [5, 10], [2, 5]]).unwrap_err();
        assert!(matches!(err, KymoError::TemporalInversion { index: 1 }));
    }

    #[test]
    fn test_zero_row_extent_rejected() {
        let err = track(vec![[0, 0], [10, 0], [20, 0]]).unwrap_err();
        assert!(matches!(err, KymoError::ZeroRowExtent));
    }

    #[test]
    fn test_direction_sign_convention() {
        // outward left-to-right: rightward motion classifies inward
        let t = track(vec![[0, 0], [10, 5]]).unwrap();
        assert_eq!(t.segments()[0].motion, Motion::In);
        assert_relative_eq!(t.segments()[0].displacement, -5.0);

        let rtl = Track::analyze(
            &Polyline::new(vec![[0, 0], [10, 5]]).unwrap(),
            &cal(),
            &AnalysisConfig::default().with_direction(Direction::OutwardRightToLeft),
        )
        .unwrap();
        assert_eq!(rtl.segments()[0].motion, Motion::Out);
        assert_relative_eq!(rtl.segments()[0].displacement, 5.0);
    }

    #[test]
    fn test_elapsed_times_sum_to_total() {
        let t = track(vec![[0, 0], [4, 3], [4, 7], [9, 12]]).unwrap();
        let sum: f64 = t.segments().iter().map(|s| s.elapsed).sum();
        assert_eq!(sum, t.stats().total_time);
        assert_eq!(t.stats().total_time, 24.0);
    }

    #[test]
    fn test_time_fractions_sum_to_one() {
        // in (rightward is inward), pause (vertical), out (leftward)
        let t = track(vec![[0, 0], [6, 2], [6, 5], [1, 9]]).unwrap();
        let s = t.stats();
        assert_relative_eq!(
            s.time_in_fraction + s.time_out_fraction + s.time_pause_fraction,
            1.0,
            epsilon = 1e-12
        );
        assert_relative_eq!(s.time_in_fraction, 2.0 / 9.0);
        assert_relative_eq!(s.time_pause_fraction, 3.0 / 9.0);
        assert_relative_eq!(s.time_out_fraction, 4.0 / 9.0);
    }

    #[test]
    fn test_full_path_sample_count() {
        let t = track(vec![[0, 10], [8, 25]]).unwrap();
        assert_eq!(t.full_path().len(), 16);
        assert_eq!(t.full_path()[0].row, 10);
        assert_eq!(t.full_path()[15].row, 25);
    }

    #[test]
    fn test_full_path_interpolation() {
        let t = track(vec![[0, 0], [10, 5]]).unwrap();
        let samples = t.full_path();
        assert_eq!(samples.len(), 6);
        assert_relative_eq!(samples[2].column, 4.0);
        assert_relative_eq!(samples[5].column, 10.0);
        // terminal sample repeats the class of the one before it
        assert_eq!(samples[5].motion, samples[4].motion);
    }

    #[test]
    fn test_zero_elapsed_segment() {
        // horizontal jump: inward at infinite speed, but no time in class
        let t = track(vec![[0, 0], [5, 0], [5, 3]]).unwrap();
        let jump = t.segments()[0];
        assert_eq!(jump.motion, Motion::In);
        assert_eq!(jump.elapsed, 0.0);
        assert!(jump.speed.is_infinite() && jump.speed < 0.0);

        let s = t.stats();
        assert_relative_eq!(s.time_in_fraction, 0.0);
        assert_relative_eq!(s.time_pause_fraction, 1.0);
        assert_relative_eq!(s.cum_dist, 2.5);
        // inward distance with zero inward time
        assert!(s.mean_speed_in.is_infinite() && s.mean_speed_in < 0.0);
    }

    #[test]
    fn test_absent_class_means_nan() {
        // purely outward under right-to-left orientation
        let t = Track::analyze(
            &Polyline::new(vec![[0, 0], [4, 4], [8, 8]]).unwrap(),
            &cal(),
            &AnalysisConfig::default().with_direction(Direction::OutwardRightToLeft),
        )
        .unwrap();
        let s = t.stats();
        assert!(s.mean_speed_in.is_nan());
        assert_relative_eq!(s.cum_dist_in, 0.0);
        assert_relative_eq!(s.mean_speed_out, 0.25);
    }

    #[test]
    fn test_straight_track_persistence() {
        let t = track(vec![[0, 0], [5, 5], [10, 10]]).unwrap();
        assert_relative_eq!(t.stats().persistence, 1.0);
    }

    #[test]
    fn test_persistence_nan_when_track_returns() {
        // out and back: straight-line distance zero
        let t = track(vec![[0, 0], [5, 4], [0, 8]]).unwrap();
        assert!(t.stats().persistence.is_nan());
        assert_relative_eq!(t.stats().cum_dist, 5.0);
    }

    #[test]
    fn test_transition_counts_and_frequencies() {
        // in, in, pause, out: one In>Pause, one Pause>Out
        let t = track(vec![[0, 0], [3, 2], [6, 4], [6, 6], [2, 8]]).unwrap();
        let tr = t.stats().transitions;
        assert_eq!(tr.in_to_pause, 1);
        assert_eq!(tr.pause_to_out, 1);
        assert_eq!(tr.in_to_out, 0);

        let freq = t.stats().transition_frequencies();
        // total time 16 s
        assert_relative_eq!(freq[1], 1.0 / 16.0);
        assert_relative_eq!(freq[5], 1.0 / 16.0);
        assert_relative_eq!(freq[0], 0.0);
    }

    #[test]
    fn test_signed_per_class_aggregates() {
        // inward then outward under the default orientation
        let t = track(vec![[0, 0], [8, 4], [2, 8]]).unwrap();
        let s = t.stats();
        assert_relative_eq!(s.cum_dist_in, -4.0);
        assert_relative_eq!(s.cum_dist_out, 3.0);
        assert_relative_eq!(s.cum_dist, 7.0);
        assert_relative_eq!(s.mean_speed_in, -0.5);
        assert_relative_eq!(s.mean_speed_out, 0.375);
        assert_relative_eq!(s.mean_speed, 7.0 / 16.0);
    }

    #[test]
    fn test_mean_speed_uses_boundary_pause() {
        // exactly at the threshold: pause, so no in/out time at all
        let config = AnalysisConfig::default().with_min_speed(0.25);
        let t = Track::analyze(
            &Polyline::new(vec![[0, 0], [1, 1]]).unwrap(),
            &cal(),
            &config,
        )
        .unwrap();
        // speed = -0.5 * 1 / 2.0 = -0.25, right on the threshold
        assert_eq!(t.segments()[0].motion, Motion::Pause);
        assert_relative_eq!(t.stats().time_pause_fraction, 1.0);
    }
}
