//! Report tables.
//!
//! Typed rows plus the unit-labeled headers that go with them. Header names
//! interpolate the calibration's units, so a kymograph calibrated in µm and
//! s reports `Mean_Speed_(µm_per_s)`. [`render_tsv`] turns headers and rows
//! into plain tab-separated text; undefined values print as `NaN`.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::calibration::Calibration;

/// One interpolated trajectory sample mapped back onto the stack.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CoordinateRow {
    /// Label of the kymograph the track was traced on.
    pub label: String,
    /// 1-based track number.
    pub track: usize,
    /// Sample time, `row * frame_interval`.
    pub time: f64,
    /// Fractional stack x position.
    pub x: f64,
    /// Fractional stack y position.
    pub y: f64,
    /// Physical distance to the previous sample, signed by class
    /// (pause 0, inward negative, outward positive); NaN on the first
    /// sample of each track.
    pub distance: f64,
    /// `distance / frame_interval`.
    pub speed: f64,
}

/// One classified segment of a track.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SegmentRow {
    /// Label of the kymograph the track was traced on.
    pub label: String,
    /// 1-based track number.
    pub track: usize,
    /// Elapsed time over the segment.
    pub elapsed: f64,
    /// Signed displacement over the segment.
    pub distance: f64,
    /// Signed speed over the segment.
    pub speed: f64,
}

/// Aggregates of one track.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SummaryRow {
    /// Label of the kymograph the track was traced on.
    pub label: String,
    /// 1-based track number.
    pub track: usize,
    pub mean_speed: f64,
    pub mean_speed_in: f64,
    pub mean_speed_out: f64,
    pub cum_dist: f64,
    pub cum_dist_in: f64,
    pub cum_dist_out: f64,
    pub straight_line_dist: f64,
    pub persistence: f64,
    /// Transition frequencies: In>Out, In>Pause, Out>In, Out>Pause,
    /// Pause>In, Pause>Out.
    pub frequencies: [f64; 6],
    pub total_time: f64,
    pub time_in_fraction: f64,
    pub time_out_fraction: f64,
    pub time_pause_fraction: f64,
}

/// A row that renders itself as table cells.
pub trait TableRow {
    /// Cell values in header order.
    fn cells(&self) -> Vec<String>;
}

impl TableRow for CoordinateRow {
    fn cells(&self) -> Vec<String> {
        vec![
            self.label.clone(),
            self.track.to_string(),
            self.time.to_string(),
            self.x.to_string(),
            self.y.to_string(),
            self.distance.to_string(),
            self.speed.to_string(),
        ]
    }
}

impl TableRow for SegmentRow {
    fn cells(&self) -> Vec<String> {
        vec![
            self.label.clone(),
            self.track.to_string(),
            self.elapsed.to_string(),
            self.distance.to_string(),
            self.speed.to_string(),
        ]
    }
}

impl TableRow for SummaryRow {
    fn cells(&self) -> Vec<String> {
        let mut cells = vec![
            self.label.clone(),
            self.track.to_string(),
            self.mean_speed.to_string(),
            self.mean_speed_in.to_string(),
            self.mean_speed_out.to_string(),
            self.cum_dist.to_string(),
            self.cum_dist_in.to_string(),
            self.cum_dist_out.to_string(),
            self.straight_line_dist.to_string(),
            self.persistence.to_string(),
        ];
        cells.extend(self.frequencies.iter().map(ToString::to_string));
        cells.push(self.total_time.to_string());
        cells.push(self.time_in_fraction.to_string());
        cells.push(self.time_out_fraction.to_string());
        cells.push(self.time_pause_fraction.to_string());
        cells
    }
}

/// Headers of the coordinate report.
#[must_use]
pub fn coordinate_headers(cal: &Calibration) -> Vec<String> {
    vec![
        "Image".into(),
        "Kymo_nb".into(),
        format!("Time_({})", cal.time_unit),
        "x".into(),
        "y".into(),
        format!("Distance_({})", cal.space_unit),
        format!("Speed_({}_per_{})", cal.space_unit, cal.time_unit),
    ]
}

/// Headers of the per-segment results report.
#[must_use]
pub fn segment_headers(cal: &Calibration) -> Vec<String> {
    vec![
        "Label".into(),
        "Kymo_nb".into(),
        format!("Ttl_Time_({})", cal.time_unit),
        format!("Cum_Dist_({})", cal.space_unit),
        format!("Mean_Speed_({}_per_{})", cal.space_unit, cal.time_unit),
    ]
}

/// Headers of the per-track summary report.
#[must_use]
pub fn summary_headers(cal: &Calibration) -> Vec<String> {
    let u = &cal.space_unit;
    let tu = &cal.time_unit;
    vec![
        "Label".into(),
        "Kymo_nb".into(),
        format!("Mean_Speed_({u}_per_{tu})"),
        format!("Mean_Speed_In_({u}_per_{tu})"),
        format!("Mean_Speed_Out_({u}_per_{tu})"),
        format!("Cum_Dist_({u})"),
        format!("Cum_Dist_In_({u})"),
        format!("Cum_Dist_Out_({u})"),
        format!("Min_Dist_Start-End_({u})"),
        "Persistence".into(),
        format!("Freq_In>Out_({tu}-1)"),
        format!("Freq_In>Pause_({tu}-1)"),
        format!("Freq_Out>In_({tu}-1)"),
        format!("Freq_Out>Pause_({tu}-1)"),
        format!("Freq_Pause>In_({tu}-1)"),
        format!("Freq_Pause>Out_({tu}-1)"),
        format!("Ttl_Time_({tu})"),
        "%_Time_In_".into(),
        "%_Time_Out_".into(),
        "%_Time_Pause_".into(),
    ]
}

/// Render headers and rows as tab-separated lines.
#[must_use]
pub fn render_tsv<R: TableRow>(headers: &[String], rows: &[R]) -> String {
    let mut out = headers.join("\t");
    out.push('\n');
    for row in rows {
        out.push_str(&row.cells().join("\t"));
        out.push('\n');
    }
    out
}
