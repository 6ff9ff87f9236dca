//! Test that exports analysis reports for external plotting.
//!
//! Run with: cargo test --test export_report -- --ignored --nocapture

use kymograph::{
    AnalysisConfig, Calibration, ImageStack, KymoAnalysis, KymographBuilder,
    LinearBandResampler, Polyline, ReportMode,
};
use ndarray::Array3;
use serde::Serialize;
use std::fs::{self, File};
use std::io::Write;

#[derive(Serialize)]
struct TrackExport {
    track: usize,
    segment_count: usize,
    cum_dist: f64,
    straight_line_dist: f64,
    persistence: f64,
    mean_speed: f64,
    total_time: f64,
    time_fractions: [f64; 3],
    transition_frequencies: [f64; 6],
}

#[derive(Serialize)]
struct AnalysisExport {
    label: String,
    pixel_width: f64,
    space_unit: String,
    frame_interval: f64,
    time_unit: String,
    tracks: Vec<TrackExport>,
}

/// Stack with several particles moving at different speeds along y = 24.
fn multi_particle_stack(frames: usize) -> ImageStack {
    let mut data = Array3::zeros((frames, 48, 96));
    for t in 0..frames {
        // steady outward-bound particle, 1 px per frame
        let fast = 10 + t;
        if fast < 96 {
            data[[t, 24, fast]] = 180.0_f32;
        }
        // slow particle, 1 px every 3 frames
        let slow = 60 + t / 3;
        if slow < 96 {
            data[[t, 24, slow]] = 140.0_f32;
        }
        // stationary particle
        data[[t, 24, 80]] = 220.0_f32;
    }
    ImageStack::new(data, Calibration::new(0.16, "µm", 2.0, "s"))
}

#[test]
#[ignore] // Run manually with: cargo test --test export_report -- --ignored --nocapture
fn export_reports_to_disk() {
    let stack = multi_particle_stack(30);
    let path = Polyline::from_line([8, 24], [88, 24]);
    let resampler = LinearBandResampler::default();
    let builder = KymographBuilder::new(&stack, &path, &resampler)
        .expect("builder should accept the stack")
        .with_label("synthetic_axon");
    let kymo = builder.build_kymograph(9).expect("kymograph should build");

    // traces matching the three particles, in kymograph coordinates
    let traces = vec![
        Polyline::from_line([2, 0], [31, 29]),
        Polyline::from_line([52, 0], [61, 29]),
        Polyline::new(vec![[72, 0], [72, 14], [73, 29]]).expect("stationary trace"),
    ];
    let analysis = KymoAnalysis::new(&kymo, &traces, AnalysisConfig::default())
        .expect("analysis should run");

    let tracks: Vec<TrackExport> = analysis
        .tracks()
        .iter()
        .enumerate()
        .map(|(i, track)| {
            let stats = track.stats();
            TrackExport {
                track: i + 1,
                segment_count: track.segments().len(),
                cum_dist: stats.cum_dist,
                straight_line_dist: stats.straight_line_dist,
                persistence: stats.persistence,
                mean_speed: stats.mean_speed,
                total_time: stats.total_time,
                time_fractions: [
                    stats.time_in_fraction,
                    stats.time_out_fraction,
                    stats.time_pause_fraction,
                ],
                transition_frequencies: stats.transition_frequencies(),
            }
        })
        .collect();

    let export = AnalysisExport {
        label: kymo.label.clone(),
        pixel_width: kymo.calibration.pixel_width,
        space_unit: kymo.calibration.space_unit.clone(),
        frame_interval: kymo.calibration.frame_interval,
        time_unit: kymo.calibration.time_unit.clone(),
        tracks,
    };

    let json = serde_json::to_string_pretty(&export).expect("Failed to serialize");

    fs::create_dir_all("reports").expect("Failed to create reports dir");
    let mut file = File::create("reports/analysis.json").expect("Failed to create file");
    file.write_all(json.as_bytes()).expect("Failed to write file");

    fs::write(
        "reports/results_summary.tsv",
        analysis.results_tsv(ReportMode::Summary),
    )
    .expect("Failed to write summary");
    fs::write(
        "reports/results_full.tsv",
        analysis.results_tsv(ReportMode::Full),
    )
    .expect("Failed to write full results");
    fs::write("reports/coordinates.tsv", analysis.coordinates_tsv())
        .expect("Failed to write coordinates");

    println!(
        "Exported {} tracks from {} to reports/",
        export.tracks.len(),
        export.label
    );
    for track in &export.tracks {
        println!(
            "  track {}: {} segments, {:.2} {} in {:.1} {}",
            track.track,
            track.segment_count,
            track.cum_dist,
            export.space_unit,
            track.total_time,
            export.time_unit
        );
    }
}
