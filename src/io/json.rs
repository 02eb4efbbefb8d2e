use std::io::{self, Write};

use serde::Serialize;

use crate::gnc::{CruiseMode, Notice};
use crate::sim::TickRecord;

/// Summary statistics computed from a cruise tick log.
#[derive(Debug, Clone, Serialize)]
pub struct FlightSummary {
    pub flight_time_s: f64,
    pub min_altitude_m: f64,
    pub max_altitude_m: f64,
    pub final_altitude_m: f64,
    pub max_climb_ms: f64,
    pub max_sink_ms: f64,
    pub mean_speed_ms: f64,
    pub final_heading_deg: f64,
    pub final_mode: CruiseMode,
    pub mode_changes: usize,
    pub notices: Vec<String>,
}

impl FlightSummary {
    /// Compute the summary from a tick log and the notices posted during it.
    /// `None` for an empty log.
    pub fn from_records(records: &[TickRecord], notices: &[Notice]) -> Option<Self> {
        let last = records.last()?;

        let min_altitude_m = records.iter().map(|r| r.altitude).fold(f64::INFINITY, f64::min);
        let max_altitude_m = records.iter().map(|r| r.altitude).fold(f64::NEG_INFINITY, f64::max);
        let max_climb_ms = records.iter().map(|r| r.vertical_speed).fold(0.0_f64, f64::max);
        let max_sink_ms = records.iter().map(|r| r.vertical_speed).fold(0.0_f64, f64::min);
        let mean_speed_ms =
            records.iter().map(|r| r.horizontal_speed).sum::<f64>() / records.len() as f64;
        let mode_changes = records.windows(2).filter(|w| w[0].mode != w[1].mode).count();

        Some(FlightSummary {
            flight_time_s: last.time,
            min_altitude_m,
            max_altitude_m,
            final_altitude_m: last.altitude,
            max_climb_ms,
            max_sink_ms,
            mean_speed_ms,
            final_heading_deg: last.heading,
            final_mode: last.mode,
            mode_changes,
            notices: notices.iter().map(|n| n.text().to_string()).collect(),
        })
    }
}

/// Write the flight summary as pretty JSON.
pub fn write_summary<W: Write>(writer: &mut W, summary: &FlightSummary) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *writer, summary)?;
    writeln!(writer)
}

/// Write the flight summary JSON to a file.
pub fn write_summary_file(path: &str, summary: &FlightSummary) -> io::Result<()> {
    let mut file = std::fs::File::create(path)?;
    write_summary(&mut file, summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn simple_log() -> Vec<TickRecord> {
        let rec = |time: f64, altitude: f64, vertical_speed: f64, mode: CruiseMode| TickRecord {
            time,
            latitude: 0.0,
            longitude: 0.0,
            altitude,
            vertical_speed,
            horizontal_speed: 200.0,
            heading: 45.0,
            mode,
            dist_to_dest: 0.0,
            throttle: 0.5,
        };
        vec![
            rec(0.0, 1000.0, 0.0, CruiseMode::Waypoint),
            rec(10.0, 1500.0, 60.0, CruiseMode::Waypoint),
            rec(20.0, 1400.0, -12.0, CruiseMode::LevelFlight),
        ]
    }

    #[test]
    fn summary_tracks_extremes_and_modes() {
        let notices = vec![Notice::Transient("Waypoint reached".into())];
        let s = FlightSummary::from_records(&simple_log(), &notices).unwrap();
        assert!((s.max_altitude_m - 1500.0).abs() < 1e-9);
        assert!((s.min_altitude_m - 1000.0).abs() < 1e-9);
        assert!((s.max_climb_ms - 60.0).abs() < 1e-9);
        assert!((s.max_sink_ms + 12.0).abs() < 1e-9);
        assert!((s.flight_time_s - 20.0).abs() < 1e-9);
        assert_eq!(s.final_mode, CruiseMode::LevelFlight);
        assert_eq!(s.mode_changes, 1);
        assert_eq!(s.notices, vec!["Waypoint reached".to_string()]);
    }

    #[test]
    fn empty_log_has_no_summary() {
        assert!(FlightSummary::from_records(&[], &[]).is_none());
    }

    #[test]
    fn summary_file_is_written() {
        let summary = FlightSummary::from_records(&simple_log(), &[]).unwrap();
        let path = std::env::temp_dir().join(format!("cruise_summary_{}.json", std::process::id()));
        let path_str = path.to_string_lossy().to_string();
        write_summary_file(&path_str, &summary).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert!(text.contains("\"flight_time_s\""));
    }

    #[test]
    fn json_output_is_valid() {
        let summary = FlightSummary::from_records(&simple_log(), &[]).unwrap();
        let mut buf = Vec::new();
        write_summary(&mut buf, &summary).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value["final_mode"], "LevelFlight");
        assert!((value["max_altitude_m"].as_f64().unwrap() - 1500.0).abs() < 1e-9);
    }
}
