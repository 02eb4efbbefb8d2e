use std::io::{self, Write};

use crate::sim::TickRecord;

/// Write the per-tick log as CSV.
///
/// Columns: time, lat_deg, lon_deg, alt_m, vs_ms, hs_ms, heading_deg,
///          mode, dist_m, throttle
pub fn write_records<W: Write>(writer: &mut W, records: &[TickRecord]) -> io::Result<()> {
    writeln!(
        writer,
        "time,lat_deg,lon_deg,alt_m,vs_ms,hs_ms,heading_deg,mode,dist_m,throttle"
    )?;

    for r in records {
        writeln!(
            writer,
            "{:.3},{:.6},{:.6},{:.2},{:.3},{:.3},{:.2},{},{:.1},{:.3}",
            r.time,
            r.latitude,
            r.longitude,
            r.altitude,
            r.vertical_speed,
            r.horizontal_speed,
            r.heading,
            r.mode,
            r.dist_to_dest,
            r.throttle,
        )?;
    }

    Ok(())
}

/// Write the tick log to a CSV file at the given path.
pub fn write_records_file(path: &str, records: &[TickRecord]) -> io::Result<()> {
    let mut file = std::fs::File::create(path)?;
    write_records(&mut file, records)
}
