use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use cruise_autopilot::config::CruiseConfig;
use cruise_autopilot::dynamics::Body;
use cruise_autopilot::io::{csv, json};
use cruise_autopilot::sim::{self, plant::PlantState, SimConfig};

#[derive(Parser, Debug)]
#[command(name = "cruise-autopilot", version, about = "Fly a cruise autopilot scenario on a point-mass plant")]
struct Opts {
    /// Cruise settings (JSON); defaults are used when omitted
    #[arg(long)]
    config: Option<PathBuf>,
    /// Initial altitude, m
    #[arg(long, default_value_t = 3000.0)]
    altitude: f64,
    /// Initial and target airspeed, m/s
    #[arg(long, default_value_t = 250.0)]
    speed: f64,
    /// Initial compass heading, deg
    #[arg(long, default_value_t = 90.0)]
    heading: f64,
    /// Initial latitude, deg
    #[arg(long, default_value_t = 0.0)]
    lat: f64,
    /// Initial longitude, deg
    #[arg(long, default_value_t = 0.0)]
    lon: f64,
    /// Simulated time, s
    #[arg(long, default_value_t = 600.0, value_parser = positive_seconds)]
    duration: f64,
    /// Physics step, s
    #[arg(long, default_value_t = 0.02, value_parser = positive_seconds)]
    dt: f64,
    /// Write the per-tick log here
    #[arg(long)]
    csv: Option<PathBuf>,
    /// Write the flight summary JSON here
    #[arg(long)]
    summary: Option<PathBuf>,
    /// Print the flight summary as JSON instead of the table
    #[arg(long)]
    json: bool,
}

fn positive_seconds(s: &str) -> Result<f64, String> {
    let value: f64 = s.parse().map_err(|e| format!("{e}"))?;
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(format!("{value} is not a positive number of seconds"))
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let opts = Opts::parse();

    let config = match &opts.config {
        Some(path) => CruiseConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => CruiseConfig::default(),
    };

    let body = Body::earth();
    let initial = PlantState::level(&body, opts.lat, opts.lon, opts.altitude, opts.heading, opts.speed);
    let sim_config = SimConfig::new(opts.dt, opts.duration)?;

    // -----------------------------------------------------------------------
    // Run simulation
    // -----------------------------------------------------------------------
    info!("flying {} s in {} mode", opts.duration, config.cruise_mode);
    let (records, notices) = sim::simulate(&body, &config, opts.speed, &initial, &sim_config)?;

    if let Some(path) = &opts.csv {
        let path = path.to_string_lossy();
        csv::write_records_file(&path, &records).with_context(|| format!("writing {path}"))?;
    }

    let summary = json::FlightSummary::from_records(&records, &notices.notices)
        .context("simulation produced no ticks")?;

    if let Some(path) = &opts.summary {
        let path = path.to_string_lossy();
        json::write_summary_file(&path, &summary).with_context(|| format!("writing {path}"))?;
    }

    if opts.json {
        json::write_summary(&mut std::io::stdout().lock(), &summary)?;
        return Ok(());
    }

    // -----------------------------------------------------------------------
    // Print results
    // -----------------------------------------------------------------------
    println!();
    println!("====================================================================");
    println!("  CRUISE AUTOPILOT - {} / {}", config.cruise_mode, config.height_mode);
    println!("====================================================================");
    println!();
    println!("  Setpoints");
    println!("  ──────────────────────────────────────────────────────────────────");
    println!(
        "  Course:        {:>8.1} deg   Altitude:     {:>8.0} m",
        config.desired_course, config.desired_altitude
    );
    println!(
        "  Waypoint:      {:>8.4} lat   {:>8.4} lon",
        config.waypoint.latitude, config.waypoint.longitude
    );
    println!(
        "  Vertical ctl:  {:>8}       Pseudo-FLC:   {:>8}",
        config.vertical_control, config.pseudo_flc
    );
    println!();

    println!("  Flight Summary");
    println!("  ──────────────────────────────────────────────────────────────────");
    println!(
        "  Altitude:      {:>8.0} m     range {:.0} .. {:.0} m",
        summary.final_altitude_m, summary.min_altitude_m, summary.max_altitude_m
    );
    println!(
        "  Climb / sink:  {:>8.1} m/s   {:>8.1} m/s",
        summary.max_climb_ms, summary.max_sink_ms
    );
    println!(
        "  Mean speed:    {:>8.1} m/s   Heading:      {:>8.1} deg",
        summary.mean_speed_ms, summary.final_heading_deg
    );
    println!(
        "  Final mode:    {:>14}   mode changes: {}",
        summary.final_mode.to_string(),
        summary.mode_changes
    );
    for text in &summary.notices {
        println!("  NOTICE        {text}");
    }
    println!();

    // -----------------------------------------------------------------------
    // Tick log (sampled)
    // -----------------------------------------------------------------------
    println!("  Trajectory");
    println!("  ──────────────────────────────────────────────────────────────────");
    println!(
        "  {:>7}  {:>9}  {:>9}  {:>8}  {:>8}  {:>9}  {:>6}",
        "t (s)", "lat", "lon", "alt (m)", "vs (m/s)", "hdg (deg)", "thr"
    );
    println!("  {}", "─".repeat(66));

    let sample_interval = (records.len() / 30).max(1);
    for (i, r) in records.iter().enumerate() {
        let changed = i > 0 && records[i - 1].mode != r.mode;
        if i % sample_interval != 0 && !changed && i != records.len() - 1 {
            continue;
        }
        println!(
            "  {:>7.1}  {:>9.4}  {:>9.4}  {:>8.0}  {:>8.2}  {:>9.1}  {:>6.2}",
            r.time, r.latitude, r.longitude, r.altitude, r.vertical_speed, r.heading, r.throttle
        );
    }

    println!();
    println!("  Simulation: {} ticks, dt={} s", records.len(), sim_config.dt);
    println!("====================================================================");
    println!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_and_duration_must_be_positive() {
        assert_eq!(positive_seconds("0.02"), Ok(0.02));
        assert!(positive_seconds("0").is_err());
        assert!(positive_seconds("-1").is_err());
        assert!(positive_seconds("inf").is_err());
        assert!(positive_seconds("fast").is_err());
    }

    #[test]
    fn cli_rejects_zero_step() {
        assert!(Opts::try_parse_from(["cruise-autopilot", "--dt", "0", "--duration", "1"]).is_err());
        let opts = Opts::try_parse_from(["cruise-autopilot", "--dt", "0.05"]).unwrap();
        assert_eq!(opts.dt, 0.05);
    }
}
