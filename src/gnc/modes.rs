use std::fmt;

use serde::{Deserialize, Serialize};

/// Above this |latitude| course hold is unavailable, deg.
pub const POLE_LATITUDE_LIMIT: f64 = 80.0;
/// Waypoint counts as reached inside this distance, m.
pub const ARRIVAL_RADIUS: f64 = 200.0;
/// Flight-path-angle setpoints are kept inside +-this, deg.
pub const MAX_PATH_ANGLE: f64 = 89.0;

// ---------------------------------------------------------------------------
// Modes
// ---------------------------------------------------------------------------

/// Horizontal guidance strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CruiseMode {
    #[default]
    LevelFlight,
    CourseHold,
    Waypoint,
}

/// Vertical regulation strategy, used while vertical control is enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HeightMode {
    #[default]
    Altitude,
    VerticalSpeed,
    FlightPathAngle,
}

impl fmt::Display for CruiseMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CruiseMode::LevelFlight => "level flight",
            CruiseMode::CourseHold => "course hold",
            CruiseMode::Waypoint => "waypoint",
        };
        f.write_str(s)
    }
}

impl fmt::Display for HeightMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            HeightMode::Altitude => "altitude",
            HeightMode::VerticalSpeed => "vertical speed",
            HeightMode::FlightPathAngle => "flight path angle",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// Forced transitions
// ---------------------------------------------------------------------------

/// Mode change the controller makes on its own during a tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ForcedTransition {
    PoleAvoidance { latitude: f64 },
    WaypointReached { distance: f64 },
}

impl ForcedTransition {
    pub fn notice_text(&self) -> String {
        match self {
            ForcedTransition::PoleAvoidance { latitude } => {
                format!("Too close to the pole (lat {:.1} deg), switching to level flight", latitude)
            }
            ForcedTransition::WaypointReached { .. } => "Waypoint reached".to_string(),
        }
    }
}

/// Resolve which mode actually runs this tick.
///
/// `dist_to_dest` must already be refreshed when `requested` is Waypoint.
/// The returned mode is final for the tick: every forced transition lands on
/// LevelFlight, which has no exit conditions of its own.
pub fn resolve_mode(
    requested: CruiseMode,
    latitude: f64,
    dist_to_dest: f64,
) -> (CruiseMode, Option<ForcedTransition>) {
    match requested {
        CruiseMode::CourseHold if latitude.abs() > POLE_LATITUDE_LIMIT => (
            CruiseMode::LevelFlight,
            Some(ForcedTransition::PoleAvoidance { latitude }),
        ),
        CruiseMode::Waypoint if dist_to_dest < ARRIVAL_RADIUS => (
            CruiseMode::LevelFlight,
            Some(ForcedTransition::WaypointReached { distance: dist_to_dest }),
        ),
        mode => (mode, None),
    }
}

// ---------------------------------------------------------------------------
// Vertical setpoint units
// ---------------------------------------------------------------------------

/// Re-express a vertical setpoint when the height mode changes so the
/// instantaneous vertical command stays continuous.
///
/// VerticalSpeed setpoints are m/s, FlightPathAngle setpoints are degrees.
/// Altitude mode doesn't use the value, so it passes through untouched.
pub fn convert_vertical_setpoint(
    from: HeightMode,
    to: HeightMode,
    value: f64,
    horizontal_speed: f64,
) -> f64 {
    match (from, to) {
        (HeightMode::FlightPathAngle, HeightMode::VerticalSpeed) => {
            let angle = value.clamp(-MAX_PATH_ANGLE, MAX_PATH_ANGLE);
            horizontal_speed * angle.to_radians().tan()
        }
        (HeightMode::VerticalSpeed, HeightMode::FlightPathAngle) => value
            .atan2(horizontal_speed)
            .to_degrees()
            .clamp(-MAX_PATH_ANGLE, MAX_PATH_ANGLE),
        _ => value,
    }
}
