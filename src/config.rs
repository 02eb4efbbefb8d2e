//! Operator setpoints and tuning parameters.
//!
//! Everything here is user intent that outlives a single activation. The
//! host decides where it lives; JSON helpers are provided for convenience.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::geo::Waypoint;
use crate::gnc::{CruiseMode, HeightMode, PidGains};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CruiseConfig {
    pub cruise_mode: CruiseMode,
    pub height_mode: HeightMode,
    pub desired_course: f64,    // deg, clockwise from north
    pub waypoint: Waypoint,
    pub desired_altitude: f64,  // m
    pub desired_vertspeed: f64, // m/s (VerticalSpeed) or deg (FlightPathAngle)
    pub vertical_control: bool,
    pub pseudo_flc: bool,
    pub flc_pid: PidGains,
    pub relax_time: f64,      // s
    pub height_relax_kp: f64, // 1/s
    pub max_climb_angle: f64, // deg
    pub strength_mult: f64,
}

impl Default for CruiseConfig {
    fn default() -> Self {
        Self {
            cruise_mode: CruiseMode::LevelFlight,
            height_mode: HeightMode::Altitude,
            desired_course: 90.0,
            waypoint: Waypoint::default(),
            desired_altitude: 1000.0,
            desired_vertspeed: 0.0,
            vertical_control: false,
            pseudo_flc: true,
            flc_pid: PidGains::default(),
            relax_time: 6.0,
            height_relax_kp: 0.3,
            max_climb_angle: 30.0,
            strength_mult: 0.75,
        }
    }
}

impl CruiseConfig {
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: CruiseConfig = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let s = std::fs::read_to_string(path)?;
        Self::from_json_str(&s)
    }

    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let finite = [
            ("desired_course", self.desired_course),
            ("waypoint.latitude", self.waypoint.latitude),
            ("waypoint.longitude", self.waypoint.longitude),
            ("desired_altitude", self.desired_altitude),
            ("desired_vertspeed", self.desired_vertspeed),
            ("flc_pid.kp", self.flc_pid.kp),
            ("flc_pid.ki", self.flc_pid.ki),
            ("flc_pid.kd", self.flc_pid.kd),
            ("flc_pid.integral_clamp", self.flc_pid.integral_clamp),
            ("flc_pid.output_clamp", self.flc_pid.output_clamp),
            ("relax_time", self.relax_time),
            ("height_relax_kp", self.height_relax_kp),
            ("max_climb_angle", self.max_climb_angle),
            ("strength_mult", self.strength_mult),
        ];
        for (name, value) in finite {
            if !value.is_finite() {
                return Err(ConfigError::invalid(name, format!("{} is not finite", value)));
            }
        }

        if self.relax_time <= 0.0 {
            return Err(ConfigError::invalid("relax_time", "must be positive"));
        }
        if self.height_relax_kp < 0.0 {
            return Err(ConfigError::invalid("height_relax_kp", "must not be negative"));
        }
        if self.max_climb_angle <= 0.1 || self.max_climb_angle >= 90.0 {
            return Err(ConfigError::invalid(
                "max_climb_angle",
                format!("{} deg is outside (0.1, 90)", self.max_climb_angle),
            ));
        }
        if self.strength_mult <= 0.0 {
            return Err(ConfigError::invalid("strength_mult", "must be positive"));
        }
        if self.flc_pid.integral_clamp < 0.0 || self.flc_pid.output_clamp < 0.0 {
            return Err(ConfigError::invalid("flc_pid", "clamps must not be negative"));
        }
        if self.waypoint.latitude.abs() > 90.0 {
            return Err(ConfigError::invalid("waypoint.latitude", "must be within +-90 deg"));
        }
        Ok(())
    }
}
