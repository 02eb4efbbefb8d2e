use log::info;
use serde::Serialize;

use crate::config::CruiseConfig;
use crate::dynamics::{Body, TickSnapshot};
use crate::error::ConfigError;
use crate::gnc::{CruiseController, CruiseMode, NoticeLog, NoticeSink};
use super::integrator::rk4_step;
use super::plant::{plant_accel, PlantParams, PlantState, SimAttitude, SimThrust};

// ---------------------------------------------------------------------------
// Simulation config and per-tick record
// ---------------------------------------------------------------------------

/// Longest run accepted, in ticks.
pub const MAX_TICKS: f64 = 1.0e7;

#[derive(Debug, Clone)]
pub struct SimConfig {
    pub dt: f64,
    pub max_time: f64,
}

impl SimConfig {
    pub fn new(dt: f64, max_time: f64) -> Result<Self, ConfigError> {
        let config = Self { dt, max_time };
        config.validate()?;
        Ok(config)
    }

    /// Step must be positive, duration non-negative, both finite, and the run
    /// no longer than [`MAX_TICKS`] steps.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.dt.is_finite() || self.dt <= 0.0 {
            return Err(ConfigError::invalid("dt", format!("{} s is not a positive step", self.dt)));
        }
        if !self.max_time.is_finite() || self.max_time < 0.0 {
            return Err(ConfigError::invalid(
                "max_time",
                format!("{} s is not a valid duration", self.max_time),
            ));
        }
        if self.max_time / self.dt > MAX_TICKS {
            return Err(ConfigError::invalid(
                "dt",
                format!("{} s steps over {} s exceed {} ticks", self.dt, self.max_time, MAX_TICKS),
            ));
        }
        Ok(())
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            dt: 0.02,        // 50 Hz physics tick
            max_time: 600.0, // 10 min
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TickRecord {
    pub time: f64,             // s
    pub latitude: f64,         // deg
    pub longitude: f64,        // deg
    pub altitude: f64,         // m
    pub vertical_speed: f64,   // m/s
    pub horizontal_speed: f64, // m/s
    pub heading: f64,          // deg from north
    pub mode: CruiseMode,
    pub dist_to_dest: f64,     // m
    pub throttle: f64,
}

pub type SimController<N> = CruiseController<SimAttitude, SimThrust, N>;

// ---------------------------------------------------------------------------
// Closed-loop run
// ---------------------------------------------------------------------------

/// Fly `controller` from `initial` until `max_time` or ground contact.
/// The controller is ticked but not activated here.
pub fn simulate_with<N: NoticeSink>(
    body: &Body,
    controller: &mut SimController<N>,
    initial: &PlantState,
    params: &PlantParams,
    config: &SimConfig,
) -> Result<Vec<TickRecord>, ConfigError> {
    config.validate()?;
    let capacity = ((config.max_time / config.dt) as usize)
        .saturating_add(1)
        .min(200_000);
    let mut records = Vec::with_capacity(capacity);
    let mut state = initial.clone();

    while state.time < config.max_time {
        let snap = TickSnapshot::from_body(body, state.pos, state.vel, config.dt)
            .with_max_lift_acc(params.max_lift_acc);

        // GNC update
        controller.tick(&snap);
        let steering = controller.attitude_mut().take_command();
        let speed = snap.surface_speed();
        let thrust = controller.thrust_mut();
        let throttle = thrust
            .take_forced()
            .unwrap_or_else(|| thrust.auto_throttle(speed, params));

        records.push(TickRecord {
            time: state.time,
            latitude: snap.latitude,
            longitude: snap.longitude,
            altitude: snap.altitude(),
            vertical_speed: snap.vertical_speed(),
            horizontal_speed: snap.horizontal_speed(),
            heading: heading(body, &snap),
            mode: controller.cruise_mode(),
            dist_to_dest: controller.dist_to_dest(),
            throttle,
        });

        // Integrate
        state = rk4_step(&state, config.dt, |p, v| {
            plant_accel(body, p, v, steering.as_ref(), throttle, params)
        });

        // Ground impact
        if state.pos.norm() <= body.radius {
            info!("ground contact at t={:.1}s", state.time);
            break;
        }
    }

    Ok(records)
}

/// Build a controller from `config`, activate it at `initial` and fly.
pub fn simulate(
    body: &Body,
    config: &CruiseConfig,
    target_speed: f64,
    initial: &PlantState,
    sim: &SimConfig,
) -> Result<(Vec<TickRecord>, NoticeLog), ConfigError> {
    sim.validate()?;
    let params = PlantParams::default();
    let mut controller = CruiseController::new(
        config,
        SimAttitude::new(1.0),
        SimThrust::new(target_speed),
        NoticeLog::new(),
    )?;

    let snap = TickSnapshot::from_body(body, initial.pos, initial.vel, sim.dt)
        .with_max_lift_acc(params.max_lift_acc);
    controller.activate(&snap);

    let records = simulate_with(body, &mut controller, initial, &params, sim)?;
    Ok((records, controller.notices().clone()))
}

/// Compass heading of the horizontal velocity, deg in [0, 360).
fn heading(body: &Body, snap: &TickSnapshot) -> f64 {
    match body.local_east_north(&snap.position) {
        Some((east, north)) => {
            let v = snap.surface_velocity;
            v.dot(&east).atan2(v.dot(&north)).to_degrees().rem_euclid(360.0)
        }
        None => 0.0,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
