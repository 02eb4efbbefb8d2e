use nalgebra::{Unit, Vector3};

use crate::dynamics::body::{Body, G0};
use crate::gnc::{AttitudeGuidance, ThrustControl};

// ---------------------------------------------------------------------------
// Plant state and parameters
// ---------------------------------------------------------------------------

/// Point-mass vehicle state in the body-fixed rotating frame.
#[derive(Debug, Clone)]
pub struct PlantState {
    pub time: f64,
    pub pos: Vector3<f64>, // m, from body center
    pub vel: Vector3<f64>, // m/s, surface-relative
}

impl PlantState {
    /// Level flight at a geodetic point on a compass heading.
    pub fn level(body: &Body, latitude: f64, longitude: f64, altitude: f64, heading: f64, speed: f64) -> Self {
        let pos = body.surface_position(latitude, longitude, altitude);
        let vel = match body.local_east_north(&pos) {
            Some((east, north)) => {
                let h = heading.to_radians();
                (east.into_inner() * h.sin() + north.into_inner() * h.cos()) * speed
            }
            None => Vector3::zeros(),
        };
        Self { time: 0.0, pos, vel }
    }
}

#[derive(Debug, Clone)]
pub struct PlantParams {
    pub steer_rate: f64,     // 1/s, velocity-direction response at unit strength
    pub max_thrust_acc: f64, // m/s^2 at full throttle
    pub drag_coeff: f64,     // 1/m, drag acc = k * v^2
    pub max_lift_acc: f64,   // m/s^2
    pub fixed_throttle: f64, // used when speed control is off
}

impl Default for PlantParams {
    fn default() -> Self {
        Self {
            steer_rate: 1.5,
            max_thrust_acc: 15.0,
            // 60% throttle balances drag at 250 m/s
            drag_coeff: 0.6 * 15.0 / (250.0 * 250.0),
            max_lift_acc: 2.0 * G0,
            fixed_throttle: 0.6,
        }
    }
}

// ---------------------------------------------------------------------------
// Simulated collaborators
// ---------------------------------------------------------------------------

/// What the attitude controller was last asked to do.
#[derive(Debug, Clone, Copy)]
pub struct SteeringCommand {
    pub direction: Unit<Vector3<f64>>,
    pub acceleration: Vector3<f64>,
    pub strength: f64,
}

/// Ideal attitude controller: records the command for the plant to follow.
#[derive(Debug, Clone)]
pub struct SimAttitude {
    strength: f64,
    last: Option<SteeringCommand>,
}

impl SimAttitude {
    pub fn new(strength: f64) -> Self {
        Self { strength, last: None }
    }

    pub fn last_direction(&self) -> Option<Unit<Vector3<f64>>> {
        self.last.map(|c| c.direction)
    }

    /// Strength in effect during the last `apply` call.
    pub fn applied_strength(&self) -> f64 {
        self.last.map(|c| c.strength).unwrap_or(self.strength)
    }

    pub fn take_command(&mut self) -> Option<SteeringCommand> {
        self.last.take()
    }
}

impl AttitudeGuidance for SimAttitude {
    fn strength(&self) -> f64 {
        self.strength
    }

    fn set_strength(&mut self, strength: f64) {
        self.strength = strength;
    }

    fn apply(&mut self, direction: &Unit<Vector3<f64>>, acceleration: &Vector3<f64>) {
        self.last = Some(SteeringCommand {
            direction: *direction,
            acceleration: *acceleration,
            strength: self.strength,
        });
    }
}

/// Speed controller with an externally forceable throttle.
#[derive(Debug, Clone)]
pub struct SimThrust {
    pub enabled: bool,
    pub target_speed: f64, // m/s
    forced: Option<f64>,
}

impl SimThrust {
    pub fn new(target_speed: f64) -> Self {
        Self { enabled: true, target_speed, forced: None }
    }

    pub fn disabled() -> Self {
        Self { enabled: false, target_speed: 0.0, forced: None }
    }

    /// Last forced throttle, if any, without consuming it.
    pub fn forced(&self) -> Option<f64> {
        self.forced
    }

    pub fn take_forced(&mut self) -> Option<f64> {
        self.forced.take()
    }

    /// Throttle the speed loop would pick on its own.
    pub fn auto_throttle(&self, speed: f64, params: &PlantParams) -> f64 {
        if !self.enabled {
            return params.fixed_throttle;
        }
        let cruise = params.drag_coeff * self.target_speed * self.target_speed / params.max_thrust_acc;
        (cruise + 0.1 * (self.target_speed - speed)).clamp(0.0, 1.0)
    }
}

impl ThrustControl for SimThrust {
    fn speed_control_enabled(&self) -> bool {
        self.enabled
    }

    fn target_speed(&self) -> f64 {
        self.target_speed
    }

    fn force_throttle(&mut self, throttle: f64) {
        self.forced = Some(throttle.clamp(0.0, 1.0));
    }
}

// ---------------------------------------------------------------------------
// Ideal-lift point mass
// ---------------------------------------------------------------------------

/// Acceleration of the point mass.
///
/// Lift cancels gravity and the non-inertial terms across the flight path;
/// along it, speed trades against climb angle. The velocity vector is turned
/// toward the commanded direction at `steer_rate * strength`, and the
/// commanded feed-forward acceleration is applied normal to the flight path.
pub fn plant_accel(
    body: &Body,
    pos: &Vector3<f64>,
    vel: &Vector3<f64>,
    steering: Option<&SteeringCommand>,
    throttle: f64,
    params: &PlantParams,
) -> Vector3<f64> {
    let speed = vel.norm();
    let (Some(forward), Some(up)) = (Unit::try_new(*vel, 1e-6), Unit::try_new(*pos, 1e-6)) else {
        return Vector3::zeros();
    };
    let along = |a: Vector3<f64>| a - forward.into_inner() * a.dot(&forward);

    let mut acc = Vector3::zeros();
    if let Some(cmd) = steering {
        let rate = params.steer_rate * cmd.strength.max(0.0);
        acc += along((cmd.direction.into_inner() * speed - vel) * rate);
        acc += along(cmd.acceleration);
    }

    let g_eff = -(body.gravity_accel(pos) + body.noninertial_accel(pos, vel)).dot(&up);
    let sin_gamma = forward.dot(&up);
    let tangential = throttle * params.max_thrust_acc - params.drag_coeff * speed * speed - g_eff * sin_gamma;
    acc + forward.into_inner() * tangential
}
