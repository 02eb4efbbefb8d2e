use nalgebra::{Unit, Vector3};

use super::body::{Body, G0};

// ---------------------------------------------------------------------------
// Per-tick kinematic snapshot
// ---------------------------------------------------------------------------

/// Read-only vehicle state handed to the autopilot once per physics tick.
/// All vectors are in the body-fixed rotating frame.
#[derive(Debug, Clone)]
pub struct TickSnapshot {
    pub position: Vector3<f64>,         // m, relative to body center
    pub surface_velocity: Vector3<f64>, // m/s, relative to the rotating surface
    pub body_radius: f64,               // m
    pub rotation_axis: Unit<Vector3<f64>>,
    pub gravity_acc: Vector3<f64>,     // m/s^2
    pub noninertial_acc: Vector3<f64>, // m/s^2, centrifugal + Coriolis
    pub latitude: f64,                 // deg
    pub longitude: f64,                // deg
    pub max_lift_acc: f64,             // m/s^2, lift authority at current speed
    pub landed: bool,                  // landed or splashed
    pub dt: f64,                       // s
}

impl TickSnapshot {
    /// Build a consistent snapshot for a vehicle flying over `body`.
    pub fn from_body(body: &Body, position: Vector3<f64>, surface_velocity: Vector3<f64>, dt: f64) -> Self {
        let (latitude, longitude) = body.geodetic(&position);
        Self {
            gravity_acc: body.gravity_accel(&position),
            noninertial_acc: body.noninertial_accel(&position, &surface_velocity),
            position,
            surface_velocity,
            body_radius: body.radius,
            rotation_axis: body.rotation_axis(),
            latitude,
            longitude,
            max_lift_acc: 2.0 * G0,
            landed: position.norm() <= body.radius,
            dt,
        }
    }

    pub fn with_max_lift_acc(mut self, max_lift_acc: f64) -> Self {
        self.max_lift_acc = max_lift_acc;
        self
    }

    pub fn with_landed(mut self, landed: bool) -> Self {
        self.landed = landed;
        self
    }

    /// Local "up": unit vector from the body center through the vehicle.
    pub fn normal(&self) -> Option<Unit<Vector3<f64>>> {
        Unit::try_new(self.position, 1e-6)
    }

    /// Height above the body's reference radius, m.
    pub fn altitude(&self) -> f64 {
        self.position.norm() - self.body_radius
    }

    pub fn vertical_speed(&self) -> f64 {
        self.normal()
            .map(|n| self.surface_velocity.dot(&n))
            .unwrap_or(0.0)
    }

    /// Surface velocity with its radial component removed.
    pub fn horizontal_velocity(&self) -> Vector3<f64> {
        match self.normal() {
            Some(n) => self.surface_velocity - n.into_inner() * self.surface_velocity.dot(&n),
            None => Vector3::zeros(),
        }
    }

    pub fn horizontal_speed(&self) -> f64 {
        self.horizontal_velocity().norm()
    }

    pub fn surface_speed(&self) -> f64 {
        self.surface_velocity.norm()
    }

    /// Downward component of gravity plus non-inertial acceleration, m/s^2.
    pub fn effective_gravity(&self) -> f64 {
        match self.normal() {
            Some(n) => -(self.gravity_acc + self.noninertial_acc).dot(&n),
            None => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_speeds_split_velocity() {
        let body = Body::earth();
        let pos = body.surface_position(0.0, 0.0, 1000.0);
        let snap = TickSnapshot::from_body(&body, pos, Vector3::new(-5.0, 200.0, 0.0), 0.02);
        assert!((snap.altitude() - 1000.0).abs() < 1e-6);
        assert!((snap.vertical_speed() + 5.0).abs() < 1e-9);
        assert!((snap.horizontal_speed() - 200.0).abs() < 1e-9);
        assert!(!snap.landed);
    }

    #[test]
    fn effective_gravity_is_reduced_by_rotation() {
        let body = Body::earth();
        let pos = body.surface_position(0.0, 0.0, 0.0);
        let snap = TickSnapshot::from_body(&body, pos * 1.001, Vector3::zeros(), 0.02);
        let g = snap.effective_gravity();
        assert!(g > 9.0 && g < body.surface_gravity());
    }
}
