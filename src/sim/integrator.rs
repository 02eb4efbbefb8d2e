use nalgebra::Vector3;

use super::plant::PlantState;

// ---------------------------------------------------------------------------
// RK4 integrator, acceleration held to the same command over the step
// ---------------------------------------------------------------------------

/// Single RK4 step of (position, velocity) under `accel(pos, vel)`.
pub fn rk4_step<F>(state: &PlantState, dt: f64, accel: F) -> PlantState
where
    F: Fn(&Vector3<f64>, &Vector3<f64>) -> Vector3<f64>,
{
    let (p, v) = (state.pos, state.vel);

    let k1p = v;
    let k1v = accel(&p, &v);
    let k2p = v + k1v * (dt * 0.5);
    let k2v = accel(&(p + k1p * (dt * 0.5)), &k2p);
    let k3p = v + k2v * (dt * 0.5);
    let k3v = accel(&(p + k2p * (dt * 0.5)), &k3p);
    let k4p = v + k3v * dt;
    let k4v = accel(&(p + k3p * dt), &k4p);

    PlantState {
        time: state.time + dt,
        pos: p + (k1p + 2.0 * k2p + 2.0 * k3p + k4p) * (dt / 6.0),
        vel: v + (k1v + 2.0 * k2v + 2.0 * k3v + k4v) * (dt / 6.0),
    }
}
