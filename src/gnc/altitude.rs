use log::debug;
use nalgebra::{Unit, Vector3};

use crate::config::CruiseConfig;
use crate::dynamics::TickSnapshot;
use super::interfaces::ThrustControl;
use super::modes::{HeightMode, MAX_PATH_ANGLE};
use super::pid::{Pid, PidGains};

/// Smallest climb/descent angle the FLC loop may command, deg.
pub const MIN_FLC_ANGLE: f64 = 0.1;
/// Descent acceleration floor used by the parabolic descent profile, m/s^2.
pub const MIN_DESCENT_ACC: f64 = -5.0;

// ---------------------------------------------------------------------------
// Outputs
// ---------------------------------------------------------------------------

/// Which law set the climb-angle ceiling in altitude mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AltitudeRegime {
    /// Inside the relaxation band: damped proportional law.
    Relaxation,
    /// PID flight-level-change with bang-bang throttle.
    FlightLevelChange,
    /// Climb angle scaled by current/target speed.
    ProportionalClimb,
    /// No speed controller to consult: full climb-angle authority.
    FullClimb,
}

#[derive(Debug, Clone, Copy)]
pub struct AltitudeCommand {
    pub vertical_speed: f64,  // m/s, final blended command
    pub vertical_acc: f64,    // m/s^2 along the local normal
    pub parabolic_speed: f64, // m/s, trajectory target before the ceiling clamp
    pub climb_angle: f64,     // deg, effective ceiling (negative while FLC descends)
    pub relax_blend: f64,     // 0 = trajectory law, 1 = relaxation law
    pub regime: AltitudeRegime,
}

#[derive(Debug, Clone, Copy)]
pub struct VerticalCommand {
    pub direction: Unit<Vector3<f64>>,
    pub vertical_speed: f64,
    pub vertical_acc: f64,
}

// ---------------------------------------------------------------------------
// Vertical regulator
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct VerticalRegulator {
    pub relax_time: f64,      // s
    pub relax_kp: f64,        // 1/s
    pub max_climb_angle: f64, // deg
    pub pseudo_flc: bool,
    flc_pid: Pid,
    regime: Option<AltitudeRegime>,
}

impl VerticalRegulator {
    pub fn new(relax_time: f64, relax_kp: f64, max_climb_angle: f64, flc_gains: &PidGains) -> Self {
        Self {
            relax_time,
            relax_kp,
            max_climb_angle,
            pseudo_flc: true,
            flc_pid: Pid::from_gains(flc_gains),
            regime: None,
        }
    }

    pub fn from_config(config: &CruiseConfig) -> Self {
        let mut reg = Self::new(
            config.relax_time,
            config.height_relax_kp,
            config.max_climb_angle,
            &config.flc_pid,
        );
        reg.pseudo_flc = config.pseudo_flc;
        reg
    }

    pub fn flc_pid(&self) -> &Pid {
        &self.flc_pid
    }

    pub fn flc_pid_mut(&mut self) -> &mut Pid {
        &mut self.flc_pid
    }

    pub fn regime(&self) -> Option<AltitudeRegime> {
        self.regime
    }

    pub fn reset(&mut self) {
        self.flc_pid.clear();
        self.regime = None;
    }

    /// Layer a vertical component onto the horizontal `direction`.
    #[allow(clippy::too_many_arguments)]
    pub fn regulate<T: ThrustControl + ?Sized>(
        &mut self,
        mode: HeightMode,
        target_altitude: f64,
        vertical_setpoint: f64,
        snap: &TickSnapshot,
        normal: &Unit<Vector3<f64>>,
        direction: &Unit<Vector3<f64>>,
        thrust: &mut T,
        strength: f64,
    ) -> VerticalCommand {
        let v_horiz = snap.horizontal_speed();
        let (vertical_speed, vertical_acc) = match mode {
            HeightMode::VerticalSpeed => (vertical_setpoint, 0.0),
            HeightMode::FlightPathAngle => {
                let angle = vertical_setpoint.clamp(-MAX_PATH_ANGLE, MAX_PATH_ANGLE);
                (v_horiz * angle.to_radians().tan(), 0.0)
            }
            HeightMode::Altitude => {
                let cmd = self.altitude_hold(snap, target_altitude, thrust, strength);
                (cmd.vertical_speed, cmd.vertical_acc)
            }
        };

        VerticalCommand {
            direction: compose(direction, v_horiz, normal, vertical_speed),
            vertical_speed,
            vertical_acc,
        }
    }

    /// Altitude-capture cascade: relaxation band, FLC / proportional climb
    /// authority and the parabolic trajectory target.
    ///
    /// `strength` is the attitude strength in effect for this tick, multiplier
    /// included; it sizes the lift available to pull out of a descent.
    pub fn altitude_hold<T: ThrustControl + ?Sized>(
        &mut self,
        snap: &TickSnapshot,
        target_altitude: f64,
        thrust: &mut T,
        strength: f64,
    ) -> AltitudeCommand {
        let height_error = target_altitude - snap.altitude();
        let g_eff = snap.effective_gravity().max(0.0);
        let relax_frame = 0.5 * g_eff * self.relax_time * self.relax_time;
        let v_vert = snap.vertical_speed();
        let v_horiz = snap.horizontal_speed();

        // Relaxation band
        let mut relax_blend = 0.0;
        let mut relax_speed = 0.0;
        let mut relax_acc = 0.0;
        let regime;
        let climb_angle;

        if height_error.abs() < relax_frame {
            relax_blend = (2.0 * (relax_frame - height_error.abs())).clamp(0.0, 1.0);
            relax_speed = self.relax_kp * height_error;
            if v_vert * height_error > 0.0 {
                // Moving toward the setpoint: damp to avoid overshoot
                relax_acc = -self.relax_kp * v_vert;
            }
            self.flc_pid.clear();
            regime = AltitudeRegime::Relaxation;
            climb_angle = self.max_climb_angle;
        } else if thrust.speed_control_enabled() && self.pseudo_flc {
            let speed = snap.surface_speed();
            let target_speed = thrust.target_speed();
            if height_error > 0.0 {
                // Surplus speed steepens the climb
                let out = self.flc_pid.control(target_speed, speed, snap.dt);
                climb_angle = out.clamp(MIN_FLC_ANGLE, self.max_climb_angle);
                thrust.force_throttle(1.0);
            } else {
                // Speed deficit steepens the dive
                let out = self.flc_pid.control(speed, target_speed, snap.dt);
                climb_angle = -out.clamp(MIN_FLC_ANGLE, self.max_climb_angle);
                thrust.force_throttle(0.0);
            }
            regime = AltitudeRegime::FlightLevelChange;
        } else if thrust.speed_control_enabled() {
            let target_speed = thrust.target_speed();
            let scale = if target_speed > 0.0 {
                (snap.surface_speed() / target_speed).clamp(0.0, 1.0)
            } else {
                1.0
            };
            climb_angle = self.max_climb_angle * scale;
            self.flc_pid.clear();
            regime = AltitudeRegime::ProportionalClimb;
        } else {
            climb_angle = self.max_climb_angle;
            self.flc_pid.clear();
            regime = AltitudeRegime::FullClimb;
        }

        if self.regime != Some(regime) {
            debug!(
                "altitude regime {:?} -> {:?} (error {:.1} m, band {:.1} m)",
                self.regime, regime, height_error, relax_frame
            );
            self.regime = Some(regime);
        }

        // Parabolic ascent/descent profile
        let mut parabolic_acc = 0.0;
        let parabolic_speed = if height_error >= 0.0 {
            if v_vert > 0.0 && height_error > 0.0 {
                parabolic_acc = -0.5 * v_vert * v_vert / height_error;
            }
            (g_eff * height_error).sqrt()
        } else {
            let lift = strength * snap.max_lift_acc * 0.5;
            let descent_acc = 2.0 * MIN_DESCENT_ACC.min(g_eff - lift);
            if v_vert < 0.0 {
                parabolic_acc = -0.5 * v_vert * v_vert / height_error;
            }
            -(descent_acc * height_error).sqrt()
        };

        let max_vert_speed = v_horiz * climb_angle.abs().min(MAX_PATH_ANGLE).to_radians().tan();
        let clamped = parabolic_speed.abs() > max_vert_speed;
        let target_speed = if clamped {
            max_vert_speed.copysign(parabolic_speed)
        } else {
            parabolic_speed
        };

        let acc_limit = snap.max_lift_acc.abs() + g_eff;
        let vertical_acc = if clamped {
            0.0
        } else {
            (parabolic_acc * (1.0 - relax_blend) + relax_acc * relax_blend).clamp(-acc_limit, acc_limit)
        };
        let vertical_speed = (relax_blend * relax_speed + (1.0 - relax_blend) * target_speed)
            .clamp(-max_vert_speed, max_vert_speed);

        AltitudeCommand {
            vertical_speed,
            vertical_acc,
            parabolic_speed,
            climb_angle,
            relax_blend,
            regime,
        }
    }
}

/// Horizontal direction at `horizontal_speed` plus `vertical_speed` along
/// `normal`, renormalized. Falls back to `direction` when both are zero.
pub fn compose(
    direction: &Unit<Vector3<f64>>,
    horizontal_speed: f64,
    normal: &Unit<Vector3<f64>>,
    vertical_speed: f64,
) -> Unit<Vector3<f64>> {
    let v = direction.into_inner() * horizontal_speed + normal.into_inner() * vertical_speed;
    Unit::try_new(v, 1e-9).unwrap_or(*direction)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::plant::SimThrust;

    const R: f64 = 600_000.0;

    /// Level flight over a non-rotating body with exactly `g` downward.
    fn snapshot(altitude: f64, v_horiz: f64, v_vert: f64, g: f64) -> TickSnapshot {
        let n = Vector3::x();
        TickSnapshot {
            position: n * (R + altitude),
            surface_velocity: Vector3::new(v_vert, v_horiz, 0.0),
            body_radius: R,
            rotation_axis: Vector3::z_axis(),
            gravity_acc: -n * g,
            noninertial_acc: Vector3::zeros(),
            latitude: 0.0,
            longitude: 0.0,
            max_lift_acc: 20.0,
            landed: false,
            dt: 0.02,
        }
    }

    fn regulator() -> VerticalRegulator {
        VerticalRegulator::new(6.0, 0.3, 30.0, &PidGains::default())
    }

    #[test]
    fn zero_height_error_commands_zero_relaxation_speed() {
        let mut reg = regulator();
        let mut thrust = SimThrust::disabled();
        let cmd = reg.altitude_hold(&snapshot(1000.0, 200.0, 0.0, 9.8), 1000.0, &mut thrust, 1.0);
        assert_eq!(cmd.regime, AltitudeRegime::Relaxation);
        assert!(cmd.relax_blend > 0.99);
        assert!(cmd.vertical_speed.abs() < 1e-9);
    }

    #[test]
    fn parabolic_ascent_far_below_target() {
        // relax band = 0.5 * 9.8 * 36 = 176.4 m, error 1000 m is outside it
        let mut reg = regulator();
        reg.pseudo_flc = false;
        let mut thrust = SimThrust::disabled();
        let cmd = reg.altitude_hold(&snapshot(1000.0, 300.0, 0.0, 9.8), 2000.0, &mut thrust, 1.0);
        assert_eq!(cmd.regime, AltitudeRegime::FullClimb);
        assert_eq!(cmd.relax_blend, 0.0);
        assert!((cmd.parabolic_speed - (9.8_f64 * 1000.0).sqrt()).abs() < 1e-9);
        assert!((cmd.parabolic_speed - 98.99).abs() < 0.01);
        // 300 * tan(30 deg) = 173 m/s ceiling, not active
        assert!((cmd.vertical_speed - cmd.parabolic_speed).abs() < 1e-9);
    }

    #[test]
    fn climb_angle_ceiling_clamps_target() {
        let mut reg = regulator();
        let mut thrust = SimThrust::disabled();
        let cmd = reg.altitude_hold(&snapshot(0.0, 100.0, 0.0, 9.8), 5000.0, &mut thrust, 1.0);
        let ceiling = 100.0 * 30.0_f64.to_radians().tan();
        assert!((cmd.vertical_speed - ceiling).abs() < 1e-9);
        assert_eq!(cmd.vertical_acc, 0.0, "Feed-forward is dropped while clamped");
    }

    #[test]
    fn proportional_climb_tapers_with_speed_deficit() {
        let mut reg = regulator();
        reg.pseudo_flc = false;
        let mut thrust = SimThrust::new(400.0);
        let cmd = reg.altitude_hold(&snapshot(0.0, 200.0, 0.0, 9.8), 5000.0, &mut thrust, 1.0);
        assert_eq!(cmd.regime, AltitudeRegime::ProportionalClimb);
        assert!((cmd.climb_angle - 15.0).abs() < 1e-9);
        assert!(thrust.forced().is_none());
    }

    #[test]
    fn flc_forces_throttle_by_direction() {
        let mut reg = regulator();
        let mut thrust = SimThrust::new(200.0);
        let cmd = reg.altitude_hold(&snapshot(0.0, 200.0, 0.0, 9.8), 5000.0, &mut thrust, 1.0);
        assert_eq!(cmd.regime, AltitudeRegime::FlightLevelChange);
        assert!(cmd.climb_angle >= MIN_FLC_ANGLE && cmd.climb_angle <= 30.0);
        assert_eq!(thrust.forced(), Some(1.0));

        let cmd = reg.altitude_hold(&snapshot(5000.0, 200.0, 0.0, 9.8), 0.0, &mut thrust, 1.0);
        assert!(cmd.climb_angle <= -MIN_FLC_ANGLE && cmd.climb_angle >= -30.0);
        assert!(cmd.vertical_speed < 0.0);
        assert_eq!(thrust.forced(), Some(0.0));
    }

    #[test]
    fn entering_relaxation_clears_flc_integral() {
        let mut reg = regulator();
        let mut thrust = SimThrust::new(250.0);
        for _ in 0..100 {
            reg.altitude_hold(&snapshot(0.0, 300.0, 0.0, 9.8), 5000.0, &mut thrust, 1.0);
        }
        assert!(reg.flc_pid().integral() != 0.0);

        reg.altitude_hold(&snapshot(4950.0, 300.0, 0.0, 9.8), 5000.0, &mut thrust, 1.0);
        assert_eq!(reg.regime(), Some(AltitudeRegime::Relaxation));
        assert_eq!(reg.flc_pid().integral(), 0.0);

        let mut fresh = Pid::from_gains(&PidGains::default());
        let expected = fresh.control(250.0, 300.0, 0.02);
        assert_eq!(reg.flc_pid_mut().control(250.0, 300.0, 0.02), expected);
    }

    #[test]
    fn relaxation_damps_motion_toward_setpoint() {
        let mut reg = regulator();
        let mut thrust = SimThrust::disabled();
        let cmd = reg.altitude_hold(&snapshot(990.0, 200.0, 5.0, 9.8), 1000.0, &mut thrust, 1.0);
        assert!((cmd.vertical_speed - 3.0).abs() < 1e-9);
        assert!((cmd.vertical_acc + 1.5).abs() < 1e-9);
    }

    #[test]
    fn descent_profile_uses_acceleration_floor() {
        let mut reg = regulator();
        reg.pseudo_flc = false;
        let mut thrust = SimThrust::disabled();
        // lift term 1 * 20 * 0.5 = 10 > g, floor of -5 applies: acc = -10
        let cmd = reg.altitude_hold(&snapshot(3000.0, 1000.0, 0.0, 9.8), 2000.0, &mut thrust, 1.0);
        assert!((cmd.parabolic_speed + 100.0).abs() < 1e-9);
        assert!((cmd.vertical_speed + 100.0).abs() < 1e-9);
    }

    #[test]
    fn stronger_attitude_steepens_descent_profile() {
        let mut reg = regulator();
        reg.pseudo_flc = false;
        let mut thrust = SimThrust::disabled();
        let snap = snapshot(3000.0, 1000.0, 0.0, 9.8);
        // lift 2 * 20 * 0.5 = 20: acc = 2 * (9.8 - 20) = -20.4
        let strong = reg.altitude_hold(&snap, 2000.0, &mut thrust, 2.0);
        assert!((strong.parabolic_speed + (20.4_f64 * 1000.0).sqrt()).abs() < 1e-9);
        let weak = reg.altitude_hold(&snap, 2000.0, &mut thrust, 1.0);
        assert!(strong.parabolic_speed < weak.parabolic_speed);
    }

    #[test]
    fn flight_path_angle_mode_composes_direction() {
        let mut reg = regulator();
        let mut thrust = SimThrust::disabled();
        let snap = snapshot(1000.0, 200.0, 0.0, 9.8);
        let n = snap.normal().unwrap();
        let dir = Vector3::y_axis();
        let cmd = reg.regulate(HeightMode::FlightPathAngle, 0.0, 10.0, &snap, &n, &dir, &mut thrust, 1.0);
        let gamma = cmd.direction.dot(&n).asin().to_degrees();
        assert!((gamma - 10.0).abs() < 1e-9);
        assert!((cmd.direction.norm() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn vertical_speed_mode_uses_setpoint() {
        let mut reg = regulator();
        let mut thrust = SimThrust::disabled();
        let snap = snapshot(1000.0, 200.0, 0.0, 9.8);
        let n = snap.normal().unwrap();
        let dir = Vector3::y_axis();
        let cmd = reg.regulate(HeightMode::VerticalSpeed, 0.0, -20.0, &snap, &n, &dir, &mut thrust, 1.0);
        assert_eq!(cmd.vertical_speed, -20.0);
        let expected = Vector3::new(-20.0, 200.0, 0.0).normalize();
        assert!((cmd.direction.into_inner() - expected).norm() < 1e-12);
    }
}
