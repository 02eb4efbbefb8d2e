use log::{info, trace, warn};
use nalgebra::{Unit, Vector3};

use crate::config::CruiseConfig;
use crate::dynamics::TickSnapshot;
use crate::error::{ConfigError, TransitionRefused};
use crate::geo::{self, Waypoint};
use super::altitude::VerticalRegulator;
use super::guidance;
use super::interfaces::{AttitudeGuidance, Notice, NoticeSink, ThrustControl};
use super::modes::{self, CruiseMode, ForcedTransition, HeightMode, POLE_LATITUDE_LIMIT};
use super::pid::PidGains;
use super::turn::limit_wide_turn;

// ---------------------------------------------------------------------------
// Guidance output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
pub struct GuidanceCommand {
    pub direction: Unit<Vector3<f64>>, // desired velocity direction
    pub acceleration: Vector3<f64>,    // m/s^2, leveling + vertical feed-forward
    pub mode: CruiseMode,              // mode that actually ran this tick
    pub vertical_speed: Option<f64>,   // m/s, when vertical control ran
}

// ---------------------------------------------------------------------------
// Cruise controller
// ---------------------------------------------------------------------------

/// Cruise guidance core.
///
/// Owns its attitude, thrust and notice collaborators. Per tick it resolves
/// the effective cruise mode, computes the raw horizontal direction, limits
/// wide turns, layers vertical regulation on top and hands the result to the
/// attitude controller.
pub struct CruiseController<A, T, N> {
    attitude: A,
    thrust: T,
    notices: N,

    active: bool,
    cruise_mode: CruiseMode,
    height_mode: HeightMode,
    circle_axis: Vector3<f64>, // unit once activated, zero before

    desired_course: f64,
    waypoint: Waypoint,
    desired_altitude: f64,
    desired_vertspeed: f64,
    dist_to_dest: f64,
    vertical_control: bool,
    strength_mult: f64,

    regulator: VerticalRegulator,
}

impl<A, T, N> CruiseController<A, T, N>
where
    A: AttitudeGuidance,
    T: ThrustControl,
    N: NoticeSink,
{
    pub fn new(config: &CruiseConfig, attitude: A, thrust: T, notices: N) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            attitude,
            thrust,
            notices,
            active: false,
            cruise_mode: config.cruise_mode,
            height_mode: config.height_mode,
            circle_axis: Vector3::zeros(),
            desired_course: config.desired_course.rem_euclid(360.0),
            waypoint: config.waypoint,
            desired_altitude: config.desired_altitude,
            desired_vertspeed: config.desired_vertspeed,
            dist_to_dest: 0.0,
            vertical_control: config.vertical_control,
            strength_mult: config.strength_mult,
            regulator: VerticalRegulator::from_config(config),
        })
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    pub fn activate(&mut self, snap: &TickSnapshot) {
        self.active = true;
        // Zero at rest; the first tick with a usable velocity picks it up
        self.circle_axis = guidance::great_circle_axis(&snap.position, &snap.surface_velocity)
            .map(|axis| axis.into_inner())
            .unwrap_or(Vector3::zeros());
        if self.cruise_mode == CruiseMode::Waypoint {
            self.refresh_distance(snap);
        }
        self.regulator.reset();
        info!("cruise control activated in {} / {} mode", self.cruise_mode, self.height_mode);
    }

    pub fn deactivate(&mut self) {
        self.active = false;
        self.regulator.reset();
        info!("cruise control deactivated");
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    // -----------------------------------------------------------------------
    // Mode transitions
    // -----------------------------------------------------------------------

    /// Switch the cruise mode. Refusals leave every bit of state untouched
    /// and post one notice.
    pub fn request_mode(&mut self, mode: CruiseMode, snap: &TickSnapshot) -> Result<(), TransitionRefused> {
        if mode == self.cruise_mode {
            return Ok(());
        }
        match mode {
            CruiseMode::LevelFlight => self.enter_level_flight(snap),
            CruiseMode::CourseHold => {
                if snap.latitude.abs() > POLE_LATITUDE_LIMIT {
                    return self.refuse(TransitionRefused::NearPole {
                        latitude: snap.latitude,
                        limit: POLE_LATITUDE_LIMIT,
                    });
                }
            }
            CruiseMode::Waypoint => {
                if !self.active {
                    return self.refuse(TransitionRefused::Inactive(CruiseMode::Waypoint));
                }
                if let Some(axis) = guidance::great_circle_axis(&snap.position, &snap.surface_velocity) {
                    self.circle_axis = axis.into_inner();
                }
                self.refresh_distance(snap);
            }
        }
        info!("cruise mode {} -> {}", self.cruise_mode, mode);
        self.set_cruise_mode(mode);
        Ok(())
    }

    /// Pick a new waypoint and fly to it. Only allowed while active.
    pub fn select_waypoint(&mut self, waypoint: Waypoint, snap: &TickSnapshot) -> Result<(), TransitionRefused> {
        if !self.active {
            return self.refuse(TransitionRefused::Inactive(CruiseMode::Waypoint));
        }
        self.waypoint = waypoint;
        info!("waypoint set to lat {:.4} lon {:.4}", waypoint.latitude, waypoint.longitude);
        if self.cruise_mode == CruiseMode::Waypoint {
            self.refresh_distance(snap);
            Ok(())
        } else {
            self.request_mode(CruiseMode::Waypoint, snap)
        }
    }

    /// Switch the vertical strategy, converting the stored setpoint so the
    /// vertical command doesn't jump.
    pub fn request_height_mode(&mut self, mode: HeightMode, snap: &TickSnapshot) {
        if mode == self.height_mode {
            return;
        }
        self.desired_vertspeed = modes::convert_vertical_setpoint(
            self.height_mode,
            mode,
            self.desired_vertspeed,
            snap.horizontal_speed(),
        );
        info!("height mode {} -> {}", self.height_mode, mode);
        self.height_mode = mode;
    }

    fn refuse(&mut self, reason: TransitionRefused) -> Result<(), TransitionRefused> {
        warn!("{}", reason);
        self.notices.post(Notice::Transient(reason.to_string()));
        Err(reason)
    }

    fn enter_level_flight(&mut self, snap: &TickSnapshot) {
        if let Some(axis) = guidance::great_circle_axis(&snap.position, &snap.surface_velocity) {
            self.circle_axis = axis.into_inner();
        }
    }

    fn refresh_distance(&mut self, snap: &TickSnapshot) {
        if let Some(d) = geo::distance_to(snap, &self.waypoint) {
            self.dist_to_dest = d;
        }
    }

    fn force_transition(&mut self, forced: ForcedTransition, snap: &TickSnapshot) {
        info!("cruise mode {} -> {} ({:?})", self.cruise_mode, CruiseMode::LevelFlight, forced);
        self.enter_level_flight(snap);
        self.notices.post(Notice::Transient(forced.notice_text()));
        self.set_cruise_mode(CruiseMode::LevelFlight);
    }

    fn set_cruise_mode(&mut self, mode: CruiseMode) {
        self.cruise_mode = mode;
        self.notices.post(Notice::Persistent(format!("Cruise: {}", mode)));
    }

    /// Stored great-circle axis, re-derived from the current velocity when
    /// it was never set (activated at rest).
    fn level_flight_axis(&mut self, snap: &TickSnapshot) -> Option<Unit<Vector3<f64>>> {
        if let Some(axis) = Unit::try_new(self.circle_axis, 1e-9) {
            return Some(axis);
        }
        let axis = guidance::great_circle_axis(&snap.position, &snap.surface_velocity)?;
        self.circle_axis = axis.into_inner();
        Some(axis)
    }

    // -----------------------------------------------------------------------
    // Per-tick guidance
    // -----------------------------------------------------------------------

    /// Run one guidance tick. `None` means nothing was commanded: inactive,
    /// landed, or the geometry was degenerate this tick.
    pub fn tick(&mut self, snap: &TickSnapshot) -> Option<GuidanceCommand> {
        if !self.active || snap.landed {
            return None;
        }
        let normal = snap.normal()?;

        // 1. Effective mode for this tick
        if self.cruise_mode == CruiseMode::Waypoint {
            self.refresh_distance(snap);
        }
        let (mode, forced) = modes::resolve_mode(self.cruise_mode, snap.latitude, self.dist_to_dest);
        if let Some(forced) = forced {
            self.force_transition(forced, snap);
        }

        // 2. Raw horizontal direction
        let raw = match mode {
            CruiseMode::LevelFlight => {
                let axis = self.level_flight_axis(snap)?;
                guidance::level_flight_direction(&normal, &axis)?
            }
            CruiseMode::CourseHold => {
                guidance::course_direction(&normal, &snap.rotation_axis, self.desired_course)?
            }
            CruiseMode::Waypoint => {
                let target = geo::target_position(snap, &self.waypoint)?;
                let axis = guidance::axis_toward(&snap.position, &target)?;
                self.circle_axis = axis.into_inner();
                guidance::level_flight_direction(&normal, &axis)?
            }
        };

        // 3. Wide-turn limiting
        let limited = limit_wide_turn(&snap.horizontal_velocity(), &normal, raw);

        // 4. Vertical regulation
        let base_strength = self.attitude.strength();
        let strength = base_strength * self.strength_mult;
        let (direction, vertical_acc, vertical_speed) = if self.vertical_control {
            let cmd = self.regulator.regulate(
                self.height_mode,
                self.desired_altitude,
                self.desired_vertspeed,
                snap,
                &normal,
                &limited,
                &mut self.thrust,
                strength,
            );
            (cmd.direction, cmd.vertical_acc, Some(cmd.vertical_speed))
        } else {
            (limited, 0.0, None)
        };

        // Centripetal term to stay on the sphere at constant altitude
        let radius = snap.position.norm();
        let level_acc = -normal.into_inner() * snap.horizontal_velocity().norm_squared() / radius;
        let acceleration = level_acc + normal.into_inner() * vertical_acc;

        self.attitude.set_strength(strength);
        self.attitude.apply(&direction, &acceleration);
        self.attitude.set_strength(base_strength);

        trace!(
            "tick mode={} dir=({:.3}, {:.3}, {:.3}) vacc={:.3}",
            mode, direction.x, direction.y, direction.z, vertical_acc
        );

        Some(GuidanceCommand {
            direction,
            acceleration,
            mode,
            vertical_speed,
        })
    }

    // -----------------------------------------------------------------------
    // Setpoints
    // -----------------------------------------------------------------------

    pub fn set_course(&mut self, course: f64) {
        if course.is_finite() {
            self.desired_course = course.rem_euclid(360.0);
        }
    }

    pub fn set_desired_altitude(&mut self, altitude: f64) {
        if altitude.is_finite() {
            self.desired_altitude = altitude;
        }
    }

    /// m/s in VerticalSpeed mode, degrees in FlightPathAngle mode.
    pub fn set_vertical_setpoint(&mut self, value: f64) {
        if value.is_finite() {
            self.desired_vertspeed = value;
        }
    }

    pub fn set_vertical_control(&mut self, enabled: bool) {
        if enabled != self.vertical_control {
            self.regulator.reset();
        }
        self.vertical_control = enabled;
    }

    pub fn set_pseudo_flc(&mut self, enabled: bool) {
        self.regulator.pseudo_flc = enabled;
    }

    /// Ignored unless positive and finite.
    pub fn set_strength_mult(&mut self, mult: f64) {
        if mult.is_finite() && mult > 0.0 {
            self.strength_mult = mult;
        }
    }

    /// Retune the FLC loop. Accumulated integral is kept.
    pub fn set_flc_gains(&mut self, gains: &PidGains) {
        self.regulator.flc_pid_mut().set_gains(gains);
    }

    /// Current setpoints and tuning, ready to be persisted by the host.
    pub fn settings(&self) -> CruiseConfig {
        CruiseConfig {
            cruise_mode: self.cruise_mode,
            height_mode: self.height_mode,
            desired_course: self.desired_course,
            waypoint: self.waypoint,
            desired_altitude: self.desired_altitude,
            desired_vertspeed: self.desired_vertspeed,
            vertical_control: self.vertical_control,
            pseudo_flc: self.regulator.pseudo_flc,
            flc_pid: self.regulator.flc_pid().gains(),
            relax_time: self.regulator.relax_time,
            height_relax_kp: self.regulator.relax_kp,
            max_climb_angle: self.regulator.max_climb_angle,
            strength_mult: self.strength_mult,
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn cruise_mode(&self) -> CruiseMode {
        self.cruise_mode
    }

    pub fn height_mode(&self) -> HeightMode {
        self.height_mode
    }

    pub fn circle_axis(&self) -> Vector3<f64> {
        self.circle_axis
    }

    pub fn desired_course(&self) -> f64 {
        self.desired_course
    }

    pub fn waypoint(&self) -> Waypoint {
        self.waypoint
    }

    pub fn desired_altitude(&self) -> f64 {
        self.desired_altitude
    }

    pub fn desired_vertspeed(&self) -> f64 {
        self.desired_vertspeed
    }

    pub fn dist_to_dest(&self) -> f64 {
        self.dist_to_dest
    }

    pub fn vertical_control(&self) -> bool {
        self.vertical_control
    }

    pub fn regulator(&self) -> &VerticalRegulator {
        &self.regulator
    }

    pub fn regulator_mut(&mut self) -> &mut VerticalRegulator {
        &mut self.regulator
    }

    pub fn attitude(&self) -> &A {
        &self.attitude
    }

    pub fn attitude_mut(&mut self) -> &mut A {
        &mut self.attitude
    }

    pub fn thrust(&self) -> &T {
        &self.thrust
    }

    pub fn thrust_mut(&mut self) -> &mut T {
        &mut self.thrust
    }

    pub fn notices(&self) -> &N {
        &self.notices
    }
}
