use nalgebra::{Unit, Vector3};

// ---------------------------------------------------------------------------
// Collaborators the cruise core drives
// ---------------------------------------------------------------------------

/// Lower-level attitude controller: turns a desired velocity direction into
/// actuator commands.
pub trait AttitudeGuidance {
    /// Aggressiveness multiplier applied to the attitude response.
    fn strength(&self) -> f64;

    fn set_strength(&mut self, strength: f64);

    /// Follow `direction`; `acceleration` is a feed-forward term (vertical
    /// correction + centrifugal leveling), m/s^2.
    fn apply(&mut self, direction: &Unit<Vector3<f64>>, acceleration: &Vector3<f64>);
}

/// Speed/thrust controller.
pub trait ThrustControl {
    fn speed_control_enabled(&self) -> bool;

    /// Airspeed setpoint, m/s.
    fn target_speed(&self) -> f64;

    /// Override the throttle (0.0..=1.0) for the current tick.
    fn force_throttle(&mut self, throttle: f64);
}

// ---------------------------------------------------------------------------
// Operator notices
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    /// Short-lived message (arrival, refusals).
    Transient(String),
    /// Status that stays up until replaced (current cruise mode).
    Persistent(String),
}

impl Notice {
    pub fn text(&self) -> &str {
        match self {
            Notice::Transient(s) | Notice::Persistent(s) => s,
        }
    }
}

pub trait NoticeSink {
    fn post(&mut self, notice: Notice);
}

/// Notice sink that just keeps everything it receives.
#[derive(Debug, Clone, Default)]
pub struct NoticeLog {
    pub notices: Vec<Notice>,
}

impl NoticeLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.notices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notices.is_empty()
    }

    pub fn last(&self) -> Option<&Notice> {
        self.notices.last()
    }

    pub fn transient_count(&self) -> usize {
        self.notices.iter().filter(|n| matches!(n, Notice::Transient(_))).count()
    }

    pub fn contains(&self, text: &str) -> bool {
        self.notices.iter().any(|n| n.text().contains(text))
    }
}

impl NoticeSink for NoticeLog {
    fn post(&mut self, notice: Notice) {
        self.notices.push(notice);
    }
}
